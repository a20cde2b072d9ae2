//! Interactive mode: pick a page, then answer its prompts.

use chrono::{Local, NaiveDate, NaiveTime};
use dialoguer::{Confirm, Input, Select};
use securecheck_analytics::{Analytics, catalog};
use securecheck_analytics_models::CandidateRecord;
use securecheck_log_models::{DEFAULT_DRIVER_AGE, Gender, MAX_DRIVER_AGE, MIN_DRIVER_AGE};
use securecheck_server::Settings;

use crate::render;

enum Page {
    Logs,
    Analytics,
    QueryRunner,
    Predict,
    Server,
}

impl Page {
    const ALL: &[Self] = &[
        Self::Logs,
        Self::Analytics,
        Self::QueryRunner,
        Self::Predict,
        Self::Server,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Logs => "Browse police post logs",
            Self::Analytics => "Show analytics",
            Self::QueryRunner => "Run a catalog query",
            Self::Predict => "Predict a stop outcome",
            Self::Server => "Start server",
        }
    }
}

/// Runs interactive mode.
///
/// # Errors
///
/// Returns an error if a prompt fails, the prediction input is invalid or
/// the server cannot start.
pub async fn run(
    analytics: &Analytics,
    settings: Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("SecureCheck");
    println!();

    let labels: Vec<&str> = Page::ALL.iter().map(Page::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Page::ALL[idx] {
        Page::Logs => {
            let logs = analytics.logs().await;
            crate::print_notices(&logs.notices);
            print!("{}", render::table(&logs.value));
        }
        Page::Analytics => {
            let overview = analytics.overview().await;
            crate::print_notices(&overview.notices);
            print!("{}", render::overview(&overview.value));
        }
        Page::QueryRunner => {
            let labels: Vec<&str> = catalog::labels().collect();
            let idx = Select::new()
                .with_prompt("Select a query")
                .items(&labels)
                .default(0)
                .interact()?;
            let descriptor = catalog::lookup(labels[idx])?;
            let outcome = analytics.run_catalog_query(descriptor.id).await;
            crate::print_notices(&outcome.notices);
            crate::print_outcome(&outcome.value);
        }
        Page::Predict => {
            let candidate = prompt_candidate(analytics).await?;
            let prediction = analytics.predict(&candidate).await?;
            crate::print_notices(&prediction.notices);
            print!("{}", render::prediction(&prediction.value));
        }
        Page::Server => {
            if Confirm::new()
                .with_prompt(format!(
                    "Start server on {}:{}?",
                    settings.server.bind_addr, settings.server.port
                ))
                .default(true)
                .interact()?
            {
                crate::serve(settings).await?;
            } else {
                println!("Cancelled.");
            }
        }
    }

    Ok(())
}

/// Asks for every field of the predict form.
async fn prompt_candidate(
    analytics: &Analytics,
) -> Result<CandidateRecord, Box<dyn std::error::Error>> {
    let now = Local::now().naive_local();

    let stop_date: NaiveDate = Input::new()
        .with_prompt("Stop date (YYYY-MM-DD)")
        .default(now.date())
        .interact_text()?;

    let stop_time: String = Input::new()
        .with_prompt("Stop time (HH:MM)")
        .default(now.time().format("%H:%M").to_string())
        .interact_text()?;
    let stop_time = NaiveTime::parse_from_str(stop_time.trim(), "%H:%M")?;

    let country_name: String = Input::new()
        .with_prompt("Country name")
        .allow_empty(true)
        .interact_text()?;

    let genders: Vec<&str> = Gender::all().iter().map(AsRef::as_ref).collect();
    let gender_idx = Select::new()
        .with_prompt("Driver gender")
        .items(&genders)
        .default(0)
        .interact()?;

    let driver_age: u8 = Input::new()
        .with_prompt(format!("Driver age ({MIN_DRIVER_AGE}-{MAX_DRIVER_AGE})"))
        .default(DEFAULT_DRIVER_AGE)
        .validate_with(|age: &u8| {
            if (MIN_DRIVER_AGE..=MAX_DRIVER_AGE).contains(age) {
                Ok(())
            } else {
                Err(format!("age must be between {MIN_DRIVER_AGE} and {MAX_DRIVER_AGE}"))
            }
        })
        .interact_text()?;

    let driver_race: String = Input::new()
        .with_prompt("Driver race")
        .allow_empty(true)
        .interact_text()?;

    let search_conducted = Confirm::new()
        .with_prompt("Was a search conducted?")
        .default(false)
        .interact()?;

    let search_type: String = Input::new()
        .with_prompt("Search type")
        .allow_empty(true)
        .interact_text()?;

    let drugs_related_stop = Confirm::new()
        .with_prompt("Was it drug related?")
        .default(false)
        .interact()?;

    let durations = analytics.stop_durations().await;
    crate::print_notices(&durations.notices);
    let stop_duration = if durations.value.is_empty() {
        Input::new()
            .with_prompt("Stop duration")
            .interact_text()?
    } else {
        let idx = Select::new()
            .with_prompt("Stop duration")
            .items(&durations.value)
            .default(0)
            .interact()?;
        durations.value[idx].clone()
    };

    let vehicle_number: String = Input::new()
        .with_prompt("Vehicle number")
        .allow_empty(true)
        .interact_text()?;

    Ok(CandidateRecord {
        stop_date,
        stop_time,
        country_name,
        driver_gender: Gender::all()[gender_idx],
        driver_age,
        driver_race,
        search_conducted,
        search_type,
        drugs_related_stop,
        stop_duration,
        vehicle_number,
    })
}
