#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line interface for SecureCheck.
//!
//! ```text
//! securecheck logs [--limit 50]
//! securecheck queries
//! securecheck run <id or label>
//! securecheck summary
//! securecheck predict --gender Female --age 30 --duration "0-15 Min" [--search] [--drugs]
//! securecheck serve
//! ```
//!
//! Running `securecheck` with no subcommand enters interactive mode.
//! Settings come from the file named by `SECURECHECK_CONFIG` and the
//! `DATABASE_URL` / `SECURECHECK_DB_*` variables; each query opens its own
//! connection unless `SECURECHECK_DB_POLICY=persistent`.

mod interactive;
mod render;

use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use securecheck_analytics::Analytics;
use securecheck_analytics::catalog::{self, CatalogQuery};
use securecheck_analytics_models::{CandidateRecord, CatalogOutcome, NO_RESULTS_MESSAGE};
use securecheck_database::DataAccess;
use securecheck_database_models::{ConnectionPolicy, ResultTable};
use securecheck_log_models::{DEFAULT_DRIVER_AGE, Gender};
use securecheck_server::Settings;

#[derive(Parser)]
#[command(
    name = "securecheck",
    about = "Browse police stop logs, run catalog queries and predict stop outcomes"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the police post logs
    Logs {
        /// Maximum number of rows to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the catalog queries
    Queries,
    /// Run a catalog query
    Run {
        /// Query id (see `queries`) or its full label
        query: String,
    },
    /// Show summary counts, breakdowns and day/night counts
    Summary,
    /// Predict violation and outcome for a stop
    Predict {
        /// Driver gender (Male or Female)
        #[arg(long, value_parser = parse_gender)]
        gender: Gender,
        /// Driver age (16-100)
        #[arg(long, default_value_t = DEFAULT_DRIVER_AGE)]
        age: u8,
        /// A search was conducted
        #[arg(long)]
        search: bool,
        /// The stop was drug related
        #[arg(long)]
        drugs: bool,
        /// Stop duration label, e.g. "0-15 Min"
        #[arg(long)]
        duration: String,
        /// Stop date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Stop time (HH:MM), defaults to now
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        /// Country name
        #[arg(long, default_value = "")]
        country: String,
        /// Driver race
        #[arg(long, default_value = "")]
        race: String,
        /// Search type
        #[arg(long, default_value = "")]
        search_type: String,
        /// Vehicle number
        #[arg(long, default_value = "")]
        vehicle: String,
    },
    /// Start the API server
    Serve,
}

fn parse_gender(s: &str) -> Result<Gender, String> {
    s.parse()
        .map_err(|_| format!("unknown gender '{s}', expected Male or Female"))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| format!("invalid time '{s}': {e}"))
}

/// Resolves a catalog query from its id or its label.
fn resolve_query(query: &str) -> Result<CatalogQuery, catalog::CatalogError> {
    CatalogQuery::from_id(query).or_else(|_| catalog::lookup(query).map(|d| d.id))
}

pub(crate) fn print_notices(notices: &[String]) {
    for notice in notices {
        eprintln!("warning: {notice}");
    }
}

pub(crate) fn print_outcome(outcome: &CatalogOutcome) {
    match outcome.table() {
        Some(table) => print!("{}", render::table(table)),
        None => println!("{NO_RESULTS_MESSAGE}"),
    }
}

fn truncated(table: ResultTable, limit: Option<usize>) -> ResultTable {
    let Some(limit) = limit else {
        return table;
    };
    let mut out = ResultTable::new(table.columns().iter().cloned());
    for row in table.raw_rows().iter().take(limit) {
        out.push_row(row.clone());
    }
    out
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let settings = Settings::load()?;

    // No connection is opened until the first query.
    let policy = settings.database.policy_or(ConnectionPolicy::PerCall);
    log::debug!(
        "Using log store at {}:{}/{} ({policy})",
        settings.database.connection.host,
        settings.database.connection.port,
        settings.database.connection.database
    );
    let analytics = Analytics::new(DataAccess::postgres(
        settings.database.connection.clone(),
        policy,
    ));

    let Some(command) = cli.command else {
        return interactive::run(&analytics, settings).await;
    };

    match command {
        Commands::Logs { limit } => {
            let logs = analytics.logs().await;
            print_notices(&logs.notices);
            let total = logs.value.row_count();
            print!("{}", render::table(&truncated(logs.value, limit)));
            println!("\n{total} stop(s)");
        }
        Commands::Queries => {
            for d in catalog::descriptors() {
                println!("{:<34} {}", d.id.as_ref(), d.label);
            }
        }
        Commands::Run { query } => {
            let query = resolve_query(&query)?;
            println!("{}\n", query.descriptor().label);
            let outcome = analytics.run_catalog_query(query).await;
            print_notices(&outcome.notices);
            print_outcome(&outcome.value);
        }
        Commands::Summary => {
            let overview = analytics.overview().await;
            print_notices(&overview.notices);
            print!("{}", render::overview(&overview.value));
        }
        Commands::Predict {
            gender,
            age,
            search,
            drugs,
            duration,
            date,
            time,
            country,
            race,
            search_type,
            vehicle,
        } => {
            let now = Local::now().naive_local();
            let candidate = CandidateRecord {
                stop_date: date.unwrap_or_else(|| now.date()),
                stop_time: time.unwrap_or_else(|| now.time()),
                country_name: country,
                driver_gender: gender,
                driver_age: age,
                driver_race: race,
                search_conducted: search,
                search_type,
                drugs_related_stop: drugs,
                stop_duration: duration,
                vehicle_number: vehicle,
            };

            let prediction = analytics.predict(&candidate).await?;
            print_notices(&prediction.notices);
            print!("{}", render::prediction(&prediction.value));
        }
        Commands::Serve => serve(settings).await?,
    }

    Ok(())
}

/// Starts the API server and blocks until it stops.
pub(crate) async fn serve(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    // The server uses actix-web's runtime, so we need to run it
    // in a blocking task to avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(securecheck_server::serve(settings))
    })
    .await??;
    Ok(())
}
