#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics result and prediction types.
//!
//! Defines the values the analytics engine hands to the presentation
//! layer: summary metrics, catalog query outcomes, day/night counts, and
//! the predict workflow's candidate record and prediction.

use chrono::{NaiveDate, NaiveTime};
use securecheck_database_models::{CellValue, ResultTable};
use securecheck_log_models::{Gender, TimeOfDay};
use serde::{Deserialize, Deserializer, Serialize};

/// Message shown in place of an empty catalog result.
pub const NO_RESULTS_MESSAGE: &str = "No Results Found";

/// A value together with the operator-visible notices raised while
/// producing it (for example, a connection failure that degraded the
/// value to empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reported<T> {
    /// The produced value.
    pub value: T,
    /// Messages to show the operator.
    pub notices: Vec<String>,
}

impl<T> Reported<T> {
    /// Transforms the value, keeping the notices.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reported<U> {
        Reported {
            value: f(self.value),
            notices: self.notices,
        }
    }
}

/// Headline metrics for the analytics page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounts {
    /// Number of stops.
    pub total_stops: u64,
    /// Stops whose outcome mentions "arrest", any case.
    pub arrests: u64,
    /// Stops whose outcome mentions "warning", any case.
    pub warnings: u64,
    /// Stops flagged as drug related.
    pub drug_related_stops: u64,
}

impl SummaryCounts {
    /// Reduces a `Police_Post_Logs` table to the four headline metrics.
    ///
    /// Null outcomes match neither "arrest" nor "warning"; unreadable drug
    /// flags count as not drug related.
    #[must_use]
    pub fn from_table(table: &ResultTable) -> Self {
        let mut counts = Self {
            total_stops: table.row_count() as u64,
            ..Self::default()
        };

        for outcome in table
            .column_values("stop_outcome")
            .filter_map(CellValue::as_text)
        {
            let outcome = outcome.to_lowercase();
            if outcome.contains("arrest") {
                counts.arrests += 1;
            }
            if outcome.contains("warning") {
                counts.warnings += 1;
            }
        }

        counts.drug_related_stops = table
            .column_values("drugs_related_stop")
            .filter(|v| v.as_flag() == Some(true))
            .count() as u64;

        counts
    }
}

/// Result of running one catalog query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CatalogOutcome {
    /// The query produced at least one row.
    Rows {
        /// The produced rows.
        table: ResultTable,
    },
    /// The query produced nothing; show [`NO_RESULTS_MESSAGE`].
    NoResults,
}

impl CatalogOutcome {
    /// Wraps a table, mapping an empty one to [`Self::NoResults`].
    #[must_use]
    pub fn from_table(table: ResultTable) -> Self {
        if table.is_empty() {
            Self::NoResults
        } else {
            Self::Rows { table }
        }
    }

    /// The rows, if any.
    #[must_use]
    pub const fn table(&self) -> Option<&ResultTable> {
        match self {
            Self::Rows { table } => Some(table),
            Self::NoResults => None,
        }
    }
}

/// Stop and arrest counts for one time-of-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOfDayCount {
    /// The bucket.
    pub time_of_day: TimeOfDay,
    /// Stops in the bucket.
    pub total_stops: u64,
    /// Arrests in the bucket.
    pub total_arrests: u64,
}

/// Everything the analytics page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    /// Headline metrics.
    pub summary: SummaryCounts,
    /// Stops per violation (`violation`, `counts`).
    pub violations: ResultTable,
    /// Stops per gender (`driver_gender`, `count`).
    pub genders: ResultTable,
    /// Day and night stop and arrest counts.
    pub time_of_day: Vec<TimeOfDayCount>,
}

/// A new stop entered in the predict form.
///
/// Only the five match fields (`driver_gender`, `driver_age`,
/// `search_conducted`, `stop_duration`, `drugs_related_stop`) take part in
/// matching; the rest is echoed in the narrative. The candidate is never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    /// Date of the stop.
    pub stop_date: NaiveDate,
    /// Time of the stop; `HH:MM` or `HH:MM:SS`.
    #[serde(deserialize_with = "deserialize_time")]
    pub stop_time: NaiveTime,
    /// Jurisdiction label.
    #[serde(default)]
    pub country_name: String,
    /// Driver gender.
    pub driver_gender: Gender,
    /// Driver age in years (16-100).
    pub driver_age: u8,
    /// Driver race.
    #[serde(default)]
    pub driver_race: String,
    /// Whether a search was conducted.
    #[serde(deserialize_with = "securecheck_log_models::flag::deserialize")]
    pub search_conducted: bool,
    /// Kind of search.
    #[serde(default)]
    pub search_type: String,
    /// Whether the stop was drug related.
    #[serde(deserialize_with = "securecheck_log_models::flag::deserialize")]
    pub drugs_related_stop: bool,
    /// Bucketed duration label, one of the values present in the data.
    pub stop_duration: String,
    /// Vehicle identifier.
    #[serde(default)]
    pub vehicle_number: String,
}

fn deserialize_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(serde::de::Error::custom)
}

/// Outcome of the predict workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Most frequent violation among matching stops.
    pub predicted_violation: String,
    /// Most frequent outcome among matching stops.
    pub predicted_outcome: String,
    /// How many historical stops matched all five fields.
    pub matched_records: usize,
    /// `true` when nothing matched and the fixed defaults were used.
    pub used_defaults: bool,
    /// Natural-language description of the stop and the prediction.
    pub summary: String,
}
