#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the SecureCheck server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the analytics types to allow independent evolution of the API
//! contract. Every response that reads the store carries a `notices` list
//! with operator-visible messages such as connection failures.

use securecheck_analytics_models::{CatalogOutcome, NO_RESULTS_MESSAGE, Overview, Prediction};
use securecheck_database_models::ResultTable;
use securecheck_log_models::{DEFAULT_DRIVER_AGE, Gender, MAX_DRIVER_AGE, MIN_DRIVER_AGE};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// A table together with the notices raised while fetching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTable {
    /// The rows.
    pub table: ResultTable,
    /// Operator-visible messages.
    pub notices: Vec<String>,
}

/// Everything the analytics page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAnalytics {
    /// Summary, breakdowns and day/night counts.
    #[serde(flatten)]
    pub overview: Overview,
    /// Operator-visible messages.
    pub notices: Vec<String>,
}

/// One entry of the query catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiQuery {
    /// Stable kebab-case id used in `/api/queries/{id}`.
    pub id: String,
    /// The question as shown in the selector.
    pub label: String,
    /// Output columns.
    pub columns: Vec<String>,
}

/// Outcome of running a catalog query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ApiQueryOutcome {
    /// The query produced rows.
    Rows {
        /// The produced rows.
        table: ResultTable,
    },
    /// The query produced nothing.
    NoResults {
        /// Always [`NO_RESULTS_MESSAGE`].
        message: String,
    },
}

impl From<CatalogOutcome> for ApiQueryOutcome {
    fn from(outcome: CatalogOutcome) -> Self {
        match outcome {
            CatalogOutcome::Rows { table } => Self::Rows { table },
            CatalogOutcome::NoResults => Self::NoResults {
                message: NO_RESULTS_MESSAGE.to_string(),
            },
        }
    }
}

/// Response of `GET /api/queries/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiQueryResult {
    /// Id of the query that ran.
    pub id: String,
    /// Label of the query that ran.
    pub label: String,
    /// Rows or the no-results message.
    #[serde(flatten)]
    pub outcome: ApiQueryOutcome,
    /// Operator-visible messages.
    pub notices: Vec<String>,
}

/// Choices offered by the predict form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPredictOptions {
    /// Selectable driver genders.
    pub genders: Vec<Gender>,
    /// Youngest accepted age.
    pub min_age: u8,
    /// Oldest accepted age.
    pub max_age: u8,
    /// Pre-filled age.
    pub default_age: u8,
    /// Stop duration labels present in the data.
    pub stop_durations: Vec<String>,
    /// Operator-visible messages.
    pub notices: Vec<String>,
}

impl ApiPredictOptions {
    /// Form options with the given stop durations.
    #[must_use]
    pub fn new(stop_durations: Vec<String>, notices: Vec<String>) -> Self {
        Self {
            genders: Gender::all().to_vec(),
            min_age: MIN_DRIVER_AGE,
            max_age: MAX_DRIVER_AGE,
            default_age: DEFAULT_DRIVER_AGE,
            stop_durations,
            notices,
        }
    }
}

/// Response of `POST /api/predict`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrediction {
    /// The prediction and its narrative.
    #[serde(flatten)]
    pub prediction: Prediction,
    /// Operator-visible messages.
    pub notices: Vec<String>,
}
