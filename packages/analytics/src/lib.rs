#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics over the police post logs.
//!
//! [`catalog`] holds the fixed set of analytical questions, [`engine`]
//! runs them (and the built-in summary queries) through the data access
//! layer, and [`predict`] answers "what usually happens to a stop like
//! this one" from the historical records.

pub mod catalog;
pub mod engine;
pub mod predict;

pub use engine::Analytics;

use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The requested catalog entry does not exist.
    #[error(transparent)]
    Catalog(#[from] catalog::CatalogError),

    /// The predict form was filled in with invalid values.
    #[error(transparent)]
    Predict(#[from] predict::PredictError),
}
