#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only data access for the police post log store.
//!
//! Every query goes through [`access::DataAccess::execute`], which never
//! fails: connection and query errors are logged, reported back as an
//! operator-visible message, and replaced by an empty
//! [`ResultTable`](securecheck_database_models::ResultTable).
//!
//! The store itself sits behind the [`source::QuerySource`] trait. The
//! production implementation ([`db::PostgresSource`]) runs raw SQL through
//! `switchy_database`; [`source::StaticSource`] serves canned tables for
//! tests and offline demos.

pub mod access;
pub mod config;
pub mod db;
pub mod records;
pub mod source;

pub use access::{DataAccess, Fetch};

/// Errors that can occur while talking to the log store.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Could not open a connection.
    #[error("connection error: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },

    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// A query could not be answered for a reason other than the driver.
    #[error("query error: {message}")]
    Query {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}
