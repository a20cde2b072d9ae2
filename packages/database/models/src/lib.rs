#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result table and connection configuration types.
//!
//! A [`ResultTable`] is what every query against the log store produces:
//! the declared column names plus an ordered list of rows. Tables are
//! built fresh for every query and never cached. [`ConnectionConfig`] is
//! the explicit, start-up-time description of where the store lives.

mod config;
mod table;

pub use config::{ConnectionConfig, ConnectionPolicy, InvalidUrlError};
pub use table::{CellValue, ResultTable, RowRef};
