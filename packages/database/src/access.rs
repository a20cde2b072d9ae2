//! The one entry point every other component uses to read the store.

use std::sync::Arc;

use securecheck_database_models::{ConnectionConfig, ConnectionPolicy, ResultTable};

use crate::db::PostgresSource;
use crate::source::QuerySource;

/// Outcome of one [`DataAccess::execute`] call.
///
/// `error` is set when the store could not be reached or rejected the
/// statement; `table` is then the empty table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fetch {
    /// Rows returned by the statement.
    pub table: ResultTable,
    /// Operator-visible failure message.
    pub error: Option<String>,
}

/// Runs statements against a [`QuerySource`], turning every failure into
/// an empty table plus a message.
#[derive(Clone)]
pub struct DataAccess {
    source: Arc<dyn QuerySource>,
}

impl std::fmt::Debug for DataAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataAccess").finish_non_exhaustive()
    }
}

impl DataAccess {
    /// Wraps an arbitrary source.
    #[must_use]
    pub fn new(source: Arc<dyn QuerySource>) -> Self {
        Self { source }
    }

    /// Data access backed by the Postgres store described by `config`.
    #[must_use]
    pub fn postgres(config: ConnectionConfig, policy: ConnectionPolicy) -> Self {
        Self::new(Arc::new(PostgresSource::new(config, policy)))
    }

    /// Runs one read-only statement.
    ///
    /// Never fails. Errors are logged and returned in [`Fetch::error`]
    /// alongside the zero-row, zero-column table.
    pub async fn execute(&self, sql: &str) -> Fetch {
        log::debug!("Executing: {}", sql.trim());

        match self.source.fetch(sql).await {
            Ok(table) => {
                log::debug!("Fetched {} row(s)", table.row_count());
                Fetch { table, error: None }
            }
            Err(e) => {
                log::error!("Query failed: {e}");
                Fetch {
                    table: ResultTable::empty(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
