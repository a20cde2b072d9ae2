//! The seam between the data access layer and the actual store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use securecheck_database_models::ResultTable;

use crate::DbError;

/// Something that can answer a parameterless, read-only SQL statement
/// with a [`ResultTable`].
#[async_trait]
pub trait QuerySource: Send + Sync {
    /// Runs `sql` and returns every row it produced.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store is unreachable or rejects the
    /// statement.
    async fn fetch(&self, sql: &str) -> Result<ResultTable, DbError>;
}

/// A [`QuerySource`] that answers from canned tables keyed by SQL text.
///
/// Statements are compared after trimming surrounding whitespace. A
/// statement without a canned table falls back to the configured default
/// table, or fails with [`DbError::Query`] when there is none.
#[derive(Debug, Default)]
pub struct StaticSource {
    tables: BTreeMap<String, ResultTable>,
    fallback: Option<ResultTable>,
    unreachable: Option<String>,
    calls: AtomicUsize,
}

impl StaticSource {
    /// Creates a source with no canned tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source whose every call fails as if the store could not
    /// be reached.
    #[must_use]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            unreachable: Some(message.into()),
            ..Self::default()
        }
    }

    /// Registers the table returned for `sql`.
    #[must_use]
    pub fn with_table(mut self, sql: &str, table: ResultTable) -> Self {
        self.tables.insert(sql.trim().to_string(), table);
        self
    }

    /// Registers the table returned for statements with no canned table.
    #[must_use]
    pub fn with_fallback(mut self, table: ResultTable) -> Self {
        self.fallback = Some(table);
        self
    }

    /// Number of statements this source has been asked to run.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QuerySource for StaticSource {
    async fn fetch(&self, sql: &str) -> Result<ResultTable, DbError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(message) = &self.unreachable {
            return Err(DbError::Connection {
                message: message.clone(),
            });
        }

        self.tables
            .get(sql.trim())
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| DbError::Query {
                message: format!("no canned result for statement: {}", sql.trim()),
            })
    }
}
