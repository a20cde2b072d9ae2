//! Postgres connection handling and row conversion.

use std::sync::Arc;

use async_trait::async_trait;
use moosicbox_json_utils::database::ToValue as _;
use securecheck_database_models::{CellValue, ConnectionConfig, ConnectionPolicy, ResultTable};
use switchy_database::{Database, DatabaseValue, Row};
use switchy_database_connection::Credentials;
use tokio::sync::Mutex;

use crate::DbError;
use crate::source::QuerySource;

/// Opens a new connection to the store described by `config`.
///
/// Configures a 60-second `statement_timeout` so a stalled aggregation
/// fails with an error instead of blocking the caller forever.
///
/// # Errors
///
/// Returns [`DbError::Connection`] if the credentials are rejected or the
/// host cannot be reached.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn Database>, DbError> {
    let (host, name, user, password) = credential_parts(config);
    let creds = Credentials::new(host, name, user, password);

    let db = switchy_database_connection::init_postgres_raw_native_tls(creds)
        .await
        .map_err(|e| DbError::Connection {
            message: format!("{}:{}: {e}", config.host, config.port),
        })?;

    db.exec_raw("SET statement_timeout = '60s'").await?;

    Ok(db)
}

/// Host (with port), database, user and password for [`Credentials::new`].
///
/// The fields are passed through untouched so passwords containing `/`,
/// `?` or `@` reach the server as configured. An empty password means none.
fn credential_parts(config: &ConnectionConfig) -> (String, String, String, Option<String>) {
    (
        format!("{}:{}", config.host, config.port),
        config.database.clone(),
        config.user.clone(),
        (!config.password.is_empty()).then(|| config.password.clone()),
    )
}

/// Runs `sql` on an open connection and collects the rows into a table.
///
/// Column names come from the first row; a statement that returns no
/// rows yields a table without columns.
///
/// # Errors
///
/// Returns [`DbError::Database`] if the statement fails.
pub async fn query_table(db: &dyn Database, sql: &str) -> Result<ResultTable, DbError> {
    let rows = db.query_raw_params(sql, &[]).await?;

    let Some(first) = rows.first() else {
        return Ok(ResultTable::empty());
    };

    let mut table = ResultTable::new(first.columns.iter().map(|(name, _)| name.clone()));
    for row in &rows {
        table.push_row(
            row.columns
                .iter()
                .map(|(name, value)| to_cell(row, name, value))
                .collect(),
        );
    }

    Ok(table)
}

/// Converts one driver value into a [`CellValue`].
///
/// Variants without a direct mapping (`DATE`, `TIME`, `NUMERIC` and the
/// narrower integer widths) are decoded through `moosicbox_json_utils`,
/// trying integer, then real, boolean and text. Dates and times therefore
/// arrive as text and are parsed by [`CellValue::as_date`] and
/// [`CellValue::as_time`].
fn to_cell(row: &Row, name: &str, value: &DatabaseValue) -> CellValue {
    match value {
        DatabaseValue::Null => CellValue::Null,
        DatabaseValue::String(s) => CellValue::Text(s.clone()),
        DatabaseValue::StringOpt(s) => s.clone().map_or(CellValue::Null, CellValue::Text),
        DatabaseValue::Bool(b) => CellValue::Bool(*b),
        DatabaseValue::BoolOpt(b) => b.map_or(CellValue::Null, CellValue::Bool),
        DatabaseValue::Int32(i) => CellValue::Integer(i64::from(*i)),
        DatabaseValue::Int64(i) => CellValue::Integer(*i),
        DatabaseValue::Int64Opt(i) => i.map_or(CellValue::Null, CellValue::Integer),
        DatabaseValue::Real64(f) => CellValue::Real(*f),
        DatabaseValue::Real64Opt(f) => f.map_or(CellValue::Null, CellValue::Real),
        DatabaseValue::DateTime(dt) => CellValue::Timestamp(*dt),
        _ => {
            if let Ok(v) = row.to_value::<Option<i64>>(name) {
                v.map_or(CellValue::Null, CellValue::Integer)
            } else if let Ok(v) = row.to_value::<Option<f64>>(name) {
                v.map_or(CellValue::Null, CellValue::Real)
            } else if let Ok(v) = row.to_value::<Option<bool>>(name) {
                v.map_or(CellValue::Null, CellValue::Bool)
            } else if let Ok(v) = row.to_value::<Option<String>>(name) {
                v.map_or(CellValue::Null, CellValue::Text)
            } else {
                log::warn!("Unsupported value in column '{name}': {value:?}");
                CellValue::Text(format!("{value:?}"))
            }
        }
    }
}

/// [`QuerySource`] backed by a Postgres store.
pub struct PostgresSource {
    config: ConnectionConfig,
    policy: ConnectionPolicy,
    shared: Mutex<Option<Arc<dyn Database>>>,
}

impl PostgresSource {
    /// Creates a source. No connection is opened until the first query.
    #[must_use]
    pub fn new(config: ConnectionConfig, policy: ConnectionPolicy) -> Self {
        Self {
            config,
            policy,
            shared: Mutex::new(None),
        }
    }

    /// Returns the kept connection, opening it first if there is none.
    async fn shared_connection(&self) -> Result<Arc<dyn Database>, DbError> {
        let mut shared = self.shared.lock().await;
        if let Some(db) = shared.as_ref() {
            return Ok(Arc::clone(db));
        }

        log::info!(
            "Opening connection to {}:{}/{}",
            self.config.host,
            self.config.port,
            self.config.database
        );
        let db: Arc<dyn Database> = Arc::from(connect(&self.config).await?);
        *shared = Some(Arc::clone(&db));
        Ok(db)
    }
}

#[async_trait]
impl QuerySource for PostgresSource {
    async fn fetch(&self, sql: &str) -> Result<ResultTable, DbError> {
        match self.policy {
            ConnectionPolicy::PerCall => {
                let db = connect(&self.config).await?;
                // The connection is dropped on every path out of this arm.
                query_table(db.as_ref(), sql).await
            }
            ConnectionPolicy::Persistent => {
                let db = self.shared_connection().await?;

                // The lock is not held while the statement runs.
                let result = query_table(db.as_ref(), sql).await;
                if result.is_err() {
                    let mut shared = self.shared.lock().await;
                    if shared.as_ref().is_some_and(|current| Arc::ptr_eq(current, &db)) {
                        log::warn!("Discarding connection after failed query");
                        *shared = None;
                    }
                }
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn row(columns: Vec<(&str, DatabaseValue)>) -> Row {
        Row {
            columns: columns
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    fn cells(row: &Row) -> Vec<CellValue> {
        row.columns
            .iter()
            .map(|(name, value)| to_cell(row, name, value))
            .collect()
    }

    #[test]
    fn maps_typed_driver_values() {
        let stamp = NaiveDate::from_ymd_opt(2020, 1, 15)
            .unwrap()
            .and_hms_opt(22, 5, 0)
            .unwrap();
        let r = row(vec![
            ("violation", DatabaseValue::String("Speeding".to_string())),
            ("is_arrested", DatabaseValue::Bool(true)),
            ("driver_age", DatabaseValue::Int32(24)),
            ("total_stops", DatabaseValue::Int64(120)),
            ("arrest_rate_percent", DatabaseValue::Real64(12.5)),
            ("stopped_at", DatabaseValue::DateTime(stamp)),
            ("search_type", DatabaseValue::Null),
        ]);

        assert_eq!(
            cells(&r),
            vec![
                CellValue::Text("Speeding".to_string()),
                CellValue::Bool(true),
                CellValue::Integer(24),
                CellValue::Integer(120),
                CellValue::Real(12.5),
                CellValue::Timestamp(stamp),
                CellValue::Null,
            ]
        );
    }

    #[test]
    fn optional_driver_values_map_none_to_null() {
        let r = row(vec![
            ("a", DatabaseValue::StringOpt(None)),
            ("b", DatabaseValue::StringOpt(Some("Warning".to_string()))),
            ("c", DatabaseValue::BoolOpt(None)),
            ("d", DatabaseValue::Int64Opt(Some(3))),
            ("e", DatabaseValue::Real64Opt(None)),
        ]);

        assert_eq!(
            cells(&r),
            vec![
                CellValue::Null,
                CellValue::Text("Warning".to_string()),
                CellValue::Null,
                CellValue::Integer(3),
                CellValue::Null,
            ]
        );
    }

    #[test]
    fn timestamps_yield_date_and_time() {
        let stamp = NaiveDate::from_ymd_opt(2020, 1, 15)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();
        let r = row(vec![("stop", DatabaseValue::DateTime(stamp))]);
        let cell = &cells(&r)[0];

        assert_eq!(cell.as_date(), NaiveDate::from_ymd_opt(2020, 1, 15));
        assert_eq!(cell.as_time(), chrono::NaiveTime::from_hms_opt(6, 30, 0));
    }

    #[test]
    fn credentials_keep_reserved_characters() {
        let config = ConnectionConfig {
            host: "db.local".to_string(),
            port: 5440,
            user: "analyst".to_string(),
            password: "p/ss?w@rd".to_string(),
            database: "policeledger".to_string(),
        };

        let (host, name, user, password) = credential_parts(&config);
        assert_eq!(host, "db.local:5440");
        assert_eq!(name, "policeledger");
        assert_eq!(user, "analyst");
        assert_eq!(password.as_deref(), Some("p/ss?w@rd"));
    }

    #[test]
    fn empty_password_means_none() {
        let (_, _, _, password) = credential_parts(&ConnectionConfig::default());
        assert_eq!(password, None);
    }
}
