//! Loading of the store configuration at start-up.
//!
//! Sources, later ones winning:
//!
//! 1. Built-in defaults ([`ConnectionConfig::default`]).
//! 2. The `[database]` table of a TOML file.
//! 3. `DATABASE_URL`.
//! 4. `SECURECHECK_DB_HOST`, `SECURECHECK_DB_PORT`, `SECURECHECK_DB_USER`,
//!    `SECURECHECK_DB_PASSWORD`, `SECURECHECK_DB_NAME` and
//!    `SECURECHECK_DB_POLICY`.

use securecheck_database_models::{ConnectionConfig, ConnectionPolicy};
use serde::Deserialize;

use crate::DbError;

/// Connection settings plus the connection policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    /// Where the store lives.
    #[serde(flatten)]
    pub connection: ConnectionConfig,
    /// How connections are managed; `None` leaves the choice to the
    /// binary.
    #[serde(default)]
    pub policy: Option<ConnectionPolicy>,
}

impl DatabaseSettings {
    /// The configured policy, or `fallback` if none was configured.
    #[must_use]
    pub fn policy_or(&self, fallback: ConnectionPolicy) -> ConnectionPolicy {
        self.policy.unwrap_or(fallback)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    database: DatabaseSettings,
}

/// Parses the `[database]` table out of a TOML document.
///
/// A document without that table yields the defaults.
///
/// # Errors
///
/// Returns [`DbError::Config`] if the document is not valid TOML or has
/// fields of the wrong type.
pub fn from_toml(text: &str) -> Result<DatabaseSettings, DbError> {
    toml::from_str::<FileConfig>(text)
        .map(|f| f.database)
        .map_err(|e| DbError::Config {
            message: e.to_string(),
        })
}

/// Applies environment overrides using `lookup` to read variables.
///
/// # Errors
///
/// Returns [`DbError::Config`] if `DATABASE_URL`, the port or the policy
/// cannot be parsed.
pub fn apply_env(
    mut settings: DatabaseSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<DatabaseSettings, DbError> {
    if let Some(url) = lookup("DATABASE_URL") {
        settings.connection =
            ConnectionConfig::from_url(&url).map_err(|e| DbError::Config {
                message: e.to_string(),
            })?;
    }

    if let Some(host) = lookup("SECURECHECK_DB_HOST") {
        settings.connection.host = host;
    }
    if let Some(port) = lookup("SECURECHECK_DB_PORT") {
        settings.connection.port = port.parse().map_err(|_| DbError::Config {
            message: format!("SECURECHECK_DB_PORT is not a port number: '{port}'"),
        })?;
    }
    if let Some(user) = lookup("SECURECHECK_DB_USER") {
        settings.connection.user = user;
    }
    if let Some(password) = lookup("SECURECHECK_DB_PASSWORD") {
        settings.connection.password = password;
    }
    if let Some(name) = lookup("SECURECHECK_DB_NAME") {
        settings.connection.database = name;
    }
    if let Some(policy) = lookup("SECURECHECK_DB_POLICY") {
        settings.policy = Some(policy.parse().map_err(|_| DbError::Config {
            message: format!("SECURECHECK_DB_POLICY must be per_call or persistent, got '{policy}'"),
        })?);
    }

    Ok(settings)
}
