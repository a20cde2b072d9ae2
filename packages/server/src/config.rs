//! Server start-up configuration.
//!
//! Read once from the TOML file named by `SECURECHECK_CONFIG` (if set),
//! then overridden by `BIND_ADDR`, `PORT` and `FRONTEND_DIR`. The
//! `[database]` table and its environment overrides are handled by
//! [`securecheck_database::config`].

use std::path::{Path, PathBuf};

use securecheck_database::DbError;
use securecheck_database::config::{self as db_config, DatabaseSettings};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "SECURECHECK_CONFIG";

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The `[database]` settings are invalid.
    #[error(transparent)]
    Database(#[from] DbError),

    /// A variable is set but has no usable value.
    #[error("{name} is set but has no usable value: '{value}'")]
    MissingValue {
        /// The variable.
        name: &'static str,
        /// What it was set to.
        value: String,
    },
}

/// Where the HTTP server listens and what it serves.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
    /// Directory of a built frontend to serve at `/`.
    pub frontend_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            frontend_dir: None,
        }
    }
}

/// All start-up settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Log store.
    pub database: DatabaseSettings,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: ServerConfig,
}

impl Settings {
    /// Parses a TOML document with optional `[server]` and `[database]`
    /// tables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is not valid TOML.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(text)?;
        Ok(Self {
            server: file.server,
            database: db_config::from_toml(text)?,
        })
    }

    /// Loads the file named by `SECURECHECK_CONFIG` and applies the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or a
    /// variable holds an invalid value.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Like [`Self::load`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or a
    /// variable holds an invalid value.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let settings = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::read(Path::new(&path))?,
            None => Self::default(),
        };
        settings.apply_env(lookup)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Reading configuration from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(addr) = lookup("BIND_ADDR") {
            if addr.trim().is_empty() {
                return Err(ConfigError::MissingValue {
                    name: "BIND_ADDR",
                    value: addr,
                });
            }
            self.server.bind_addr = addr;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::MissingValue { name: "PORT", value: port })?;
        }
        if let Some(dir) = lookup("FRONTEND_DIR") {
            self.server.frontend_dir = if dir.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }

        self.database = db_config::apply_env(self.database, &lookup)?;

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use securecheck_database_models::ConnectionPolicy;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_variables() {
        let settings = Settings::load_with(env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn reads_both_tables() {
        let settings = Settings::from_toml(
            r#"
            [server]
            port = 9000
            frontend_dir = "app/dist"

            [database]
            host = "db"
            policy = "per_call"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.bind_addr, "127.0.0.1");
        assert_eq!(settings.server.frontend_dir, Some(PathBuf::from("app/dist")));
        assert_eq!(settings.database.connection.host, "db");
        assert_eq!(settings.database.policy, Some(ConnectionPolicy::PerCall));
    }

    #[test]
    fn variables_override_defaults() {
        let settings = Settings::load_with(env(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "3000"),
            ("FRONTEND_DIR", "/srv/securecheck"),
            ("SECURECHECK_DB_HOST", "ledger"),
        ]))
        .unwrap();

        assert_eq!(settings.server.bind_addr, "0.0.0.0");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(
            settings.server.frontend_dir,
            Some(PathBuf::from("/srv/securecheck"))
        );
        assert_eq!(settings.database.connection.host, "ledger");
    }

    #[test]
    fn unusable_values_are_rejected() {
        assert!(matches!(
            Settings::load_with(env(&[("PORT", "http")])),
            Err(ConfigError::MissingValue { name: "PORT", .. })
        ));
        assert!(matches!(
            Settings::load_with(env(&[("BIND_ADDR", " ")])),
            Err(ConfigError::MissingValue { name: "BIND_ADDR", .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = Settings::load_with(env(&[(
            CONFIG_PATH_VAR,
            "/nonexistent/securecheck.toml",
        )]));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
