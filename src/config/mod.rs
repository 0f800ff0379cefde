//! Configuration management for the dailyshot application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `DAILYSHOT_DB`: Path to the SQLite store (defaults to ~/.local/share/dailyshot/dailyshot.db)
//! - `DAILYSHOT_CATALOG`: Optional JSON catalog replacing the embedded one
//! - `DAILYSHOT_LOG_FORMAT`: `text` or `json` (defaults to `json` when `CI` is set)
//! - `HOME`: Used for expanding the default database path

use crate::constants::{
    DEFAULT_DB_SUBPATH, DEFAULT_LOG_LEVEL, ENV_VAR_CI, ENV_VAR_DAILYSHOT_CATALOG,
    ENV_VAR_DAILYSHOT_DB, ENV_VAR_DAILYSHOT_LOG_FORMAT, ENV_VAR_HOME, LOG_FORMAT_JSON,
    LOG_FORMAT_TEXT, REDACTED_PLACEHOLDER, VALID_LOG_LEVELS,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Configuration for the dailyshot application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use dailyshot::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("/tmp/dailyshot.db"),
///     catalog_path: None,
///     log_format: "text".to_string(),
///     log_level: "info".to_string(),
/// };
/// assert!(config.validate().is_ok());
/// ```
pub struct Config {
    /// SQLite file backing the key-value store.
    pub db_path: PathBuf,

    /// Catalog file to load instead of the embedded catalog.
    pub catalog_path: Option<PathBuf>,

    /// `text` or `json`.
    pub log_format: String,

    /// Default level when `RUST_LOG` is not set.
    pub log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &REDACTED_PLACEHOLDER)
            .field(
                "catalog_path",
                &self.catalog_path.as_ref().map(|_| REDACTED_PLACEHOLDER),
            )
            .field("log_format", &self.log_format)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(""),
            catalog_path: None,
            log_format: LOG_FORMAT_TEXT.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// Paths are expanded with `shellexpand`, so `~` and `$VAR` references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a path expansion fails or the resulting
    /// database path is empty.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dailyshot::Config;
    ///
    /// match Config::load() {
    ///     Ok(config) => println!("Loaded config: {:?}", config),
    ///     Err(err) => eprintln!("Failed to load config: {}", err),
    /// }
    /// ```
    pub fn load() -> AppResult<Self> {
        let db_raw = env::var(ENV_VAR_DAILYSHOT_DB).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_DB_SUBPATH)
        });
        let db_path = expand_path(&db_raw)?;

        if db_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }

        let catalog_path = match env::var(ENV_VAR_DAILYSHOT_CATALOG) {
            Ok(raw) if !raw.trim().is_empty() => Some(expand_path(raw.trim())?),
            _ => None,
        };

        let log_format = env::var(ENV_VAR_DAILYSHOT_LOG_FORMAT).unwrap_or_else(|_| {
            if env::var(ENV_VAR_CI).is_ok() {
                LOG_FORMAT_JSON.to_string()
            } else {
                LOG_FORMAT_TEXT.to_string()
            }
        });

        Ok(Config {
            db_path,
            catalog_path,
            log_format,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The database path is empty or relative
    /// - The catalog path is relative
    /// - The log format is neither `text` nor `json`
    /// - The log level is not a tracing level
    ///
    /// # Examples
    ///
    /// ```
    /// use dailyshot::Config;
    /// use std::path::PathBuf;
    ///
    /// let config = Config {
    ///     db_path: PathBuf::from("relative.db"),
    ///     ..Config::default()
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> AppResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }

        if !self.db_path.is_absolute() {
            return Err(AppError::Config(
                "Database path must be an absolute path".to_string(),
            ));
        }

        if let Some(catalog) = &self.catalog_path {
            if !catalog.is_absolute() {
                return Err(AppError::Config(
                    "Catalog path must be an absolute path".to_string(),
                ));
            }
        }

        if self.log_format != LOG_FORMAT_TEXT && self.log_format != LOG_FORMAT_JSON {
            return Err(AppError::Config(format!(
                "Unknown log format '{}'; expected '{}' or '{}'",
                self.log_format, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            )));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown log level '{}'",
                self.log_level
            )));
        }

        Ok(())
    }
}

fn expand_path(raw: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}
