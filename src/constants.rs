//! Constants used throughout the application.
//!
//! This module contains all constants used in the dailyshot application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "dailyshot";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "One scripture shot a day, no repeats until the pool runs dry";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Log level used when `--verbose` is passed.
pub const VERBOSE_LOG_LEVEL: &str = "debug";

// Configuration Keys & Environment Variables
/// Environment variable for the SQLite file backing the key-value store.
pub const ENV_VAR_DAILYSHOT_DB: &str = "DAILYSHOT_DB";
/// Environment variable for a JSON catalog replacing the embedded one.
pub const ENV_VAR_DAILYSHOT_CATALOG: &str = "DAILYSHOT_CATALOG";
/// Environment variable selecting the log format.
pub const ENV_VAR_DAILYSHOT_LOG_FORMAT: &str = "DAILYSHOT_LOG_FORMAT";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Environment variable often used to indicate a Continuous Integration environment.
pub const ENV_VAR_CI: &str = "CI";
/// Default database location, relative to the user's home directory.
pub const DEFAULT_DB_SUBPATH: &str = ".local/share/dailyshot/dailyshot.db";

// Validation
/// Log levels accepted by `Config::validate`.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// File System Parameters
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Maximum number of pooled SQLite connections.
pub const DB_POOL_MAX_SIZE: u32 = 4;

// Persisted Key Layout
/// Key holding the used-shots ledger for the current year.
pub const USED_SHOTS_KEY: &str = "used_shots";
/// Prefix shared by every per-day shot cache key.
pub const DAILY_SHOT_KEY_PREFIX: &str = "daily_shot_";
/// Key holding the debug mode flag (`"true"` or absent).
pub const DEBUG_MODE_KEY: &str = "debug_mode_enabled";
/// Key holding the simulated day offset as decimal text.
pub const DEBUG_DATE_OFFSET_KEY: &str = "debug_date_offset";
/// Stored value meaning "debug mode enabled".
pub const DEBUG_MODE_ENABLED_VALUE: &str = "true";

// Date/Time Logic
/// Display format for the effective date (day/month/year).
pub const EFFECTIVE_DATE_DISPLAY_FORMAT: &str = "%d/%m/%Y";
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "dailyshot";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
