//! Error handling utilities for the dailyshot application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.

use thiserror::Error;

/// Represents specific error cases that can occur when talking to the key-value store.
///
/// Read and write failures are kept apart because callers treat them differently:
/// a failed ledger write must surface, while a failed read on an informational path
/// is logged and treated as "nothing found".
///
/// # Examples
///
/// ```
/// use dailyshot::errors::StoreError;
///
/// let error = StoreError::ReadFailed {
///     key: "used_shots".to_string(),
///     message: "disk I/O error".to_string(),
/// };
/// assert!(format!("{}", error).contains("used_shots"));
/// assert!(error.is_read_failure());
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// A value (or the key listing) could not be read.
    #[error("Failed to read '{key}' from the store: {message}")]
    ReadFailed {
        /// The key being read, or `*` for a key listing
        key: String,
        /// A description of the underlying failure
        message: String,
    },

    /// A value could not be written or removed.
    #[error("Failed to write '{key}' to the store: {message}")]
    WriteFailed {
        /// The key being written, or a comma-separated list for bulk removal
        key: String,
        /// A description of the underlying failure
        message: String,
    },

    /// SQLite error raised while opening or preparing the database.
    #[error("Database error: {0}\n\nIf you're seeing 'file is not a database', the store file may be corrupted or belong to another program.")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}")]
    Pool(#[from] r2d2::Error),

    /// The blocking task running a store call panicked or was cancelled.
    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    /// Returns true for the PersistenceReadFailure kind.
    pub fn is_read_failure(&self) -> bool {
        matches!(self, StoreError::ReadFailed { .. })
    }

    /// Returns true for the PersistenceWriteFailure kind.
    pub fn is_write_failure(&self) -> bool {
        matches!(self, StoreError::WriteFailed { .. })
    }
}

/// Represents all possible errors that can occur in the dailyshot application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use dailyshot::errors::AppError;
///
/// let error = AppError::Config("Database path is empty".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Database path is empty");
/// ```
///
/// Converting from an IO error:
/// ```
/// use dailyshot::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors raised by the key-value store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An operation was requested in a state that does not allow it,
    /// e.g. simulating the next day while debug mode is disabled.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The catalog holds no shots, so nothing can be selected.
    #[error("The shot catalog is empty. Check DAILYSHOT_CATALOG or rebuild with a non-empty catalog.")]
    EmptyCatalog,

    /// The catalog could not be parsed or failed validation.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A stored or emitted value could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use dailyshot::errors::{AppResult, AppError};
///
/// fn might_fail(enabled: bool) -> AppResult<u32> {
///     if !enabled {
///         return Err(AppError::InvalidState("debug mode is not enabled".to_string()));
///     }
///     Ok(1)
/// }
/// assert!(might_fail(false).is_err());
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");

        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let config_error = AppError::Config("Invalid configuration".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: Invalid configuration"
        );

        let state_error = AppError::InvalidState("debug mode is not enabled".to_string());
        assert_eq!(
            format!("{}", state_error),
            "Invalid state: debug mode is not enabled"
        );

        assert!(format!("{}", AppError::EmptyCatalog).contains("catalog is empty"));

        let store_error = AppError::Store(StoreError::WriteFailed {
            key: "used_shots".to_string(),
            message: "read-only database".to_string(),
        });
        let message = format!("{}", store_error);
        assert!(message.contains("Store error"));
        assert!(message.contains("used_shots"));
        assert!(message.contains("read-only database"));
    }

    #[test]
    fn test_store_error_kinds() {
        let read = StoreError::ReadFailed {
            key: "*".to_string(),
            message: "locked".to_string(),
        };
        assert!(read.is_read_failure());
        assert!(!read.is_write_failure());

        let write = StoreError::WriteFailed {
            key: "debug_date_offset".to_string(),
            message: "locked".to_string(),
        };
        assert!(write.is_write_failure());
        assert!(!write.is_read_failure());
    }

    #[test]
    fn test_serialization_error_conversion() {
        let parse_error = serde_json::from_str::<u32>("not json").unwrap_err();
        let app_error: AppError = parse_error.into();
        assert!(matches!(app_error, AppError::Serialization(_)));
        assert!(format!("{}", app_error).starts_with("Serialization error"));
    }
}
