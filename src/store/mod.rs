//! Key-value persistence for shot and debug state.
//!
//! Everything the application remembers between runs lives behind the
//! [`KeyValueStore`] trait: the used-shots ledger, the per-day shot cache and the
//! debug date state. Values are plain text; structured records are JSON-encoded by
//! the callers.
//!
//! # Module Structure
//!
//! - `sqlite`: SQLite-backed store used by the binary
//! - [`MemoryStore`]: in-process store for tests and `--ephemeral` runs
//!
//! # Example
//!
//! ```
//! use dailyshot::store::{KeyValueStore, MemoryStore};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let store = MemoryStore::new();
//!     store.set("debug_date_offset", "2").await.unwrap();
//!     assert_eq!(store.get("debug_date_offset").await.unwrap().as_deref(), Some("2"));
//! });
//! ```

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::errors::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Asynchronous text key-value store.
///
/// Implementations must report read failures as `StoreError::ReadFailed` and
/// write or removal failures as `StoreError::WriteFailed`, since callers decide
/// whether to propagate or swallow an error based on that distinction.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes every listed key. Missing keys are ignored.
    async fn multi_remove(&self, keys: &[String]) -> Result<(), StoreError>;

    /// Lists every key currently stored.
    async fn all_keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Store that keeps everything in process memory.
///
/// Nothing survives the process. The lock is never held across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, key: &str) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries.lock().map_err(|e| StoreError::ReadFailed {
            key: key.to_string(),
            message: format!("memory store lock poisoned: {}", e),
        })
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock(key)?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        debug!("memory store set {}", key);
        self.lock(key)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StoreError> {
        let mut entries = self.lock("*")?;
        for key in keys {
            entries.remove(key);
        }
        debug!("memory store removed {} keys", keys.len());
        Ok(())
    }

    async fn all_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock("*")?.keys().cloned().collect())
    }
}
