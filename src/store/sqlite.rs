//! SQLite-backed key-value store.
//!
//! A single `kv` table holds every key. Connections come from an r2d2 pool and
//! each call runs on tokio's blocking thread pool so the async callers never block
//! the runtime.

use super::KeyValueStore;
use crate::constants::DB_POOL_MAX_SIZE;
use crate::errors::{AppError, AppResult, StoreError};
use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
#[cfg(unix)]
use std::fs::Permissions;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{debug, info};

/// Which failure kind a pooled call reports when it goes wrong.
#[derive(Debug, Clone, Copy)]
enum Access {
    Read,
    Write,
}

impl Access {
    fn error(self, key: &str, err: impl std::fmt::Display) -> StoreError {
        match self {
            Access::Read => StoreError::ReadFailed {
                key: key.to_string(),
                message: err.to_string(),
            },
            Access::Write => StoreError::WriteFailed {
                key: key.to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// Key-value store persisted in a SQLite file.
///
/// # Example
///
/// ```no_run
/// use dailyshot::store::{KeyValueStore, SqliteStore};
/// use std::path::Path;
///
/// # async fn run() -> dailyshot::AppResult<()> {
/// let store = SqliteStore::open(Path::new("/tmp/dailyshot.db"))?;
/// store.set("debug_mode_enabled", "true").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Opens or creates the database at `db_path` and prepares the schema.
    ///
    /// Missing parent directories are created (owner-only on unix).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - The database file cannot be opened
    /// - The connection pool cannot be initialized
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening store at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            ensure_store_directory_exists(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(DB_POOL_MAX_SIZE)
            .build(manager)
            .map_err(StoreError::Pool)?;

        let store = SqliteStore { pool };
        store.initialize_schema()?;

        info!("Store opened successfully");
        Ok(store)
    }

    /// Creates the `kv` table if it does not exist. Safe to call repeatedly.
    pub fn initialize_schema(&self) -> AppResult<()> {
        let conn = self.pool.get().map_err(StoreError::Pool)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(StoreError::Sqlite)?;
        debug!("Store schema initialized");
        Ok(())
    }

    async fn run<T, F>(&self, access: Access, key: String, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| access.error(&key, e))?;
            f(&mut conn).map_err(|e| access.error(&key, e))
        })
        .await?
    }
}

fn ensure_store_directory_exists(dir: &Path) -> AppResult<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create store directory: {}", e),
        ))
    })?;

    #[cfg(unix)]
    {
        let permissions = Permissions::from_mode(crate::constants::DEFAULT_DIR_PERMISSIONS);
        fs::set_permissions(dir, permissions)?;
        debug!("Set 0o700 permissions on store directory");
    }

    Ok(())
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let owned = key.to_string();
        self.run(Access::Read, key.to_string(), move |conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![owned], |row| {
                row.get(0)
            })
            .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        debug!("Writing key {}", key);
        let owned_key = key.to_string();
        let owned_value = value.to_string();
        self.run(Access::Write, key.to_string(), move |conn| {
            conn.execute(
                r#"
                INSERT INTO kv (key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
                params![owned_key, owned_value],
            )
            .map(|_| ())
        })
        .await
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StoreError> {
        if keys.is_empty() {
            return Ok(());
        }
        debug!("Removing {} keys", keys.len());
        let owned = keys.to_vec();
        self.run(Access::Write, keys.join(","), move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare("DELETE FROM kv WHERE key = ?1")?;
                for key in &owned {
                    stmt.execute(params![key])?;
                }
            }
            tx.commit()
        })
        .await
    }

    async fn all_keys(&self) -> Result<Vec<String>, StoreError> {
        self.run(Access::Read, "*".to_string(), |conn| {
            let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(keys)
        })
        .await
    }
}
