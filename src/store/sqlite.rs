//! Pooled SQLite entry store.
//!
//! Connection pooling via r2d2 for concurrent access, panic-safe transactions
//! with automatic rollback, and WAL mode for read-heavy workloads. Name
//! uniqueness is enforced by the schema.

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};

use crate::types::{ConfigEntry, ConfigError, Result};

use super::EntryStore;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS config_entries (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE,
    value TEXT
);
"#;

/// Minimum pool size regardless of CPU count
const MIN_POOL_SIZE: u32 = 2;
/// Maximum pool size regardless of CPU count
const MAX_POOL_SIZE: u32 = 16;

/// Thread-safe SQLite-backed [`EntryStore`] with connection pooling.
pub struct SqliteEntryStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteEntryStore {
    /// Open (or create) the store at `path` with an automatically sized pool.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_pool_size(path, Self::optimal_pool_size())
    }

    /// Open with an explicit pool size.
    pub fn open_with_pool_size<P: AsRef<Path>>(path: P, max_size: u32) -> Result<Self> {
        let manager =
            SqliteConnectionManager::file(path.as_ref()).with_init(Self::configure_connection);

        let pool = Pool::builder()
            .max_size(max_size.max(1))
            .build(manager)
            .map_err(|e| {
                ConfigError::Storage(format!("failed to create connection pool: {}", e))
            })?;

        let store = Self { pool };
        store.initialize()?;
        Ok(store)
    }

    /// Open an in-memory store for testing or temporary use.
    ///
    /// Pool size is pinned to 1 so every handle sees the same database.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        let pool = Pool::builder().max_size(1).build(manager).map_err(|e| {
            ConfigError::Storage(format!("failed to create in-memory pool: {}", e))
        })?;

        let store = Self { pool };
        store.initialize()?;
        Ok(store)
    }

    /// clamp(cores, MIN, MAX); entry lookups are short so one connection per
    /// core is plenty.
    fn optimal_pool_size() -> u32 {
        let cores = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);
        cores.clamp(MIN_POOL_SIZE, MAX_POOL_SIZE)
    }

    fn configure_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            ConfigError::Storage(format!("failed to acquire database connection: {}", e))
        })
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Execute a function within a panic-safe database transaction.
    ///
    /// All operations within the closure are atomic. If the closure panics,
    /// the transaction is rolled back and an error is returned instead of
    /// poisoning the connection pool.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&tx)));

        match result {
            Ok(Ok(value)) => {
                tx.commit()?;
                Ok(value)
            }
            // Transaction rolls back on drop
            Ok(Err(e)) => Err(e),
            Err(panic_payload) => {
                let panic_msg = panic_payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic_payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());

                tracing::error!("transaction panicked: {}", panic_msg);
                Err(ConfigError::Storage(format!(
                    "transaction panicked: {}",
                    panic_msg
                )))
            }
        }
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> std::result::Result<ConfigEntry, rusqlite::Error> {
    Ok(ConfigEntry {
        name: row.get(0)?,
        value: row.get(1)?,
    })
}

impl EntryStore for SqliteEntryStore {
    fn all(&self) -> Result<Vec<ConfigEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT name, value FROM config_entries ORDER BY id")?;
        let entries = stmt
            .query_map([], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<ConfigEntry>> {
        let conn = self.conn()?;
        // ORDER BY id DESC tolerates duplicates deterministically should the
        // uniqueness constraint ever be relaxed.
        let entry = conn
            .query_row(
                "SELECT name, value FROM config_entries WHERE name = ?1 ORDER BY id DESC LIMIT 1",
                params![name],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn add(&self, entry: &ConfigEntry) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO config_entries (name, value) VALUES (?1, ?2)",
            params![entry.name, entry.value],
        )?;
        Ok(())
    }

    fn update(&self, entry: &ConfigEntry) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE config_entries SET value = ?2 WHERE name = ?1",
            params![entry.name, entry.value],
        )?;
        Ok(())
    }

    fn set_value(&self, name: &str, value: Option<&str>) -> Result<bool> {
        self.transaction(|tx| {
            let existing: Option<Option<String>> = tx
                .query_row(
                    "SELECT value FROM config_entries WHERE name = ?1 ORDER BY id DESC LIMIT 1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;

            match existing {
                None => {
                    tx.execute(
                        "INSERT INTO config_entries (name, value) VALUES (?1, ?2)",
                        params![name, value],
                    )?;
                }
                Some(current) if current.as_deref() != value => {
                    tx.execute(
                        "UPDATE config_entries SET value = ?2 WHERE name = ?1",
                        params![name, value],
                    )?;
                }
                Some(_) => {}
            }
            Ok(true)
        })
    }
}
