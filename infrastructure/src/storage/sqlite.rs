//! SQLite-backed governance store shared by every process using the same file.
//!
//! Counters are updated with a single `INSERT ... ON CONFLICT ... RETURNING`
//! statement, so concurrent increments never lose updates. Window entries are
//! pruned on every read.

use async_trait::async_trait;
use conclave_application::{Clock, CounterStore, StoreError, WindowStore};
use conclave_domain::{WindowEntry, WindowKey};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS counters (
    key TEXT PRIMARY KEY,
    value INTEGER NOT NULL,
    expires_at_ms INTEGER
);
CREATE TABLE IF NOT EXISTS window_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL,
    timestamp_ms INTEGER NOT NULL,
    amount REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_window_entries_key_time ON window_entries(key, timestamp_ms);
";

// An expired counter restarts from zero before the delta is applied.
const ADD_TO_COUNTER: &str = "
INSERT INTO counters (key, value, expires_at_ms) VALUES (?1, ?2, NULL)
ON CONFLICT(key) DO UPDATE SET
    value = CASE
        WHEN expires_at_ms IS NOT NULL AND expires_at_ms <= ?3 THEN ?2
        ELSE value + ?2
    END,
    expires_at_ms = CASE
        WHEN expires_at_ms IS NOT NULL AND expires_at_ms <= ?3 THEN NULL
        ELSE expires_at_ms
    END
RETURNING value
";

fn store_error(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => StoreError::Corrupt(e.to_string()),
        other => StoreError::Unavailable(other.to_string()),
    }
}

/// Counter and window store in one SQLite database.
///
/// Calls run on the blocking thread pool; the connection is guarded by a mutex.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`. `":memory:"` opens a private
    /// in-memory database.
    pub fn open(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = if path.as_os_str() == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(store_error)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")
            .map_err(store_error)?;
        conn.execute_batch(SCHEMA).map_err(store_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            clock,
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("store task failed: {}", e)))?
        .map_err(store_error)
    }

    async fn add(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let key = key.to_string();
        let now = self.clock.now_millis();
        self.with_conn(move |conn| {
            conn.query_row(ADD_TO_COUNTER, params![key, delta, now], |row| row.get(0))
        })
        .await
    }
}

#[async_trait]
impl CounterStore for SqliteStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        self.add(key, 1).await
    }

    async fn decrement(&self, key: &str) -> Result<i64, StoreError> {
        self.add(key, -1).await
    }

    async fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let key = key.to_string();
        let now = self.clock.now_millis();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT value FROM counters
                 WHERE key = ?1 AND (expires_at_ms IS NULL OR expires_at_ms > ?2)",
                params![key, now],
                |row| row.get(0),
            )
            .optional()
        })
        .await
    }

    async fn expire_at(&self, key: &str, epoch_secs: i64) -> Result<(), StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE counters SET expires_at_ms = ?2 WHERE key = ?1",
                params![key, epoch_secs * 1000],
            )
            .map(|_| ())
        })
        .await
    }
}

#[async_trait]
impl WindowStore for SqliteStore {
    async fn append(&self, key: &WindowKey, entry: WindowEntry) -> Result<(), StoreError> {
        let key = key.storage_key();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO window_entries (key, timestamp_ms, amount) VALUES (?1, ?2, ?3)",
                params![key, entry.timestamp_ms, entry.amount],
            )
            .map(|_| ())
        })
        .await
    }

    async fn live_entries(
        &self,
        key: &WindowKey,
        now_ms: i64,
    ) -> Result<Vec<WindowEntry>, StoreError> {
        let cutoff = now_ms - key.span.millis();
        let key = key.storage_key();
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM window_entries WHERE key = ?1 AND timestamp_ms <= ?2",
                params![key, cutoff],
            )?;
            let mut stmt = conn.prepare_cached(
                "SELECT timestamp_ms, amount FROM window_entries
                 WHERE key = ?1 ORDER BY timestamp_ms, id",
            )?;
            let rows = stmt.query_map(params![key], |row| {
                Ok(WindowEntry {
                    timestamp_ms: row.get(0)?,
                    amount: row.get(1)?,
                })
            })?;
            rows.collect()
        })
        .await
    }
}
