//! SQLite response cache.
//!
//! Stores successful response bodies keyed by URL in
//! `~/.mensaboard/cache.db`. Entries older than the TTL are ignored on read
//! and removed by [`ResponseCache::purge_expired`].

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

/// Errors from cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// SQLite-backed response cache.
///
/// The connection sits behind a mutex, so writes for a key never interleave.
pub struct ResponseCache {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache").finish_non_exhaustive()
    }
}

impl ResponseCache {
    /// Open (or create) the cache database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// A cache that lives only as long as this value.
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS responses (
                url         TEXT PRIMARY KEY,
                body        TEXT NOT NULL,
                fetched_at  INTEGER NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }

    /// Cached body for `url` if it is younger than `ttl`.
    pub fn get(&self, url: &str, ttl: Duration) -> Result<Option<String>> {
        let conn = self.lock()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT body, fetched_at FROM responses WHERE url = ?1",
                params![url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(row.and_then(|(body, fetched_at)| {
            let age = now_secs().saturating_sub(fetched_at);
            (age < ttl.as_secs() as i64).then_some(body)
        }))
    }

    /// Insert or replace the body for `url`, stamped with the current time.
    pub fn put(&self, url: &str, body: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO responses (url, body, fetched_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(url) DO UPDATE SET \
                body = excluded.body, \
                fetched_at = excluded.fetched_at",
            params![url, body, now_secs()],
        )?;
        Ok(())
    }

    /// Delete entries older than `ttl`. Returns the number removed.
    pub fn purge_expired(&self, ttl: Duration) -> Result<usize> {
        let cutoff = now_secs() - ttl.as_secs() as i64;
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM responses WHERE fetched_at <= ?1",
            params![cutoff],
        )?;
        Ok(removed)
    }

    /// Delete every entry. Returns the number removed.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.lock()?;
        Ok(conn.execute("DELETE FROM responses", [])?)
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Unix epoch seconds.
fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
