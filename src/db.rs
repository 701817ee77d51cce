use std::{
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rusqlite::{params, Connection, OptionalExtension};

use crate::utils;

/// Durable string key-value storage backing favorites and the event cache.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open_default() -> rusqlite::Result<Self> {
        Self::open(&utils::database_path())
    }

    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        utils::ensure_parent(path);
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv(
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at_utc TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, key: &str) -> rusqlite::Result<Option<String>> {
        let conn = self.lock();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> rusqlite::Result<()> {
        self.set_many(&[(key, value)])
    }

    /// Writes every pair in one transaction.
    pub fn set_many(&self, pairs: &[(&str, &str)]) -> rusqlite::Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        for (key, value) in pairs {
            tx.execute(
                "INSERT INTO kv (key, value, updated_at_utc) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   updated_at_utc = excluded.updated_at_utc",
                params![key, value, now],
            )?;
        }
        tx.commit()
    }

    pub fn remove(&self, keys: &[&str]) -> rusqlite::Result<()> {
        let conn = self.lock();
        for key in keys {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        }
        Ok(())
    }

    /// Recovers the connection after a panicking holder.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
