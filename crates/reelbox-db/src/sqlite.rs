//! `SQLite`-backed key-value store.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use tokio::sync::Mutex;

use super::connection::open_db;
use super::error::StorageError;
use super::migrations::run_migrations;
use super::store::KeyValueStore;

/// Durable key-value store persisted in the `kv` table.
///
/// The connection is serialized behind an async mutex; every statement
/// runs synchronously while the lock is held.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens the store at `{dir}/reelbox.db` (or the default data path).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(dir: Option<&Path>) -> Result<Self> {
        let conn = open_db(dir)?;
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        run_migrations(&conn).context("database migration failed")?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already-migrated connection.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock().await;
        load_value(&conn, key)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        save_value(&conn, key, value)
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        delete_value(&conn, key)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> Result<bool, StorageError> {
        let mut conn = self.conn.lock().await;
        swap_value(&mut conn, key, expected, new)
    }
}

fn load_value(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    conn.query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .optional()
    .map_err(|e| StorageError::backend(format!("failed to read key {key}"), e))
}

fn save_value(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        rusqlite::params![key, value, now],
    )
    .map_err(|e| StorageError::backend(format!("failed to write key {key}"), e))?;
    tracing::trace!(key, "Stored value");
    Ok(())
}

fn delete_value(conn: &Connection, key: &str) -> Result<(), StorageError> {
    conn.execute("DELETE FROM kv WHERE key = ?1", [key])
        .map_err(|e| StorageError::backend(format!("failed to delete key {key}"), e))?;
    Ok(())
}

/// Compare-and-swap inside `BEGIN IMMEDIATE`, which takes the database
/// write lock up front so other connections (and processes) cannot write
/// between the read and the upsert.
fn swap_value(
    conn: &mut Connection,
    key: &str,
    expected: Option<&str>,
    new: &str,
) -> Result<bool, StorageError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| StorageError::backend("failed to begin transaction", e))?;

    let current = load_value(&tx, key)?;
    if current.as_deref() != expected {
        // Dropping `tx` rolls back.
        return Ok(false);
    }
    save_value(&tx, key, new)?;

    tx.commit()
        .map_err(|e| StorageError::backend(format!("failed to commit key {key}"), e))?;
    Ok(true)
}
