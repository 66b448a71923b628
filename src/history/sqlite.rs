//! SQLite-backed key-value store.
//!
//! One `kv_store` table holds each blob under its key. The connection sits
//! behind a mutex because `rusqlite::Connection` is not `Sync`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::kv::KeyValueStore;
use super::HistoryError;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn from_connection(conn: Connection) -> Result<Self, HistoryError> {
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, HistoryError> {
        self.conn.lock().map_err(|_| HistoryError::LockPoisoned)
    }
}

/// Open (or create) the store at `path` and run migrations.
///
/// Parent directories are created as needed.
pub fn open_store(path: &Path) -> Result<SqliteStore, HistoryError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    SqliteStore::from_connection(Connection::open(path)?)
}

/// Open an in-memory store (for testing).
pub fn open_memory_store() -> Result<SqliteStore, HistoryError> {
    SqliteStore::from_connection(Connection::open_in_memory()?)
}

fn configure_pragmas(conn: &Connection) -> Result<(), HistoryError> {
    conn.execute_batch("PRAGMA journal_mode=DELETE;")?;
    Ok(())
}

/// Run all pending migrations.
fn run_migrations(conn: &Connection) -> Result<(), HistoryError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/migrations/001_kv_store.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running history migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| HistoryError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet).
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), HistoryError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}
