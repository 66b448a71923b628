//! Bounded conversation history.
//!
//! The log is one JSON array stored under [`HISTORY_KEY`], newest entry
//! first. Storage failures never reach the caller: reads degrade to an empty
//! list and failed writes are logged and dropped.

pub mod kv;
pub mod sqlite;

pub use kv::{KeyValueStore, MemoryStore};
pub use sqlite::{open_memory_store, open_store, SqliteStore};

use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;

use crate::config::{HISTORY_CAPACITY, HISTORY_KEY};
use crate::models::ChatHistoryEntry;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("History serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("History storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Internal lock error")]
    LockPoisoned,
}

/// Append-only, capped log of query/response exchanges.
pub struct HistoryStore {
    store: Box<dyn KeyValueStore>,
    capacity: usize,
    /// Serialises the read-modify-write in `record`.
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_capacity(store, HISTORY_CAPACITY)
    }

    pub fn with_capacity(store: Box<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity,
            write_lock: Mutex::new(()),
        }
    }

    /// History held only in process memory.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// SQLite-backed history at `path`, or in-memory history if it cannot be opened.
    pub fn open_or_memory(path: &Path, capacity: usize) -> Self {
        match open_store(path) {
            Ok(store) => Self::with_capacity(Box::new(store), capacity),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "History database unavailable, keeping history in memory"
                );
                Self::with_capacity(Box::new(MemoryStore::new()), capacity)
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Save an exchange at the front of the log, evicting the oldest beyond capacity.
    pub fn record(&self, query: &str, response: &str) {
        if let Err(e) = self.append(ChatHistoryEntry::new(query, response)) {
            tracing::warn!(error = %e, "History: failed to save exchange");
        }
    }

    /// All saved exchanges, newest first.
    pub fn list(&self) -> Vec<ChatHistoryEntry> {
        match self.read() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "History: unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// The exchange at `index` in the newest-first list, for redisplay.
    pub fn get(&self, index: usize) -> Option<ChatHistoryEntry> {
        self.list().into_iter().nth(index)
    }

    pub fn clear(&self) {
        let result = self
            .write_lock
            .lock()
            .map_err(|_| HistoryError::LockPoisoned)
            .and_then(|_guard| self.store.remove(HISTORY_KEY));
        if let Err(e) = result {
            tracing::warn!(error = %e, "History: failed to clear");
        }
    }

    fn append(&self, entry: ChatHistoryEntry) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock().map_err(|_| HistoryError::LockPoisoned)?;

        // A corrupt blob is replaced rather than blocking new writes.
        let mut entries = self.read().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "History: discarding unreadable log");
            Vec::new()
        });
        entries.insert(0, entry);
        entries.truncate(self.capacity);

        let json = serde_json::to_string(&entries)?;
        self.store.set(HISTORY_KEY, &json)
    }

    fn read(&self) -> Result<Vec<ChatHistoryEntry>, HistoryError> {
        match self.store.get(HISTORY_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }
}
