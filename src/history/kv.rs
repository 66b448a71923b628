use std::collections::HashMap;
use std::sync::Mutex;

use super::HistoryError;

/// Blob storage keyed by string, the persistence seam for history.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;
    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError>;
    fn remove(&self, key: &str) -> Result<(), HistoryError>;
}

/// Process-local store, used by tests and when no database can be opened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        let entries = self.entries.lock().map_err(|_| HistoryError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        let mut entries = self.entries.lock().map_err(|_| HistoryError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), HistoryError> {
        let mut entries = self.entries.lock().map_err(|_| HistoryError::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }
}
