use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One saved query/response exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatHistoryEntry {
    pub fn new(query: &str, response: &str) -> Self {
        Self {
            query: query.to_string(),
            response: response.to_string(),
            timestamp: Utc::now(),
        }
    }
}
