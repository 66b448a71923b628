use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::triage::corpus::CorpusSource;

/// Application-level constants
pub const APP_NAME: &str = "Carebot";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Key under which the conversation history blob is stored.
pub const HISTORY_KEY: &str = "medical-chatbot-history";

/// Maximum number of saved exchanges. Older entries are evicted first.
pub const HISTORY_CAPACITY: usize = 50;

/// Pause before composing a reply, for perceived responsiveness only.
pub const DEFAULT_THINKING_DELAY_MS: u64 = 800;

const CORPUS_FILE_NAME: &str = "medical_data.csv";
const HISTORY_DB_NAME: &str = "history.db";

/// Whether this is a debug (dev) build.
pub fn is_dev() -> bool {
    cfg!(debug_assertions)
}

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if is_dev() {
        "carebot_lib=debug"
    } else {
        "carebot_lib=info"
    }
}

/// Get the application data directory (~/Carebot/ on all platforms).
///
/// Falls back to the working directory when no home directory can be
/// determined (containers, some CI runners).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the medical-knowledge corpus.
pub fn default_corpus_path() -> PathBuf {
    app_data_dir().join(CORPUS_FILE_NAME)
}

/// Sample corpus compiled into the binary, used when no corpus file is installed.
pub const BUNDLED_CORPUS: &str = include_str!("../data/medical_data.csv");

/// Read the corpus from `path` if it exists, otherwise use [`BUNDLED_CORPUS`].
pub fn corpus_or_bundled(path: PathBuf) -> CorpusSource {
    if path.is_file() {
        CorpusSource::File(path)
    } else {
        tracing::info!(
            expected = %path.display(),
            "No corpus file installed, using the bundled sample corpus"
        );
        CorpusSource::Inline(BUNDLED_CORPUS.to_string())
    }
}

/// Default location of the SQLite file backing the history store.
pub fn history_db_path() -> PathBuf {
    app_data_dir().join(HISTORY_DB_NAME)
}

// ═══════════════════════════════════════════════════════════
// Runtime configuration
// ═══════════════════════════════════════════════════════════

/// What to do when the corpus could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadRetryPolicy {
    /// A failed load is final for the engine's lifetime.
    #[default]
    AttemptOnce,
    /// Re-attempt on later requests, up to `max_attempts` loads in total.
    Retry { max_attempts: u32 },
}

impl LoadRetryPolicy {
    /// Whether another load may be started after `attempts` failures.
    pub fn allows_attempt(&self, attempts: u32) -> bool {
        match self {
            Self::AttemptOnce => attempts == 0,
            Self::Retry { max_attempts } => attempts < *max_attempts,
        }
    }

    fn from_retries(retries: u32) -> Self {
        if retries == 0 {
            Self::AttemptOnce
        } else {
            Self::Retry {
                max_attempts: retries.saturating_add(1),
            }
        }
    }
}

/// Triage engine configuration.
#[derive(Debug, Clone, Serialize)]
pub struct TriageConfig {
    /// Where the medical-knowledge corpus is read from.
    pub corpus: CorpusSource,
    /// Artificial delay before each reply.
    pub thinking_delay: Duration,
    /// Whether failed corpus loads are retried.
    pub load_retry: LoadRetryPolicy,
    /// Number of history entries kept.
    pub history_capacity: usize,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusSource::File(default_corpus_path()),
            thinking_delay: Duration::from_millis(DEFAULT_THINKING_DELAY_MS),
            load_retry: LoadRetryPolicy::default(),
            history_capacity: HISTORY_CAPACITY,
        }
    }
}

impl TriageConfig {
    /// Build a configuration from `CAREBOT_*` environment variables.
    ///
    /// - `CAREBOT_CORPUS`: corpus file path or `http(s)://` URL. When unset,
    ///   `~/Carebot/medical_data.csv` is used if present, else the bundled sample.
    /// - `CAREBOT_THINK_MS`: thinking delay in milliseconds
    /// - `CAREBOT_LOAD_RETRIES`: extra load attempts after a failure (0 = none)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.corpus = match std::env::var("CAREBOT_CORPUS") {
            Ok(corpus) => CorpusSource::from_location(&corpus),
            Err(_) => corpus_or_bundled(default_corpus_path()),
        };
        if let Some(ms) = parse_env::<u64>("CAREBOT_THINK_MS") {
            config.thinking_delay = Duration::from_millis(ms);
        }
        if let Some(retries) = parse_env::<u32>("CAREBOT_LOAD_RETRIES") {
            config.load_retry = LoadRetryPolicy::from_retries(retries);
        }

        config
    }
}

/// History database path, honouring `CAREBOT_HISTORY_DB`.
pub fn history_db_path_from_env() -> PathBuf {
    std::env::var("CAREBOT_HISTORY_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| history_db_path())
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, "Ignoring unparseable configuration value");
            None
        }
    }
}
