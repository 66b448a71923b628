pub mod config;
pub mod models;
pub mod triage; // Emergency detection, symptom matching, reply composition
pub mod history; // Capped query/response log
pub mod cli;

use std::sync::Arc;

use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::config::TriageConfig;
use crate::history::HistoryStore;
use crate::triage::TriageEngine;

/// Build an engine from `CAREBOT_*` environment configuration.
pub fn engine_from_env() -> TriageEngine {
    let config = TriageConfig::from_env();
    let history = HistoryStore::open_or_memory(
        &config::history_db_path_from_env(),
        config.history_capacity,
    );
    TriageEngine::new(config, history)
}

pub fn run() {
    // Logs go to stderr; stdout carries replies.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            return;
        }
    };

    runtime.block_on(async {
        let engine = Arc::new(engine_from_env());
        let config = engine.config();
        tracing::debug!(
            corpus = config.corpus.kind(),
            thinking_ms = config.thinking_delay.as_millis() as u64,
            load_retry = ?config.load_retry,
            history_capacity = config.history_capacity,
            "Triage engine configured"
        );

        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = cli::repl(engine, stdin, tokio::io::stdout()).await {
            tracing::error!(error = %e, "Console I/O failed");
        }
    });
}
