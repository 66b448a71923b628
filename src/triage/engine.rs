//! Triage pipeline: emergency check → best match → variant → reply → history.
//!
//! The engine owns its corpus. The first request loads it under an async
//! mutex; concurrent first requests wait on that same load rather than
//! starting their own, and later requests reuse the cached records.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::compose::{compose_guidance, NO_MATCH_RESPONSE};
use super::corpus::{load_corpus, LoadResult};
use super::emergency::detect_emergency;
use super::matcher::find_best_match;
use super::variation::select_variation;
use crate::config::TriageConfig;
use crate::history::HistoryStore;
use crate::models::{MedicalRecord, VariantTier};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// How a query was answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriageOutcome {
    /// An emergency rule fired; the reply is its fixed message.
    Emergency { rule: &'static str },
    /// A corpus record matched and one of its variants was composed.
    Guidance { symptom: String, tier: VariantTier },
    /// Nothing matched. `corpus` tells an empty corpus apart from a miss.
    NoMatch { corpus: LoadResult },
}

/// Reply text plus the outcome that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriageReply {
    pub response: String,
    pub outcome: TriageOutcome,
}

#[derive(Debug)]
enum CorpusState {
    Unloaded,
    Loaded(Arc<Vec<MedicalRecord>>),
    Failed { reason: String },
}

#[derive(Debug)]
struct CorpusSlot {
    state: CorpusState,
    attempts: u32,
}

// ═══════════════════════════════════════════════════════════
// TriageEngine
// ═══════════════════════════════════════════════════════════

pub struct TriageEngine {
    config: TriageConfig,
    corpus: Mutex<CorpusSlot>,
    history: Arc<HistoryStore>,
}

impl TriageEngine {
    pub fn new(config: TriageConfig, history: HistoryStore) -> Self {
        Self {
            config,
            corpus: Mutex::new(CorpusSlot {
                state: CorpusState::Unloaded,
                attempts: 0,
            }),
            history: Arc::new(history),
        }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &*self.history
    }

    /// Load the corpus if no load has happened yet (or a retry is due).
    pub async fn ensure_loaded(&self) -> LoadResult {
        self.corpus().await.1
    }

    /// Number of corpus loads started so far.
    pub async fn load_attempts(&self) -> u32 {
        self.corpus.lock().await.attempts
    }

    /// Answer a patient message and save the exchange to history.
    pub async fn respond(&self, text: &str) -> String {
        self.triage(text).await.response
    }

    /// Answer a patient message, reporting how the answer was reached.
    pub async fn triage(&self, text: &str) -> TriageReply {
        let (corpus, load) = self.corpus().await;

        if !self.config.thinking_delay.is_zero() {
            tokio::time::sleep(self.config.thinking_delay).await;
        }

        let reply = evaluate(text, &corpus, load);
        self.record_history(text, &reply.response).await;
        reply
    }

    /// Run a request on its own task.
    ///
    /// Dropping the handle does not cancel the request: the reply is still
    /// computed and still saved to history.
    pub fn submit(self: &Arc<Self>, text: String) -> JoinHandle<TriageReply> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.triage(&text).await })
    }

    /// Save an exchange on the blocking pool; SQLite writes must not stall a worker.
    async fn record_history(&self, query: &str, response: &str) {
        let history = Arc::clone(&self.history);
        let query = query.to_string();
        let response = response.to_string();
        let write = tokio::task::spawn_blocking(move || history.record(&query, &response));
        if let Err(e) = write.await {
            tracing::error!(error = %e, "History write task failed");
        }
    }

    async fn corpus(&self) -> (Arc<Vec<MedicalRecord>>, LoadResult) {
        let mut slot = self.corpus.lock().await;

        match &slot.state {
            CorpusState::Loaded(records) => {
                let count = records.len();
                return (Arc::clone(records), LoadResult::Loaded { records: count });
            }
            CorpusState::Failed { reason } if !self.config.load_retry.allows_attempt(slot.attempts) => {
                return (Arc::default(), LoadResult::Empty { reason: reason.clone() });
            }
            CorpusState::Failed { .. } | CorpusState::Unloaded => {}
        }

        slot.attempts += 1;
        match load_corpus(&self.config.corpus).await {
            Ok(records) => {
                let records = Arc::new(records);
                let count = records.len();
                slot.state = CorpusState::Loaded(Arc::clone(&records));
                (records, LoadResult::Loaded { records: count })
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    source = self.config.corpus.kind(),
                    attempt = slot.attempts,
                    "Corpus load failed, symptom matching disabled"
                );
                let reason = e.to_string();
                slot.state = CorpusState::Failed {
                    reason: reason.clone(),
                };
                (Arc::default(), LoadResult::Empty { reason })
            }
        }
    }
}

/// Emergency rules first, then the best corpus match, then the fallback.
fn evaluate(text: &str, corpus: &[MedicalRecord], load: LoadResult) -> TriageReply {
    if let Some(rule) = detect_emergency(text) {
        tracing::info!(rule = rule.name, "Triage: emergency escalation");
        return TriageReply {
            response: rule.message.to_string(),
            outcome: TriageOutcome::Emergency { rule: rule.name },
        };
    }

    let Some(hit) = find_best_match(text, corpus) else {
        tracing::info!(corpus = ?load, "Triage: no matching record");
        return TriageReply {
            response: NO_MATCH_RESPONSE.to_string(),
            outcome: TriageOutcome::NoMatch { corpus: load },
        };
    };

    let tier = select_variation(text);
    tracing::info!(symptom = %hit.record.symptom, tier = %tier, "Triage: guidance selected");
    TriageReply {
        response: compose_guidance(hit.record.variant(tier)),
        outcome: TriageOutcome::Guidance {
            symptom: hit.record.symptom.clone(),
            tier,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;

    use crate::config::LoadRetryPolicy;
    use crate::history::{HistoryError, KeyValueStore, MemoryStore};
    use crate::triage::corpus::CorpusSource;
    use crate::triage::emergency::emergency_message;

    const CORPUS: &str = "\
symptom,keywords,d1,m1,c1,f1,l1,d2,m2,c2,f2,l2,d3,m3,c3,f3,l3
Skin Rash,rash;itchy skin,Rash standard.,Calamine.,If it spreads.,Water.,Loose clothes.,Rash default.,Antihistamine.,If it blisters.,Fruit.,Cool showers.,Rash detailed.,Hydrocortisone.,If fever appears.,Omega-3.,Avoid irritants.
Headache,headache;head pain,Headache standard.,Paracetamol.,If persistent.,Water.,Rest.,Headache default.,Ibuprofen.,If recurring.,Magnesium.,Sleep.,Headache detailed.,\"Ibuprofen, with food.\",If vision changes.,Ginger.,Dark room.
Common Cold,cold;runny nose;sneezing,Cold standard.,Rest.,After a week.,Soup.,Sleep.,Cold default.,Decongestant.,After ten days.,Citrus.,Steam.,Cold detailed.,Zinc.,If breathing worsens.,Broth.,Humidifier.
";

    fn config(corpus: CorpusSource) -> TriageConfig {
        TriageConfig {
            corpus,
            thinking_delay: Duration::ZERO,
            ..TriageConfig::default()
        }
    }

    fn engine() -> TriageEngine {
        TriageEngine::new(
            config(CorpusSource::Inline(CORPUS.into())),
            HistoryStore::in_memory(),
        )
    }

    #[tokio::test]
    async fn chest_pain_returns_emergency_message_and_records_it() {
        let engine = engine();
        let response = engine.respond("I have chest pain").await;

        assert_eq!(Some(response.as_str()), emergency_message("chest pain"));
        assert!(response.starts_with("⚠️ **URGENT: This could be a medical emergency!**"));

        let history = engine.history().list();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].query, "I have chest pain");
        assert_eq!(history[0].response, response);
    }

    #[tokio::test]
    async fn emergency_overrides_symptom_match() {
        let engine = engine();
        let reply = engine.triage("headache and a rash, also chest pain").await;

        assert_eq!(reply.outcome, TriageOutcome::Emergency { rule: "chest_pain" });
        assert!(!reply.response.contains("Thank you for sharing"));
    }

    #[tokio::test]
    async fn mild_rash_for_days_selects_detailed_variant() {
        let engine = engine();
        let reply = engine.triage("mild rash for 2 days").await;

        assert_eq!(
            reply.outcome,
            TriageOutcome::Guidance {
                symptom: "Skin Rash".into(),
                tier: VariantTier::Detailed,
            }
        );
        assert!(reply.response.contains("**Understanding What You're Experiencing:**\nRash detailed."));
        assert!(reply.response.contains("**Recommended Medications:**\nHydrocortisone."));
        assert!(!reply.response.contains("Rash standard."));
    }

    #[tokio::test]
    async fn reply_embeds_selected_variant_verbatim() {
        let engine = engine();
        let reply = engine.triage("I have a headache").await;
        let record = crate::triage::corpus::parse_corpus(CORPUS)
            .into_iter()
            .find(|r| r.symptom == "Headache")
            .unwrap();

        assert_eq!(reply.response, compose_guidance(record.variant(VariantTier::Default)));
    }

    #[tokio::test]
    async fn quoted_corpus_fields_survive_into_reply() {
        let engine = engine();
        let response = engine.respond("terrible head pain").await;
        assert!(response.contains("Ibuprofen, with food."));
    }

    #[tokio::test]
    async fn unmatched_query_gets_fallback_and_is_recorded() {
        let engine = engine();
        let reply = engine.triage("my elbow clicks").await;

        assert_eq!(reply.response, NO_MATCH_RESPONSE);
        assert_eq!(
            reply.outcome,
            TriageOutcome::NoMatch {
                corpus: LoadResult::Loaded { records: 3 },
            }
        );
        assert_eq!(engine.history().list()[0].response, NO_MATCH_RESPONSE);
    }

    #[tokio::test]
    async fn empty_input_gets_fallback() {
        let engine = engine();
        assert_eq!(engine.respond("").await, NO_MATCH_RESPONSE);
    }

    #[tokio::test]
    async fn missing_corpus_degrades_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TriageEngine::new(
            config(CorpusSource::File(dir.path().join("absent.csv"))),
            HistoryStore::in_memory(),
        );

        let reply = engine.triage("I have a rash").await;
        assert_eq!(reply.response, NO_MATCH_RESPONSE);
        assert!(matches!(
            reply.outcome,
            TriageOutcome::NoMatch { corpus: LoadResult::Empty { .. } }
        ));

        // Emergencies do not depend on the corpus.
        let response = engine.respond("she fainted").await;
        assert_eq!(Some(response.as_str()), emergency_message("fainted"));
    }

    #[tokio::test]
    async fn failed_load_is_not_retried_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medical.csv");
        let engine = TriageEngine::new(config(CorpusSource::File(path.clone())), HistoryStore::in_memory());

        assert!(!engine.ensure_loaded().await.is_loaded());
        std::fs::write(&path, CORPUS).unwrap();
        assert!(!engine.ensure_loaded().await.is_loaded());
        assert_eq!(engine.load_attempts().await, 1);
    }

    #[tokio::test]
    async fn retry_policy_reloads_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medical.csv");
        let mut cfg = config(CorpusSource::File(path.clone()));
        cfg.load_retry = LoadRetryPolicy::Retry { max_attempts: 3 };
        let engine = TriageEngine::new(cfg, HistoryStore::in_memory());

        assert!(!engine.ensure_loaded().await.is_loaded());
        std::fs::write(&path, CORPUS).unwrap();
        assert_eq!(engine.ensure_loaded().await, LoadResult::Loaded { records: 3 });
        assert_eq!(engine.load_attempts().await, 2);

        // Loaded corpora are cached; no further loads happen.
        engine.ensure_loaded().await;
        assert_eq!(engine.load_attempts().await, 2);
    }

    #[tokio::test]
    async fn retry_policy_stops_at_max_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(CorpusSource::File(dir.path().join("absent.csv")));
        cfg.load_retry = LoadRetryPolicy::Retry { max_attempts: 2 };
        let engine = TriageEngine::new(cfg, HistoryStore::in_memory());

        for _ in 0..5 {
            engine.ensure_loaded().await;
        }
        assert_eq!(engine.load_attempts().await, 2);
    }

    #[tokio::test]
    async fn readable_corpus_without_rows_is_loaded_but_empty() {
        let engine = TriageEngine::new(
            config(CorpusSource::Inline("symptom,keywords\n".into())),
            HistoryStore::in_memory(),
        );
        let reply = engine.triage("I have a rash").await;
        assert_eq!(
            reply.outcome,
            TriageOutcome::NoMatch {
                corpus: LoadResult::Loaded { records: 0 },
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_requests_load_once() {
        let engine = Arc::new(engine());

        let handles: Vec<_> = (0..16)
            .map(|i| engine.submit(format!("itchy skin number {i}")))
            .collect();
        for handle in handles {
            let reply = handle.await.unwrap();
            assert!(matches!(reply.outcome, TriageOutcome::Guidance { .. }));
        }

        assert_eq!(engine.load_attempts().await, 1);
        assert_eq!(engine.history().list().len(), 16);
    }

    #[tokio::test]
    async fn abandoned_request_is_still_recorded() {
        let mut cfg = config(CorpusSource::Inline(CORPUS.into()));
        cfg.thinking_delay = Duration::from_millis(20);
        let engine = Arc::new(TriageEngine::new(cfg, HistoryStore::in_memory()));

        drop(engine.submit("sneezing all morning".into()));
        tokio::time::sleep(Duration::from_millis(300)).await;

        let history = engine.history().list();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].query, "sneezing all morning");
    }

    #[tokio::test]
    async fn history_stays_capped_through_engine() {
        let engine = engine();
        for i in 0..55 {
            engine.respond(&format!("runny nose {i}")).await;
        }
        let history = engine.history().list();
        assert_eq!(history.len(), 50);
        assert_eq!(history[0].query, "runny nose 54");
    }

    /// Store whose writes wait for a signal sent from async code.
    struct GatedStore {
        gate: std::sync::Mutex<mpsc::Receiver<()>>,
        opened: AtomicBool,
        inner: MemoryStore,
    }

    impl KeyValueStore for GatedStore {
        fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
            let gate = self.gate.lock().map_err(|_| HistoryError::LockPoisoned)?;
            if gate.recv_timeout(Duration::from_secs(2)).is_ok() {
                self.opened.store(true, Ordering::SeqCst);
            }
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), HistoryError> {
            self.inner.remove(key)
        }
    }

    #[tokio::test]
    async fn history_write_does_not_block_the_runtime() {
        let (tx, rx) = mpsc::channel();
        let store = Arc::new(GatedStore {
            gate: std::sync::Mutex::new(rx),
            opened: AtomicBool::new(false),
            inner: MemoryStore::new(),
        });
        let engine = Arc::new(TriageEngine::new(
            config(CorpusSource::Inline(CORPUS.into())),
            HistoryStore::new(Box::new(SharedStore(Arc::clone(&store)))),
        ));

        let handle = engine.submit("itchy skin".into());
        // On a single-threaded runtime this timer only fires if the write
        // is waiting off the runtime thread.
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();

        handle.await.unwrap();
        assert!(store.opened.load(Ordering::SeqCst));
        assert_eq!(engine.history().list().len(), 1);
    }

    struct SharedStore(Arc<GatedStore>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
            self.0.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), HistoryError> {
            self.0.remove(key)
        }
    }
}
