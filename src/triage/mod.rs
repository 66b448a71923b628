pub mod corpus;
pub mod emergency;
pub mod matcher;
pub mod variation;
pub mod compose;
pub mod engine;

pub use corpus::{CorpusSource, LoadResult};
pub use engine::{TriageEngine, TriageOutcome, TriageReply};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Corpus read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corpus fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Corpus server returned status {status}")]
    HttpStatus { status: u16 },
}
