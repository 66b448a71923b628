//! Medical-knowledge corpus loader.
//!
//! The corpus is comma-separated text, one record per line, with a header row:
//!
//! ```text
//! symptom, keywords, [description, medicine, doctor_consult, food, lifestyle] x 3
//! ```
//!
//! Keywords are `;`-separated. Fields may be wrapped in double quotes to
//! carry commas. Rows with fewer than 17 fields are dropped without error.

use std::path::PathBuf;

use serde::Serialize;

use super::CorpusError;
use crate::models::{GuidanceVariant, MedicalRecord};

/// Minimum number of fields in a usable row: symptom, keywords, 3 x 5 variant fields.
pub const MIN_FIELDS_PER_ROW: usize = 17;

const FIELDS_PER_VARIANT: usize = 5;
const FIRST_VARIANT_FIELD: usize = 2;

// ═══════════════════════════════════════════════════════════
// Sources
// ═══════════════════════════════════════════════════════════

/// Where the corpus text comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum CorpusSource {
    /// A local file.
    File(PathBuf),
    /// An `http(s)://` resource.
    Url(String),
    /// Text already held in memory.
    Inline(String),
}

impl CorpusSource {
    /// Interpret a user-supplied location as a URL or a file path.
    pub fn from_location(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Url(_) => "url",
            Self::Inline(_) => "inline",
        }
    }

    /// Read the raw corpus text.
    pub async fn fetch(&self) -> Result<String, CorpusError> {
        match self {
            Self::File(path) => Ok(tokio::fs::read_to_string(path).await?),
            Self::Url(url) => {
                let response = reqwest::get(url).await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(CorpusError::HttpStatus {
                        status: status.as_u16(),
                    });
                }
                Ok(response.text().await?)
            }
            Self::Inline(text) => Ok(text.clone()),
        }
    }
}

/// Outcome of a corpus load attempt.
///
/// `Loaded { records: 0 }` means the source was readable but held no usable
/// rows; `Empty` means the source itself could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadResult {
    Loaded { records: usize },
    Empty { reason: String },
}

impl LoadResult {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Fetch and parse a corpus.
pub async fn load_corpus(source: &CorpusSource) -> Result<Vec<MedicalRecord>, CorpusError> {
    let text = source.fetch().await?;
    let records = parse_corpus(&text);
    tracing::info!(
        source = source.kind(),
        records = records.len(),
        "Loaded medical conditions from corpus"
    );
    Ok(records)
}

// ═══════════════════════════════════════════════════════════
// Parsing
// ═══════════════════════════════════════════════════════════

/// Parse corpus text into records, in corpus order.
///
/// The first line is always treated as the header and skipped.
pub fn parse_corpus(text: &str) -> Vec<MedicalRecord> {
    text.split('\n')
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(row, line)| {
            let fields = split_fields(line);
            if fields.len() < MIN_FIELDS_PER_ROW {
                tracing::trace!(row, fields = fields.len(), "Corpus: skipping incomplete row");
                return None;
            }
            Some(parse_record(&fields))
        })
        .collect()
}

fn parse_record(fields: &[String]) -> MedicalRecord {
    MedicalRecord {
        symptom: clean_value(&fields[0]),
        keywords: parse_keywords(&clean_value(&fields[1])),
        variations: [
            parse_variant(fields, 0),
            parse_variant(fields, 1),
            parse_variant(fields, 2),
        ],
    }
}

fn parse_variant(fields: &[String], tier: usize) -> GuidanceVariant {
    let start = FIRST_VARIANT_FIELD + tier * FIELDS_PER_VARIANT;
    GuidanceVariant {
        description: clean_value(&fields[start]),
        medicine: clean_value(&fields[start + 1]),
        doctor_consult: clean_value(&fields[start + 2]),
        food_suggestions: clean_value(&fields[start + 3]),
        lifestyle_suggestions: clean_value(&fields[start + 4]),
    }
}

/// Split the `;`-separated keyword field into lowercase, trimmed phrases.
fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Split one line on commas that are outside double quotes.
///
/// Quote characters only toggle the quoted state; they stay in the field
/// text and are trimmed from its edges by [`clean_value`].
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);

    fields
}

/// Trim whitespace and one wrapping quote from each edge of a field.
pub fn clean_value(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);
    unquoted.trim().to_string()
}
