use crate::models::VariantTier;

const DURATION_MARKERS: &[&str] = &["days", "weeks", "long time", "since", "for", "from"];

const SEVERITY_MARKERS: &[&str] = &[
    "severe",
    "bad",
    "terrible",
    "worst",
    "intense",
    "unbearable",
    "very",
    "really",
    "extremely",
];

const MILD_MARKERS: &[&str] = &["mild", "little", "slight", "bit of", "small"];

/// Tone and duration signals found in a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToneSignals {
    pub duration: bool,
    pub severity: bool,
    pub mild: bool,
}

impl ToneSignals {
    pub fn scan(text: &str) -> Self {
        let lower = text.to_lowercase();
        let any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));
        Self {
            duration: any(DURATION_MARKERS),
            severity: any(SEVERITY_MARKERS),
            mild: any(MILD_MARKERS),
        }
    }

    /// Duration or severity outranks mildness.
    pub fn tier(self) -> VariantTier {
        if self.duration || self.severity {
            VariantTier::Detailed
        } else if self.mild {
            VariantTier::Standard
        } else {
            VariantTier::Default
        }
    }
}

/// Choose which guidance variant answers a query.
pub fn select_variation(text: &str) -> VariantTier {
    ToneSignals::scan(text).tier()
}
