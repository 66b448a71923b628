use serde::{Deserialize, Serialize};

/// One symptom category from the medical-knowledge corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    /// Display label, e.g. "Skin Rash".
    pub symptom: String,
    /// Lowercase trigger phrases, in corpus order.
    pub keywords: Vec<String>,
    /// Guidance texts indexed by [`VariantTier`].
    pub variations: [GuidanceVariant; 3],
}

impl MedicalRecord {
    pub fn variant(&self, tier: VariantTier) -> &GuidanceVariant {
        &self.variations[tier.index()]
    }
}

/// Guidance text for one severity tier of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceVariant {
    pub description: String,
    pub medicine: String,
    pub doctor_consult: String,
    pub food_suggestions: String,
    pub lifestyle_suggestions: String,
}

/// Which of a record's three variants answers the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantTier {
    /// Mild wording in the query.
    Standard,
    /// No tone signal either way.
    Default,
    /// Duration or severity wording in the query.
    Detailed,
}

impl VariantTier {
    pub fn index(self) -> usize {
        match self {
            Self::Standard => 0,
            Self::Default => 1,
            Self::Detailed => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Default => "default",
            Self::Detailed => "detailed",
        }
    }
}

impl std::fmt::Display for VariantTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
