use serde::Serialize;

use crate::config::{GateConfig, ScoringConfig};
use crate::identifiers::IdentifierSet;

/// Brands strong enough to count as a key match. Narrower than the
/// extraction vocabulary: appliance and laptop brands are too often part
/// of accessory titles.
pub const KEY_BRANDS: &[&str] = &[
    "apple", "iphone", "samsung", "oneplus", "xiaomi", "redmi", "realme", "oppo", "vivo", "poco",
    "motorola", "google", "pixel", "nothing", "mi", "lg", "sony", "boat", "jbl",
];

/// Composite score of one non-conflicting candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairScore {
    pub semantic: f64,
    /// Identifier tags present on both sides.
    pub overlap: usize,
    /// Both sides share at least one `model_` token.
    pub model_match: bool,
    /// Independent strong signals: brand, storage, color (0..=3).
    pub key_matches: u8,
    pub score: f64,
}

/// Confidence tier that admitted a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    StrongKeys,
    ModerateKeys,
    ModelNumber,
    Semantic,
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongKeys => write!(f, "strong_keys"),
            Self::ModerateKeys => write!(f, "moderate_keys"),
            Self::ModelNumber => write!(f, "model_number"),
            Self::Semantic => write!(f, "semantic"),
        }
    }
}

pub fn score_pair(
    a: &IdentifierSet,
    b: &IdentifierSet,
    semantic: f64,
    config: &ScoringConfig,
) -> PairScore {
    let overlap = a.overlap(b);
    let model_match = !a.with_prefix("model_").is_disjoint(&b.with_prefix("model_"));

    let mut score = semantic + overlap as f64 * config.overlap_weight;
    if model_match {
        score += config.model_bonus;
    }

    PairScore {
        semantic,
        overlap,
        model_match,
        key_matches: key_match_count(a, b),
        score,
    }
}

/// Count brand, storage and color agreement.
pub fn key_match_count(a: &IdentifierSet, b: &IdentifierSet) -> u8 {
    let mut count = 0;

    if !a.restricted_to(KEY_BRANDS).is_disjoint(&b.restricted_to(KEY_BRANDS)) {
        count += 1;
    }
    for prefix in ["storage_", "color_"] {
        let ta = a.with_prefix(prefix);
        let tb = b.with_prefix(prefix);
        if !ta.is_empty() && ta == tb {
            count += 1;
        }
    }

    count
}

/// First gate the candidate clears, checked from most to least evidence.
pub fn confidence_gate(score: &PairScore, gates: &GateConfig) -> Option<Gate> {
    if score.key_matches >= gates.strong_keys && score.semantic > gates.strong_semantic {
        Some(Gate::StrongKeys)
    } else if score.key_matches >= gates.moderate_keys && score.semantic > gates.moderate_semantic {
        Some(Gate::ModerateKeys)
    } else if gates.trust_model_match && score.model_match {
        Some(Gate::ModelNumber)
    } else if score.semantic > gates.semantic_only {
        Some(Gate::Semantic)
    } else {
        None
    }
}
