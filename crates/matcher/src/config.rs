use serde::Deserialize;

use crate::error::MatchError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Tunables for one matching run. Every field defaults to the reference
/// behaviour, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub gates: GateConfig,
    #[serde(default)]
    pub conflicts: ConflictConfig,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Added per identifier tag shared by both titles.
    pub overlap_weight: f64,
    /// Added once when both titles share a `model_` token.
    pub model_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            overlap_weight: 0.1,
            model_bonus: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Confidence gates
// ---------------------------------------------------------------------------

/// Tiered acceptance thresholds. Semantic comparisons are strict (`>`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    pub strong_keys: u8,
    pub strong_semantic: f64,
    pub moderate_keys: u8,
    pub moderate_semantic: f64,
    /// Accept on a shared model token regardless of semantic similarity.
    pub trust_model_match: bool,
    pub semantic_only: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            strong_keys: 3,
            strong_semantic: 0.5,
            moderate_keys: 2,
            moderate_semantic: 0.6,
            trust_model_match: true,
            semantic_only: 0.78,
        }
    }
}

// ---------------------------------------------------------------------------
// Conflict rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConflictConfig {
    /// Reject when `|p1 - p2| / min(p1, p2)` exceeds this.
    pub max_price_ratio: f64,
    /// Largest screen-size difference (inches) still treated as equal.
    pub screen_size_tolerance: u32,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            max_price_ratio: 0.8,
            screen_size_tolerance: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, MatchError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| MatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        let s = &self.scoring;
        for (name, value) in [("overlap_weight", s.overlap_weight), ("model_bonus", s.model_bonus)] {
            if !value.is_finite() || value < 0.0 {
                return Err(MatchError::ConfigValidation(format!(
                    "scoring.{name} must be a non-negative number, got {value}"
                )));
            }
        }

        let g = &self.gates;
        for (name, value) in [
            ("strong_semantic", g.strong_semantic),
            ("moderate_semantic", g.moderate_semantic),
            ("semantic_only", g.semantic_only),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(MatchError::ConfigValidation(format!(
                    "gates.{name} must be within [-1, 1], got {value}"
                )));
            }
        }
        for (name, value) in [("strong_keys", g.strong_keys), ("moderate_keys", g.moderate_keys)] {
            if value > 3 {
                return Err(MatchError::ConfigValidation(format!(
                    "gates.{name} must be at most 3 (brand, storage, color), got {value}"
                )));
            }
        }

        let c = &self.conflicts;
        if !c.max_price_ratio.is_finite() || c.max_price_ratio <= 0.0 {
            return Err(MatchError::ConfigValidation(format!(
                "conflicts.max_price_ratio must be positive, got {}",
                c.max_price_ratio
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
