use serde::Serialize;

use crate::model::UnifiedProduct;
use crate::score::Gate;

/// Why one A listing was paired with one B listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchEvidence {
    /// Position in the A input.
    pub a_index: usize,
    /// Position in the B input.
    pub b_index: usize,
    pub semantic: f64,
    pub score: f64,
    pub identifier_overlap: usize,
    pub key_matches: u8,
    pub model_match: bool,
    pub gate: Gate,
    /// Jaccard overlap of the normalized title words. Reported only.
    pub lexical_overlap: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    /// Records in the unified catalog.
    pub total: usize,
    /// Records carrying both prices.
    pub matched: usize,
    pub a_only: usize,
    pub b_only: usize,
}

/// Compute summary statistics from the unified catalog.
pub fn compute_summary(products: &[UnifiedProduct]) -> MatchSummary {
    let mut summary = MatchSummary {
        total: products.len(),
        ..MatchSummary::default()
    };

    for p in products {
        match (p.amazon_price.is_some(), p.flipkart_price.is_some()) {
            (true, true) => summary.matched += 1,
            (true, false) => summary.a_only += 1,
            (false, true) => summary.b_only += 1,
            // fallback records can lack both
            (false, false) => {}
        }
    }

    summary
}
