use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use crate::config::MatchConfig;
use crate::conflict::{first_conflict, PricePair};
use crate::embedding::SimilarityMatrix;
use crate::evidence::MatchEvidence;
use crate::identifiers::{extract_identifiers, IdentifierSet};
use crate::model::ProductListing;
use crate::normalize::{lexical_overlap, title_words};
use crate::score::{confidence_gate, score_pair, Gate, PairScore};

/// A listing with its per-title derived data, computed once per run.
#[derive(Debug, Clone)]
pub struct PreparedListing<'a> {
    pub listing: &'a ProductListing,
    pub identifiers: IdentifierSet,
    pub words: BTreeSet<String>,
}

impl<'a> PreparedListing<'a> {
    pub fn new(listing: &'a ProductListing) -> Self {
        Self {
            listing,
            identifiers: extract_identifiers(&listing.title),
            words: title_words(&listing.title),
        }
    }
}

pub fn prepare(listings: &[ProductListing]) -> Vec<PreparedListing<'_>> {
    listings.iter().map(PreparedListing::new).collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentOutput {
    /// For each A listing, the B index it was paired with.
    pub partner: Vec<Option<usize>>,
    /// B listings consumed by some A listing.
    pub used: Vec<bool>,
    /// One entry per pairing, in A order.
    pub evidence: Vec<MatchEvidence>,
}

/// Greedy one-to-one assignment.
///
/// A listings are anchors, visited in input order. Each takes the
/// highest-scoring unused B listing that has no conflict and clears a
/// confidence gate; that B listing is then unavailable to later anchors.
/// Ties keep the earlier B listing. Not globally optimal.
///
/// `similarity` must be `a.len()` × `b.len()`.
pub fn assign_greedy(
    a: &[PreparedListing<'_>],
    b: &[PreparedListing<'_>],
    similarity: &SimilarityMatrix,
    config: &MatchConfig,
) -> AssignmentOutput {
    let mut used = vec![false; b.len()];
    let mut partner = Vec::with_capacity(a.len());
    let mut evidence = Vec::new();

    for (ai, anchor) in a.iter().enumerate() {
        let mut best: Option<(usize, PairScore, Gate)> = None;
        let mut best_score = 0.0;

        for (bi, candidate) in b.iter().enumerate() {
            if used[bi] {
                continue;
            }

            let prices = PricePair {
                a: anchor.listing.effective_price(),
                b: candidate.listing.effective_price(),
            };
            if let Some(rule) = first_conflict(
                &anchor.identifiers,
                &candidate.identifiers,
                prices,
                &config.conflicts,
            ) {
                debug!(a = ai, b = bi, %rule, "conflict");
                continue;
            }

            let scored = score_pair(
                &anchor.identifiers,
                &candidate.identifiers,
                similarity.get(ai, bi),
                &config.scoring,
            );
            // NaN never beats the running best
            if scored.score.partial_cmp(&best_score) != Some(Ordering::Greater) {
                continue;
            }
            if let Some(gate) = confidence_gate(&scored, &config.gates) {
                best_score = scored.score;
                best = Some((bi, scored, gate));
            }
        }

        match best {
            Some((bi, scored, gate)) => {
                used[bi] = true;
                debug!(a = ai, b = bi, score = scored.score, %gate, "matched");
                evidence.push(MatchEvidence {
                    a_index: ai,
                    b_index: bi,
                    semantic: scored.semantic,
                    score: scored.score,
                    identifier_overlap: scored.overlap,
                    key_matches: scored.key_matches,
                    model_match: scored.model_match,
                    gate,
                    lexical_overlap: lexical_overlap(&anchor.words, &b[bi].words),
                });
                partner.push(Some(bi));
            }
            None => partner.push(None),
        }
    }

    AssignmentOutput {
        partner,
        used,
        evidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Catalog;

    fn amazon(title: &str, price: f64) -> ProductListing {
        ProductListing::new(Catalog::Amazon, title).with_price(price)
    }

    fn flipkart(title: &str, price: f64) -> ProductListing {
        ProductListing::new(Catalog::Flipkart, title).with_price(price)
    }

    fn assign(a: &[ProductListing], b: &[ProductListing], rows: Vec<Vec<f64>>) -> AssignmentOutput {
        let sim = SimilarityMatrix::from_rows(rows).unwrap();
        assign_greedy(&prepare(a), &prepare(b), &sim, &MatchConfig::default())
    }

    #[test]
    fn first_anchor_wins_shared_candidate() {
        let a = vec![amazon("Steel Water Bottle", 500.0), amazon("Steel Water Bottle", 500.0)];
        let b = vec![flipkart("Steel Water Bottle", 520.0)];
        let out = assign(&a, &b, vec![vec![0.80], vec![0.95]]);
        assert_eq!(out.partner, vec![Some(0), None]);
        assert_eq!(out.used, vec![true]);
    }

    #[test]
    fn highest_score_wins_within_anchor() {
        let a = vec![amazon("Steel Water Bottle", 500.0)];
        let b = vec![
            flipkart("Steel Water Bottle", 500.0),
            flipkart("Steel Water Bottle", 500.0),
        ];
        let out = assign(&a, &b, vec![vec![0.80, 0.90]]);
        assert_eq!(out.partner, vec![Some(1)]);
        assert_eq!(out.evidence[0].gate, Gate::Semantic);
    }

    #[test]
    fn equal_scores_keep_earlier_candidate() {
        let a = vec![amazon("Steel Water Bottle", 500.0)];
        let b = vec![
            flipkart("Steel Water Bottle", 500.0),
            flipkart("Steel Water Bottle", 500.0),
        ];
        let out = assign(&a, &b, vec![vec![0.90, 0.90]]);
        assert_eq!(out.partner, vec![Some(0)]);
    }

    #[test]
    fn below_every_gate_stays_unmatched() {
        let a = vec![amazon("Steel Water Bottle", 500.0)];
        let b = vec![flipkart("Steel Water Bottle", 500.0)];
        let out = assign(&a, &b, vec![vec![0.70]]);
        assert_eq!(out.partner, vec![None]);
        assert!(out.evidence.is_empty());
    }

    #[test]
    fn gated_out_candidate_does_not_block_lower_scoring_one() {
        // b0: 0.75 + 0.1 (color_blue) = 0.85, one key match, no gate.
        // b1: 0.79, semantic gate.
        let a = vec![amazon("Steel Water Bottle Blue", 500.0)];
        let b = vec![
            flipkart("Steel Water Bottle Blue", 500.0),
            flipkart("Steel Water Bottle", 500.0),
        ];
        let out = assign(&a, &b, vec![vec![0.75, 0.79]]);
        assert_eq!(out.partner, vec![Some(1)]);
        assert_eq!(out.evidence[0].gate, Gate::Semantic);
    }

    #[test]
    fn shared_model_token_admits_low_similarity() {
        let a = vec![amazon("Sony WH1000XM4 Headphones", 20000.0)];
        let b = vec![flipkart("SONY WH1000XM4 Wireless", 21000.0)];
        let out = assign(&a, &b, vec![vec![0.2]]);
        assert_eq!(out.partner, vec![Some(0)]);
        assert_eq!(out.evidence[0].gate, Gate::ModelNumber);
        assert!(out.evidence[0].model_match);
    }

    #[test]
    fn nan_similarity_never_displaces_valid_match() {
        let a = vec![amazon("Sony WH1000XM4 Headphones", 20000.0)];
        let b = vec![
            flipkart("Sony WH1000XM4 Headphones", 20500.0),
            flipkart("Sony WH1000XM4 Headphones", 21000.0),
        ];
        let out = assign(&a, &b, vec![vec![0.95, f64::NAN]]);
        assert_eq!(out.partner, vec![Some(0)]);
        assert!(out.evidence[0].score.is_finite());
        assert_eq!(out.used, vec![true, false]);
    }

    #[test]
    fn nan_only_candidate_stays_unmatched() {
        let a = vec![amazon("Sony WH1000XM4 Headphones", 20000.0)];
        let b = vec![flipkart("Sony WH1000XM4 Headphones", 20500.0)];
        let out = assign(&a, &b, vec![vec![f64::NAN]]);
        assert_eq!(out.partner, vec![None]);
    }

    #[test]
    fn conflict_removes_candidate_regardless_of_similarity() {
        let a = vec![amazon("Samsung Galaxy S21 128GB Storage Black", 700.0)];
        let b = vec![flipkart("Samsung Galaxy S21 256GB Storage Black", 720.0)];
        let out = assign(&a, &b, vec![vec![1.0]]);
        assert_eq!(out.partner, vec![None]);
        assert_eq!(out.used, vec![false]);
    }

    #[test]
    fn price_outlier_is_rejected() {
        let a = vec![amazon("Steel Water Bottle", 100.0)];
        let b = vec![flipkart("Steel Water Bottle", 200.0)];
        let out = assign(&a, &b, vec![vec![0.99]]);
        assert_eq!(out.partner, vec![None]);
    }

    #[test]
    fn evidence_reports_lexical_overlap() {
        let a = vec![amazon("Steel Water Bottle 1 Litre", 500.0)];
        let b = vec![flipkart("Steel Water Bottle", 520.0)];
        let out = assign(&a, &b, vec![vec![0.9]]);
        let ev = &out.evidence[0];
        assert_eq!((ev.a_index, ev.b_index), (0, 0));
        // {steel, water, bottle} / {steel, water, bottle, 1, litre}
        assert!((ev.lexical_overlap - 0.6).abs() < 1e-9);
    }
}
