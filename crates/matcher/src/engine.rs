use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::build_catalog;
use crate::config::MatchConfig;
use crate::embedding::{EmbeddingProvider, SimilarityMatrix};
use crate::error::{EmbeddingError, MatchError};
use crate::evidence::{compute_summary, MatchEvidence, MatchSummary};
use crate::matcher::{assign_greedy, prepare};
use crate::model::{ProductListing, UnifiedProduct};

#[derive(Debug, Clone, Serialize)]
pub struct MatchMeta {
    pub engine_version: String,
    pub a_listings: usize,
    pub b_listings: usize,
}

/// Unified catalog plus how it was reached.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub meta: MatchMeta,
    pub summary: MatchSummary,
    pub products: Vec<UnifiedProduct>,
    pub evidence: Vec<MatchEvidence>,
}

impl MatchReport {
    fn empty(a: usize, b: usize) -> Self {
        Self {
            meta: meta(a, b),
            summary: MatchSummary::default(),
            products: Vec::new(),
            evidence: Vec::new(),
        }
    }
}

fn meta(a: usize, b: usize) -> MatchMeta {
    MatchMeta {
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        a_listings: a,
        b_listings: b,
    }
}

/// Match two catalogs with the default configuration.
///
/// Empty input on either side yields an empty catalog and the provider is
/// not called.
pub fn match_listings<P: EmbeddingProvider + ?Sized>(
    a: &[ProductListing],
    b: &[ProductListing],
    provider: &P,
) -> Result<Vec<UnifiedProduct>, MatchError> {
    run(&MatchConfig::default(), a, b, provider).map(|report| report.products)
}

/// Embed every title in one provider call, then match.
pub fn run<P: EmbeddingProvider + ?Sized>(
    config: &MatchConfig,
    a: &[ProductListing],
    b: &[ProductListing],
    provider: &P,
) -> Result<MatchReport, MatchError> {
    if a.is_empty() || b.is_empty() {
        debug!(a = a.len(), b = b.len(), "empty side, skipping match");
        return Ok(MatchReport::empty(a.len(), b.len()));
    }

    let titles_a: Vec<&str> = a.iter().map(|l| l.title.as_str()).collect();
    let titles_b: Vec<&str> = b.iter().map(|l| l.title.as_str()).collect();
    let similarity = SimilarityMatrix::compute(provider, &titles_a, &titles_b)?;

    run_with_similarity(config, a, b, &similarity)
}

/// Match against a precomputed |A|×|B| similarity matrix.
pub fn run_with_similarity(
    config: &MatchConfig,
    a: &[ProductListing],
    b: &[ProductListing],
    similarity: &SimilarityMatrix,
) -> Result<MatchReport, MatchError> {
    if a.is_empty() || b.is_empty() {
        return Ok(MatchReport::empty(a.len(), b.len()));
    }
    similarity.check_shape(a.len(), b.len())?;

    let prepared_a = prepare(a);
    let prepared_b = prepare(b);
    debug!(a = a.len(), b = b.len(), "identifiers extracted");

    let assignment = assign_greedy(&prepared_a, &prepared_b, similarity, config);
    let products = build_catalog(a, b, &assignment);
    let summary = compute_summary(&products);

    info!(
        total = summary.total,
        matched = summary.matched,
        a_only = summary.a_only,
        b_only = summary.b_only,
        "match complete"
    );

    Ok(MatchReport {
        meta: meta(a.len(), b.len()),
        summary,
        products,
        evidence: assignment.evidence,
    })
}

/// [`run_with_similarity`] with the default configuration, catalog only.
pub fn match_with_similarity(
    a: &[ProductListing],
    b: &[ProductListing],
    similarity: &SimilarityMatrix,
) -> Result<Vec<UnifiedProduct>, MatchError> {
    run_with_similarity(&MatchConfig::default(), a, b, similarity).map(|report| report.products)
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// A provider bound to a configuration. Holds no state between runs.
#[derive(Debug, Clone)]
pub struct Matcher<P> {
    provider: P,
    config: MatchConfig,
}

impl<P: EmbeddingProvider> Matcher<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, MatchConfig::default())
    }

    pub fn with_config(provider: P, config: MatchConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Initialize the provider. Call once before the first match.
    pub fn warm_up(&self) -> Result<(), EmbeddingError> {
        self.provider.warm_up()
    }

    pub fn match_listings(
        &self,
        a: &[ProductListing],
        b: &[ProductListing],
    ) -> Result<Vec<UnifiedProduct>, MatchError> {
        self.run(a, b).map(|report| report.products)
    }

    pub fn run(&self, a: &[ProductListing], b: &[ProductListing]) -> Result<MatchReport, MatchError> {
        run(&self.config, a, b, &self.provider)
    }
}
