//! `shopsync-match`: two-catalog product matching engine.
//!
//! Pure engine crate: receives pre-loaded listings from catalog A (Amazon)
//! and catalog B (Flipkart) plus an injected embedding provider, returns the
//! unified, price-comparable catalog. No network or filesystem access.
//!
//! Pipeline per run:
//!
//! ```text
//! listings A, B ──► identifiers + normalized words (per listing)
//!               ──► one batched embedding call ──► |A|×|B| cosine matrix
//!               ──► conflict rules + scorer + greedy assignment (A order)
//!               ──► unified catalog (compared first, ids renumbered)
//! ```

pub mod catalog;
pub mod config;
pub mod conflict;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod identifiers;
pub mod listing;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod score;

pub use config::MatchConfig;
pub use embedding::{EmbeddingProvider, SimilarityMatrix};
pub use engine::{match_listings, match_with_similarity, run, run_with_similarity, MatchReport, Matcher};
pub use error::{EmbeddingError, MatchError};
pub use identifiers::{extract_identifiers, IdentifierSet};
pub use model::{Catalog, ProductListing, UnifiedProduct};
