use thiserror::Error;

/// Failure reported by an embedding provider.
///
/// Providers live outside this crate; the engine only propagates these.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Provider was never warmed up or its backend is gone.
    #[error("embedding provider unavailable: {0}")]
    Unavailable(String),
    /// Transport-level failure (timeout, connection refused, ...).
    #[error("embedding request failed: {0}")]
    Request(String),
    /// Backend answered but the payload was unusable.
    #[error("malformed embedding response: {0}")]
    Response(String),
}

#[derive(Debug, Error)]
pub enum MatchError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (negative weight, threshold out of range, ...).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    /// Provider returned a different number of vectors than titles sent.
    #[error("embedding provider returned {got} vectors for {expected} titles")]
    EmbeddingCount { expected: usize, got: usize },
    /// Vectors of differing dimension within one batch.
    #[error("embedding {index} has dimension {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize, index: usize },
    /// Similarity matrix does not cover the A×B cross product.
    #[error("similarity matrix is {got_rows}x{got_cols}, expected {rows}x{cols}")]
    SimilarityShape {
        rows: usize,
        cols: usize,
        got_rows: usize,
        got_cols: usize,
    },
    /// Missing required column in listing CSV.
    #[error("missing column '{column}'")]
    MissingColumn { column: String },
    /// A listing row that cannot be interpreted at all.
    #[error("row {row}: {reason}")]
    InvalidListing { row: usize, reason: String },
    /// Listing payload unreadable (CSV/JSON syntax).
    #[error("IO error: {0}")]
    Io(String),
}
