use tracing::debug;

use crate::error::{EmbeddingError, MatchError};

/// Text → vector capability consumed by the engine.
///
/// Implementations own model loading and hardware placement. The engine
/// calls `embed` once per run with every title of both catalogs and never
/// retries; callers decide on timeouts and fallbacks.
pub trait EmbeddingProvider {
    /// One-time initialization (model load, connection check, first
    /// inference). Called by [`crate::Matcher::warm_up`] before serving.
    fn warm_up(&self) -> Result<(), EmbeddingError> {
        Ok(())
    }

    /// One vector per input, in input order, all of the same dimension.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for &P {
    fn warm_up(&self) -> Result<(), EmbeddingError> {
        (**self).warm_up()
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed(texts)
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<P> {
    fn warm_up(&self) -> Result<(), EmbeddingError> {
        (**self).warm_up()
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed(texts)
    }
}

/// Cosine similarity; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

// ---------------------------------------------------------------------------
// SimilarityMatrix
// ---------------------------------------------------------------------------

/// Dense |A|×|B| semantic similarity, row-major. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build from explicit rows (one per A listing). Rows must be equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatchError> {
        let cols = rows.first().map_or(0, Vec::len);
        let n = rows.len();
        let mut values = Vec::with_capacity(n * cols);
        for row in rows {
            if row.len() != cols {
                return Err(MatchError::SimilarityShape {
                    rows: n,
                    cols,
                    got_rows: n,
                    got_cols: row.len(),
                });
            }
            values.extend(row);
        }
        Ok(Self { rows: n, cols, values })
    }

    /// Every cell set to `value`.
    pub fn uniform(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            values: vec![value; rows * cols],
        }
    }

    /// Cosine similarity of every A vector against every B vector.
    pub fn from_embeddings(a: &[Vec<f32>], b: &[Vec<f32>]) -> Result<Self, MatchError> {
        let dim = a.first().or_else(|| b.first()).map_or(0, Vec::len);
        for (index, v) in a.iter().chain(b).enumerate() {
            if v.len() != dim {
                return Err(MatchError::DimensionMismatch {
                    expected: dim,
                    got: v.len(),
                    index,
                });
            }
        }

        let mut values = Vec::with_capacity(a.len() * b.len());
        for va in a {
            for vb in b {
                values.push(cosine_similarity(va, vb));
            }
        }
        Ok(Self {
            rows: a.len(),
            cols: b.len(),
            values,
        })
    }

    /// Embed both title lists in a single provider call and compare.
    pub fn compute<P: EmbeddingProvider + ?Sized>(
        provider: &P,
        titles_a: &[&str],
        titles_b: &[&str],
    ) -> Result<Self, MatchError> {
        let texts: Vec<&str> = titles_a.iter().chain(titles_b).copied().collect();
        debug!(a = titles_a.len(), b = titles_b.len(), "embedding titles");

        let mut vectors = provider.embed(&texts)?;
        if vectors.len() != texts.len() {
            return Err(MatchError::EmbeddingCount {
                expected: texts.len(),
                got: vectors.len(),
            });
        }
        let vectors_b = vectors.split_off(titles_a.len());
        Self::from_embeddings(&vectors, &vectors_b)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Similarity of A item `i` and B item `j`.
    ///
    /// # Panics
    /// If `i` or `j` is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows && j < self.cols, "({i}, {j}) outside {}x{}", self.rows, self.cols);
        self.values[i * self.cols + j]
    }

    pub(crate) fn check_shape(&self, rows: usize, cols: usize) -> Result<(), MatchError> {
        if self.rows == rows && self.cols == cols {
            return Ok(());
        }
        Err(MatchError::SimilarityShape {
            rows,
            cols,
            got_rows: self.rows,
            got_cols: self.cols,
        })
    }
}
