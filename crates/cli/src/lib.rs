//! `shopsync-cli`: file-driven front end for the matching engine.
//!
//! Loads listing exports, builds an embedding provider, runs
//! `shopsync-match`, sorts for presentation and wraps the catalog in the
//! response envelope.

pub mod exit_codes;
pub mod providers;
pub mod response;
pub mod sort;

use shopsync_match::{EmbeddingError, MatchError};

use exit_codes::{EXIT_CONFIG, EXIT_EMBEDDING, EXIT_IO, EXIT_PARSE, EXIT_USAGE};

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    pub fn embedding(err: EmbeddingError) -> Self {
        let hint = match &err {
            EmbeddingError::Unavailable(_) => {
                Some("use --provider hashing to match offline, or pass --fallback".to_string())
            }
            EmbeddingError::Request(_) => {
                Some("check SHOPSYNC_EMBEDDINGS_URL and OPENAI_API_KEY".to_string())
            }
            EmbeddingError::Response(_) => None,
        };
        Self { code: EXIT_EMBEDDING, message: err.to_string(), hint }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<MatchError> for CliError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::Embedding(e) => Self::embedding(e),
            MatchError::EmbeddingCount { .. } | MatchError::DimensionMismatch { .. } => {
                Self { code: EXIT_EMBEDDING, message: err.to_string(), hint: None }
            }
            MatchError::ConfigParse(_) | MatchError::ConfigValidation(_) => Self::config(err.to_string()),
            MatchError::MissingColumn { .. } | MatchError::InvalidListing { .. } => {
                Self::parse(err.to_string())
            }
            MatchError::Io(_) => Self::parse(err.to_string()),
            MatchError::SimilarityShape { .. } => {
                Self { code: exit_codes::EXIT_ERROR, message: err.to_string(), hint: None }
            }
        }
    }
}
