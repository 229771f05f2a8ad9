//! Embedding providers selectable with `--provider`.
//!
//! - `hashing`: offline, deterministic. Feature-hashes the normalized title's
//!   words and character trigrams into a fixed-size vector. No model, no
//!   network; good enough for near-duplicate titles.
//! - `openai`: any OpenAI-compatible `/embeddings` endpoint over blocking
//!   HTTP. One request per batch, no retries; fallback policy is the
//!   caller's.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use shopsync_match::normalize::normalize_title;
use shopsync_match::{EmbeddingError, EmbeddingProvider};

pub const DEFAULT_HASHING_DIM: usize = 256;
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";
const DEFAULT_BATCH_SIZE: usize = 256;
const TRIGRAM_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderKind {
    Hashing,
    Openai,
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = blake3::hash(feature.as_bytes());
        let bytes = hash.as_bytes();
        let mut slot = [0u8; 8];
        slot.copy_from_slice(&bytes[..8]);
        let index = (u64::from_le_bytes(slot) % self.dim as u64) as usize;
        // signed hashing keeps collisions from only ever adding up
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[index] += sign * weight;
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let normalized = normalize_title(text);

        for word in normalized.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            self.add_feature(&mut vector, word, 1.0);

            let padded: Vec<char> = format!(" {word} ").chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.add_feature(&mut vector, &format!("#{gram}"), TRIGRAM_WEIGHT);
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASHING_DIM)
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn warm_up(&self) -> Result<(), EmbeddingError> {
        if self.dim == 0 {
            return Err(EmbeddingError::Unavailable("hashing dimension must be positive".into()));
        }
        Ok(())
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if self.dim == 0 {
            return Err(EmbeddingError::Unavailable("hashing dimension must be positive".into()));
        }
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible
// ---------------------------------------------------------------------------

/// Blocking client for an OpenAI-compatible embeddings endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
    batch_size: usize,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        dimensions: Option<usize>,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        if api_key.trim().is_empty() {
            return Err(EmbeddingError::Unavailable("missing API key".into()));
        }
        if model.trim().is_empty() {
            return Err(EmbeddingError::Unavailable("missing model name".into()));
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| EmbeddingError::Unavailable("API key is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shopsync/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| EmbeddingError::Unavailable(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.trim().to_string(),
            dimensions,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: self.dimensions,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbeddingError::Request(format!("{} returned {status}: {body}", self.endpoint)));
        }

        let parsed: EmbeddingResponse = resp
            .json()
            .map_err(|e| EmbeddingError::Response(e.to_string()))?;
        parsed.into_ordered(inputs.len())
    }
}

impl EmbeddingProvider for OpenAiEmbedder {
    /// One round trip with a probe title, so a bad key or URL fails before
    /// any listing is loaded.
    fn warm_up(&self) -> Result<(), EmbeddingError> {
        let probe = self.embed_batch(&["warm up"])?;
        info!(endpoint = %self.endpoint, dim = probe.first().map_or(0, Vec::len), "embedding provider ready");
        Ok(())
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            debug!(size = chunk.len(), "embedding batch");
            vectors.extend(self.embed_batch(chunk)?);
        }
        Ok(vectors)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    /// Vectors in input order. Every index in `0..expected` must appear once.
    fn into_ordered(mut self, expected: usize) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if self.data.len() != expected {
            return Err(EmbeddingError::Response(format!(
                "{} embeddings for {expected} inputs",
                self.data.len()
            )));
        }
        self.data.sort_by_key(|entry| entry.index);
        if let Some((position, entry)) = self
            .data
            .iter()
            .enumerate()
            .find(|(position, entry)| entry.index != *position)
        {
            return Err(EmbeddingError::Response(format!(
                "embedding index {} at position {position}: indices must cover 0..{expected} once",
                entry.index
            )));
        }
        Ok(self.data.into_iter().map(|entry| entry.embedding).collect())
    }
}
