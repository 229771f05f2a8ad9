//! Response envelope and fallback dataset.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use shopsync_match::catalog::order_and_number;
use shopsync_match::UnifiedProduct;

use crate::CliError;

/// What `shopsync match` prints on stdout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub count: usize,
    pub is_fallback: bool,
    pub products: Vec<UnifiedProduct>,
    /// Wall-clock seconds, rounded to two decimals.
    pub elapsed_time: f64,
}

impl SearchResponse {
    pub fn new(query: impl Into<String>, products: Vec<UnifiedProduct>, is_fallback: bool, elapsed: Duration) -> Self {
        Self {
            success: true,
            query: query.into(),
            count: products.len(),
            is_fallback,
            products,
            elapsed_time: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FallbackDocument {
    #[serde(default)]
    products: Vec<UnifiedProduct>,
}

/// Parse a fallback document (`{"products": [...]}`). Records are
/// re-ordered and renumbered the way the engine emits them.
pub fn parse_fallback(json: &str) -> Result<Vec<UnifiedProduct>, CliError> {
    let doc: FallbackDocument =
        serde_json::from_str(json).map_err(|e| CliError::parse(format!("fallback data: {e}")))?;
    Ok(order_and_number(doc.products))
}

/// Load fallback products. An unreadable or malformed file degrades to an
/// empty list so the response can still be served.
pub fn load_fallback(path: &Path) -> Vec<UnifiedProduct> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read fallback data");
            return Vec::new();
        }
    };
    match parse_fallback(&json) {
        Ok(products) => products,
        Err(e) => {
            warn!(path = %path.display(), error = %e.message, "cannot parse fallback data");
            Vec::new()
        }
    }
}
