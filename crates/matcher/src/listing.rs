//! Listing ingestion: turns raw catalog exports into [`ProductListing`]s.
//!
//! Rows without a usable title or a positive price are dropped here so the
//! matcher only ever sees well-formed listings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::MatchError;
use crate::model::{Catalog, ProductListing};

/// Shortest fragment accepted as a title.
const MIN_TITLE_CHARS: usize = 8;
/// A single all-caps word up to this length is a brand badge, not a title.
const MAX_BADGE_CHARS: usize = 12;

static RATING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+\.?[0-9]*)").unwrap_or_else(|e| panic!("invalid rating pattern: {e}"))
});

// ---------------------------------------------------------------------------
// Field cleanup
// ---------------------------------------------------------------------------

/// Pick the display title from candidate fragments (label text, link
/// attributes, image alt text): the longest fragment of at least 8
/// characters that is not a bare all-caps brand word.
pub fn resolve_title<S: AsRef<str>>(candidates: &[S]) -> Option<String> {
    let mut usable: Vec<&str> = candidates
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| c.chars().count() >= MIN_TITLE_CHARS)
        .collect();
    usable.sort_by_key(|c| std::cmp::Reverse(c.chars().count()));

    usable
        .into_iter()
        .find(|c| !is_brand_badge(c))
        .map(str::to_string)
}

fn is_brand_badge(text: &str) -> bool {
    let single_word = text.split_whitespace().count() == 1;
    let has_cased = text.chars().any(char::is_alphabetic);
    let all_caps = has_cased && !text.chars().any(char::is_lowercase);
    single_word && all_caps && text.chars().count() <= MAX_BADGE_CHARS
}

/// Whole-currency price from display text ("₹1,29,999.00" → 129999).
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '₹' | '$' | ',') && !c.is_whitespace())
        .collect();
    let whole = cleaned.split('.').next().unwrap_or("");
    whole.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// First decimal number in a rating label ("4.3 out of 5 stars" → 4.3).
pub fn parse_rating(text: &str) -> Option<f64> {
    RATING_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// Absolute product URL for `catalog`. Relative hrefs get the catalog's
/// origin; a doubled Amazon origin is repaired.
pub fn normalize_link(catalog: Catalog, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = catalog.base_url();
    let link = if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    };
    Some(link.replace("https://www.amazon.inhttps", "https"))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "n" => Some(false),
        "1" | "true" | "yes" | "y" => Some(true),
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Load listings from a CSV export with a header row.
///
/// Required columns: `title`, `price`. Optional: `image`, `link`, `rating`,
/// `is_prime`. `title` may hold several candidates separated by `|`.
pub fn load_csv_listings(catalog: Catalog, csv_data: &str) -> Result<Vec<ProductListing>, MatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| MatchError::Io(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let required = |name: &str| -> Result<usize, MatchError> {
        position(name).ok_or_else(|| MatchError::MissingColumn { column: name.into() })
    };

    let title_idx = required("title")?;
    let price_idx = required("price")?;
    let image_idx = position("image");
    let link_idx = position("link");
    let rating_idx = position("rating");
    let prime_idx = position("is_prime");

    let mut listings = Vec::new();
    let mut rejected = 0usize;

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| MatchError::Io(e.to_string()))?;
        // header is row 1
        let row = i + 2;
        let field = |idx: Option<usize>| idx.and_then(|col| record.get(col)).unwrap_or("");

        let candidates: Vec<&str> = field(Some(title_idx)).split('|').collect();
        let title = resolve_title(&candidates);
        let price = parse_price(field(Some(price_idx))).filter(|p| *p > 0.0);

        let (Some(title), Some(price)) = (title, price) else {
            rejected += 1;
            continue;
        };

        let is_prime = parse_flag(field(prime_idx)).ok_or_else(|| MatchError::InvalidListing {
            row,
            reason: format!("is_prime must be a boolean, got '{}'", field(prime_idx)),
        })?;

        listings.push(ProductListing {
            source: catalog,
            title,
            price: Some(price),
            image: non_empty(field(image_idx)),
            link: normalize_link(catalog, field(link_idx)),
            rating: parse_rating(field(rating_idx)),
            is_prime: is_prime && catalog == Catalog::Amazon,
        });
    }

    debug!(%catalog, kept = listings.len(), rejected, "loaded csv listings");
    Ok(listings)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawListing {
    #[serde(default)]
    title: Option<String>,
    /// Alternative title fragments, resolved together with `title`.
    #[serde(default)]
    titles: Vec<String>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    rating: Option<Value>,
    #[serde(default)]
    is_prime: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    List(Vec<RawListing>),
    Wrapped { listings: Vec<RawListing> },
}

fn value_number(value: &Value, text_parser: fn(&str) -> Option<f64>) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => text_parser(s),
        _ => None,
    }
}

impl RawListing {
    fn into_listing(self, catalog: Catalog) -> Option<ProductListing> {
        let mut candidates = self.titles;
        candidates.extend(self.title);
        let title = resolve_title(&candidates)?;
        let price = self
            .price
            .as_ref()
            .and_then(|v| value_number(v, parse_price))
            .filter(|p| *p > 0.0)?;

        Some(ProductListing {
            source: catalog,
            title,
            price: Some(price),
            image: self.image.as_deref().and_then(non_empty),
            link: self.link.as_deref().and_then(|l| normalize_link(catalog, l)),
            rating: self.rating.as_ref().and_then(|v| value_number(v, parse_rating)),
            is_prime: self.is_prime.unwrap_or(false) && catalog == Catalog::Amazon,
        })
    }
}

/// Load listings from JSON: either an array of listing objects or an
/// object with a `listings` array. Prices and ratings may be numbers or
/// display strings.
pub fn load_json_listings(catalog: Catalog, json: &str) -> Result<Vec<ProductListing>, MatchError> {
    let document: RawDocument =
        serde_json::from_str(json).map_err(|e| MatchError::Io(e.to_string()))?;
    let raw = match document {
        RawDocument::List(items) | RawDocument::Wrapped { listings: items } => items,
    };

    let total = raw.len();
    let listings: Vec<ProductListing> = raw
        .into_iter()
        .filter_map(|r| r.into_listing(catalog))
        .collect();

    debug!(%catalog, kept = listings.len(), rejected = total - listings.len(), "loaded json listings");
    Ok(listings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
