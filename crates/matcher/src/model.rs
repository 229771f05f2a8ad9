use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

/// The two source catalogs. A = Amazon (anchor side), B = Flipkart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Catalog {
    Amazon,
    Flipkart,
}

impl Catalog {
    /// Origin used to absolutize relative product links.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Amazon => "https://www.amazon.in",
            Self::Flipkart => "https://www.flipkart.com",
        }
    }
}

impl std::fmt::Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amazon => write!(f, "amazon"),
            Self::Flipkart => write!(f, "flipkart"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One scraped record from a single catalog. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub source: Catalog,
    pub title: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Only meaningful for Amazon listings.
    #[serde(default)]
    pub is_prime: bool,
}

impl ProductListing {
    pub fn new(source: Catalog, title: impl Into<String>) -> Self {
        Self {
            source,
            title: title.into(),
            price: None,
            image: None,
            link: None,
            rating: None,
            is_prime: false,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_prime(mut self, is_prime: bool) -> Self {
        self.is_prime = is_prime;
        self
    }

    /// Price if present and positive. Zero or negative counts as absent.
    pub fn effective_price(&self) -> Option<f64> {
        self.price.filter(|p| p.is_finite() && *p > 0.0)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One merged record of the unified catalog.
///
/// `hasComparison` is derived from the two price fields at serialization
/// time and never stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedProduct {
    pub id: usize,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, alias = "is_prime")]
    pub is_prime: bool,
    #[serde(default, alias = "amazon_price")]
    pub amazon_price: Option<f64>,
    #[serde(default, alias = "amazon_link")]
    pub amazon_link: Option<String>,
    #[serde(default, alias = "flipkart_price")]
    pub flipkart_price: Option<f64>,
    #[serde(default, alias = "flipkart_link")]
    pub flipkart_link: Option<String>,
}

impl UnifiedProduct {
    /// True iff both catalog prices are present.
    pub fn has_comparison(&self) -> bool {
        self.amazon_price.is_some() && self.flipkart_price.is_some()
    }

    /// Lowest price across both catalogs.
    pub fn min_price(&self) -> Option<f64> {
        match (self.amazon_price, self.flipkart_price) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnifiedProductWire<'a> {
    id: usize,
    title: &'a str,
    image: Option<&'a str>,
    rating: Option<f64>,
    is_prime: bool,
    amazon_price: Option<f64>,
    amazon_link: Option<&'a str>,
    flipkart_price: Option<f64>,
    flipkart_link: Option<&'a str>,
    has_comparison: bool,
}

impl Serialize for UnifiedProduct {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        UnifiedProductWire {
            id: self.id,
            title: &self.title,
            image: self.image.as_deref(),
            rating: self.rating,
            is_prime: self.is_prime,
            amazon_price: self.amazon_price,
            amazon_link: self.amazon_link.as_deref(),
            flipkart_price: self.flipkart_price,
            flipkart_link: self.flipkart_link.as_deref(),
            has_comparison: self.has_comparison(),
        }
        .serialize(serializer)
    }
}
