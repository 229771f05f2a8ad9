use std::cmp::Ordering;

use shopsync_match::UnifiedProduct;

/// Presentation order applied after matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum SortOrder {
    /// Engine order: price comparisons first.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    /// Highest rating first; unrated counts as 0.
    Rating,
}

/// Lowest present price; a record without prices sorts as infinitely
/// expensive.
fn price_key(p: &UnifiedProduct) -> f64 {
    p.min_price().unwrap_or(f64::INFINITY)
}

fn rating_key(p: &UnifiedProduct) -> f64 {
    p.rating.unwrap_or(0.0)
}

/// Stable sort in place. Ids are left as the engine assigned them.
pub fn apply_sort(products: &mut [UnifiedProduct], order: SortOrder) {
    let descending = |x: f64, y: f64| -> Ordering { y.total_cmp(&x) };
    match order {
        SortOrder::Relevance => {}
        SortOrder::PriceAsc => products.sort_by(|a, b| price_key(a).total_cmp(&price_key(b))),
        SortOrder::PriceDesc => products.sort_by(|a, b| descending(price_key(a), price_key(b))),
        SortOrder::Rating => products.sort_by(|a, b| descending(rating_key(a), rating_key(b))),
    }
}
