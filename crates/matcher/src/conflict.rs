//! Hard-reject rules over two identifier sets.
//!
//! Categorical rules come in two styles:
//! - "clash": both sides tagged in the namespace and no tag shared
//!   (resolution, color, unit, storage, appliance model);
//! - "differ": both sides tagged and the tag sets are not equal
//!   (series, wattage, jar count).
//!
//! The variant rule is stricter than both: the variant sets must be
//! exactly equal, including when only one side carries a variant.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::ConflictConfig;
use crate::identifiers::{IdentifierSet, RESOLUTION_TAGS, VARIANT_TAGS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Conflict {
    Series,
    Resolution,
    ScreenSize,
    Variant,
    Price,
    Color,
    Unit,
    Storage,
    Wattage,
    ApplianceModel,
    JarCount,
}

impl Conflict {
    /// Evaluation order.
    pub const ALL: [Conflict; 11] = [
        Self::Series,
        Self::Resolution,
        Self::ScreenSize,
        Self::Variant,
        Self::Price,
        Self::Color,
        Self::Unit,
        Self::Storage,
        Self::Wattage,
        Self::ApplianceModel,
        Self::JarCount,
    ];
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Series => "series",
            Self::Resolution => "resolution",
            Self::ScreenSize => "screen_size",
            Self::Variant => "variant",
            Self::Price => "price",
            Self::Color => "color",
            Self::Unit => "unit",
            Self::Storage => "storage",
            Self::Wattage => "wattage",
            Self::ApplianceModel => "appliance_model",
            Self::JarCount => "jar_count",
        };
        write!(f, "{name}")
    }
}

/// Both prices of a candidate pair; absent or non-positive prices disable
/// the price rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricePair {
    pub a: Option<f64>,
    pub b: Option<f64>,
}

/// Evaluate one rule.
pub fn violates(
    rule: Conflict,
    a: &IdentifierSet,
    b: &IdentifierSet,
    prices: PricePair,
    config: &ConflictConfig,
) -> bool {
    match rule {
        Conflict::Series => differ(a, b, "series_"),
        Conflict::Resolution => {
            let ra = a.restricted_to(RESOLUTION_TAGS);
            let rb = b.restricted_to(RESOLUTION_TAGS);
            disjoint(&ra, &rb)
        }
        Conflict::ScreenSize => match (a.screen_inches(), b.screen_inches()) {
            (Some(x), Some(y)) => x.abs_diff(y) > config.screen_size_tolerance,
            _ => false,
        },
        Conflict::Variant => a.restricted_to(VARIANT_TAGS) != b.restricted_to(VARIANT_TAGS),
        Conflict::Price => price_conflict(prices, config.max_price_ratio),
        Conflict::Color => clash(a, b, "color_"),
        Conflict::Unit => clash(a, b, "unit_"),
        Conflict::Storage => clash(a, b, "storage_"),
        Conflict::Wattage => differ(a, b, "watt_"),
        Conflict::ApplianceModel => clash(a, b, "appmodel_"),
        Conflict::JarCount => differ(a, b, "jars_"),
    }
}

/// First violated rule in evaluation order, if any.
pub fn first_conflict(
    a: &IdentifierSet,
    b: &IdentifierSet,
    prices: PricePair,
    config: &ConflictConfig,
) -> Option<Conflict> {
    Conflict::ALL
        .into_iter()
        .find(|rule| violates(*rule, a, b, prices, config))
}

/// Every violated rule, in evaluation order.
pub fn all_conflicts(
    a: &IdentifierSet,
    b: &IdentifierSet,
    prices: PricePair,
    config: &ConflictConfig,
) -> Vec<Conflict> {
    Conflict::ALL
        .into_iter()
        .filter(|rule| violates(*rule, a, b, prices, config))
        .collect()
}

fn price_conflict(prices: PricePair, max_ratio: f64) -> bool {
    let positive = |p: Option<f64>| p.filter(|v| v.is_finite() && *v > 0.0);
    match (positive(prices.a), positive(prices.b)) {
        (Some(p1), Some(p2)) => (p1 - p2).abs() / p1.min(p2) > max_ratio,
        _ => false,
    }
}

fn disjoint(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> bool {
    !a.is_empty() && !b.is_empty() && a.is_disjoint(b)
}

fn clash(a: &IdentifierSet, b: &IdentifierSet, prefix: &str) -> bool {
    disjoint(&a.with_prefix(prefix), &b.with_prefix(prefix))
}

fn differ(a: &IdentifierSet, b: &IdentifierSet, prefix: &str) -> bool {
    let ta = a.with_prefix(prefix);
    let tb = b.with_prefix(prefix);
    !ta.is_empty() && !tb.is_empty() && ta != tb
}
