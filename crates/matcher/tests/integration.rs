use std::path::PathBuf;

use shopsync_match::conflict::{violates, Conflict, PricePair};
use shopsync_match::config::ConflictConfig;
use shopsync_match::engine::{run_with_similarity, MatchReport};
use shopsync_match::listing::{load_csv_listings, load_json_listings};
use shopsync_match::score::Gate;
use shopsync_match::{
    extract_identifiers, match_with_similarity, Catalog, MatchConfig, ProductListing, SimilarityMatrix,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load_fixtures() -> (Vec<ProductListing>, Vec<ProductListing>) {
    let a = load_csv_listings(Catalog::Amazon, &read_fixture("amazon.csv")).unwrap();
    let b = load_json_listings(Catalog::Flipkart, &read_fixture("flipkart.json")).unwrap();
    (a, b)
}

/// A: S21, XYZ 43", Sony XM4, bottle. B: XYZ 55", Sony XM4, S21, towel.
fn fixture_similarity() -> SimilarityMatrix {
    SimilarityMatrix::from_rows(vec![
        vec![0.3, 0.1, 0.9, 0.1],
        vec![0.9, 0.1, 0.2, 0.1],
        vec![0.1, 0.4, 0.1, 0.1],
        vec![0.1, 0.1, 0.1, 0.2],
    ])
    .unwrap()
}

fn load_and_run(config: &MatchConfig) -> MatchReport {
    let (a, b) = load_fixtures();
    run_with_similarity(config, &a, &b, &fixture_similarity()).unwrap()
}

fn amazon(title: &str, price: f64) -> ProductListing {
    ProductListing::new(Catalog::Amazon, title).with_price(price)
}

fn flipkart(title: &str, price: f64) -> ProductListing {
    ProductListing::new(Catalog::Flipkart, title).with_price(price)
}

fn single(semantic: f64) -> SimilarityMatrix {
    SimilarityMatrix::uniform(1, 1, semantic)
}

// -------------------------------------------------------------------------
// Fixture runs
// -------------------------------------------------------------------------

#[test]
fn fixtures_load_and_clean() {
    let (a, b) = load_fixtures();
    assert_eq!(a.len(), 4, "row without a price is dropped");
    assert_eq!(b.len(), 4, "short title is dropped");

    assert_eq!(a[0].title, "Samsung Galaxy S21 128GB Black");
    assert_eq!(a[0].price, Some(69999.0));
    assert_eq!(a[0].rating, Some(4.3));
    assert_eq!(a[0].link.as_deref(), Some("https://www.amazon.in/dp/B08S21BLK"));
    assert!(a[0].is_prime);
    assert_eq!(a[3].link.as_deref(), Some("https://www.amazon.in/dp/B0BOTTLE"));

    assert_eq!(b[1].title, "SONY WH-1000XM4 Bluetooth Headset");
    assert_eq!(b[0].price, Some(31000.0));
    assert_eq!(b[0].link.as_deref(), Some("https://www.flipkart.com/xyz-tv-55/p/itm55"));
    assert!(!b[2].is_prime, "prime is an Amazon-only flag");
}

#[test]
fn fixtures_default_config() {
    let result = load_and_run(&MatchConfig::default());

    assert_eq!(result.summary.total, 6);
    assert_eq!(result.summary.matched, 2);
    assert_eq!(result.summary.a_only, 2);
    assert_eq!(result.summary.b_only, 2);

    let titles: Vec<_> = result.products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Samsung Galaxy S21 128GB Black",
            "Sony WH-1000XM4 Wireless Headphones",
            "XYZ TV 43 inch 4K",
            "Steel Water Bottle",
            "XYZ TV 55 inch 4K",
            "Cotton Bath Towel",
        ]
    );
    let ids: Vec<_> = result.products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

    let s21 = &result.products[0];
    assert_eq!(s21.amazon_price, Some(69999.0));
    assert_eq!(s21.flipkart_price, Some(67999.0));
    assert_eq!(
        s21.flipkart_link.as_deref(),
        Some("https://www.flipkart.com/samsung-galaxy-s21/p/itms21")
    );
    assert!(s21.is_prime);

    let gates: Vec<_> = result.evidence.iter().map(|e| (e.a_index, e.b_index, e.gate)).collect();
    assert_eq!(gates, vec![(0, 2, Gate::StrongKeys), (2, 1, Gate::ModelNumber)]);
}

#[test]
fn fixtures_strict_config() {
    let config = MatchConfig::from_toml(&read_fixture("strict.match.toml")).unwrap();
    let result = load_and_run(&config);

    // model-number trust is off and 0.4 is far below the semantic floor
    assert_eq!(result.summary.matched, 1);
    assert_eq!(result.summary.total, 7);
    assert_eq!(result.products[0].title, "Samsung Galaxy S21 128GB Black");
}

#[test]
fn output_serializes_with_contract_names() {
    let result = load_and_run(&MatchConfig::default());
    let json = serde_json::to_value(&result.products).unwrap();
    let first = &json[0];
    assert_eq!(first["id"], 1);
    assert_eq!(first["amazonPrice"], 69999.0);
    assert_eq!(first["flipkartPrice"], 67999.0);
    assert_eq!(first["hasComparison"], true);
    assert_eq!(first["isPrime"], true);
    assert_eq!(json[5]["amazonPrice"], serde_json::Value::Null);
    assert_eq!(json[5]["hasComparison"], false);
}

#[test]
fn runs_are_deterministic() {
    let first = load_and_run(&MatchConfig::default());
    let second = load_and_run(&MatchConfig::default());
    assert_eq!(first.products, second.products);
    assert_eq!(first.evidence, second.evidence);
}

// -------------------------------------------------------------------------
// End-to-end scenarios
// -------------------------------------------------------------------------

#[test]
fn same_phone_across_catalogs_merges() {
    let a = vec![amazon("Samsung Galaxy S21 128GB Black", 699.0)];
    let b = vec![flipkart("Samsung Galaxy S21 128GB Phantom Black", 679.0)];

    let products = match_with_similarity(&a, &b, &single(0.9)).unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].amazon_price, Some(699.0));
    assert_eq!(products[0].flipkart_price, Some(679.0));
    assert!(products[0].has_comparison());
}

#[test]
fn different_screen_sizes_stay_apart() {
    let a = vec![amazon("XYZ TV 43 inch 4K", 300.0)];
    let b = vec![flipkart("XYZ TV 55 inch 4K", 310.0)];

    let products = match_with_similarity(&a, &b, &single(0.9)).unwrap();
    assert_eq!(products.len(), 2);
    assert!(products.iter().all(|p| !p.has_comparison()));
    assert_eq!(products[0].amazon_price, Some(300.0));
    assert_eq!(products[0].flipkart_price, None);
    assert_eq!(products[1].amazon_price, None);
    assert_eq!(products[1].flipkart_price, Some(310.0));
}

#[test]
fn all_key_signals_at_full_similarity_always_match() {
    let a = vec![amazon("boAt Rockerz 450 64GB Storage Blue", 1499.0)];
    let b = vec![flipkart("boAt Rockerz 450 Storage 64GB Blue", 1399.0)];
    let products = match_with_similarity(&a, &b, &single(1.0)).unwrap();
    assert_eq!(products.len(), 1);
}

#[test]
fn different_explicit_storage_never_matches() {
    let a = vec![amazon("Redmi Note 13 Storage 128GB Black", 15999.0)];
    let b = vec![flipkart("Redmi Note 13 Storage 256GB Black", 16999.0)];

    for semantic in [0.5, 0.9, 1.0] {
        let products = match_with_similarity(&a, &b, &single(semantic)).unwrap();
        assert_eq!(products.len(), 2, "semantic {semantic}");
    }
}

#[test]
fn screen_size_tolerance_is_one_inch() {
    let config = ConflictConfig::default();
    let none = PricePair { a: None, b: None };
    let ids_32 = extract_identifiers("Vu 32 inch HD Ready LED TV");
    let ids_33 = extract_identifiers("Vu 33 inch HD Ready LED TV");
    let ids_43 = extract_identifiers("Vu 43 inch HD Ready LED TV");

    assert!(!violates(Conflict::ScreenSize, &ids_32, &ids_33, none, &config));
    assert!(violates(Conflict::ScreenSize, &ids_32, &ids_43, none, &config));
}

#[test]
fn missing_price_never_rejects_by_itself() {
    let a = vec![ProductListing::new(Catalog::Amazon, "Steel Water Bottle")];
    let b = vec![flipkart("Steel Water Bottle", 10_000.0)];
    let products = match_with_similarity(&a, &b, &single(0.9)).unwrap();
    assert_eq!(products.len(), 1);
    // only one price present, so it is not a comparison
    assert!(!products[0].has_comparison());
}

#[test]
fn earlier_anchor_claims_contested_listing() {
    let a = vec![
        amazon("Steel Water Bottle", 500.0),
        amazon("Steel Water Bottle", 510.0),
    ];
    let b = vec![flipkart("Steel Water Bottle", 505.0)];
    let sim = SimilarityMatrix::from_rows(vec![vec![0.8], vec![0.99]]).unwrap();

    let products = match_with_similarity(&a, &b, &sim).unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].amazon_price, Some(500.0));
    assert_eq!(products[0].flipkart_price, Some(505.0));
    assert_eq!(products[1].flipkart_price, None);
}
