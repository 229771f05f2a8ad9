// Integration tests for the `shopsync` binary.
//
// stdout of `match` must be exactly one JSON envelope; everything human
// goes to stderr.
//
// Run with: cargo test -p shopsync-cli --test cli_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn shopsync() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_shopsync"));
    cmd.env_remove("OPENAI_API_KEY");
    cmd.env_remove("SHOPSYNC_EMBEDDINGS_URL");
    cmd.env_remove("RUST_LOG");
    cmd
}

const AMAZON_CSV: &str = "\
title,price,link,rating,is_prime
Samsung Galaxy S21 128GB Black,\"₹69,999\",/dp/B08S21,4.3 out of 5 stars,true
XYZ TV 43 inch 4K,\"₹30,000\",/dp/B0XYZ43,,false
";

const FLIPKART_JSON: &str = r#"[
  {"title": "Samsung Galaxy S21 128GB Phantom Black", "price": "₹67,999", "link": "/s21/p/itm1", "rating": "4.4"},
  {"title": "Cotton Bath Towel Set of 2", "price": 299, "link": "/towel/p/itm2", "rating": 4.8}
]"#;

const FALLBACK_JSON: &str = r#"{"products": [
  {"id": 1, "title": "Cheap Unmatched Item", "flipkart_price": 99},
  {"id": 2, "title": "Boat Rockerz 450", "amazon_price": 1499, "flipkart_price": 1399}
]}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("amazon.csv"), AMAZON_CSV).unwrap();
        std::fs::write(dir.path().join("flipkart.json"), FLIPKART_JSON).unwrap();
        std::fs::write(dir.path().join("fallback.json"), FALLBACK_JSON).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn arg(&self, name: &str) -> String {
        self.path(name).to_string_lossy().into_owned()
    }

    fn run_match(&self, extra: &[&str]) -> Output {
        shopsync()
            .args(["match", "--amazon", &self.arg("amazon.csv"), "--flipkart", &self.arg("flipkart.json")])
            .args(extra)
            .output()
            .expect("shopsync match")
    }
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\nstdout:\n{stdout}"))
}

fn titles(json: &serde_json::Value) -> Vec<String> {
    json["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

// ===========================================================================
// shopsync match
// ===========================================================================

#[test]
fn match_emits_envelope_with_merged_product_first() {
    let ws = Workspace::new();
    let json = stdout_json(&ws.run_match(&["--query", "galaxy s21"]));

    assert_eq!(json["success"], true);
    assert_eq!(json["query"], "galaxy s21");
    assert_eq!(json["isFallback"], false);
    assert_eq!(json["count"], 3);
    assert!(json["elapsedTime"].as_f64().unwrap() >= 0.0);

    let first = &json["products"][0];
    assert_eq!(first["title"], "Samsung Galaxy S21 128GB Black");
    assert_eq!(first["hasComparison"], true);
    assert_eq!(first["amazonPrice"], 69999.0);
    assert_eq!(first["flipkartPrice"], 67999.0);
    assert_eq!(first["amazonLink"], "https://www.amazon.in/dp/B08S21");
    assert_eq!(first["flipkartLink"], "https://www.flipkart.com/s21/p/itm1");
    assert_eq!(first["id"], 1);
}

#[test]
fn match_sorts_by_price() {
    let ws = Workspace::new();
    let json = stdout_json(&ws.run_match(&["--sort", "price_asc"]));
    assert_eq!(
        titles(&json),
        vec!["Cotton Bath Towel Set of 2", "XYZ TV 43 inch 4K", "Samsung Galaxy S21 128GB Black"]
    );
}

#[test]
fn match_sorts_by_rating() {
    let ws = Workspace::new();
    let json = stdout_json(&ws.run_match(&["--sort", "rating"]));
    // towel 4.8, merged S21 carries the Amazon rating 4.3, TV unrated
    assert_eq!(
        titles(&json),
        vec!["Cotton Bath Towel Set of 2", "Samsung Galaxy S21 128GB Black", "XYZ TV 43 inch 4K"]
    );
}

#[test]
fn match_writes_output_and_report_files() {
    let ws = Workspace::new();
    let output = ws.run_match(&["--output", &ws.arg("out.json"), "--report", &ws.arg("report.json")]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let out: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(ws.path("out.json")).unwrap()).unwrap();
    assert_eq!(out["count"], 3);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(ws.path("report.json")).unwrap()).unwrap();
    assert!(report["run_at"].is_string());
    assert_eq!(report["summary"]["matched"], 1);
    assert_eq!(report["evidence"][0]["a_index"], 0);
    assert_eq!(report["evidence"][0]["b_index"], 0);
}

#[test]
fn match_respects_config() {
    let ws = Workspace::new();
    // nothing can clear these gates
    std::fs::write(
        ws.path("never.toml"),
        "[gates]\nstrong_keys = 3\nstrong_semantic = 1.0\nmoderate_keys = 3\nmoderate_semantic = 1.0\ntrust_model_match = false\nsemantic_only = 1.0\n",
    )
    .unwrap();
    let json = stdout_json(&ws.run_match(&["--config", &ws.arg("never.toml")]));
    assert_eq!(json["count"], 4);
    assert!(json["products"].as_array().unwrap().iter().all(|p| p["hasComparison"] == false));
}

// ===========================================================================
// fallback
// ===========================================================================

#[test]
fn mock_serves_fallback_unsorted() {
    let ws = Workspace::new();
    let output = shopsync()
        .args(["match", "--mock", "--fallback", &ws.arg("fallback.json"), "--sort", "price_asc"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["isFallback"], true);
    assert_eq!(json["count"], 2);
    // engine order (comparison first), not price order
    assert_eq!(titles(&json), vec!["Boat Rockerz 450", "Cheap Unmatched Item"]);
}

fn unreachable_provider_args() -> Vec<&'static str> {
    vec![
        "--provider",
        "openai",
        "--api-key",
        "sk-test",
        "--embeddings-url",
        "http://127.0.0.1:9/v1",
        "--timeout",
        "1",
    ]
}

#[test]
fn provider_failure_falls_back_when_configured() {
    let ws = Workspace::new();
    let fallback = ws.arg("fallback.json");
    let mut args = unreachable_provider_args();
    args.extend(["--fallback", &fallback]);

    let json = stdout_json(&ws.run_match(&args));
    assert_eq!(json["isFallback"], true);
    assert_eq!(json["count"], 2);
}

#[test]
fn provider_failure_without_fallback_exits_6() {
    let ws = Workspace::new();
    let output = ws.run_match(&unreachable_provider_args());
    assert_eq!(output.status.code(), Some(6));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
    assert!(output.stdout.is_empty());
}

#[test]
fn openai_without_key_exits_6() {
    let ws = Workspace::new();
    let output = ws.run_match(&["--provider", "openai"]);
    assert_eq!(output.status.code(), Some(6));
}

// ===========================================================================
// errors
// ===========================================================================

#[test]
fn missing_listing_file_exits_3() {
    let ws = Workspace::new();
    let output = shopsync()
        .args(["match", "--amazon", &ws.arg("nope.csv"), "--flipkart", &ws.arg("flipkart.json")])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn csv_without_price_column_exits_4() {
    let ws = Workspace::new();
    std::fs::write(ws.path("bad.csv"), "title,link\nSomething Long Enough,/dp/x\n").unwrap();
    let output = shopsync()
        .args(["match", "--amazon", &ws.arg("bad.csv"), "--flipkart", &ws.arg("flipkart.json")])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("price"));
}

// ===========================================================================
// validate / explain
// ===========================================================================

fn validate(dir: &Path, body: &str) -> Output {
    let path = dir.join("cfg.toml");
    std::fs::write(&path, body).unwrap();
    shopsync().args(["validate", path.to_str().unwrap()]).output().unwrap()
}

#[test]
fn validate_accepts_empty_and_partial_configs() {
    let ws = Workspace::new();
    assert!(validate(ws.dir.path(), "").status.success());
    let output = validate(ws.dir.path(), "[conflicts]\nmax_price_ratio = 0.5\n");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("valid:"));
}

#[test]
fn validate_rejects_bad_configs_with_exit_5() {
    let ws = Workspace::new();
    assert_eq!(validate(ws.dir.path(), "[gates]\nsemantic_only = 2.0\n").status.code(), Some(5));
    assert_eq!(validate(ws.dir.path(), "[scoring]\nunknown = 1\n").status.code(), Some(5));
}

#[test]
fn explain_json_lists_identifiers() {
    let output = shopsync()
        .args(["explain", "Samsung Galaxy S21 128GB Storage Black", "--json"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    let ids: Vec<_> = json["identifiers"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert!(ids.contains(&"samsung"));
    assert!(ids.contains(&"storage_128gb"));
    assert!(ids.contains(&"color_black"));
    assert_eq!(json["normalized"], "samsung galaxy s21 128gb storage black");
}
