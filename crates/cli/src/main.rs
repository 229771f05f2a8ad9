// ShopSync CLI - match two catalog exports into one price-comparable list

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shopsync_cli::exit_codes::EXIT_SUCCESS;
use shopsync_cli::providers::{
    HashingEmbedder, OpenAiEmbedder, ProviderKind, DEFAULT_HASHING_DIM, DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL,
};
use shopsync_cli::response::{load_fallback, SearchResponse};
use shopsync_cli::sort::{apply_sort, SortOrder};
use shopsync_cli::CliError;
use shopsync_match::listing::{load_csv_listings, load_json_listings};
use shopsync_match::normalize::normalize_title;
use shopsync_match::{
    extract_identifiers, Catalog, EmbeddingError, EmbeddingProvider, MatchConfig, MatchError, MatchReport, Matcher,
    ProductListing,
};

#[derive(Parser)]
#[command(name = "shopsync")]
#[command(about = "Match Amazon and Flipkart listings into one price-comparable catalog")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match two listing files and print the unified catalog as JSON
    #[command(after_help = "\
Examples:
  shopsync match --amazon amazon.csv --flipkart flipkart.json --query 'galaxy s21'
  shopsync match --amazon a.csv --flipkart b.csv --sort price_asc --output result.json
  shopsync match --amazon a.csv --flipkart b.csv --provider openai --fallback fallback.json
  shopsync match --fallback fallback.json --mock")]
    Match {
        /// Amazon listings (.csv or .json)
        #[arg(long, required_unless_present = "mock")]
        amazon: Option<PathBuf>,

        /// Flipkart listings (.csv or .json)
        #[arg(long, required_unless_present = "mock")]
        flipkart: Option<PathBuf>,

        /// Search query echoed in the response
        #[arg(long, default_value = "")]
        query: String,

        /// Matcher config (.toml); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Embedding provider
        #[arg(long, value_enum, default_value_t = ProviderKind::Hashing)]
        provider: ProviderKind,

        /// Vector size (hashing) or requested dimensions (openai)
        #[arg(long)]
        dimensions: Option<usize>,

        /// Base URL of an OpenAI-compatible API
        #[arg(long, env = "SHOPSYNC_EMBEDDINGS_URL", default_value = DEFAULT_OPENAI_URL)]
        embeddings_url: String,

        /// Embedding model name
        #[arg(long, env = "SHOPSYNC_EMBEDDINGS_MODEL", default_value = DEFAULT_OPENAI_MODEL)]
        embeddings_model: String,

        /// API key for the openai provider
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Request timeout for remote providers, in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,

        /// Presentation order (not applied to fallback data)
        #[arg(long, value_enum, default_value_t = SortOrder::Relevance)]
        sort: SortOrder,

        /// Fallback catalog ({"products": [...]}) served when matching fails or finds nothing
        #[arg(long)]
        fallback: Option<PathBuf>,

        /// Serve the fallback catalog without matching
        #[arg(long, requires = "fallback")]
        mock: bool,

        /// Write the response JSON to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the match report (summary + per-match evidence) to a file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Validate a matcher config without running
    #[command(after_help = "\
Examples:
  shopsync validate strict.match.toml")]
    Validate {
        /// Path to the .toml config file
        config: PathBuf,
    },

    /// Show the identifiers and normalized form extracted from one title
    #[command(after_help = "\
Examples:
  shopsync explain 'Samsung Galaxy S21 Ultra 5G (Phantom Black, 12GB RAM, 256GB Storage)'
  shopsync explain 'Prestige Iris 750 Watt Mixer Grinder with 3 Jars' --json")]
    Explain {
        /// Product title
        title: String,

        /// Output JSON instead of one tag per line
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("SHOPSYNC_GIT_HASH"), ")",
        "\nengine:  shopsync-match ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("SHOPSYNC_TARGET"),
    )
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Match {
            amazon,
            flipkart,
            query,
            config,
            provider,
            dimensions,
            embeddings_url,
            embeddings_model,
            api_key,
            timeout,
            sort,
            fallback,
            mock,
            output,
            report,
        } => cmd_match(MatchArgs {
            amazon,
            flipkart,
            query,
            config,
            provider: ProviderArgs {
                kind: provider,
                dimensions,
                url: embeddings_url,
                model: embeddings_model,
                api_key,
                timeout: Duration::from_secs(timeout),
            },
            sort,
            fallback,
            mock,
            output,
            report,
        }),
        Commands::Validate { config } => cmd_validate(config),
        Commands::Explain { title, json } => cmd_explain(title, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// match
// ============================================================================

struct ProviderArgs {
    kind: ProviderKind,
    dimensions: Option<usize>,
    url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

struct MatchArgs {
    amazon: Option<PathBuf>,
    flipkart: Option<PathBuf>,
    query: String,
    config: Option<PathBuf>,
    provider: ProviderArgs,
    sort: SortOrder,
    fallback: Option<PathBuf>,
    mock: bool,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
}

fn build_provider(args: &ProviderArgs) -> Result<Box<dyn EmbeddingProvider>, EmbeddingError> {
    match args.kind {
        ProviderKind::Hashing => Ok(Box::new(HashingEmbedder::new(args.dimensions.unwrap_or(DEFAULT_HASHING_DIM)))),
        ProviderKind::Openai => {
            let key = args
                .api_key
                .as_deref()
                .ok_or_else(|| EmbeddingError::Unavailable("missing API key (use --api-key or set OPENAI_API_KEY)".into()))?;
            let embedder = OpenAiEmbedder::new(key, &args.url, &args.model, args.dimensions, args.timeout)?;
            Ok(Box::new(embedder))
        }
    }
}

fn read_file(path: &Path, what: &str) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::io(format!("cannot read {what} {}: {e}", path.display())))
}

fn load_config(path: Option<&Path>) -> Result<MatchConfig, CliError> {
    match path {
        Some(path) => Ok(MatchConfig::from_toml(&read_file(path, "config")?)?),
        None => Ok(MatchConfig::default()),
    }
}

/// `.json` files are listing arrays (or `{"listings": [...]}`); anything
/// else is read as CSV.
fn load_listings(catalog: Catalog, path: &Path) -> Result<Vec<ProductListing>, CliError> {
    let data = read_file(path, &format!("{catalog} listings"))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let listings = if is_json {
        load_json_listings(catalog, &data)
    } else {
        load_csv_listings(catalog, &data)
    };
    listings.map_err(|e| CliError::from(e).with_hint(format!("while loading {}", path.display())))
}

fn run_matcher(
    provider: &ProviderArgs,
    config: MatchConfig,
    a: &[ProductListing],
    b: &[ProductListing],
) -> Result<MatchReport, MatchError> {
    let matcher = Matcher::with_config(build_provider(provider)?, config);
    matcher.warm_up()?;
    matcher.run(a, b)
}

#[derive(Serialize)]
struct ReportFile<'a> {
    run_at: String,
    query: &'a str,
    #[serde(flatten)]
    report: &'a MatchReport,
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    std::fs::write(path, json).map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_match(args: MatchArgs) -> Result<(), CliError> {
    let start = Instant::now();

    let (mut products, is_fallback) = if args.mock {
        let path = args.fallback.as_deref().ok_or_else(|| CliError::args("--mock requires --fallback"))?;
        (load_fallback(path), true)
    } else {
        let (Some(amazon), Some(flipkart)) = (args.amazon.as_deref(), args.flipkart.as_deref()) else {
            return Err(CliError::args("--amazon and --flipkart are required").with_hint("or serve fallback data with --mock"));
        };
        let config = load_config(args.config.as_deref())?;
        let a = load_listings(Catalog::Amazon, amazon)?;
        let b = load_listings(Catalog::Flipkart, flipkart)?;
        info!(amazon = a.len(), flipkart = b.len(), "listings loaded");

        match run_matcher(&args.provider, config, &a, &b) {
            Ok(report) if !report.products.is_empty() => {
                if let Some(path) = &args.report {
                    let file = ReportFile {
                        run_at: chrono::Utc::now().to_rfc3339(),
                        query: &args.query,
                        report: &report,
                    };
                    write_json(path, &file)?;
                }
                eprintln!(
                    "{} products: {} compared, {} amazon only, {} flipkart only",
                    report.summary.total, report.summary.matched, report.summary.a_only, report.summary.b_only,
                );
                (report.products, false)
            }
            Ok(_) => match args.fallback.as_deref() {
                Some(path) => {
                    warn!("no products matched, serving fallback data");
                    (load_fallback(path), true)
                }
                None => (Vec::new(), false),
            },
            Err(e) => match args.fallback.as_deref() {
                Some(path) => {
                    warn!(error = %e, "matching failed, serving fallback data");
                    (load_fallback(path), true)
                }
                None => return Err(e.into()),
            },
        }
    };

    if !is_fallback {
        apply_sort(&mut products, args.sort);
    }

    let response = SearchResponse::new(args.query, products, is_fallback, start.elapsed());
    info!(count = response.count, is_fallback, elapsed = response.elapsed_time, "response ready");

    match &args.output {
        Some(path) => write_json(path, &response),
        None => {
            let json = serde_json::to_string_pretty(&response)
                .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
            println!("{json}");
            Ok(())
        }
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = MatchConfig::from_toml(&read_file(&config_path, "config")?)?;
    let g = &config.gates;
    eprintln!(
        "valid: gates {}/{} keys, semantic floor {}, model match {}; price ratio {}, screen tolerance {}\"",
        g.strong_keys,
        g.moderate_keys,
        g.semantic_only,
        if g.trust_model_match { "trusted" } else { "ignored" },
        config.conflicts.max_price_ratio,
        config.conflicts.screen_size_tolerance,
    );
    Ok(())
}

// ============================================================================
// explain
// ============================================================================

#[derive(Serialize)]
struct Explanation<'a> {
    title: &'a str,
    normalized: String,
    identifiers: shopsync_match::IdentifierSet,
}

fn cmd_explain(title: String, json: bool) -> Result<(), CliError> {
    let explanation = Explanation {
        title: &title,
        normalized: normalize_title(&title),
        identifiers: extract_identifiers(&title),
    };

    if json {
        let out = serde_json::to_string_pretty(&explanation)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{out}");
    } else {
        println!("normalized: {}", explanation.normalized);
        for tag in explanation.identifiers.iter() {
            println!("{tag}");
        }
    }
    Ok(())
}
