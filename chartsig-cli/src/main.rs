//! chartsig CLI: analyze saved chart history and manage the report cache.
//!
//! Commands:
//! - `analyze`: run the indicator pipeline over chart JSON or CSV files
//! - `cache status`: list cached reports with their bar counts and age
//! - `cache clean`: remove every cached report

use anyhow::{bail, Context, Result};
use chartsig_core::data::{parse_chart_json, read_csv, ReportCache};
use chartsig_core::domain::PriceSeries;
use chartsig_core::{analyze, AnalysisConfig, ChartAnalysis};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chartsig",
    about = "chartsig: MACD, moving-average and stochastic buy/sell signals from chart history"
)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more chart-history files (Yahoo chart JSON or CSV).
    Analyze {
        /// Input files. `.json` is read as a chart response, `.csv` as
        /// `timestamp,open,high,low,close,volume[,adj_close]`.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Symbol to label a single input with. Defaults to the chart meta
        /// symbol, then the file name.
        #[arg(long)]
        symbol: Option<String>,

        /// Path to a TOML analysis config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Report cache directory.
        #[arg(long, default_value = "charts")]
        cache_dir: PathBuf,

        /// Recompute even when a cached report matches the config.
        #[arg(long, default_value_t = false)]
        no_cache: bool,

        /// Print the full analysis (overlays, markers, events) as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Report cache management.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached reports.
    Status {
        /// Report cache directory.
        #[arg(long, default_value = "charts")]
        cache_dir: PathBuf,
    },
    /// Remove every cached report.
    Clean {
        /// Report cache directory.
        #[arg(long, default_value = "charts")]
        cache_dir: PathBuf,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            inputs,
            symbol,
            config,
            cache_dir,
            no_cache,
            json,
        } => run_analyze(&inputs, symbol, config.as_deref(), &cache_dir, no_cache, json),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
            CacheAction::Clean { cache_dir, confirm } => run_cache_clean(&cache_dir, confirm),
        },
    }
}

/// Logs go to stderr so stdout carries only reports.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// What one input produced.
enum Outcome {
    Cached { symbol: String, report: String },
    Fresh(Box<ChartAnalysis>),
}

fn run_analyze(
    inputs: &[PathBuf],
    symbol: Option<String>,
    config_path: Option<&Path>,
    cache_dir: &Path,
    no_cache: bool,
    json: bool,
) -> Result<()> {
    if symbol.is_some() && inputs.len() > 1 {
        bail!("--symbol labels a single input; got {} inputs", inputs.len());
    }

    let config = match config_path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    let fingerprint = config.fingerprint();
    let cache = ReportCache::new(cache_dir);
    // A JSON dump needs the full analysis, which the cache does not hold.
    let use_cache = !no_cache && !json;

    let results: Vec<(PathBuf, Result<Outcome>)> = inputs
        .par_iter()
        .map(|path| {
            let outcome = analyze_one(
                path,
                symbol.as_deref(),
                &config,
                &fingerprint,
                &cache,
                use_cache,
            );
            (path.clone(), outcome)
        })
        .collect();

    let mut failed = 0usize;
    let mut analyses = Vec::new();
    for (path, result) in results {
        match result {
            Ok(Outcome::Fresh(analysis)) if json => analyses.push(*analysis),
            Ok(Outcome::Fresh(analysis)) => print_report(&analysis.symbol, &analysis.report),
            Ok(Outcome::Cached { symbol, report }) => print_report(&symbol, &report),
            Err(e) => {
                eprintln!("Error for {}: {e:#}", path.display());
                failed += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&analyses)?);
    }

    info!(
        inputs = inputs.len(),
        succeeded = inputs.len() - failed,
        failed,
        "analyze complete"
    );
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn analyze_one(
    path: &Path,
    symbol: Option<&str>,
    config: &AnalysisConfig,
    fingerprint: &str,
    cache: &ReportCache,
    use_cache: bool,
) -> Result<Outcome> {
    let series = load_series(path, symbol)?;

    if use_cache {
        // A hit needs the same config and the exact same bars.
        if let Some(report) = cache.load(&series, fingerprint)? {
            debug!(symbol = series.symbol(), "cache hit");
            return Ok(Outcome::Cached {
                symbol: series.symbol().to_string(),
                report,
            });
        }
    }

    let analysis = analyze(&series, config)
        .with_context(|| format!("analyzing {}", series.symbol()))?;

    if use_cache {
        cache
            .store(&series, &analysis.report, fingerprint)
            .with_context(|| format!("caching report for {}", series.symbol()))?;
    }
    Ok(Outcome::Fresh(Box::new(analysis)))
}

/// Read a chart-history file, picking the parser from its extension.
fn load_series(path: &Path, symbol: Option<&str>) -> Result<PriceSeries> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("json") => {
            let body =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            // Parse once under a placeholder to learn the meta symbol, then relabel.
            let fallback = symbol.map(str::to_string).unwrap_or_else(|| file_symbol(path));
            let (series, meta) = parse_chart_json(&fallback, &body)
                .with_context(|| format!("parsing {}", path.display()))?;
            match (symbol, meta.symbol) {
                (None, Some(meta_symbol)) if meta_symbol != series.symbol() => {
                    Ok(PriceSeries::new(meta_symbol, series.bars().to_vec())?)
                }
                _ => Ok(series),
            }
        }
        Some("csv") => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let label = symbol.map(str::to_string).unwrap_or_else(|| file_symbol(path));
            read_csv(&label, file).with_context(|| format!("importing {}", path.display()))
        }
        _ => bail!(
            "unsupported input {}: expected a .json chart response or a .csv export",
            path.display()
        ),
    }
}

/// Upper-cased file stem, e.g. `data/aapl.csv` → `AAPL`.
fn file_symbol(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

fn print_report(symbol: &str, report: &str) {
    println!("=== {symbol} ===");
    if report.is_empty() {
        println!("(no confirmed signals)");
    } else {
        print!("{report}");
    }
    println!();
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = ReportCache::new(cache_dir);
    let metas = cache.status()?;
    if metas.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    println!("Cache: {}", cache_dir.display());
    println!("Reports: {}", metas.len());
    println!();
    println!("{:<8} {:>6} {:<20} {:<12}", "Symbol", "Bars", "Created", "Config");
    println!("{}", "-".repeat(50));
    for meta in &metas {
        println!(
            "{:<8} {:>6} {:<20} {:<12}",
            meta.symbol,
            meta.bar_count,
            meta.created_at.format("%Y-%m-%d %H:%M"),
            &meta.fingerprint[..meta.fingerprint.len().min(12)]
        );
    }

    Ok(())
}

fn run_cache_clean(cache_dir: &Path, confirm: bool) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = ReportCache::new(cache_dir);
    let metas = cache.status()?;

    if !confirm {
        println!("Found {} cached report(s):", metas.len());
        for meta in &metas {
            println!("  {}", meta.symbol);
        }
        println!();
        println!("Dry run: pass --confirm to actually delete.");
        return Ok(());
    }

    let removed = cache.clean()?;
    println!("Done. Removed {removed} report(s).");
    Ok(())
}
