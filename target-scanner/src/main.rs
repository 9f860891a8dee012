//! Target Scanner - heuristic target prices over real-time quote snapshots.
//!
//! Fetches a snapshot per market segment and prints a target-price report
//! for every listing.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use target_common::logging::init_logging;
use target_common::Config;
use target_scanner::report::{RowValuation, ValuationReport};
use target_scanner::{
    EastmoneyAdapter, IndustryMetrics, MarketSegment, OutputFormat, ScanOptions, Scanner,
    ValuationEstimator,
};

/// Heuristic target-price scanner for A-share and HK listings.
#[derive(Parser, Debug)]
#[command(name = "target-scanner")]
#[command(version)]
#[command(about = "Heuristic target prices over real-time quote snapshots", long_about = None)]
struct Cli {
    /// Config file (default: ~/.target-scanner/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Value every listing of one or more segments
    Scan {
        /// Segment to scan (sh, sz, bj, hk); repeatable
        #[arg(short, long = "segment")]
        segments: Vec<MarketSegment>,

        /// Maximum rows per segment
        #[arg(long)]
        limit: Option<usize>,

        /// Emit one JSON object per listing
        #[arg(long)]
        json: bool,
    },

    /// Value a single listing
    Quote {
        /// Listing code, e.g. 430047 or 03690
        code: String,

        /// Segment the listing trades in
        #[arg(short, long)]
        segment: Option<MarketSegment>,

        /// Emit JSON instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// Value a literal price without fetching quotes
    Estimate {
        /// Current price
        #[arg(allow_negative_numbers = true)]
        price: f64,

        /// Emit JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load_with_env(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    config.validate().context("Invalid configuration")?;

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Target Scanner v{}", env!("CARGO_PKG_VERSION"));

    let estimator = ValuationEstimator::new(IndustryMetrics::from(config.valuation));
    let default_segments = configured_segments(&config)?;
    let mut out = std::io::stdout();

    tracing::debug!(
        duration_ms = startup_start.elapsed().as_millis() as u64,
        "Initialized"
    );

    match cli.command {
        Commands::Estimate { price, json } => {
            let result = match estimator.estimate(price) {
                Ok(result) => result,
                Err(e) => bail!("Target price calculation failed: {}", e),
            };
            if json {
                let line = RowValuation {
                    code: None,
                    name: None,
                    segment: None,
                    result: &result,
                }
                .to_json_line();
                println!("{}", line);
            } else {
                let currency = config.scan.currency_prefix.as_deref().unwrap_or("¥");
                print!("{}", ValuationReport::new(&result, currency).to_text());
            }
            Ok(())
        }

        Commands::Quote {
            code,
            segment,
            json,
        } => {
            let segment = segment.unwrap_or(default_segments[0]);
            let scanner = build_scanner(&config, estimator, json, None)?;
            match scanner.evaluate_code(&mut out, segment, &code).await? {
                Some(_) => Ok(()),
                None => bail!("Target price calculation failed for {}", code),
            }
        }

        Commands::Scan {
            segments,
            limit,
            json,
        } => {
            let segments = if segments.is_empty() {
                default_segments
            } else {
                segments
            };
            let scanner = build_scanner(&config, estimator, json, limit)?;
            let outcomes = scanner.scan(&mut out, &segments).await;

            if outcomes.iter().all(|(_, outcome)| outcome.is_err()) {
                bail!("Every requested segment failed to fetch");
            }
            Ok(())
        }
    }
}

fn build_scanner(
    config: &Config,
    estimator: ValuationEstimator,
    json: bool,
    limit: Option<usize>,
) -> Result<Scanner<EastmoneyAdapter>> {
    let options = ScanOptions {
        format: if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        limit,
        currency_prefix: config.scan.currency_prefix.clone(),
    };
    let adapter = EastmoneyAdapter::from_config(&config.provider)
        .context("Failed to build quote provider client")?;
    Ok(Scanner::new(adapter, estimator, options))
}

/// Segments from `scan.segments`; validation has already rejected unknown names.
fn configured_segments(config: &Config) -> Result<Vec<MarketSegment>> {
    let segments = config
        .scan
        .segments
        .iter()
        .map(|s| s.parse::<MarketSegment>())
        .collect::<std::result::Result<Vec<_>, String>>()
        .map_err(anyhow::Error::msg)
        .context("Invalid scan.segments")?;

    if segments.is_empty() {
        bail!("scan.segments must name at least one segment");
    }
    Ok(segments)
}
