//! Snapshot-driven runner for the short-candidate screener.
//!
//! Data acquisition lives elsewhere; this binary reads a JSON file of
//! [`TickerSnapshot`]s (the documented ingestion shape), runs the decision
//! engine over it, and prints the ranked one-line report.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use short_scan_core::ConfigLoader;
use short_scan_engine::{
    expand_warrant_tickers, summarize_rankings, AnalysisPipeline, TickerSnapshot,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "short-scan", about = "Scores sharply-moved stocks for short attractiveness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a batch of ticker snapshots and print the ranked report.
    Analyze {
        /// Path to a JSON file containing an array of ticker snapshots.
        #[arg(long)]
        snapshot: PathBuf,

        /// Configuration file (defaults to config/Config.toml).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use the LLM catalyst classifier when an API key is configured
        /// (falls back to the heuristic on any failure).
        #[arg(long)]
        llm: bool,

        /// Only print candidates above the report threshold, excluding AVOID.
        #[arg(long)]
        top: bool,

        /// Print batch summary statistics after the report.
        #[arg(long)]
        summary: bool,
    },

    /// Expand a ticker list so each warrant's underlying is included.
    Warrants {
        /// Ticker symbols to check.
        tickers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            snapshot,
            config,
            llm,
            top,
            summary,
        } => run_analyze(&snapshot, config.as_deref(), llm, top, summary).await,
        Command::Warrants { tickers } => {
            for ticker in expand_warrant_tickers(&tickers) {
                println!("{ticker}");
            }
            Ok(())
        }
    }
}

async fn run_analyze(
    path: &Path,
    config_path: Option<&Path>,
    llm: bool,
    top: bool,
    summary: bool,
) -> Result<()> {
    let config = match config_path {
        Some(config_path) => ConfigLoader::load_from(config_path)?,
        None => ConfigLoader::load()?,
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file {}", path.display()))?;
    let snapshots: Vec<TickerSnapshot> =
        serde_json::from_str(&raw).context("snapshot file is not a valid snapshot array")?;

    tracing::info!(count = snapshots.len(), llm, "starting batch analysis");

    let pipeline = if llm {
        AnalysisPipeline::new(config)
    } else {
        AnalysisPipeline::heuristic_only(config)
    };

    let outcome = pipeline.analyze_batch(&snapshots).await;

    if top {
        for candidate in pipeline.ranking().top_candidates(&outcome.candidates, true) {
            println!("{}", candidate.to_output_line());
        }
    } else {
        for line in outcome.report_lines() {
            println!("{line}");
        }
    }

    for skipped in &outcome.skipped {
        tracing::warn!(ticker = %skipped.ticker, reason = %skipped.reason, "ticker skipped");
    }

    if summary {
        let stats = summarize_rankings(&outcome.candidates);
        println!(
            "-- {} analyzed, {} actionable, {} avoid, avg {:.1}, best {:.1}",
            stats.total, stats.actionable, stats.avoid, stats.avg_score, stats.max_score
        );
    }

    Ok(())
}
