//! evaldiv - evaluate diversification strategies on an aspect-judged dataset.
//!
//! # Usage
//!
//! ```bash
//! # Evaluate BM25 and MMR at the default lambdas
//! cargo run -p evaldiv-eval --release -- --data-dir data
//!
//! # Top 20, candidates restricted to judged-relevant documents
//! cargo run -p evaldiv-eval --release -- -n 20 --pool relevant-only
//!
//! # Custom MMR sweep, progress bar instead of traces, JSON summary
//! cargo run -p evaldiv-eval --release -- --lambdas 0.3,0.6,0.9 --quiet --json
//! ```
//!
//! The per-rank averages are always written to `--output` as tab-separated
//! rows: `index \t usl@1 .. usl@n \t wsl@1 .. wsl@n`.

mod output;
mod progress;

use anyhow::{Context, Result};
use clap::Parser;
use evaldiv_core::config::{DEFAULT_NUM_RESULTS, DEFAULT_OUTPUT_PATH};
use evaldiv_core::dataset::load_dataset;
use evaldiv_core::loss::{SubtopicRecall, UnweightedSubtopicLoss, WeightedSubtopicLoss};
use evaldiv_core::selector::{Bm25Selector, MmrSelector};
use evaldiv_core::{
    AspectLoss, DocumentPoolMode, Evaluator, ResultListSelector, RunConfig, SelectorError,
};
use progress::ProgressObserver;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LAMBDAS: &[f64] = &[0.0, 0.25, 0.5, 0.75, 1.0];

/// Evaluate search-result diversification strategies.
///
/// Runs BM25 and one MMR re-ranker per lambda over every query, scores each
/// result list with subtopic recall and subtopic loss, and writes the mean
/// loss curves per strategy.
#[derive(Parser, Debug)]
#[command(name = "evaldiv", version, about)]
struct Cli {
    /// Directory holding corpus.jsonl, queries.jsonl and aspects.tsv
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Result-list length (rank positions per curve)
    #[arg(short = 'n', long, default_value_t = DEFAULT_NUM_RESULTS)]
    num_results: usize,

    /// Report file (tab-separated)
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Candidate documents offered per query: all | relevant-only
    #[arg(long, default_value_t = DocumentPoolMode::All)]
    pool: DocumentPoolMode,

    /// MMR lambda values (comma-separated)
    #[arg(long, value_delimiter = ',')]
    lambdas: Option<Vec<f64>>,

    /// Show a progress bar instead of per-query traces
    #[arg(short, long)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig::default()
            .with_output_path(&self.output)
            .with_pool_mode(self.pool)
            .with_num_results(self.num_results)
            .with_trace(!self.quiet)
    }

    fn lambdas(&self) -> &[f64] {
        self.lambdas.as_deref().unwrap_or(DEFAULT_LAMBDAS)
    }

    fn log_filter(&self) -> EnvFilter {
        let level = if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

/// BM25 followed by one MMR selector per lambda, in that order.
fn build_selectors(lambdas: &[f64]) -> Result<Vec<Box<dyn ResultListSelector>>, SelectorError> {
    let mut selectors: Vec<Box<dyn ResultListSelector>> = vec![Box::new(Bm25Selector::new())];
    for &lambda in lambdas {
        selectors.push(Box::new(MmrSelector::new(lambda)?));
    }
    Ok(selectors)
}

fn build_losses(num_results: usize) -> Vec<Box<dyn AspectLoss>> {
    vec![
        Box::new(SubtopicRecall::new(num_results)),
        Box::new(UnweightedSubtopicLoss::new(num_results)),
        Box::new(WeightedSubtopicLoss::new(num_results)),
    ]
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so that --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let dataset = load_dataset(&cli.data_dir)
        .with_context(|| format!("Failed to load dataset from {}", cli.data_dir.display()))?;

    let config = cli.run_config();
    let losses = build_losses(config.num_results);
    let mut selectors = build_selectors(cli.lambdas()).context("Invalid MMR lambda")?;

    info!(
        "Evaluating {} strategies on {} queries (n={}, pool={})",
        selectors.len(),
        dataset.num_queries(),
        config.num_results,
        config.pool_mode
    );

    let mut evaluator = Evaluator::new(config);
    if cli.quiet {
        let total = selectors.len() * dataset.num_queries();
        evaluator = evaluator.with_observer(Box::new(ProgressObserver::new(total)));
    }

    let summary = evaluator
        .run(&dataset.inputs(), &losses, &mut selectors)
        .with_context(|| format!("Evaluation failed (report: {})", cli.output.display()))?;

    let report = output::Report::new(&dataset, &cli.output, &summary);
    if cli.json {
        println!("{}", output::format_json(&report)?);
    } else {
        print!("{}", output::format_human(&report));
    }

    Ok(())
}
