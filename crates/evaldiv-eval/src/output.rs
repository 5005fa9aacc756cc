//! Summary output for evaluation runs.
//!
//! Supports both a human-readable table and JSON for scripting. The TSV
//! report itself is written by the evaluator; this module only describes it.

use anyhow::Result;
use evaldiv_core::dataset::AspectDataset;
use evaldiv_core::evaluation::StrategyResult;
use evaldiv_core::{EvalSummary, LossKind, MetricResult};
use serde::Serialize;
use std::path::Path;

/// Maximum characters of a strategy description in the table
const DESCRIPTION_WIDTH: usize = 24;

#[derive(Debug, Serialize)]
pub struct DatasetInfo {
    pub num_documents: usize,
    pub num_queries: usize,
    pub num_judgments: usize,
}

/// Everything printed at the end of a run.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub dataset: DatasetInfo,
    pub report_path: String,
    #[serde(flatten)]
    pub summary: &'a EvalSummary,
}

impl<'a> Report<'a> {
    pub fn new(dataset: &AspectDataset, report_path: &Path, summary: &'a EvalSummary) -> Self {
        Self {
            dataset: DatasetInfo {
                num_documents: dataset.num_documents(),
                num_queries: dataset.num_queries(),
                num_judgments: dataset.num_judgments(),
            },
            report_path: report_path.display().to_string(),
            summary,
        }
    }
}

/// Mean over queries of the first scalar `Other`-kind metric (S-recall).
fn mean_recall(strategy: &StrategyResult) -> Option<f64> {
    let values: Vec<f64> = strategy
        .queries
        .iter()
        .filter_map(|q| {
            q.losses.iter().find_map(|l| match (&l.kind, &l.value) {
                (LossKind::Other, MetricResult::Scalar(v)) => Some(*v),
                _ => None,
            })
        })
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max - 1).collect();
        format!("{}…", cut)
    }
}

/// Formats the summary as pretty-printed JSON.
pub fn format_json(report: &Report<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Formats the summary as a table for the terminal.
pub fn format_human(report: &Report<'_>) -> String {
    let summary = report.summary;
    let n = summary.num_results;
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "=".repeat(80)));
    out.push_str("DIVERSIFICATION EVALUATION\n");
    out.push_str(&format!("{}\n", "=".repeat(80)));
    out.push_str(&format!(
        "\nDataset: {} docs, {} queries, {} judgments\n",
        report.dataset.num_documents, report.dataset.num_queries, report.dataset.num_judgments
    ));
    out.push_str(&format!(
        "Results: n={}, pool={}\n",
        n, summary.pool_mode
    ));

    out.push_str(&format!("\n{}\n", "-".repeat(70)));
    out.push_str(&format!(
        "{:<4} {:<24} {:>9} {:>8} {:>8} {:>8} {:>8}\n",
        "#",
        "Strategy",
        format!("S-rec@{}", n),
        "USL@1",
        format!("USL@{}", n),
        "WSL@1",
        format!("WSL@{}", n)
    ));

    for strategy in &summary.strategies {
        let usl = strategy.usl.values();
        let wsl = strategy.wsl.values();
        let recall = mean_recall(strategy)
            .map(|r| format!("{:.4}", r))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<4} {:<24} {:>9} {:>8.4} {:>8.4} {:>8.4} {:>8.4}\n",
            strategy.index,
            truncate(&strategy.description, DESCRIPTION_WIDTH),
            recall,
            usl.first().copied().unwrap_or_default(),
            usl.last().copied().unwrap_or_default(),
            wsl.first().copied().unwrap_or_default(),
            wsl.last().copied().unwrap_or_default(),
        ));
    }

    out.push_str(&format!("\nReport written to {}\n", report.report_path));
    out.push_str(&format!("{}\n", "=".repeat(80)));
    out
}
