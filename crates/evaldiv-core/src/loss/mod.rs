//! Loss functions scored against subtopic (aspect) judgments.
//!
//! Every loss declares a [`LossKind`] when it is constructed. The driver uses
//! that tag, not the concrete type or the shape of the returned value, to
//! decide which aggregate curve a result feeds.
//!
//! # Metrics Reference
//!
//! | Loss | Kind | Output |
//! |------|------|--------|
//! | [`SubtopicRecall`] | `Other` | scalar S-recall@k |
//! | [`UnweightedSubtopicLoss`] | `UnweightedSubtopicLoss` | loss at ranks 1..=n |
//! | [`WeightedSubtopicLoss`] | `WeightedSubtopicLoss` | weighted loss at ranks 1..=n |
//!
//! # References
//!
//! - Zhai, Cohen & Lafferty (2003). "Beyond independent relevance: methods and
//!   evaluation metrics for subtopic retrieval"

mod subtopic;

pub use subtopic::{SubtopicRecall, UnweightedSubtopicLoss, WeightedSubtopicLoss};

use crate::error::LossError;
use crate::types::{DocId, QueryAspects};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared role of a loss function in aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossKind {
    /// Feeds the unweighted subtopic loss curve
    UnweightedSubtopicLoss,
    /// Feeds the weighted subtopic loss curve
    WeightedSubtopicLoss,
    /// Reported only
    Other,
}

/// Value produced by a loss function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricResult {
    /// A single number for the whole result list
    Scalar(f64),
    /// One number per rank position
    Vector(Vec<f64>),
}

impl MetricResult {
    /// Renders the value the way it appears in traces and reports.
    ///
    /// Vectors are tab-joined.
    pub fn render(&self) -> String {
        match self {
            MetricResult::Scalar(v) => format_value(*v),
            MetricResult::Vector(values) => values
                .iter()
                .map(|&v| format_value(v))
                .collect::<Vec<_>>()
                .join("\t"),
        }
    }
}

impl fmt::Display for MetricResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Formats a number with a fractional part always present (`1.0`, `0.5`).
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

/// A loss function evaluated per (strategy, query) result list.
///
/// Implementations must be stateless: the same inputs always produce the
/// same output. Losses of an aggregate kind must return a
/// [`MetricResult::Vector`] with exactly `num_results` elements.
pub trait AspectLoss {
    /// Human-readable name for traces and summaries.
    fn name(&self) -> String;

    /// Which aggregate curve (if any) this loss feeds.
    fn kind(&self) -> LossKind;

    /// Scores a ranked result list against the query's aspect judgments.
    fn eval(&self, aspects: &QueryAspects, results: &[DocId]) -> Result<MetricResult, LossError>;
}
