//! # evaldiv-core
//!
//! Evaluation of search-result diversification strategies against
//! intent-aware (subtopic) relevance judgments.
//!
//! For each strategy the driver runs every query, scores the ranked result
//! list with every configured loss, and reports the per-rank average of the
//! unweighted and weighted subtopic loss curves.
//!
//! ## Modules
//!
//! - [`evaluation`] - The evaluation driver, aggregate curves, report sinks
//! - [`selector`] - Ranking strategy trait plus BM25 and MMR selectors
//! - [`loss`] - Loss trait, kind tags, and subtopic coverage losses
//! - [`types`] - Documents, queries, and aspect judgments
//! - [`dataset`] - JSONL/TSV dataset loader
//! - [`config`] - Run configuration
//! - [`error`] - Error types

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod loss;
pub mod selector;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use config::{DocumentPoolMode, RunConfig};
pub use error::{ErrorCategory, EvalError, LossError, SelectorError};
pub use evaluation::{run_evaluation, EvalInputs, EvalObserver, EvalSummary, Evaluator};
pub use loss::{AspectLoss, LossKind, MetricResult};
pub use selector::ResultListSelector;
pub use types::{DocId, Document, Query, QueryAspects, QueryId};
