//! Error types for evaldiv-core.
//!
//! [`EvalError`] is what the evaluation driver returns. Selector and loss
//! implementations report their own failures through [`SelectorError`] and
//! [`LossError`]; the driver wraps those with the strategy, query, and metric
//! that were being evaluated.

use crate::types::{DocId, QueryId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`ResultListSelector`](crate::selector::ResultListSelector).
#[derive(Debug, Clone, Error)]
pub enum SelectorError {
    /// Selector was constructed with an out-of-range parameter
    #[error("Invalid selector parameter: {0}")]
    InvalidParameter(String),
    /// Ranking the pool failed
    #[error("Selection failed: {0}")]
    SelectionFailed(String),
}

/// Errors raised by an [`AspectLoss`](crate::loss::AspectLoss).
#[derive(Debug, Clone, Error)]
pub enum LossError {
    /// Loss was constructed with an out-of-range parameter
    #[error("Invalid loss parameter: {0}")]
    InvalidParameter(String),
    /// Evaluating the result list failed
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),
}

/// Coarse classification of [`EvalError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Inputs disagree with each other (missing query data, unknown documents)
    DataConsistency,
    /// A metric broke its output contract
    MetricContract,
    /// A selector or metric call failed
    Collaborator,
    /// The report could not be opened, written, or closed
    Sink,
    /// The run configuration is unusable
    Config,
}

/// Errors that abort an evaluation run.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A query ID has no content or no aspect judgments
    #[error("Missing {what} for query '{query_id}'")]
    MissingQueryData {
        query_id: QueryId,
        what: &'static str,
    },

    /// A judged document is not in the corpus
    #[error("Query '{query_id}' references unknown document '{doc_id}'")]
    MissingDocument { query_id: QueryId, doc_id: DocId },

    /// The query list is empty, so there is nothing to average over
    #[error("No queries to evaluate")]
    NoQueries,

    /// Invalid run configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An aggregate-tagged metric returned a vector of the wrong length
    #[error(
        "Metric '{metric}' returned {actual} values for query '{query_id}' \
         (strategy '{strategy}'), expected {expected}"
    )]
    MetricVectorLengthMismatch {
        strategy: String,
        query_id: QueryId,
        metric: String,
        expected: usize,
        actual: usize,
    },

    /// An aggregate-tagged metric returned a scalar instead of a rank vector
    #[error("Metric '{metric}' returned a scalar for query '{query_id}' (strategy '{strategy}')")]
    UnexpectedScalar {
        strategy: String,
        query_id: QueryId,
        metric: String,
    },

    /// The selector failed
    #[error("Strategy '{strategy}' failed on query '{query_id}': {source}")]
    Selector {
        strategy: String,
        query_id: QueryId,
        #[source]
        source: SelectorError,
    },

    /// The metric failed
    #[error("Metric '{metric}' failed on query '{query_id}' (strategy '{strategy}'): {source}")]
    Loss {
        strategy: String,
        query_id: QueryId,
        metric: String,
        #[source]
        source: LossError,
    },

    /// The report file could not be created
    #[error("Failed to open report {}: {source}", path.display())]
    ReportOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or flushing the report failed
    #[error("Failed to write report: {0}")]
    ReportWrite(#[from] std::io::Error),
}

impl EvalError {
    /// Returns the category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            EvalError::MissingQueryData { .. }
            | EvalError::MissingDocument { .. }
            | EvalError::NoQueries => ErrorCategory::DataConsistency,
            EvalError::InvalidConfig(_) => ErrorCategory::Config,
            EvalError::MetricVectorLengthMismatch { .. } | EvalError::UnexpectedScalar { .. } => {
                ErrorCategory::MetricContract
            }
            EvalError::Selector { .. } | EvalError::Loss { .. } => ErrorCategory::Collaborator,
            EvalError::ReportOpen { .. } | EvalError::ReportWrite(_) => ErrorCategory::Sink,
        }
    }
}
