//! Run configuration.
//!
//! Everything that used to be a process-wide constant (output path, trace
//! flag, document pool mode) lives in [`RunConfig`] and is passed into the
//! driver explicitly.
//!
//! # Usage
//!
//! ```
//! use evaldiv_core::config::{DocumentPoolMode, RunConfig};
//!
//! let config = RunConfig::default()
//!     .with_num_results(20)
//!     .with_pool_mode(DocumentPoolMode::RelevantOnly)
//!     .with_trace(false);
//! assert_eq!(config.num_results, 20);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default result-list length (rank positions per curve).
pub const DEFAULT_NUM_RESULTS: usize = 10;

/// Default location of the tab-separated report.
pub const DEFAULT_OUTPUT_PATH: &str = "results/evaldiv-avg.tsv";

/// Which documents are offered to a selector for each query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentPoolMode {
    /// Every corpus document, for every query
    #[default]
    All,
    /// Only documents judged relevant to the current query
    RelevantOnly,
}

impl fmt::Display for DocumentPoolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentPoolMode::All => f.write_str("all"),
            DocumentPoolMode::RelevantOnly => f.write_str("relevant-only"),
        }
    }
}

/// Accepts the same names [`Display`](fmt::Display) produces.
impl FromStr for DocumentPoolMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(DocumentPoolMode::All),
            "relevant-only" => Ok(DocumentPoolMode::RelevantOnly),
            other => Err(format!(
                "unknown pool mode '{}' (expected 'all' or 'relevant-only')",
                other
            )),
        }
    }
}

/// Configuration for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Where the tab-separated report is written
    pub output_path: PathBuf,
    /// Document pool offered to selectors
    pub pool_mode: DocumentPoolMode,
    /// Result-list length requested from selectors; also the curve length
    pub num_results: usize,
    /// Emit per-query / per-metric trace events
    pub trace_enabled: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            pool_mode: DocumentPoolMode::default(),
            num_results: DEFAULT_NUM_RESULTS,
            trace_enabled: true,
        }
    }
}

impl RunConfig {
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_pool_mode(mut self, mode: DocumentPoolMode) -> Self {
        self.pool_mode = mode;
        self
    }

    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results;
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace_enabled = enabled;
        self
    }
}
