//! Result list selectors (ranking strategies under evaluation).
//!
//! A selector owns a working pool of documents for the query currently being
//! evaluated. The driver clears the pool, adds the query's candidate
//! documents, and asks for a ranked list of at most `k` document IDs.
//!
//! # Implementations
//!
//! - [`Bm25Selector`] - plain relevance ranking (no diversification)
//! - [`MmrSelector`] - Maximal Marginal Relevance over BM25 relevance and
//!   term-overlap similarity

mod keyword;
mod mmr;

pub use keyword::{Bm25Selector, KeywordPool};
pub use mmr::MmrSelector;

use crate::error::SelectorError;
use crate::types::DocId;

/// A ranking strategy with a per-query document pool.
///
/// # Contract
///
/// - `clear_pool` discards every added document and is idempotent.
/// - `add_document` with an ID already in the pool replaces its content.
/// - `select_results` returns at most `k` IDs from the current pool and
///   depends only on the pool and its arguments.
pub trait ResultListSelector {
    /// Human-readable label used in traces and reports.
    fn description(&self) -> String;

    /// Discards all previously added documents.
    fn clear_pool(&mut self);

    /// Adds one document to the working pool.
    fn add_document(&mut self, doc_id: &DocId, content: &str);

    /// Ranks the current pool against `query` and returns up to `k` IDs.
    fn select_results(&self, query: &str, k: usize) -> Result<Vec<DocId>, SelectorError>;
}
