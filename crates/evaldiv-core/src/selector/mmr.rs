//! Maximal Marginal Relevance (MMR) selection.
//!
//! Greedily builds the result list, at each step taking the candidate that
//! maximises
//!
//! ```text
//! λ · rel(d) - (1 - λ) · max_{s ∈ selected} sim(d, s)
//! ```
//!
//! `rel` is the BM25 score normalised to [0, 1] by the best score in the
//! pool; `sim` is the Jaccard overlap of the documents' term sets.
//!
//! | λ | Behaviour |
//! |---|-----------|
//! | 1.0 | Pure relevance (same order as BM25) |
//! | 0.5 | Balanced |
//! | 0.0 | Pure novelty after the first pick |
//!
//! # References
//!
//! - Carbonell & Goldstein (1998). "The use of MMR, diversity-based reranking
//!   for reordering documents and producing summaries"

use super::keyword::KeywordPool;
use super::ResultListSelector;
use crate::error::SelectorError;
use crate::types::DocId;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// MMR diversification over BM25 relevance.
pub struct MmrSelector {
    lambda: f64,
    pool: KeywordPool,
}

impl MmrSelector {
    /// Creates a selector with relevance/diversity trade-off `lambda`.
    ///
    /// Returns [`SelectorError::InvalidParameter`] unless `0.0 <= lambda <= 1.0`.
    pub fn new(lambda: f64) -> Result<Self, SelectorError> {
        if !(0.0..=1.0).contains(&lambda) {
            return Err(SelectorError::InvalidParameter(format!(
                "lambda must be in [0, 1], got {}",
                lambda
            )));
        }
        Ok(Self {
            lambda,
            pool: KeywordPool::new(),
        })
    }
}

/// Lower-cased alphanumeric terms of a text.
fn term_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Jaccard similarity of two term sets (0.0 when both are empty).
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

impl ResultListSelector for MmrSelector {
    fn description(&self) -> String {
        format!("MMR (lambda={:.2})", self.lambda)
    }

    fn clear_pool(&mut self) {
        self.pool.clear();
    }

    fn add_document(&mut self, doc_id: &DocId, content: &str) {
        self.pool.insert(doc_id, content);
    }

    #[instrument(skip_all, fields(k = k, lambda = self.lambda))]
    fn select_results(&self, query: &str, k: usize) -> Result<Vec<DocId>, SelectorError> {
        let entries = self.pool.entries();
        let ranked = self.pool.rank(query);

        let max_score = ranked.first().map(|&(_, s)| s as f64).unwrap_or(0.0);
        // (position, normalised relevance) in relevance order
        let mut candidates: Vec<(usize, f64)> = ranked
            .into_iter()
            .map(|(position, score)| {
                let rel = if max_score > 0.0 {
                    score as f64 / max_score
                } else {
                    0.0
                };
                (position, rel)
            })
            .collect();

        let terms: Vec<HashSet<String>> = entries.iter().map(|e| term_set(&e.text)).collect();
        let mut selected: Vec<usize> = Vec::with_capacity(k.min(candidates.len()));

        while selected.len() < k && !candidates.is_empty() {
            let mut best_idx = 0;
            let mut best_score = f64::NEG_INFINITY;

            for (idx, &(position, rel)) in candidates.iter().enumerate() {
                let redundancy = selected
                    .iter()
                    .map(|&s| jaccard(&terms[position], &terms[s]))
                    .fold(0.0, f64::max);
                let score = self.lambda * rel - (1.0 - self.lambda) * redundancy;
                // Strict comparison keeps the earlier (more relevant) candidate on ties
                if score > best_score {
                    best_score = score;
                    best_idx = idx;
                }
            }

            let (position, _) = candidates.remove(best_idx);
            selected.push(position);
        }

        debug!(
            pool_size = entries.len(),
            selected = selected.len(),
            "MMR selection complete"
        );

        Ok(selected
            .into_iter()
            .map(|position| entries[position].doc_id.clone())
            .collect())
    }
}
