//! BM25 keyword scoring over a selector's working pool.
//!
//! [`KeywordPool`] wraps the [`bm25`](https://crates.io/crates/bm25) crate and
//! remembers insertion order so that rankings are fully deterministic: ties
//! (including documents that match no query term) keep the order in which
//! documents were added.

use super::ResultListSelector;
use crate::error::SelectorError;
use crate::types::DocId;
use bm25::{Document, Language, SearchEngineBuilder};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::instrument;

/// A pooled document with its position in insertion order.
#[derive(Debug, Clone)]
pub struct PoolEntry {
    pub doc_id: DocId,
    pub text: String,
}

/// Per-query document pool indexed for BM25 search.
///
/// Not thread-safe; a pool belongs to exactly one selector.
pub struct KeywordPool {
    search_engine: bm25::SearchEngine<u64>,
    /// Entries in insertion order; the index doubles as the BM25 document key
    entries: Vec<PoolEntry>,
    positions: HashMap<DocId, usize>,
}

impl KeywordPool {
    /// Creates an empty pool with English tokenization and stemming.
    pub fn new() -> Self {
        Self {
            search_engine: Self::empty_engine(),
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn empty_engine() -> bm25::SearchEngine<u64> {
        let empty_docs: Vec<Document<u64>> = vec![];
        SearchEngineBuilder::<u64>::with_documents(Language::English, empty_docs).build()
    }

    /// Removes every document.
    pub fn clear(&mut self) {
        self.search_engine = Self::empty_engine();
        self.entries.clear();
        self.positions.clear();
    }

    /// Adds a document, replacing the text of an existing entry with the same ID.
    ///
    /// A replaced document keeps its original insertion position.
    #[instrument(skip_all, fields(text_len = text.len()))]
    pub fn insert(&mut self, doc_id: &DocId, text: &str) {
        let position = match self.positions.get(doc_id) {
            Some(&position) => {
                self.entries[position].text = text.to_string();
                position
            }
            None => {
                let position = self.entries.len();
                self.entries.push(PoolEntry {
                    doc_id: doc_id.clone(),
                    text: text.to_string(),
                });
                self.positions.insert(doc_id.clone(), position);
                position
            }
        };

        self.search_engine.upsert(Document {
            id: position as u64,
            contents: text.to_string(),
        });
    }

    /// Pooled entries in insertion order.
    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    /// Scores every pooled document against `query`.
    ///
    /// Returns `(position, score)` for the whole pool sorted by score
    /// descending, then insertion order. Documents matching no query term
    /// score 0.0.
    pub fn rank(&self, query: &str) -> Vec<(usize, f32)> {
        let mut scores = vec![0.0f32; self.entries.len()];
        for result in self.search_engine.search(query, self.entries.len()) {
            if let Some(score) = scores.get_mut(result.document.id as usize) {
                *score = result.score;
            }
        }

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        ranked
    }

    /// Returns the number of pooled documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KeywordPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Ranks the pool by BM25 relevance alone.
///
/// When fewer than `k` documents match the query, the list is filled with
/// the remaining pool documents in insertion order.
#[derive(Default)]
pub struct Bm25Selector {
    pool: KeywordPool,
}

impl Bm25Selector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultListSelector for Bm25Selector {
    fn description(&self) -> String {
        "BM25 top-k".to_string()
    }

    fn clear_pool(&mut self) {
        self.pool.clear();
    }

    fn add_document(&mut self, doc_id: &DocId, content: &str) {
        self.pool.insert(doc_id, content);
    }

    fn select_results(&self, query: &str, k: usize) -> Result<Vec<DocId>, SelectorError> {
        let entries = self.pool.entries();
        Ok(self
            .pool
            .rank(query)
            .into_iter()
            .take(k)
            .map(|(position, _)| entries[position].doc_id.clone())
            .collect())
    }
}
