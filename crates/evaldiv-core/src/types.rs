//! Domain records: documents, queries, and per-query aspect judgments.
//!
//! These are plain immutable values. Selectors receive document and query
//! text unchanged; only loss functions look at [`QueryAspects`].

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Unique document identifier.
///
/// Ordering is lexicographic on the underlying string, which fixes the
/// order documents are handed to selectors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Creates a document ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for DocId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Unique query identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(String);

impl QueryId {
    /// Creates a query ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for QueryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for QueryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A corpus document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier
    pub doc_id: DocId,
    /// Document content, passed to selectors as-is
    pub text: String,
}

impl Document {
    pub fn new(doc_id: impl Into<DocId>, text: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            text: text.into(),
        }
    }
}

/// A query to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Unique query identifier
    pub query_id: QueryId,
    /// Query content, passed to selectors as-is
    pub text: String,
}

impl Query {
    pub fn new(query_id: impl Into<QueryId>, text: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            text: text.into(),
        }
    }
}

/// Subtopic relevance judgments for a single query.
///
/// Maps each aspect (subtopic) ID to the documents judged relevant to it,
/// together with a relevance grade. Grades are typically 1; a grade of 0
/// records a judged-but-not-relevant document and does not count as
/// coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAspects {
    /// Query these judgments belong to
    pub query_id: QueryId,
    /// aspect_id -> (doc_id -> grade)
    aspects: BTreeMap<String, BTreeMap<DocId, u8>>,
}

impl QueryAspects {
    /// Creates an empty judgment set for a query.
    pub fn new(query_id: impl Into<QueryId>) -> Self {
        Self {
            query_id: query_id.into(),
            aspects: BTreeMap::new(),
        }
    }

    /// Builder-style variant of [`add_judgment`](Self::add_judgment).
    pub fn with_judgment(mut self, aspect: &str, doc_id: impl Into<DocId>, grade: u8) -> Self {
        self.add_judgment(aspect, doc_id, grade);
        self
    }

    /// Records that `doc_id` has relevance `grade` for `aspect`.
    ///
    /// A repeated (aspect, doc) pair keeps the most recent grade.
    pub fn add_judgment(&mut self, aspect: &str, doc_id: impl Into<DocId>, grade: u8) {
        self.aspects
            .entry(aspect.to_string())
            .or_default()
            .insert(doc_id.into(), grade);
    }

    /// Number of aspects with at least one relevant document.
    pub fn num_aspects(&self) -> usize {
        self.aspect_ids().count()
    }

    /// Aspect IDs with at least one relevant document, in ascending order.
    pub fn aspect_ids(&self) -> impl Iterator<Item = &str> {
        self.aspects
            .iter()
            .filter(|(_, docs)| docs.values().any(|&g| g > 0))
            .map(|(aspect, _)| aspect.as_str())
    }

    /// All documents with a positive grade for any aspect, deduplicated and sorted.
    pub fn relevant_docs(&self) -> BTreeSet<&DocId> {
        self.aspects
            .values()
            .flat_map(|docs| docs.iter())
            .filter(|&(_, &grade)| grade > 0)
            .map(|(doc_id, _)| doc_id)
            .collect()
    }

    /// Aspects a document is relevant to.
    pub fn aspects_of<'a>(&'a self, doc_id: &'a DocId) -> impl Iterator<Item = &'a str> + 'a {
        self.aspects
            .iter()
            .filter(move |(_, docs)| docs.get(doc_id).is_some_and(|&g| g > 0))
            .map(|(aspect, _)| aspect.as_str())
    }

    /// Weight of an aspect: the number of documents judged relevant to it.
    pub fn aspect_weight(&self, aspect: &str) -> f64 {
        self.aspects
            .get(aspect)
            .map(|docs| docs.values().filter(|&&g| g > 0).count() as f64)
            .unwrap_or(0.0)
    }

    /// Returns true if no aspect has a relevant document.
    pub fn is_empty(&self) -> bool {
        self.num_aspects() == 0
    }
}
