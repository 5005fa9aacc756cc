//! Test utilities for evaldiv-core.
//!
//! Scripted selectors and losses plus a small in-memory dataset.
//! Only compiled when running tests.

use crate::error::{LossError, SelectorError};
use crate::evaluation::EvalInputs;
use crate::loss::{AspectLoss, LossKind, MetricResult};
use crate::selector::ResultListSelector;
use crate::types::{DocId, Document, Query, QueryAspects, QueryId};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Owned dataset backing an [`EvalInputs`].
pub struct Fixture {
    pub query_ids: Vec<QueryId>,
    pub documents: BTreeMap<DocId, Document>,
    pub queries: HashMap<QueryId, Query>,
    pub aspects: HashMap<QueryId, QueryAspects>,
}

impl Fixture {
    pub fn inputs(&self) -> EvalInputs<'_> {
        EvalInputs {
            query_ids: &self.query_ids,
            documents: &self.documents,
            query_content: &self.queries,
            query_aspects: &self.aspects,
        }
    }
}

/// Four documents, two queries.
///
/// - qA: a1 = {d1, d2}, a2 = {d2}
/// - qB: b1 = {d3}, b2 = {d4}
pub fn fixture() -> Fixture {
    let documents = ["d1", "d2", "d3", "d4"]
        .iter()
        .map(|&id| (DocId::from(id), Document::new(id, format!("text of {}", id))))
        .collect();

    let query_ids = vec![QueryId::from("qA"), QueryId::from("qB")];
    let queries = query_ids
        .iter()
        .map(|id| (id.clone(), Query::new(id.clone(), format!("query {}", id))))
        .collect();

    let mut aspects = HashMap::new();
    aspects.insert(
        QueryId::from("qA"),
        QueryAspects::new("qA")
            .with_judgment("a1", "d1", 1)
            .with_judgment("a1", "d2", 1)
            .with_judgment("a2", "d2", 1),
    );
    aspects.insert(
        QueryId::from("qB"),
        QueryAspects::new("qB")
            .with_judgment("b1", "d3", 1)
            .with_judgment("b2", "d4", 1),
    );

    Fixture {
        query_ids,
        documents,
        queries,
        aspects,
    }
}

/// Calls observed by a [`RecordingSelector`].
#[derive(Debug, Default)]
pub struct SelectorLog {
    /// Pool contents at each `select_results` call
    pub pools_seen: Vec<Vec<DocId>>,
    pub clears: usize,
}

/// Selector returning its pool in insertion order, logging every call.
pub struct RecordingSelector {
    description: String,
    pool: Vec<DocId>,
    log: Rc<RefCell<SelectorLog>>,
}

impl RecordingSelector {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            pool: Vec::new(),
            log: Rc::new(RefCell::new(SelectorLog::default())),
        }
    }

    /// Shared handle to the call log, readable after the selector is boxed.
    pub fn log(&self) -> Rc<RefCell<SelectorLog>> {
        Rc::clone(&self.log)
    }
}

impl ResultListSelector for RecordingSelector {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn clear_pool(&mut self) {
        self.pool.clear();
        self.log.borrow_mut().clears += 1;
    }

    fn add_document(&mut self, doc_id: &DocId, _content: &str) {
        if !self.pool.contains(doc_id) {
            self.pool.push(doc_id.clone());
        }
    }

    fn select_results(&self, _query: &str, k: usize) -> Result<Vec<DocId>, SelectorError> {
        self.log.borrow_mut().pools_seen.push(self.pool.clone());
        Ok(self.pool.iter().take(k).cloned().collect())
    }
}

/// Loss returning a scripted value per query.
pub struct FixedLoss {
    name: String,
    kind: LossKind,
    default: MetricResult,
    per_query: HashMap<QueryId, MetricResult>,
}

impl FixedLoss {
    pub fn scalar(name: &str, kind: LossKind, value: f64) -> Self {
        Self::new(name, kind, MetricResult::Scalar(value))
    }

    pub fn vector(name: &str, kind: LossKind, values: Vec<f64>) -> Self {
        Self::new(name, kind, MetricResult::Vector(values))
    }

    fn new(name: &str, kind: LossKind, default: MetricResult) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default,
            per_query: HashMap::new(),
        }
    }

    /// Overrides the value returned for one query.
    pub fn with_query(mut self, query_id: &str, value: MetricResult) -> Self {
        self.per_query.insert(QueryId::from(query_id), value);
        self
    }
}

impl AspectLoss for FixedLoss {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> LossKind {
        self.kind
    }

    fn eval(&self, aspects: &QueryAspects, _results: &[DocId]) -> Result<MetricResult, LossError> {
        Ok(self
            .per_query
            .get(&aspects.query_id)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }
}
