//! Evaluation driver for diversification strategies.
//!
//! Runs every selector against every query, scores each result list with
//! every loss function, and averages the two subtopic-loss curves per
//! selector into one report row.
//!
//! # Overview
//!
//! ```text
//! for each selector (index 1, 2, ...):
//!     usl, wsl = zeros(num_results)
//!     for each query:
//!         clear pool, add candidate documents, select top num_results
//!         for each loss: evaluate, trace, feed usl/wsl by declared kind
//!     clear pool
//!     write row: index, usl / |queries|, wsl / |queries|
//! ```
//!
//! Everything runs sequentially and in input order, so identical inputs
//! produce byte-identical reports.
//!
//! # Example
//!
//! ```ignore
//! use evaldiv_core::evaluation::run_evaluation;
//!
//! let summary = run_evaluation(
//!     &dataset.query_ids,
//!     &dataset.documents,
//!     &dataset.queries,
//!     &dataset.aspects,
//!     &losses,
//!     &mut selectors,
//!     &config,
//! )?;
//! ```

mod curve;
pub mod report;

pub use curve::RankCurve;
pub use report::{MemoryReportSink, ReportRow, ReportSink, TsvReportSink};

use crate::config::{DocumentPoolMode, RunConfig};
use crate::error::EvalError;
use crate::loss::{AspectLoss, LossKind, MetricResult};
use crate::selector::ResultListSelector;
use crate::types::{DocId, Document, Query, QueryAspects, QueryId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, instrument};

// ============================================================================
// Inputs
// ============================================================================

/// Borrowed view of everything a run evaluates against.
#[derive(Debug, Clone, Copy)]
pub struct EvalInputs<'a> {
    /// Queries to evaluate, in evaluation order
    pub query_ids: &'a [QueryId],
    /// The corpus, iterated in ascending ID order
    pub documents: &'a BTreeMap<DocId, Document>,
    pub query_content: &'a HashMap<QueryId, Query>,
    pub query_aspects: &'a HashMap<QueryId, QueryAspects>,
}

impl<'a> EvalInputs<'a> {
    /// Checks that every query can be evaluated under `config`.
    ///
    /// Runs before the report is opened, so a failure here leaves no
    /// report behind.
    pub fn validate(&self, config: &RunConfig) -> Result<(), EvalError> {
        if config.num_results == 0 {
            return Err(EvalError::InvalidConfig(
                "num_results must be positive".to_string(),
            ));
        }
        if self.query_ids.is_empty() {
            return Err(EvalError::NoQueries);
        }

        for query_id in self.query_ids {
            if !self.query_content.contains_key(query_id) {
                return Err(EvalError::MissingQueryData {
                    query_id: query_id.clone(),
                    what: "content",
                });
            }
            let Some(aspects) = self.query_aspects.get(query_id) else {
                return Err(EvalError::MissingQueryData {
                    query_id: query_id.clone(),
                    what: "aspects",
                });
            };
            if config.pool_mode == DocumentPoolMode::RelevantOnly {
                if let Some(doc_id) = aspects
                    .relevant_docs()
                    .into_iter()
                    .find(|doc_id| !self.documents.contains_key(*doc_id))
                {
                    return Err(EvalError::MissingDocument {
                        query_id: query_id.clone(),
                        doc_id: doc_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    fn query(&self, query_id: &QueryId) -> Result<&'a Query, EvalError> {
        self.query_content
            .get(query_id)
            .ok_or_else(|| EvalError::MissingQueryData {
                query_id: query_id.clone(),
                what: "content",
            })
    }

    fn aspects(&self, query_id: &QueryId) -> Result<&'a QueryAspects, EvalError> {
        self.query_aspects
            .get(query_id)
            .ok_or_else(|| EvalError::MissingQueryData {
                query_id: query_id.clone(),
                what: "aspects",
            })
    }

    /// Candidate documents for one query, in ascending ID order.
    pub fn pool(
        &self,
        mode: DocumentPoolMode,
        query_id: &QueryId,
    ) -> Result<Vec<&'a Document>, EvalError> {
        match mode {
            DocumentPoolMode::All => Ok(self.documents.values().collect()),
            DocumentPoolMode::RelevantOnly => self
                .aspects(query_id)?
                .relevant_docs()
                .into_iter()
                .map(|doc_id| {
                    self.documents
                        .get(doc_id)
                        .ok_or_else(|| EvalError::MissingDocument {
                            query_id: query_id.clone(),
                            doc_id: doc_id.clone(),
                        })
                })
                .collect(),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// One loss function's value for one (strategy, query) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossValue {
    pub name: String,
    pub kind: LossKind,
    pub value: MetricResult,
}

/// Everything recorded for one query under one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryEvaluation {
    pub query_id: QueryId,
    pub results: Vec<DocId>,
    pub losses: Vec<LossValue>,
}

/// Averaged curves and per-query detail for one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyResult {
    /// 1-based processing order
    pub index: usize,
    pub description: String,
    /// Mean unweighted subtopic loss per rank
    pub usl: RankCurve,
    /// Mean weighted subtopic loss per rank
    pub wsl: RankCurve,
    pub queries: Vec<QueryEvaluation>,
}

impl StrategyResult {
    /// The report row for this strategy.
    pub fn report_row(&self) -> ReportRow<'_> {
        ReportRow {
            strategy_index: self.index,
            usl: self.usl.values(),
            wsl: self.wsl.values(),
        }
    }
}

/// Outcome of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalSummary {
    pub num_results: usize,
    pub pool_mode: DocumentPoolMode,
    pub num_queries: usize,
    pub strategies: Vec<StrategyResult>,
}

// ============================================================================
// Observer
// ============================================================================

/// Progress callbacks. All methods default to no-ops.
pub trait EvalObserver {
    fn on_strategy_start(&self, _index: usize, _description: &str, _num_queries: usize) {}

    fn on_query_complete(&self, _index: usize, _query_id: &QueryId) {}

    fn on_strategy_complete(&self, _result: &StrategyResult) {}
}

// ============================================================================
// Driver
// ============================================================================

/// Evaluation driver bound to one [`RunConfig`].
pub struct Evaluator {
    config: RunConfig,
    observer: Option<Box<dyn EvalObserver>>,
}

impl Evaluator {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    /// Attaches a progress observer.
    pub fn with_observer(mut self, observer: Box<dyn EvalObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Runs the evaluation and writes the report to `config.output_path`.
    ///
    /// Inputs are validated before the file is created. The file is closed on
    /// every exit path; on failure it may hold only the rows written so far.
    pub fn run(
        &self,
        inputs: &EvalInputs<'_>,
        losses: &[Box<dyn AspectLoss>],
        selectors: &mut [Box<dyn ResultListSelector>],
    ) -> Result<EvalSummary, EvalError> {
        inputs.validate(&self.config)?;

        let path = &self.config.output_path;
        let mut sink = TsvReportSink::create(path).map_err(|source| EvalError::ReportOpen {
            path: path.clone(),
            source,
        })?;

        let summary = self.run_with_sink(inputs, losses, selectors, &mut sink)?;
        info!(
            "Wrote {} report rows to {}",
            summary.strategies.len(),
            path.display()
        );
        Ok(summary)
    }

    /// Runs the evaluation, writing one row per selector to `sink`.
    pub fn run_with_sink(
        &self,
        inputs: &EvalInputs<'_>,
        losses: &[Box<dyn AspectLoss>],
        selectors: &mut [Box<dyn ResultListSelector>],
        sink: &mut dyn ReportSink,
    ) -> Result<EvalSummary, EvalError> {
        inputs.validate(&self.config)?;

        let mut strategies = Vec::with_capacity(selectors.len());
        for (offset, selector) in selectors.iter_mut().enumerate() {
            let index = offset + 1;
            let outcome = self.evaluate_strategy(index, selector.as_mut(), inputs, losses);
            // The pool is released whether or not the strategy completed
            selector.clear_pool();
            let result = outcome?;

            if self.config.trace_enabled {
                info!(index, description = %result.description, "Exporting strategy");
            }
            sink.write_row(&result.report_row())?;

            if let Some(observer) = &self.observer {
                observer.on_strategy_complete(&result);
            }
            strategies.push(result);
        }

        sink.finish()?;

        Ok(EvalSummary {
            num_results: self.config.num_results,
            pool_mode: self.config.pool_mode,
            num_queries: inputs.query_ids.len(),
            strategies,
        })
    }

    /// Runs one selector over all queries and averages its curves.
    #[instrument(skip_all, fields(index = index))]
    fn evaluate_strategy(
        &self,
        index: usize,
        selector: &mut dyn ResultListSelector,
        inputs: &EvalInputs<'_>,
        losses: &[Box<dyn AspectLoss>],
    ) -> Result<StrategyResult, EvalError> {
        let num_results = self.config.num_results;
        let description = selector.description();
        let trace = self.config.trace_enabled;

        if trace {
            info!(strategy = %description, "Processing strategy");
        }
        if let Some(observer) = &self.observer {
            observer.on_strategy_start(index, &description, inputs.query_ids.len());
        }

        let mut usl = RankCurve::zeros(num_results);
        let mut wsl = RankCurve::zeros(num_results);
        let mut queries = Vec::with_capacity(inputs.query_ids.len());

        for query_id in inputs.query_ids {
            let query = inputs.query(query_id)?;
            let aspects = inputs.aspects(query_id)?;

            selector.clear_pool();
            for doc in inputs.pool(self.config.pool_mode, query_id)? {
                selector.add_document(&doc.doc_id, &doc.text);
            }

            let results = selector
                .select_results(&query.text, num_results)
                .map_err(|source| EvalError::Selector {
                    strategy: description.clone(),
                    query_id: query_id.clone(),
                    source,
                })?;

            if trace {
                info!(
                    strategy = %description,
                    query = %query_id,
                    query_text = %query.text,
                    results = %render_results(&results),
                    "Selected results"
                );
            }

            let mut values = Vec::with_capacity(losses.len());
            for loss in losses {
                let name = loss.name();
                let kind = loss.kind();
                let value = loss
                    .eval(aspects, &results)
                    .map_err(|source| EvalError::Loss {
                        strategy: description.clone(),
                        query_id: query_id.clone(),
                        metric: name.clone(),
                        source,
                    })?;

                if trace {
                    info!(
                        strategy = %description,
                        query = %query_id,
                        metric = %name,
                        value = %value,
                        "Evaluated loss"
                    );
                }

                let curve = match kind {
                    LossKind::UnweightedSubtopicLoss => Some(&mut usl),
                    LossKind::WeightedSubtopicLoss => Some(&mut wsl),
                    LossKind::Other => None,
                };
                if let Some(curve) = curve {
                    match &value {
                        MetricResult::Vector(v) => curve.accumulate(v).map_err(|actual| {
                            EvalError::MetricVectorLengthMismatch {
                                strategy: description.clone(),
                                query_id: query_id.clone(),
                                metric: name.clone(),
                                expected: num_results,
                                actual,
                            }
                        })?,
                        MetricResult::Scalar(_) => {
                            return Err(EvalError::UnexpectedScalar {
                                strategy: description.clone(),
                                query_id: query_id.clone(),
                                metric: name,
                            })
                        }
                    }
                }

                values.push(LossValue { name, kind, value });
            }

            if let Some(observer) = &self.observer {
                observer.on_query_complete(index, query_id);
            }
            queries.push(QueryEvaluation {
                query_id: query_id.clone(),
                results,
                losses: values,
            });
        }

        let num_queries = inputs.query_ids.len();
        usl.divide(num_queries);
        wsl.divide(num_queries);

        Ok(StrategyResult {
            index,
            description,
            usl,
            wsl,
            queries,
        })
    }
}

/// Renders a result list as `[d1, d2, ...]` for traces.
fn render_results(results: &[DocId]) -> String {
    let ids: Vec<&str> = results.iter().map(DocId::as_str).collect();
    format!("[{}]", ids.join(", "))
}

/// Runs a full evaluation and writes the report to `config.output_path`.
///
/// Convenience wrapper around [`Evaluator::run`].
pub fn run_evaluation(
    query_ids: &[QueryId],
    documents: &BTreeMap<DocId, Document>,
    query_content: &HashMap<QueryId, Query>,
    query_aspects: &HashMap<QueryId, QueryAspects>,
    losses: &[Box<dyn AspectLoss>],
    selectors: &mut [Box<dyn ResultListSelector>],
    config: &RunConfig,
) -> Result<EvalSummary, EvalError> {
    let inputs = EvalInputs {
        query_ids,
        documents,
        query_content,
        query_aspects,
    };
    Evaluator::new(config.clone()).run(&inputs, losses, selectors)
}
