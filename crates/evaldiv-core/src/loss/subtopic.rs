//! Subtopic coverage losses.
//!
//! A document "covers" every aspect it is judged relevant to. Subtopic loss
//! at rank `i` is the share of the query's aspects (optionally weighted) not
//! yet covered by the top `i` results.

use super::{AspectLoss, LossKind, MetricResult};
use crate::error::LossError;
use crate::types::{DocId, QueryAspects};
use std::collections::HashSet;

/// Loss after each of the first `num_results` ranks.
///
/// Ranks past the end of `results` repeat the last value, so the output
/// always has `num_results` elements. A query without aspects has nothing to
/// miss and scores 0.0 everywhere.
fn loss_curve(
    aspects: &QueryAspects,
    results: &[DocId],
    num_results: usize,
    weight: impl Fn(&str) -> f64,
) -> Vec<f64> {
    let total: f64 = aspects.aspect_ids().map(&weight).sum();
    if total <= 0.0 {
        return vec![0.0; num_results];
    }

    let mut covered: HashSet<&str> = HashSet::new();
    let mut covered_weight = 0.0;
    let mut curve = Vec::with_capacity(num_results);

    for rank in 0..num_results {
        if let Some(doc_id) = results.get(rank) {
            for aspect in aspects.aspects_of(doc_id) {
                if covered.insert(aspect) {
                    covered_weight += weight(aspect);
                }
            }
        }
        curve.push(1.0 - covered_weight / total);
    }

    curve
}

/// S-recall@k: fraction of aspects covered by the top `k` results.
#[derive(Debug, Clone, Copy)]
pub struct SubtopicRecall {
    k: usize,
}

impl SubtopicRecall {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl AspectLoss for SubtopicRecall {
    fn name(&self) -> String {
        format!("S-recall@{}", self.k)
    }

    fn kind(&self) -> LossKind {
        LossKind::Other
    }

    fn eval(&self, aspects: &QueryAspects, results: &[DocId]) -> Result<MetricResult, LossError> {
        let total = aspects.num_aspects();
        if total == 0 {
            // No aspects means trivially perfect recall
            return Ok(MetricResult::Scalar(1.0));
        }

        let covered: HashSet<&str> = results
            .iter()
            .take(self.k)
            .flat_map(|doc_id| aspects.aspects_of(doc_id))
            .collect();

        Ok(MetricResult::Scalar(covered.len() as f64 / total as f64))
    }
}

/// Unweighted subtopic loss at ranks 1..=`num_results`.
#[derive(Debug, Clone, Copy)]
pub struct UnweightedSubtopicLoss {
    num_results: usize,
}

impl UnweightedSubtopicLoss {
    pub fn new(num_results: usize) -> Self {
        Self { num_results }
    }
}

impl AspectLoss for UnweightedSubtopicLoss {
    fn name(&self) -> String {
        "Unweighted subtopic loss".to_string()
    }

    fn kind(&self) -> LossKind {
        LossKind::UnweightedSubtopicLoss
    }

    fn eval(&self, aspects: &QueryAspects, results: &[DocId]) -> Result<MetricResult, LossError> {
        Ok(MetricResult::Vector(loss_curve(
            aspects,
            results,
            self.num_results,
            |_| 1.0,
        )))
    }
}

/// Weighted subtopic loss at ranks 1..=`num_results`.
///
/// Each aspect is weighted by the number of documents judged relevant to it,
/// so missing a broad aspect costs more than missing a narrow one.
#[derive(Debug, Clone, Copy)]
pub struct WeightedSubtopicLoss {
    num_results: usize,
}

impl WeightedSubtopicLoss {
    pub fn new(num_results: usize) -> Self {
        Self { num_results }
    }
}

impl AspectLoss for WeightedSubtopicLoss {
    fn name(&self) -> String {
        "Weighted subtopic loss".to_string()
    }

    fn kind(&self) -> LossKind {
        LossKind::WeightedSubtopicLoss
    }

    fn eval(&self, aspects: &QueryAspects, results: &[DocId]) -> Result<MetricResult, LossError> {
        Ok(MetricResult::Vector(loss_curve(
            aspects,
            results,
            self.num_results,
            |aspect| aspects.aspect_weight(aspect),
        )))
    }
}
