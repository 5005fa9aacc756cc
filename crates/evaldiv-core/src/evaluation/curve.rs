//! Rank-indexed aggregate curves.

use serde::Serialize;

/// Per-rank sum (and later mean) of a rank-indexed loss across queries.
///
/// The length is fixed at construction and never changes: adding a vector of
/// a different length is rejected rather than padded or truncated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankCurve(Vec<f64>);

impl RankCurve {
    /// All-zero curve with one entry per rank.
    pub fn zeros(num_results: usize) -> Self {
        Self(vec![0.0; num_results])
    }

    /// Adds `values` elementwise.
    ///
    /// Returns the offending length as `Err` when it differs from the curve's.
    pub fn accumulate(&mut self, values: &[f64]) -> Result<(), usize> {
        if values.len() != self.0.len() {
            return Err(values.len());
        }
        for (acc, v) in self.0.iter_mut().zip(values) {
            *acc += v;
        }
        Ok(())
    }

    /// Divides every entry by `count`, turning a sum into a mean.
    pub fn divide(&mut self, count: usize) {
        let count = count as f64;
        for v in &mut self.0 {
            *v /= count;
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}
