//! Dynamic time warping
//!
//! Plain O(n·m) accumulated-cost table without banding or pruning. Feature
//! weighting is expressed by scaling point values before the call, not here.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::Distance;
use crate::data::{Sequence, SparseInstance};
use crate::error::{PipelineError, Result};

/// DTW distance between sequences, using an injected point cost
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DynamicTimeWarping<D> {
    cost: D,
}

impl<D: Distance<SparseInstance>> DynamicTimeWarping<D> {
    pub fn new(cost: D) -> Self {
        Self { cost }
    }

    /// The point cost function
    pub fn cost_function(&self) -> &D {
        &self.cost
    }

    /// Full `(n+1) x (m+1)` accumulated-cost table.
    ///
    /// Cell `(0, 0)` is `0`, the rest of row 0 and column 0 is `+inf`, and
    /// every other cell adds the point cost to the cheapest of its upper,
    /// left and diagonal predecessors.
    pub fn cost_table(&self, s: &Sequence, t: &Sequence) -> Result<Array2<f64>> {
        for seq in [s, t] {
            if seq.is_empty() {
                return Err(PipelineError::EmptySequence(seq.id.clone()));
            }
        }
        Ok(self.fill_table(s.points(), t.points()))
    }

    /// Accumulated alignment cost of `s` and `t`
    pub fn distance(&self, s: &Sequence, t: &Sequence) -> Result<f64> {
        let table = self.cost_table(s, t)?;
        Ok(table[[s.len(), t.len()]])
    }

    fn fill_table(&self, s: &[SparseInstance], t: &[SparseInstance]) -> Array2<f64> {
        let n = s.len() + 1;
        let m = t.len() + 1;
        let mut table = Array2::from_elem((n, m), f64::INFINITY);
        table[[0, 0]] = 0.0;

        for i in 1..n {
            for j in 1..m {
                let cost = self.cost.distance(&s[i - 1], &t[j - 1]);
                let insertion = table[[i - 1, j]];
                let deletion = table[[i, j - 1]];
                let matched = table[[i - 1, j - 1]];
                table[[i, j]] = cost + insertion.min(deletion).min(matched);
            }
        }
        table
    }
}

/// Lets DTW stand in wherever a sequence metric is expected.
///
/// An empty sequence yields `+inf` here instead of an error.
impl<D: Distance<SparseInstance>> Distance<Sequence> for DynamicTimeWarping<D> {
    fn distance(&self, a: &Sequence, b: &Sequence) -> f64 {
        if a.is_empty() || b.is_empty() {
            return f64::INFINITY;
        }
        let table = self.fill_table(a.points(), b.points());
        table[[a.len(), b.len()]]
    }
}
