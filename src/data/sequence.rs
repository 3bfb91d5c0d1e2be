//! Time-indexed sequences of sparse observations

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::dataset::DataSet;
use super::instance::{Instance, SparseInstance};

/// Ordered list of time-indexed point observations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sequence {
    /// Identifier
    pub id: String,
    /// Class label
    pub class_name: String,
    /// Sequence-level outcome
    pub outcome: f64,
    times: Vec<f64>,
    points: Vec<SparseInstance>,
}

impl Sequence {
    /// Create an empty sequence
    pub fn new(id: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class_name: class_name.into(),
            ..Default::default()
        }
    }

    /// Build a sequence whose points are at times `0, 1, 2, ...`
    pub fn from_points(id: impl Into<String>, points: impl IntoIterator<Item = SparseInstance>) -> Self {
        let mut seq = Self::new(id, "");
        for (t, point) in points.into_iter().enumerate() {
            seq.push(t as f64, point);
        }
        seq
    }

    /// Set the outcome
    pub fn with_outcome(mut self, outcome: f64) -> Self {
        self.outcome = outcome;
        self
    }

    /// Insert a point, keeping points ordered by time.
    ///
    /// Points with equal times keep their insertion order.
    pub fn push(&mut self, time: f64, point: SparseInstance) {
        let pos = self.times.partition_point(|&t| t <= time);
        self.times.insert(pos, time);
        self.points.insert(pos, point);
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SparseInstance] {
        &self.points
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Copy the points into a dataset, in time order
    pub fn time_points(&self) -> DataSet<SparseInstance> {
        self.points.iter().cloned().collect()
    }
}

impl Instance for Sequence {
    /// Mean of `feature` over all points (`0.0` for an empty sequence)
    fn get(&self, feature: &str) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(|p| p.get(feature)).sum::<f64>() / self.points.len() as f64
    }

    fn outcome(&self) -> f64 {
        self.outcome
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn feature_names(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self
            .points
            .iter()
            .flat_map(|p| p.feature_names())
            .collect();
        names.into_iter().collect()
    }
}
