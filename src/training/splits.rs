//! Candidate split thresholds per feature

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::data::{DataSet, Features, Instance};

/// Ordered candidate thresholds for each feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitCandidates {
    thresholds: HashMap<String, Vec<f64>>,
}

impl SplitCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the thresholds for `feature`
    pub fn insert(&mut self, feature: impl Into<String>, thresholds: Vec<f64>) {
        self.thresholds.insert(feature.into(), thresholds);
    }

    /// Thresholds for `feature`; empty when none were registered
    pub fn get(&self, feature: &str) -> &[f64] {
        self.thresholds.get(feature).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of candidate thresholds
    pub fn len(&self) -> usize {
        self.thresholds.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Midpoints between sorted distinct observed values of every feature.
    ///
    /// Absent values count as `0.0`. When a feature has more than
    /// `max_per_feature` midpoints, evenly spaced ones are kept.
    pub fn from_dataset<E: Instance>(
        dataset: &DataSet<E>,
        features: &Features,
        max_per_feature: usize,
    ) -> Self {
        let mut candidates = Self::new();
        for feature in features.iter() {
            let mut values: Vec<f64> = dataset
                .iter()
                .map(|inst| inst.get(feature))
                .filter(|v| v.is_finite())
                .collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();

            let midpoints: Vec<f64> = values
                .windows(2)
                .map(|w| (w[0] + w[1]) / 2.0)
                .collect();
            candidates.insert(feature, thin(midpoints, max_per_feature));
        }
        candidates
    }
}

fn thin(values: Vec<f64>, max: usize) -> Vec<f64> {
    if max == 0 || values.len() <= max {
        return values;
    }
    let step = values.len() as f64 / max as f64;
    (0..max)
        .map(|i| values[((i as f64 + 0.5) * step) as usize])
        .collect()
}
