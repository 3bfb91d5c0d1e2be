//! Sparse labeled instances

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read access shared by everything the learners consume.
///
/// Values are sparse: a feature that is not present reads as `0.0`.
pub trait Instance {
    /// Value of `feature`, or `0.0` when absent
    fn get(&self, feature: &str) -> f64;

    /// Scalar outcome used as the regression target
    fn outcome(&self) -> f64;

    /// Class label for categorical use
    fn class_name(&self) -> &str;

    /// Names of all features present on this instance
    fn feature_names(&self) -> Vec<&str>;
}

/// Labeled sparse numeric vector
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseInstance {
    /// Identifier
    pub id: String,
    /// Class label
    pub class_name: String,
    /// Regression outcome
    pub outcome: f64,
    values: BTreeMap<String, f64>,
    results: BTreeMap<String, f64>,
}

impl SparseInstance {
    /// Create an instance with outcome `0.0`
    pub fn new(
        id: impl Into<String>,
        class_name: impl Into<String>,
        values: impl IntoIterator<Item = (String, f64)>,
    ) -> Self {
        Self {
            id: id.into(),
            class_name: class_name.into(),
            outcome: 0.0,
            values: values.into_iter().collect(),
            results: BTreeMap::new(),
        }
    }

    /// Build an anonymous instance from `(feature, value)` pairs
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self::new(
            "",
            "",
            pairs.into_iter().map(|(f, v)| (f.to_string(), v)),
        )
    }

    /// Set the outcome
    pub fn with_outcome(mut self, outcome: f64) -> Self {
        self.outcome = outcome;
        self
    }

    /// Set a feature value
    pub fn put(&mut self, feature: impl Into<String>, value: f64) {
        self.values.insert(feature.into(), value);
    }

    /// Remove a feature, returning its value if it was present
    pub fn remove(&mut self, feature: &str) -> Option<f64> {
        self.values.remove(feature)
    }

    /// Iterate `(feature, value)` pairs in feature order
    pub fn features(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(f, &v)| (f.as_str(), v))
    }

    /// Multiply present features by per-feature weights.
    ///
    /// Features without a weight are left unchanged. This is how feature
    /// weighting is expressed for point metrics.
    pub fn scale(&mut self, weights: &BTreeMap<String, f64>) {
        for (feature, value) in self.values.iter_mut() {
            if let Some(w) = weights.get(feature) {
                *value *= w;
            }
        }
    }

    /// Record a named result, e.g. a prediction
    pub fn put_result(&mut self, name: impl Into<String>, value: f64) {
        self.results.insert(name.into(), value);
    }

    /// Read back a named result
    pub fn result(&self, name: &str) -> Option<f64> {
        self.results.get(name).copied()
    }

    /// Number of present features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Instance for SparseInstance {
    fn get(&self, feature: &str) -> f64 {
        self.values.get(feature).copied().unwrap_or(0.0)
    }

    fn outcome(&self) -> f64 {
        self.outcome
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn feature_names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }
}
