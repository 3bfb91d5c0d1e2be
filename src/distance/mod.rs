//! Distance metrics
//!
//! [`Distance`] is the single-method capability every metric implements.
//! [`SparseMetric`] covers the usual point metrics over sparse instances and
//! [`DynamicTimeWarping`] lifts any point metric to whole sequences.

mod dtw;

pub use dtw::DynamicTimeWarping;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::data::{Instance, SparseInstance};
use crate::error::PipelineError;

/// Dissimilarity between two values of `T`
pub trait Distance<T: ?Sized> {
    fn distance(&self, a: &T, b: &T) -> f64;
}

impl<T: ?Sized, F> Distance<T> for F
where
    F: Fn(&T, &T) -> f64,
{
    fn distance(&self, a: &T, b: &T) -> f64 {
        self(a, b)
    }
}

/// Point metric over sparse instances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SparseMetric {
    /// Euclidean distance (L2)
    Euclidean,
    /// Manhattan distance (L1)
    Manhattan,
    /// Minkowski distance with parameter p
    Minkowski(f64),
    /// Largest per-feature difference
    Chebyshev,
}

impl Default for SparseMetric {
    fn default() -> Self {
        Self::Euclidean
    }
}

impl Distance<SparseInstance> for SparseMetric {
    fn distance(&self, a: &SparseInstance, b: &SparseInstance) -> f64 {
        let features: BTreeSet<&str> = a
            .feature_names()
            .into_iter()
            .chain(b.feature_names())
            .collect();
        let diffs = features.into_iter().map(|f| (a.get(f) - b.get(f)).abs());

        match *self {
            SparseMetric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            SparseMetric::Manhattan => diffs.sum(),
            SparseMetric::Minkowski(p) => diffs.map(|d| d.powf(p)).sum::<f64>().powf(1.0 / p),
            SparseMetric::Chebyshev => diffs.fold(0.0, f64::max),
        }
    }
}

impl FromStr for SparseMetric {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Self::Euclidean),
            "manhattan" | "l1" => Ok(Self::Manhattan),
            "chebyshev" | "max" => Ok(Self::Chebyshev),
            other => Err(PipelineError::InvalidParameter {
                name: "metric".to_string(),
                value: other.to_string(),
                reason: "expected euclidean, manhattan or chebyshev".to_string(),
            }),
        }
    }
}
