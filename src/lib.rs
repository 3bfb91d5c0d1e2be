//! Pipeline Toolkit - building blocks for supervised learning pipelines
//!
//! This crate provides:
//! - Sparse instances, time-indexed sequences and datasets
//! - A feature registry mapping feature names to stable indices
//! - Dynamic time warping over sequences with a pluggable point cost
//! - CART-style regression trees and bagged forests
//!
//! # Modules
//!
//! - [`data`] - Instances, sequences, datasets, the feature registry and text readers
//! - [`distance`] - Point metrics and dynamic time warping
//! - [`training`] - Regression trees, forests, split candidates and configuration
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

pub mod data;
pub mod distance;
pub mod training;

// Services
pub mod cli;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{PipelineError, Result};

    pub use crate::data::{DataSet, Features, Instance, Sequence, SparseInstance};

    pub use crate::distance::{Distance, DynamicTimeWarping, SparseMetric};

    pub use crate::training::{
        ForestConfig, RegressionForest, RegressionTree, SplitCandidates, TreeConfig, TreeNode,
    };
}
