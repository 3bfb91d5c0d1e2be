//! Tree-based regression
//!
//! Provides:
//! - [`RegressionTree`]: CART-style regression tree minimising squared error
//! - [`RegressionForest`]: bagged trees with per-node feature sampling
//! - [`SplitCandidates`]: per-feature candidate thresholds fed to the learners
//! - [`TreeConfig`] / [`ForestConfig`]: learner parameters

mod config;
pub mod decision_tree;
pub mod random_forest;
pub mod splits;

pub use config::{ForestConfig, TreeConfig, MAX_TREE_DEPTH};
pub use decision_tree::{RegressionTree, TreeNode};
pub use random_forest::RegressionForest;
pub use splits::SplitCandidates;
