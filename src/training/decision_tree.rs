//! Regression tree implementation
//!
//! Nodes pick the (feature, threshold) pair that minimises the total squared
//! error of both partitions against their own means. Rows with a value
//! `>= threshold` go to the `left` child and the rest to `right`; this naming
//! is kept as-is so dumped trees read the same way everywhere.

use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::config::TreeConfig;
use super::splits::SplitCandidates;
use crate::data::{DataSet, Features, Instance, SparseInstance};
use crate::error::{PipelineError, Result};

/// Regression tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Terminal node predicting the mean outcome of its rows
    Leaf {
        depth: usize,
        value: f64,
        samples: Vec<usize>,
    },
    /// Internal node. `left` holds rows with `value >= threshold`.
    Split {
        depth: usize,
        value: f64,
        samples: Vec<usize>,
        feature: String,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { depth, .. } | TreeNode::Split { depth, .. } => *depth,
        }
    }

    /// Mean outcome of the node's training rows
    pub fn value(&self) -> f64 {
        match self {
            TreeNode::Leaf { value, .. } | TreeNode::Split { value, .. } => *value,
        }
    }

    /// Indices of the training rows that reached this node
    pub fn samples(&self) -> &[usize] {
        match self {
            TreeNode::Leaf { samples, .. } | TreeNode::Split { samples, .. } => samples,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.samples().len()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// Split feature and threshold, `None` for a leaf
    pub fn split(&self) -> Option<(&str, f64)> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split { feature, threshold, .. } => Some((feature.as_str(), *threshold)),
        }
    }

    /// `(left, right)` children, `None` for a leaf
    pub fn children(&self) -> Option<(&TreeNode, &TreeNode)> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split { left, right, .. } => Some((&**left, &**right)),
        }
    }

    fn leaf_for<E: Instance>(&self, instance: &E) -> &TreeNode {
        let mut node = self;
        while let TreeNode::Split { feature, threshold, left, right, .. } = node {
            node = if instance.get(feature) >= *threshold { &**left } else { &**right };
        }
        node
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a TreeNode>) {
        match self {
            TreeNode::Leaf { .. } => out.push(self),
            TreeNode::Split { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    fn n_nodes(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.n_nodes() + right.n_nodes(),
        }
    }

    fn height(&self) -> usize {
        match self {
            TreeNode::Leaf { depth, .. } => *depth,
            TreeNode::Split { left, right, .. } => left.height().max(right.height()),
        }
    }

    fn render(&self) -> String {
        let mut out = format!("{{ 'value' : {:?}, 'num' : {}", self.value(), self.n_samples());
        if let TreeNode::Split { feature, threshold, left, right, .. } = self {
            out.push_str(&format!(", 'splitOn' : '{}', 'splitValue' : {:?}", feature, threshold));
            out.push_str(&format!(", \n'right' : {}", indent(&right.render())));
            out.push_str(&format!(", 'left' : {}", indent(&left.render())));
        }
        out.push('}');
        out
    }
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("  {}\n", line)).collect()
}

/// Best split found at a node
struct Candidate<'a> {
    feature: &'a str,
    threshold: f64,
    error: f64,
}

/// Grows one tree depth-first, owning the shared sampling source
struct TreeGrower<'a, E> {
    dataset: &'a DataSet<E>,
    features: &'a Features,
    splits: &'a SplitCandidates,
    config: &'a TreeConfig,
    rng: ChaCha8Rng,
}

impl<'a, E: Instance> TreeGrower<'a, E> {
    fn outcome(&self, row: usize) -> f64 {
        self.dataset.get(row).map_or(0.0, |inst| inst.outcome())
    }

    fn value(&self, row: usize, feature: &str) -> f64 {
        self.dataset.get(row).map_or(0.0, |inst| inst.get(feature))
    }

    fn mean_outcome(&self, samples: &[usize]) -> f64 {
        samples.iter().map(|&i| self.outcome(i)).sum::<f64>() / samples.len() as f64
    }

    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> TreeNode {
        let value = self.mean_outcome(&samples);

        if depth >= self.config.max_depth || samples.len() <= self.config.min_size {
            return TreeNode::Leaf { depth, value, samples };
        }

        let candidates = self.sample_features();
        let (feature, threshold) = match self.best_split(&samples, &candidates) {
            Some(best) => {
                debug!(
                    depth,
                    feature = best.feature,
                    threshold = best.threshold,
                    error = best.error,
                    n_samples = samples.len(),
                    "Split node"
                );
                (best.feature.to_string(), best.threshold)
            }
            None => return TreeNode::Leaf { depth, value, samples },
        };

        let (ge, lt): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&i| self.value(i, &feature) >= threshold);

        let left = Box::new(self.grow(ge, depth + 1));
        let right = Box::new(self.grow(lt, depth + 1));

        TreeNode::Split {
            depth,
            value,
            samples,
            feature,
            threshold,
            left,
            right,
        }
    }

    /// Features to search at this node.
    ///
    /// With `k < 1` each registered feature is kept with probability `k`, one
    /// draw per feature in index order, and the kept set is ordered by name.
    fn sample_features(&mut self) -> Vec<&'a str> {
        let features: &'a Features = self.features;
        if self.config.k >= 1.0 {
            return features.iter().collect();
        }
        let mut sampled: Vec<&'a str> = Vec::new();
        for name in features.iter() {
            if self.rng.gen::<f64>() < self.config.k {
                sampled.push(name);
            }
        }
        sampled.sort_unstable();
        debug!(n_sampled = sampled.len(), n_features = features.len(), "Sampled features");
        sampled
    }

    /// Exhaustive search; the first strict minimum in enumeration order wins
    fn best_split(&self, samples: &[usize], candidates: &[&'a str]) -> Option<Candidate<'a>> {
        let splits: &'a SplitCandidates = self.splits;
        let min_size = self.config.min_size;
        let mut best: Option<Candidate<'a>> = None;
        let mut best_error = f64::INFINITY;

        for &feature in candidates {
            let values: Vec<f64> = samples.iter().map(|&i| self.value(i, feature)).collect();
            let outcomes: Vec<f64> = samples.iter().map(|&i| self.outcome(i)).collect();

            for &threshold in splits.get(feature) {
                let (mut ge_sum, mut ge_n, mut lt_sum, mut lt_n) = (0.0, 0usize, 0.0, 0usize);
                for (&v, &y) in values.iter().zip(&outcomes) {
                    if v >= threshold {
                        ge_sum += y;
                        ge_n += 1;
                    } else {
                        lt_sum += y;
                        lt_n += 1;
                    }
                }
                if ge_n <= min_size || lt_n <= min_size {
                    continue;
                }

                let ge_mean = ge_sum / ge_n as f64;
                let lt_mean = lt_sum / lt_n as f64;
                let error: f64 = values
                    .iter()
                    .zip(&outcomes)
                    .map(|(&v, &y)| {
                        let mean = if v >= threshold { ge_mean } else { lt_mean };
                        (y - mean).powi(2)
                    })
                    .sum();

                if error < best_error {
                    best_error = error;
                    best = Some(Candidate { feature, threshold, error });
                }
            }
        }
        best
    }
}

/// Trained regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
    config: TreeConfig,
}

impl RegressionTree {
    /// Grow a tree over every row of `dataset`
    pub fn train<E: Instance>(
        dataset: &DataSet<E>,
        features: &Features,
        splits: &SplitCandidates,
        config: &TreeConfig,
    ) -> Result<Self> {
        let rows: Vec<usize> = (0..dataset.len()).collect();
        Self::train_on_rows(dataset, rows, features, splits, config)
    }

    /// Grow a tree over the given row indices (repeats allowed)
    pub fn train_on_rows<E: Instance>(
        dataset: &DataSet<E>,
        rows: Vec<usize>,
        features: &Features,
        splits: &SplitCandidates,
        config: &TreeConfig,
    ) -> Result<Self> {
        config.validate()?;
        if rows.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }
        if let Some(&bad) = rows.iter().find(|&&i| i >= dataset.len()) {
            return Err(PipelineError::ShapeError {
                expected: format!("row index < {}", dataset.len()),
                actual: bad.to_string(),
            });
        }

        let mut grower = TreeGrower {
            dataset,
            features,
            splits,
            config,
            rng: ChaCha8Rng::seed_from_u64(config.random_seed),
        };
        let root = grower.grow(rows, 0);
        let tree = Self {
            root,
            config: config.clone(),
        };
        info!(
            n_samples = tree.root.n_samples(),
            n_nodes = tree.n_nodes(),
            n_leaves = tree.n_leaves(),
            depth = tree.depth(),
            "Trained regression tree"
        );
        Ok(tree)
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Prediction for one instance; absent features read as `0.0`
    pub fn predict<E: Instance>(&self, instance: &E) -> f64 {
        self.root.leaf_for(instance).value()
    }

    /// Leaf an instance is routed to
    pub fn leaf_for<E: Instance>(&self, instance: &E) -> &TreeNode {
        self.root.leaf_for(instance)
    }

    /// Predictions for every instance, in order
    pub fn predict_dataset<E: Instance>(&self, dataset: &DataSet<E>) -> Array1<f64> {
        dataset.iter().map(|inst| self.predict(inst)).collect()
    }

    /// Store predictions on each instance under `result_name`
    pub fn apply(&self, dataset: &mut DataSet<SparseInstance>, result_name: &str) {
        for inst in dataset.iter_mut() {
            let prediction = self.predict(&*inst);
            inst.put_result(result_name, prediction);
        }
    }

    /// Depth of the deepest leaf
    pub fn depth(&self) -> usize {
        self.root.height()
    }

    pub fn n_leaves(&self) -> usize {
        self.leaves().len()
    }

    pub fn n_nodes(&self) -> usize {
        self.root.n_nodes()
    }

    /// Leaves in depth-first order, `>=` side first
    pub fn leaves(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        self.root.collect_leaves(&mut out);
        out
    }
}

impl fmt::Display for RegressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.render())
    }
}
