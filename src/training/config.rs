//! Training configuration

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Deepest tree a config may ask for; nodes are grown recursively
pub const MAX_TREE_DEPTH: usize = 256;

/// Configuration for growing a regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeConfig {
    /// Minimum rows per leaf; a split must leave more than this on each side
    pub min_size: usize,

    /// Maximum tree depth (the root is at depth 0), at most [`MAX_TREE_DEPTH`]
    pub max_depth: usize,

    /// Probability that a feature is considered at a node, in (0, 1]
    pub k: f64,

    /// Seed for the feature sampling source
    pub random_seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            min_size: 5,
            max_depth: 10,
            k: 1.0,
            random_seed: 42,
        }
    }
}

impl TreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum leaf size
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set feature sampling probability
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    /// Set random seed
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set a parameter by its option name.
    ///
    /// Recognised names are `minSize`, `maxDepth`, `k` and `randomSeed`. Counts
    /// are given as doubles and truncated.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<()> {
        let invalid = |reason: &str| PipelineError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };
        if !value.is_finite() {
            return Err(invalid("must be finite"));
        }
        match name {
            "minSize" | "maxDepth" | "randomSeed" if value < 0.0 => {
                return Err(invalid("must be non-negative"))
            }
            "maxDepth" if value > MAX_TREE_DEPTH as f64 => {
                return Err(invalid(&format!("must be at most {}", MAX_TREE_DEPTH)))
            }
            "minSize" => self.min_size = value as usize,
            "maxDepth" => self.max_depth = value as usize,
            "randomSeed" => self.random_seed = value as u64,
            "k" => self.k = value,
            _ => return Err(invalid("unknown parameter")),
        }
        Ok(())
    }

    /// Parse and apply a `name=value` assignment
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<()> {
        let (name, raw) = assignment.split_once('=').ok_or_else(|| {
            PipelineError::ConfigError(format!("expected name=value, got '{}'", assignment))
        })?;
        let value = raw.trim().parse::<f64>().map_err(|_| PipelineError::InvalidParameter {
            name: name.trim().to_string(),
            value: raw.trim().to_string(),
            reason: "not a number".to_string(),
        })?;
        self.set_parameter(name.trim(), value)
    }

    /// Check the parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.k > 0.0 && self.k <= 1.0) {
            return Err(PipelineError::InvalidParameter {
                name: "k".to_string(),
                value: self.k.to_string(),
                reason: "must be in (0, 1]".to_string(),
            });
        }
        if self.max_depth > MAX_TREE_DEPTH {
            return Err(PipelineError::InvalidParameter {
                name: "maxDepth".to_string(),
                value: self.max_depth.to_string(),
                reason: format!("must be at most {}", MAX_TREE_DEPTH),
            });
        }
        Ok(())
    }

    /// Load a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration for a bagged ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForestConfig {
    /// Per-tree settings; tree `i` is seeded with `random_seed + i`
    pub tree: TreeConfig,

    /// Number of trees
    pub n_trees: usize,

    /// Resample rows with replacement for each tree
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            tree: TreeConfig {
                k: 0.5,
                ..TreeConfig::default()
            },
            n_trees: 10,
            bootstrap: true,
        }
    }
}

impl ForestConfig {
    pub fn new(n_trees: usize) -> Self {
        Self {
            n_trees,
            ..Self::default()
        }
    }

    pub fn with_tree(mut self, tree: TreeConfig) -> Self {
        self.tree = tree;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(PipelineError::InvalidParameter {
                name: "nTrees".to_string(),
                value: "0".to_string(),
                reason: "need at least one tree".to_string(),
            });
        }
        self.tree.validate()
    }
}
