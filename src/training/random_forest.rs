//! Random forest of regression trees

use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::ForestConfig;
use super::decision_tree::RegressionTree;
use super::splits::SplitCandidates;
use crate::data::{DataSet, Features, Instance};
use crate::error::{PipelineError, Result};

/// Bagged ensemble of regression trees with per-node feature sampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionForest {
    trees: Vec<RegressionTree>,
    config: ForestConfig,
}

impl RegressionForest {
    /// Train `n_trees` trees in parallel.
    ///
    /// Tree `i` draws its bootstrap sample and feature subsets from its own
    /// source seeded with `random_seed + i`, so the result does not depend on
    /// thread scheduling.
    pub fn train<E: Instance + Sync>(
        dataset: &DataSet<E>,
        features: &Features,
        splits: &SplitCandidates,
        config: &ForestConfig,
    ) -> Result<Self> {
        config.validate()?;
        let n_samples = dataset.len();
        if n_samples == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        let base_seed = config.tree.random_seed;

        let trees: Vec<RegressionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let rows: Vec<usize> = if config.bootstrap {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                let tree_config = config.tree.clone().with_random_seed(seed);
                RegressionTree::train_on_rows(dataset, rows, features, splits, &tree_config)
            })
            .collect::<Result<_>>()?;

        info!(n_trees = trees.len(), n_samples, "Trained regression forest");
        Ok(Self {
            trees,
            config: config.clone(),
        })
    }

    /// Mean prediction over all trees
    pub fn predict<E: Instance>(&self, instance: &E) -> f64 {
        self.trees.iter().map(|t| t.predict(instance)).sum::<f64>() / self.trees.len() as f64
    }

    /// Predictions for every instance, in order
    pub fn predict_dataset<E: Instance + Sync>(&self, dataset: &DataSet<E>) -> Array1<f64> {
        let predictions: Vec<f64> = dataset
            .as_slice()
            .par_iter()
            .map(|inst| self.predict(inst))
            .collect();
        Array1::from_vec(predictions)
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SparseInstance;
    use crate::training::TreeConfig;

    fn regression_data() -> DataSet<SparseInstance> {
        (0..40)
            .map(|i| {
                let x = i as f64;
                SparseInstance::from_pairs([("x", x), ("z", (i % 4) as f64)]).with_outcome(2.0 * x)
            })
            .collect()
    }

    fn fit(config: &ForestConfig) -> (DataSet<SparseInstance>, RegressionForest) {
        let ds = regression_data();
        let features = Features::create_from_datasets(&[&ds]);
        let splits = SplitCandidates::from_dataset(&ds, &features, 16);
        let forest = RegressionForest::train(&ds, &features, &splits, config).unwrap();
        (ds, forest)
    }

    #[test]
    fn test_forest_regression() {
        let config = ForestConfig::new(8).with_tree(TreeConfig::new().with_min_size(2).with_k(0.7));
        let (ds, forest) = fit(&config);
        assert_eq!(forest.n_trees(), 8);

        let predictions = forest.predict_dataset(&ds);
        let mse: f64 = predictions
            .iter()
            .zip(ds.outcomes().iter())
            .map(|(p, y)| (p - y).powi(2))
            .sum::<f64>()
            / ds.len() as f64;
        // outcomes span 0..78; a constant predictor would score ~530
        assert!(mse < 100.0, "MSE too high: {}", mse);
    }

    #[test]
    fn test_forest_is_reproducible() {
        let config = ForestConfig::new(4).with_tree(TreeConfig::new().with_min_size(2).with_k(0.5));
        let (_, first) = fit(&config);
        let (_, second) = fit(&config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_without_bootstrap_trees_see_all_rows() {
        let config = ForestConfig::new(3)
            .with_bootstrap(false)
            .with_tree(TreeConfig::new().with_min_size(2));
        let (ds, forest) = fit(&config);
        for tree in forest.trees() {
            assert_eq!(tree.root().n_samples(), ds.len());
        }
        // k = 1 and no bootstrap: every tree is identical apart from its seed
        assert_eq!(forest.trees()[0].root(), forest.trees()[2].root());
    }
}
