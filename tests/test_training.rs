//! Integration test: regression tree training end-to-end

use pipeline_toolkit::prelude::*;

fn clustered_data() -> DataSet<SparseInstance> {
    let mut ds = DataSet::new();
    for i in 0..10 {
        let i = i as f64;
        ds.push(
            SparseInstance::from_pairs([("dose", 1.0 + i * 0.1), ("age", 30.0 + i)])
                .with_outcome(0.1 * (i % 2.0)),
        );
        ds.push(
            SparseInstance::from_pairs([("dose", 5.0 + i * 0.1), ("age", 35.0 + i)])
                .with_outcome(10.0 - 0.1 * (i % 2.0)),
        );
    }
    ds
}

fn train(ds: &DataSet<SparseInstance>, config: &TreeConfig) -> RegressionTree {
    let features = Features::create_from_datasets(&[ds]);
    let splits = SplitCandidates::from_dataset(ds, &features, 0);
    RegressionTree::train(ds, &features, &splits, config).expect("training should succeed")
}

#[test]
fn test_two_clusters_split_on_separating_feature() {
    let ds = clustered_data();
    let tree = train(&ds, &TreeConfig::new().with_min_size(3).with_max_depth(3));

    let (feature, _) = tree.root().split().expect("root should split");
    assert_eq!(feature, "dose");

    let (high, low) = tree.root().children().unwrap();
    assert!((high.value() - 9.95).abs() < 1e-9, "high = {}", high.value());
    assert!((low.value() - 0.05).abs() < 1e-9, "low = {}", low.value());

    let query_low = SparseInstance::from_pairs([("dose", 1.2), ("age", 31.0)]);
    let query_high = SparseInstance::from_pairs([("dose", 5.2), ("age", 31.0)]);
    assert!(tree.predict(&query_low) < 1.0);
    assert!(tree.predict(&query_high) > 9.0);
}

#[test]
fn test_structural_limits_hold_across_configs() {
    let ds: DataSet<SparseInstance> = (0..60)
        .map(|i| {
            let x = i as f64;
            SparseInstance::from_pairs([("x", x), ("y", (i % 7) as f64)])
                .with_outcome((x / 6.0).sin() * 10.0 + (i % 7) as f64)
        })
        .collect();

    for (min_size, max_depth) in [(0, 2), (1, 5), (4, 8), (10, 3)] {
        let tree = train(&ds, &TreeConfig::new().with_min_size(min_size).with_max_depth(max_depth));
        let mut stack = vec![tree.root()];
        while let Some(node) = stack.pop() {
            assert!(node.depth() <= max_depth);
            match node.children() {
                Some((left, right)) => {
                    assert!(node.depth() < max_depth, "node at max depth has children");
                    assert!(left.n_samples() > min_size);
                    assert!(right.n_samples() > min_size);
                    assert_eq!(left.n_samples() + right.n_samples(), node.n_samples());
                    stack.push(left);
                    stack.push(right);
                }
                None => assert!(node.n_samples() > 0),
            }
        }
    }
}

#[test]
fn test_leaf_prediction_is_idempotent() {
    let ds = clustered_data();
    let tree = train(&ds, &TreeConfig::new().with_min_size(1));

    for leaf in tree.leaves() {
        let expected = leaf.value();
        let mean = leaf
            .samples()
            .iter()
            .map(|&i| ds.get(i).unwrap().outcome)
            .sum::<f64>()
            / leaf.n_samples() as f64;
        assert!((expected - mean).abs() < 1e-12);

        for _ in 0..2 {
            for &i in leaf.samples() {
                assert_eq!(tree.predict(ds.get(i).unwrap()), expected);
            }
        }
    }
}

#[test]
fn test_feature_sampling_is_reproducible() {
    let ds = clustered_data();
    let config = TreeConfig::new().with_min_size(1).with_k(0.4).with_random_seed(2024);

    let first = train(&ds, &config);
    let second = train(&ds, &config);

    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(first.predict_dataset(&ds), second.predict_dataset(&ds));
}

#[test]
fn test_config_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, br#"{"minSize": 1, "maxDepth": 1, "k": 1.0, "randomSeed": 3}"#)
        .unwrap();

    let config = TreeConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config, TreeConfig::new().with_min_size(1).with_max_depth(1).with_random_seed(3));

    let tree = train(&clustered_data(), &config);
    assert_eq!(tree.depth(), 1);
    assert_eq!(tree.n_leaves(), 2);
}

#[test]
fn test_tree_json_round_trip() {
    let ds = clustered_data();
    let tree = train(&ds, &TreeConfig::new().with_min_size(2));
    let json = serde_json::to_string(&tree).unwrap();
    let restored: RegressionTree = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.n_nodes(), tree.n_nodes());
    for (a, b) in restored.predict_dataset(&ds).iter().zip(tree.predict_dataset(&ds).iter()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn test_train_from_delimited_text() {
    let text = "\
# id;class;outcome;values
a;low;1.0;x=1
b;low;1.0;x=2
c;low;1.0;x=3
d;high;9.0;x=10
e;high;9.0;x=11
f;high;9.0;x=12
";
    let ds = DataSet::from_reader(text.as_bytes()).unwrap();
    let tree = train(&ds, &TreeConfig::new().with_min_size(1));
    assert_eq!(tree.root().split().map(|(f, _)| f), Some("x"));
    assert_eq!(tree.predict(&SparseInstance::from_pairs([("x", 11.5)])), 9.0);
    assert_eq!(tree.predict(&SparseInstance::default()), 1.0);
}

#[test]
fn test_forest_averages_bootstrapped_trees() {
    let ds = clustered_data();
    let features = Features::create_from_datasets(&[&ds]);
    let splits = SplitCandidates::from_dataset(&ds, &features, 0);
    let config = ForestConfig::new(5).with_tree(TreeConfig::new().with_min_size(2));

    let forest = RegressionForest::train(&ds, &features, &splits, &config).unwrap();
    let query = SparseInstance::from_pairs([("dose", 5.5), ("age", 44.0)]);
    assert_eq!(forest.n_trees(), 5);
    assert!(forest.predict(&query) > 5.0);
}
