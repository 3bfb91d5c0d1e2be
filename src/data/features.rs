//! Feature registry
//!
//! Maps feature names to dense integer indices. Indices are contiguous and
//! alphabetically ordered right after [`Features::recalculate_index`]. Removing
//! a feature only drops it from the name lookup; index positions and `len()`
//! stay stale until the next re-index.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use super::dataset::DataSet;
use super::instance::{Instance, SparseInstance};
use crate::error::{PipelineError, Result};

/// Bijection between feature names and indices
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Features {
    by_index: Vec<String>,
    indices: HashMap<String, usize>,
    descriptions: HashMap<String, String>,
}

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry over `names`, re-indexed alphabetically
    pub fn from_list<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut features = Self::new();
        for name in names {
            features.add_feature(name.as_ref());
        }
        features.recalculate_index();
        features
    }

    /// Append a feature. Duplicates are ignored.
    pub fn add_feature(&mut self, feature: &str) {
        if !self.by_index.iter().any(|f| f == feature) {
            self.by_index.push(feature.to_string());
            self.indices.insert(feature.to_string(), self.by_index.len() - 1);
        }
    }

    /// Drop a feature from the name lookup.
    ///
    /// Index positions are not touched; call [`recalculate_index`](Self::recalculate_index)
    /// afterwards to compact them.
    pub fn remove_feature(&mut self, feature: &str) {
        self.indices.remove(feature);
    }

    /// Rebuild contiguous indices in alphabetical order
    pub fn recalculate_index(&mut self) {
        let mut names: Vec<String> = self.indices.keys().cloned().collect();
        names.sort();
        self.indices = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        self.by_index = names;
    }

    pub fn index_of(&self, feature: &str) -> Option<usize> {
        self.indices.get(feature).copied()
    }

    pub fn feature_by_index(&self, index: usize) -> Option<&str> {
        self.by_index.get(index).map(String::as_str)
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.by_index.iter().any(|f| f == feature)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Feature names in index order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.by_index.iter().map(String::as_str)
    }

    /// Names currently in the lookup (excludes removed features)
    pub fn as_set(&self) -> HashSet<&str> {
        self.indices.keys().map(String::as_str).collect()
    }

    pub fn as_list(&self) -> Vec<String> {
        self.by_index.clone()
    }

    pub fn add_description(&mut self, feature: impl Into<String>, description: impl Into<String>) {
        self.descriptions.insert(feature.into(), description.into());
    }

    /// Description of a feature, falling back to its name
    pub fn description<'a>(&'a self, feature: &'a str) -> &'a str {
        self.descriptions
            .get(feature)
            .map(String::as_str)
            .unwrap_or(feature)
    }

    /// Collect every feature seen in the given datasets
    pub fn create_from_datasets<E: Instance>(datasets: &[&DataSet<E>]) -> Self {
        let mut features = Self::new();
        for ds in datasets {
            for instance in ds.iter() {
                for name in instance.feature_names() {
                    features.add_feature(name);
                }
            }
        }
        features.recalculate_index();
        features
    }

    /// One registry per class label
    pub fn create_from_datasets_per_class<E: Instance>(datasets: &[&DataSet<E>]) -> HashMap<String, Features> {
        let mut per_class: HashMap<String, Features> = HashMap::new();
        for ds in datasets {
            for instance in ds.iter() {
                let features = per_class.entry(instance.class_name().to_string()).or_default();
                for name in instance.feature_names() {
                    features.add_feature(name);
                }
            }
        }
        for features in per_class.values_mut() {
            features.recalculate_index();
        }
        per_class
    }

    /// One instance per feature, carrying only that feature with value `1.0`
    pub fn create_dataset(&self) -> DataSet<SparseInstance> {
        self.by_index
            .iter()
            .map(|f| SparseInstance::new(f.clone(), f.clone(), [(f.clone(), 1.0)]))
            .collect()
    }

    /// Write `index:feature:description` lines
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = BufWriter::new(File::create(path.as_ref())?);
        write!(out, "{}", self)?;
        out.flush()?;
        Ok(())
    }

    /// Read a file written by [`write_to_file`](Self::write_to_file).
    ///
    /// The index column is informational only; features are indexed by line order.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut features = Self::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.splitn(3, ':');
            let _index = parts.next();
            let feature = parts.next().ok_or_else(|| PipelineError::ParseError {
                line: line_no + 1,
                reason: format!("expected index:feature[:description], got '{}'", line),
            })?;
            features.add_feature(feature);
            if let Some(description) = parts.next() {
                features.add_description(feature, description);
            }
        }
        info!(path = %path.as_ref().display(), n_features = features.len(), "Loaded feature list");
        Ok(features)
    }

    /// Load `feature:description` lines. Malformed lines are skipped with a warning.
    pub fn load_description_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        for line in reader.lines() {
            let line = line?;
            match line.split_once(':') {
                Some((feature, description)) if !description.is_empty() => {
                    self.add_description(feature, description)
                }
                _ => warn!(%line, "Unexpected description format"),
            }
        }
        Ok(())
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, feature) in self.by_index.iter().enumerate() {
            writeln!(f, "{}:{}:{}", i, feature, self.description(feature))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_list_sorts_and_dedups() {
        let features = Features::from_list(["los", "age", "sex", "age"]);
        assert_eq!(features.len(), 3);
        assert_eq!(features.as_list(), vec!["age", "los", "sex"]);
        assert_eq!(features.index_of("los"), Some(1));
        assert_eq!(features.feature_by_index(2), Some("sex"));
        assert_eq!(features.index_of("missing"), None);
    }

    #[test]
    fn test_add_appends_index() {
        let mut features = Features::new();
        features.add_feature("z");
        features.add_feature("a");
        assert_eq!(features.index_of("z"), Some(0));
        assert_eq!(features.index_of("a"), Some(1));
    }

    #[test]
    fn test_remove_is_stale_until_reindex() {
        let mut features = Features::from_list(["a", "b", "c"]);
        features.remove_feature("b");

        assert_eq!(features.len(), 3);
        assert!(features.has_feature("b"));
        assert_eq!(features.index_of("b"), None);
        assert_eq!(features.index_of("c"), Some(2));
        assert!(!features.as_set().contains("b"));

        features.recalculate_index();
        assert_eq!(features.len(), 2);
        assert!(!features.has_feature("b"));
        assert_eq!(features.index_of("c"), Some(1));
    }

    #[test]
    fn test_description_fallback() {
        let mut features = Features::from_list(["los"]);
        assert_eq!(features.description("los"), "los");
        features.add_description("los", "Length of stay");
        assert_eq!(features.description("los"), "Length of stay");
        assert_eq!(features.to_string(), "0:los:Length of stay\n");
    }

    #[test]
    fn test_create_dataset() {
        let features = Features::from_list(["a", "b"]);
        let ds = features.create_dataset();
        assert_eq!(ds.len(), 2);
        let first = ds.get(0).unwrap();
        assert_eq!(first.get("a"), 1.0);
        assert_eq!(first.get("b"), 0.0);
        assert_eq!(first.class_name, "a");
    }

    #[test]
    fn test_create_per_class() {
        let ds: DataSet<SparseInstance> = vec![
            SparseInstance::new("1", "x", [("a".to_string(), 1.0)]),
            SparseInstance::new("2", "y", [("b".to_string(), 1.0)]),
            SparseInstance::new("3", "x", [("c".to_string(), 1.0)]),
        ]
        .into();
        let per_class = Features::create_from_datasets_per_class(&[&ds]);
        assert_eq!(per_class["x"].as_list(), vec!["a", "c"]);
        assert_eq!(per_class["y"].as_list(), vec!["b"]);

        let all = Features::create_from_datasets(&[&ds]);
        assert_eq!(all.as_list(), vec!["a", "b", "c"]);
    }
}
