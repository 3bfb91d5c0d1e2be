//! Ordered instance collections

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::features::Features;
use super::instance::Instance;

/// Ordered collection of instances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet<E> {
    instances: Vec<E>,
}

impl<E> Default for DataSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> DataSet<E> {
    pub fn new() -> Self {
        Self { instances: Vec::new() }
    }

    pub fn push(&mut self, instance: E) {
        self.instances.push(instance);
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.instances.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut E> {
        self.instances.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.instances.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, E> {
        self.instances.iter_mut()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.instances
    }
}

impl<E: Clone> DataSet<E> {
    /// Copy the instances at `indices`, in the given order
    pub fn subset(&self, indices: &[usize]) -> Self {
        indices
            .iter()
            .filter_map(|&i| self.instances.get(i).cloned())
            .collect()
    }
}

impl<E: Instance> DataSet<E> {
    /// Outcomes of all instances, in order
    pub fn outcomes(&self) -> Array1<f64> {
        self.instances.iter().map(|i| i.outcome()).collect()
    }

    /// Dense matrix with one row per instance and one column per feature index.
    ///
    /// Missing values are `0.0`.
    pub fn as_matrix(&self, features: &Features) -> Array2<f64> {
        let n_features = features.len();
        let mut matrix = Array2::zeros((self.instances.len(), n_features));
        for (row, instance) in self.instances.iter().enumerate() {
            for col in 0..n_features {
                if let Some(feature) = features.feature_by_index(col) {
                    matrix[[row, col]] = instance.get(feature);
                }
            }
        }
        matrix
    }
}

impl<E> FromIterator<E> for DataSet<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            instances: iter.into_iter().collect(),
        }
    }
}

impl<E> From<Vec<E>> for DataSet<E> {
    fn from(instances: Vec<E>) -> Self {
        Self { instances }
    }
}

impl<E> IntoIterator for DataSet<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a DataSet<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SparseInstance;

    fn sample() -> DataSet<SparseInstance> {
        vec![
            SparseInstance::from_pairs([("a", 1.0), ("b", 2.0)]).with_outcome(1.0),
            SparseInstance::from_pairs([("b", 5.0)]).with_outcome(2.0),
            SparseInstance::from_pairs([("c", 9.0)]).with_outcome(3.0),
        ]
        .into()
    }

    #[test]
    fn test_as_matrix_follows_feature_order() {
        let features = Features::from_list(["b", "a"]);
        let m = sample().as_matrix(&features);
        assert_eq!(m.shape(), &[3, 2]);
        // re-indexed alphabetically: a, b
        assert_eq!(m.row(0).to_vec(), vec![1.0, 2.0]);
        assert_eq!(m.row(1).to_vec(), vec![0.0, 5.0]);
        assert_eq!(m.row(2).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_outcomes_and_subset() {
        let ds = sample();
        assert_eq!(ds.outcomes().to_vec(), vec![1.0, 2.0, 3.0]);
        let sub = ds.subset(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.get(0).map(|i| i.outcome), Some(3.0));
    }
}
