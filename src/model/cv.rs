//! Stratified k-fold splitting.

use std::collections::BTreeMap;

use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};

/// One train/validation split.
#[derive(Debug, Clone)]
pub struct Fold {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// K folds that keep each class's share roughly equal across folds.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize, shuffle: bool, seed: u64) -> Self {
        Self {
            n_splits,
            shuffle,
            seed,
        }
    }

    pub fn split(&self, y: &Array1<f64>) -> Result<Vec<Fold>> {
        let n = y.len();
        if self.n_splits < 2 {
            return Err(Error::InvalidInput(format!(
                "n_fold must be at least 2, got {}",
                self.n_splits
            )));
        }
        if n < self.n_splits {
            return Err(Error::InvalidInput(format!(
                "n_fold ({}) exceeds the number of samples ({n})",
                self.n_splits
            )));
        }

        // BTreeMap: classes are visited in a fixed order so the seed alone
        // determines the folds.
        let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &label) in y.iter().enumerate() {
            by_class.entry(label.round() as i64).or_default().push(idx);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        let mut next = 0;
        for indices in by_class.values_mut() {
            if self.shuffle {
                indices.shuffle(&mut rng);
            }
            // continue round-robin across classes so fold sizes stay balanced
            for &idx in indices.iter() {
                folds[next].push(idx);
                next = (next + 1) % self.n_splits;
            }
        }

        Ok((0..self.n_splits)
            .map(|k| {
                let mut test_indices = folds[k].clone();
                test_indices.sort_unstable();
                let mut train_indices: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != k)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();
                train_indices.sort_unstable();
                Fold {
                    train_indices,
                    test_indices,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Array1<f64> {
        Array1::from_iter((0..20).map(|i| if i % 4 == 0 { 1.0 } else { 0.0 }))
    }

    #[test]
    fn folds_partition_samples() {
        let folds = StratifiedKFold::new(5, true, 42).split(&labels()).unwrap();
        assert_eq!(folds.len(), 5);

        let mut all: Vec<usize> = folds.iter().flat_map(|f| f.test_indices.clone()).collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.test_indices.len() + fold.train_indices.len(), 20);
            assert!(fold.test_indices.iter().all(|i| !fold.train_indices.contains(i)));
        }
    }

    #[test]
    fn each_fold_keeps_class_share() {
        let y = labels();
        let folds = StratifiedKFold::new(5, true, 3).split(&y).unwrap();
        for fold in folds {
            let positives = fold.test_indices.iter().filter(|&&i| y[i] == 1.0).count();
            assert_eq!(positives, 1);
            assert_eq!(fold.test_indices.len(), 4);
        }
    }

    #[test]
    fn seed_determines_folds() {
        let y = labels();
        let a = StratifiedKFold::new(4, true, 9).split(&y).unwrap();
        let b = StratifiedKFold::new(4, true, 9).split(&y).unwrap();
        let tests = |f: &[Fold]| f.iter().map(|f| f.test_indices.clone()).collect::<Vec<_>>();
        assert_eq!(tests(&a), tests(&b));
    }

    #[test]
    fn rejects_bad_fold_counts() {
        assert!(StratifiedKFold::new(1, true, 0).split(&labels()).is_err());
        assert!(StratifiedKFold::new(30, true, 0).split(&labels()).is_err());
    }
}
