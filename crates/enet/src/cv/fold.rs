//! Fold generator collaborator (§4.7, §6 "fold generator" contract).

use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Disjoint `(train_indices, test_indices)` folds over the sample axis.
///
/// Deterministic given `n_splits` and `shuffle_seed`: the same seed always
/// produces the same partition (TESTABLE PROPERTY 9).
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    shuffle_seed: Option<u64>,
}

impl KFold {
    pub fn new(n_splits: usize, shuffle_seed: Option<u64>) -> Self {
        assert!(n_splits >= 2, "KFold requires at least 2 splits");
        Self {
            n_splits,
            shuffle_seed,
        }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Yields `n_splits` `(train, test)` index pairs covering `0..n_samples`
    /// disjointly on the test side.
    pub fn split(&self, n_samples: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
        let mut order: Vec<usize> = (0..n_samples).collect();
        if let Some(seed) = self.shuffle_seed {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }

        let n = self.n_splits;
        let base = n_samples / n;
        let remainder = n_samples % n;

        let mut folds = Vec::with_capacity(n);
        let mut start = 0;
        for fold in 0..n {
            let size = base + usize::from(fold < remainder);
            let test: Vec<usize> = order[start..start + size].to_vec();
            let mut train: Vec<usize> = order[..start].to_vec();
            train.extend_from_slice(&order[start + size..]);
            train.sort_unstable();
            let mut test_sorted = test.clone();
            test_sorted.sort_unstable();
            folds.push((train, test_sorted));
            start += size;
        }
        folds
    }
}
