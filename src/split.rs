//! Train/validation splitting and cross-validation folds.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

use crate::error::{PipelineError, Result};

/// Row indices of the two partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Seeded random split. `ceil(test_fraction * n_samples)` rows go to the
/// test partition; the same seed always yields the same partition.
pub fn train_test_split(n_samples: usize, test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::Split {
            n_samples,
            reason: format!("test fraction {} is not in (0, 1)", test_fraction),
        });
    }
    let n_test = (test_fraction * n_samples as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(PipelineError::Split {
            n_samples,
            reason: format!("a test fraction of {} leaves an empty partition", test_fraction),
        });
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(TrainTestSplit { train, test: indices })
}

/// A single cross-validation fold.
#[derive(Debug, Clone)]
pub struct Fold {
    pub train_indices: Vec<usize>,
    pub val_indices: Vec<usize>,
}

/// Deterministic stratified k-fold.
///
/// Samples are grouped by class (classes in ascending order, samples in
/// their original order) and dealt round-robin across the folds, so fold
/// sizes differ by at most one and every class is spread evenly.
pub fn stratified_k_fold(labels: &[usize], k: usize) -> Result<Vec<Fold>> {
    let n_samples = labels.len();
    if k < 2 {
        return Err(PipelineError::Split {
            n_samples,
            reason: format!("cross-validation needs at least 2 folds, got {}", k),
        });
    }
    if n_samples < k {
        return Err(PipelineError::Split {
            n_samples,
            reason: format!("cannot build {} folds", k),
        });
    }

    let mut class_indices: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        class_indices.entry(label).or_default().push(i);
    }

    let mut assignment = vec![0usize; n_samples];
    let mut position = 0;
    for indices in class_indices.values() {
        for &i in indices {
            assignment[i] = position % k;
            position += 1;
        }
    }

    let folds = (0..k)
        .map(|fold| {
            let (val_indices, train_indices): (Vec<usize>, Vec<usize>) =
                (0..n_samples).partition(|&i| assignment[i] == fold);
            Fold {
                train_indices,
                val_indices,
            }
        })
        .collect();
    Ok(folds)
}
