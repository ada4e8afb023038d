//! Exhaustive hyperparameter search with stratified cross-validation.

use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use ndarray::{Array1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::error::{PipelineError, Result};
use crate::metrics::accuracy;
use crate::model::{BoostingParams, GradientBoostedTrees};
use crate::split::{stratified_k_fold, Fold};

/// The values tried for each searched hyperparameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub learning_rate: Vec<f64>,
    pub max_depth: Vec<usize>,
    pub n_estimators: Vec<usize>,
    pub subsample: Vec<f64>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            learning_rate: vec![0.01, 0.1, 0.2],
            max_depth: vec![3, 5, 7],
            n_estimators: vec![100, 200, 300],
            subsample: vec![0.8, 1.0],
        }
    }
}

impl ParamGrid {
    pub fn len(&self) -> usize {
        self.learning_rate.len()
            * self.max_depth.len()
            * self.n_estimators.len()
            * self.subsample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination layered over `base`, with the last parameter
    /// (`subsample`) varying fastest.
    pub fn candidates(&self, base: &BoostingParams) -> Vec<BoostingParams> {
        let mut out = Vec::with_capacity(self.len());
        for &learning_rate in &self.learning_rate {
            for &max_depth in &self.max_depth {
                for &n_estimators in &self.n_estimators {
                    for &subsample in &self.subsample {
                        out.push(BoostingParams {
                            learning_rate,
                            max_depth,
                            n_estimators,
                            subsample,
                            ..base.clone()
                        });
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub params: BoostingParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

/// Outcome of a search: every candidate's scores and the refit winner.
#[derive(Debug)]
pub struct SearchOutcome {
    pub best_index: usize,
    pub results: Vec<CandidateScore>,
    pub model: GradientBoostedTrees,
}

impl SearchOutcome {
    pub fn best(&self) -> &CandidateScore {
        &self.results[self.best_index]
    }
}

pub struct GridSearch {
    grid: ParamGrid,
    base: BoostingParams,
    n_folds: usize,
}

impl GridSearch {
    pub fn new(grid: ParamGrid, base: BoostingParams, n_folds: usize) -> Self {
        Self { grid, base, n_folds }
    }

    /// Scores every candidate by mean fold accuracy and refits the best one
    /// on all of `x`. Ties go to the candidate that comes first in the grid.
    pub fn fit(&self, x: ArrayView2<'_, f64>, y: &Array1<usize>) -> Result<SearchOutcome> {
        let candidates = self.grid.candidates(&self.base);
        if candidates.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "the parameter grid is empty".to_string(),
            ));
        }
        let labels = y.to_vec();
        let folds = stratified_k_fold(&labels, self.n_folds)?;

        log::info!(
            "Fitting {} folds for each of {} candidates, totalling {} fits",
            folds.len(),
            candidates.len(),
            folds.len() * candidates.len()
        );

        let results = candidates
            .into_par_iter()
            .map(|params| score_candidate(params, x, &labels, &folds))
            .collect::<Result<Vec<_>>>()?;

        let mut best_index = 0;
        for (i, result) in results.iter().enumerate() {
            log::debug!(
                "[{}/{}] {} -> mean accuracy {:.4}",
                i + 1,
                results.len(),
                result.params,
                result.mean_score
            );
            if result.mean_score > results[best_index].mean_score {
                best_index = i;
            }
        }

        let best = &results[best_index];
        log::info!(
            "Best parameters: {} (cv accuracy {:.4})",
            best.params,
            best.mean_score
        );

        let model = best.params.fit(&DatasetBase::new(x.to_owned(), y.to_owned()))?;
        Ok(SearchOutcome {
            best_index,
            results,
            model,
        })
    }
}

fn score_candidate(
    params: BoostingParams,
    x: ArrayView2<'_, f64>,
    labels: &[usize],
    folds: &[Fold],
) -> Result<CandidateScore> {
    let mut fold_scores = Vec::with_capacity(folds.len());
    for fold in folds {
        let x_train = x.select(Axis(0), &fold.train_indices);
        let y_train: Array1<usize> = fold.train_indices.iter().map(|&i| labels[i]).collect();
        let x_val = x.select(Axis(0), &fold.val_indices);
        let y_val: Vec<usize> = fold.val_indices.iter().map(|&i| labels[i]).collect();

        let model = params.fit(&DatasetBase::new(x_train, y_train))?;
        let predicted = model.predict(&x_val);
        fold_scores.push(accuracy(&y_val, &predicted.to_vec()));
    }
    let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
    Ok(CandidateScore {
        params,
        fold_scores,
        mean_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_default_grid_size_and_order() {
        let grid = ParamGrid::default();
        assert_eq!(grid.len(), 54);

        let candidates = grid.candidates(&BoostingParams::default());
        assert_eq!(candidates.len(), 54);
        assert_eq!(candidates[0].learning_rate, 0.01);
        assert_eq!(candidates[0].subsample, 0.8);
        assert_eq!(candidates[1].subsample, 1.0);
        assert_eq!(candidates[1].n_estimators, 100);
        assert_eq!(candidates[2].n_estimators, 200);
        assert_eq!(candidates[53].learning_rate, 0.2);
        assert_eq!(candidates[53].max_depth, 7);
        assert!(candidates.iter().all(|c| c.n_classes == 4));
    }

    fn separable() -> (Array2<f64>, Array1<usize>) {
        let n = 60;
        let x = Array2::from_shape_fn((n, 1), |(i, _)| {
            (i % 3) as f64 * 10.0 + (i / 3) as f64 * 0.01
        });
        let y = Array1::from_shape_fn(n, |i| i % 3);
        (x, y)
    }

    #[test]
    fn test_search_picks_a_winner_and_refits() {
        let (x, y) = separable();
        let grid = ParamGrid {
            learning_rate: vec![0.3],
            max_depth: vec![2, 3],
            n_estimators: vec![5],
            subsample: vec![1.0],
        };
        let base = BoostingParams {
            n_classes: 3,
            ..Default::default()
        };
        let outcome = GridSearch::new(grid, base, 3).fit(x.view(), &y).unwrap();

        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.results.iter().all(|r| r.fold_scores.len() == 3));
        assert_eq!(outcome.model.params(), &outcome.best().params);
        for r in &outcome.results {
            assert!(r.mean_score <= outcome.best().mean_score);
        }
        // Both candidates separate the data perfectly; the first one wins.
        assert_eq!(outcome.best_index, 0);
        assert_eq!(outcome.best().mean_score, 1.0);
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        let (x, y) = separable();
        let grid = ParamGrid {
            learning_rate: vec![],
            ..Default::default()
        };
        let err = GridSearch::new(grid, BoostingParams::default(), 3)
            .fit(x.view(), &y)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }
}
