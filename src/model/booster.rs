//! Multi-class boosted trees backed by XGBoost's `multi:softmax` objective.
//!
//! [`BoostingParams`] is translated into XGBoost booster and training
//! parameters; the fitted [`xgboost::Booster`] returns one class index per
//! row. The model plugs into `linfa` through [`Fit`] and [`PredictInplace`],
//! so it is trained from a `DatasetBase` and queried with `predict`.

use std::fmt;

use linfa::traits::{Fit, PredictInplace};
use linfa::DatasetBase;
use ndarray::{Array1, ArrayBase, Data, Ix2};
use thiserror::Error;
use xgboost::parameters::learning::{LearningTaskParametersBuilder, Objective};
use xgboost::parameters::tree::TreeBoosterParametersBuilder;
use xgboost::parameters::{
    BoosterParameters, BoosterParametersBuilder, BoosterType, TrainingParametersBuilder,
};
use xgboost::{Booster, DMatrix, XGBError};

#[derive(Error, Debug)]
pub enum BoostError {
    #[error("Invalid boosting parameter: {0}")]
    InvalidParams(String),
    #[error("Cannot fit on an empty dataset.")]
    EmptyDataset,
    #[error("Records have {records} rows but there are {targets} targets.")]
    LengthMismatch { records: usize, targets: usize },
    #[error("Label {label} is out of range for {n_classes} classes.")]
    LabelOutOfRange { label: usize, n_classes: usize },
    #[error("XGBoost rejected the parameters: {0}")]
    Parameters(String),
    #[error("XGBoost error: {0}")]
    XGBoost(#[from] XGBError),
    #[error(transparent)]
    Linfa(#[from] linfa::Error),
}

/// Hyperparameters of [`GradientBoostedTrees`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoostingParams {
    /// Number of target classes (`num_class`)
    pub n_classes: usize,
    /// Shrinkage applied to every leaf (`eta`)
    pub learning_rate: f64,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Number of boosting rounds
    pub n_estimators: usize,
    /// Fraction of rows sampled for each round
    pub subsample: f64,
    /// L2 regularization on leaf weights (`lambda`)
    pub reg_lambda: f64,
    /// Minimum hessian sum per child
    pub min_child_weight: f64,
    /// Seed of XGBoost's row sampler
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_classes: 4,
            learning_rate: 0.3,
            max_depth: 6,
            n_estimators: 100,
            subsample: 1.0,
            reg_lambda: 1.0,
            min_child_weight: 1.0,
            seed: 0,
        }
    }
}

impl fmt::Display for BoostingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "learning_rate={}, max_depth={}, n_estimators={}, subsample={}",
            self.learning_rate, self.max_depth, self.n_estimators, self.subsample
        )
    }
}

impl BoostingParams {
    pub fn validate(&self) -> Result<(), BoostError> {
        if self.n_classes < 2 {
            return Err(BoostError::InvalidParams(format!(
                "n_classes must be at least 2, got {}",
                self.n_classes
            )));
        }
        if !(self.learning_rate > 0.0) {
            return Err(BoostError::InvalidParams(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(BoostError::InvalidParams(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.n_estimators == 0 {
            return Err(BoostError::InvalidParams(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(BoostError::InvalidParams(format!(
                "subsample must be in (0, 1], got {}",
                self.subsample
            )));
        }
        if self.reg_lambda < 0.0 || self.min_child_weight < 0.0 {
            return Err(BoostError::InvalidParams(
                "reg_lambda and min_child_weight must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// XGBoost booster parameters for a `multi:softmax` tree booster.
    fn booster_params(&self) -> Result<BoosterParameters, BoostError> {
        let tree_params = TreeBoosterParametersBuilder::default()
            .eta(self.learning_rate as f32)
            .max_depth(self.max_depth as u32)
            .subsample(self.subsample as f32)
            .lambda(self.reg_lambda as f32)
            .min_child_weight(self.min_child_weight as f32)
            .build()
            .map_err(BoostError::Parameters)?;
        let learning_params = LearningTaskParametersBuilder::default()
            .objective(Objective::MultiSoftmax(self.n_classes as u32))
            .seed(self.seed)
            .build()
            .map_err(BoostError::Parameters)?;
        BoosterParametersBuilder::default()
            .booster_type(BoosterType::Tree(tree_params))
            .learning_params(learning_params)
            .verbose(false)
            .build()
            .map_err(BoostError::Parameters)
    }
}

enum Fitted {
    Booster(Booster),
    // No feature columns to split on: every row gets the majority class.
    Constant(usize),
}

/// A fitted `multi:softmax` ensemble.
pub struct GradientBoostedTrees {
    params: BoostingParams,
    n_features: usize,
    fitted: Fitted,
}

impl fmt::Debug for GradientBoostedTrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradientBoostedTrees")
            .field("params", &self.params)
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}

impl GradientBoostedTrees {
    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    /// Predicted class of every row of `x`.
    pub fn predict_classes<D: Data<Elem = f64>>(
        &self,
        x: &ArrayBase<D, Ix2>,
    ) -> Result<Array1<usize>, BoostError> {
        let booster = match &self.fitted {
            Fitted::Constant(class) => return Ok(Array1::from_elem(x.nrows(), *class)),
            Fitted::Booster(_) if x.nrows() == 0 => return Ok(Array1::zeros(0)),
            Fitted::Booster(booster) => booster,
        };
        let dmatrix = dense_matrix(x)?;
        let last = self.params.n_classes - 1;
        let classes = booster
            .predict(&dmatrix)?
            .into_iter()
            .map(|class| (class.round().max(0.0) as usize).min(last))
            .collect();
        Ok(classes)
    }
}

fn dense_matrix<D: Data<Elem = f64>>(x: &ArrayBase<D, Ix2>) -> Result<DMatrix, XGBError> {
    // Row-major f32 buffer, as DMatrix::from_dense expects.
    let values: Vec<f32> = x.iter().map(|&v| v as f32).collect();
    DMatrix::from_dense(&values, x.nrows())
}

fn majority_class(y: &Array1<usize>, n_classes: usize) -> usize {
    let mut counts = vec![0usize; n_classes];
    for &label in y {
        counts[label] += 1;
    }
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

impl<D: Data<Elem = f64>> Fit<ArrayBase<D, Ix2>, Array1<usize>, BoostError> for BoostingParams {
    type Object = GradientBoostedTrees;

    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, Array1<usize>>,
    ) -> Result<Self::Object, BoostError> {
        self.validate()?;
        let x = dataset.records();
        let y = dataset.targets();
        let (n_rows, n_features) = x.dim();
        let n_classes = self.n_classes;

        if n_rows == 0 {
            return Err(BoostError::EmptyDataset);
        }
        if y.len() != n_rows {
            return Err(BoostError::LengthMismatch {
                records: n_rows,
                targets: y.len(),
            });
        }
        if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
            return Err(BoostError::LabelOutOfRange { label, n_classes });
        }

        let fitted = if n_features == 0 {
            let class = majority_class(y, n_classes);
            log::warn!("No feature columns; predicting class {} for every row", class);
            Fitted::Constant(class)
        } else {
            let mut dtrain = dense_matrix(x)?;
            let labels: Vec<f32> = y.iter().map(|&label| label as f32).collect();
            dtrain.set_labels(&labels)?;

            let training_params = TrainingParametersBuilder::default()
                .dtrain(&dtrain)
                .booster_params(self.booster_params()?)
                .boost_rounds(self.n_estimators as u32)
                .build()
                .map_err(BoostError::Parameters)?;
            Fitted::Booster(Booster::train(&training_params)?)
        };

        log::trace!("Fitted {} on {} rows x {} features", self, n_rows, n_features);
        Ok(GradientBoostedTrees {
            params: self.clone(),
            n_features,
            fitted,
        })
    }
}

impl<D: Data<Elem = f64>> PredictInplace<ArrayBase<D, Ix2>, Array1<usize>>
    for GradientBoostedTrees
{
    /// # Panics
    ///
    /// If the shapes disagree with the model or XGBoost fails to predict.
    fn predict_inplace<'a>(&'a self, x: &'a ArrayBase<D, Ix2>, y: &mut Array1<usize>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.ncols(),
            self.n_features,
            "The number of features must match the number the model was trained on."
        );

        match self.predict_classes(x) {
            Ok(classes) => y.assign(&classes),
            Err(err) => panic!("XGBoost prediction failed: {}", err),
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linfa::traits::Predict;
    use ndarray::Array2;

    /// Four well-separated classes along the first feature.
    fn four_class_data() -> (Array2<f64>, Array1<usize>) {
        let n = 80;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                (i / 20) as f64 * 10.0 + (i % 20) as f64 * 0.1
            } else {
                (i % 7) as f64
            }
        });
        let y = Array1::from_shape_fn(n, |i| i / 20);
        (x, y)
    }

    #[test]
    fn test_fits_separable_classes() {
        let (x, y) = four_class_data();
        let params = BoostingParams {
            n_estimators: 20,
            max_depth: 3,
            learning_rate: 0.3,
            ..Default::default()
        };
        let model = params.fit(&DatasetBase::new(x.clone(), y.clone())).unwrap();
        assert_eq!(model.params(), &params);

        let pred = model.predict(&x);
        assert_eq!(pred, y);
    }

    #[test]
    fn test_predict_classes_matches_predict() {
        let (x, y) = four_class_data();
        let params = BoostingParams {
            n_estimators: 10,
            max_depth: 2,
            ..Default::default()
        };
        let model = params.fit(&DatasetBase::new(x.clone(), y)).unwrap();
        let classes = model.predict_classes(&x).unwrap();
        assert!(classes.iter().all(|&c| c < 4));
        assert_eq!(classes, model.predict(&x));
    }

    #[test]
    fn test_subsampling_is_seeded() {
        let (x, y) = four_class_data();
        let params = BoostingParams {
            n_estimators: 5,
            subsample: 0.5,
            seed: 3,
            ..Default::default()
        };
        let a = params.fit(&DatasetBase::new(x.clone(), y.clone())).unwrap();
        let b = params.fit(&DatasetBase::new(x.clone(), y)).unwrap();
        assert_eq!(a.predict(&x), b.predict(&x));
    }

    #[test]
    fn test_booster_params_accept_grid_values() {
        for (learning_rate, max_depth, subsample) in [(0.01, 3, 0.8), (0.2, 7, 1.0)] {
            let params = BoostingParams {
                learning_rate,
                max_depth,
                subsample,
                ..Default::default()
            };
            assert!(params.booster_params().is_ok());
        }
    }

    #[test]
    fn test_label_out_of_range() {
        let x = Array2::zeros((3, 1));
        let y = Array1::from_vec(vec![0, 1, 4]);
        let err = BoostingParams::default()
            .fit(&DatasetBase::new(x, y))
            .unwrap_err();
        assert!(matches!(
            err,
            BoostError::LabelOutOfRange {
                label: 4,
                n_classes: 4
            }
        ));
    }

    #[test]
    fn test_invalid_params() {
        let x = Array2::zeros((3, 1));
        let y = Array1::from_vec(vec![0, 1, 2]);
        for params in [
            BoostingParams {
                subsample: 0.0,
                ..Default::default()
            },
            BoostingParams {
                max_depth: 0,
                ..Default::default()
            },
            BoostingParams {
                n_estimators: 0,
                ..Default::default()
            },
            BoostingParams {
                learning_rate: -0.1,
                ..Default::default()
            },
            BoostingParams {
                n_classes: 1,
                ..Default::default()
            },
        ] {
            let err = params
                .fit(&DatasetBase::new(x.clone(), y.clone()))
                .unwrap_err();
            assert!(matches!(err, BoostError::InvalidParams(_)));
        }
    }

    #[test]
    fn test_empty_dataset() {
        let x = Array2::<f64>::zeros((0, 2));
        let y = Array1::<usize>::zeros(0);
        let err = BoostingParams::default()
            .fit(&DatasetBase::new(x, y))
            .unwrap_err();
        assert!(matches!(err, BoostError::EmptyDataset));
    }

    #[test]
    fn test_predict_no_rows() {
        let (x, y) = four_class_data();
        let params = BoostingParams {
            n_estimators: 3,
            ..Default::default()
        };
        let model = params.fit(&DatasetBase::new(x, y)).unwrap();
        let pred = model.predict(&Array2::<f64>::zeros((0, 2)));
        assert!(pred.is_empty());
    }

    #[test]
    fn test_zero_features_predicts_a_constant_class() {
        let x = Array2::<f64>::zeros((6, 0));
        let y = Array1::from_vec(vec![2, 2, 2, 2, 1, 0]);
        let params = BoostingParams {
            n_estimators: 10,
            ..Default::default()
        };
        let model = params.fit(&DatasetBase::new(x.clone(), y)).unwrap();
        let pred = model.predict(&x);
        assert!(pred.iter().all(|&p| p == 2));
    }
}
