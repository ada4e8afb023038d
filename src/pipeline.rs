//! The end-to-end training and submission run.

use linfa::traits::Predict;
use ndarray::{Array1, Axis};
use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::features::align_features;
use crate::metrics::accuracy;
use crate::model::BoostingParams;
use crate::preprocess::Preprocessor;
use crate::search::GridSearch;
use crate::split::train_test_split;
use crate::submission::write_submission;
use crate::table::{Column, Table};

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Labelled training rows after dropping missing targets
    pub n_labelled_rows: usize,
    /// Rows dropped because the target was missing
    pub n_dropped_rows: usize,
    pub features: Vec<String>,
    pub best_params: BoostingParams,
    pub cv_accuracy: f64,
    pub validation_accuracy: f64,
    pub n_predictions: usize,
    pub submission_path: PathBuf,
}

/// Converts target cells into class labels in `0..n_classes`.
pub fn parse_targets(column: &Column, n_classes: usize) -> Result<Array1<usize>> {
    column
        .cells()
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            let raw = cell.as_deref().unwrap_or("");
            let invalid = || PipelineError::InvalidTarget {
                row,
                value: raw.to_string(),
                n_classes,
            };
            let value = raw.parse::<f64>().map_err(|_| invalid())?;
            if value.fract() != 0.0 || value < 0.0 || value >= n_classes as f64 {
                return Err(invalid());
            }
            Ok(value as usize)
        })
        .collect()
}

pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    config.validate()?;

    let mut train = Table::read_csv(config.train_path())?;
    let test = Table::read_csv(config.test_path())?;
    log::info!(
        "Loaded {} training rows and {} test rows",
        train.n_rows(),
        test.n_rows()
    );
    train.column(&config.id_column)?;
    let test_ids: Vec<String> = test
        .column(&config.id_column)?
        .cells()
        .iter()
        .map(|cell| cell.clone().unwrap_or_default())
        .collect();

    let n_dropped_rows = train.drop_missing(&config.target_column)?;
    log::info!(
        "Dropped {} rows without '{}', {} labelled rows remain",
        n_dropped_rows,
        config.target_column,
        train.n_rows()
    );
    let y = parse_targets(train.column(&config.target_column)?, config.n_classes())?;

    let features = align_features(&train, &test, &config.id_column, &config.target_column);
    let preprocessor = Preprocessor::fit(&train, features)?;
    let x = preprocessor.transform(&train)?;
    let x_test = preprocessor.transform(&test)?;

    let split = train_test_split(x.nrows(), config.validation_fraction, config.seed)?;
    let x_train = x.select(Axis(0), &split.train);
    let y_train = y.select(Axis(0), &split.train);
    let x_val = x.select(Axis(0), &split.test);
    let y_val = y.select(Axis(0), &split.test);
    log::info!(
        "Split {} rows into {} for training and {} for validation",
        x.nrows(),
        split.train.len(),
        split.test.len()
    );

    let search = GridSearch::new(
        config.grid.clone(),
        config.base_params.clone(),
        config.cv_folds,
    );
    let outcome = search.fit(x_train.view(), &y_train)?;

    let val_predicted = outcome.model.predict(&x_val);
    let validation_accuracy = accuracy(&y_val.to_vec(), &val_predicted.to_vec());

    let predictions = outcome.model.predict(&x_test);
    write_submission(
        &config.submission_path,
        &config.target_column,
        &test_ids,
        &predictions.to_vec(),
    )?;
    log::info!(
        "Wrote {} predictions to {}",
        predictions.len(),
        config.submission_path.display()
    );

    Ok(RunReport {
        n_labelled_rows: train.n_rows(),
        n_dropped_rows,
        features: preprocessor.features().names(),
        best_params: outcome.model.params().clone(),
        cv_accuracy: outcome.best().mean_score,
        validation_accuracy,
        n_predictions: predictions.len(),
        submission_path: config.submission_path.clone(),
    })
}
