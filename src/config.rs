//! Run constants.
//!
//! The program takes no flags and reads no configuration file: every knob
//! lives in [`PipelineConfig::default`]. Tests build their own values.

use std::path::PathBuf;

use crate::error::{PipelineError, Result};
use crate::model::BoostingParams;
use crate::search::ParamGrid;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the input tables
    pub data_dir: PathBuf,
    pub train_file: String,
    pub test_file: String,
    /// Where the submission is written
    pub submission_path: PathBuf,
    pub id_column: String,
    pub target_column: String,
    /// Fraction of labelled rows held out for validation
    pub validation_fraction: f64,
    /// Seed of the train/validation split
    pub seed: u64,
    pub cv_folds: usize,
    pub grid: ParamGrid,
    /// Parameters the grid does not search
    pub base_params: BoostingParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            train_file: "train.csv".to_string(),
            test_file: "test.csv".to_string(),
            submission_path: PathBuf::from("sample_submission.csv"),
            id_column: "id".to_string(),
            target_column: "sii".to_string(),
            validation_fraction: 0.2,
            seed: 42,
            cv_folds: 3,
            grid: ParamGrid::default(),
            base_params: BoostingParams::default(),
        }
    }
}

impl PipelineConfig {
    pub fn train_path(&self) -> PathBuf {
        self.data_dir.join(&self.train_file)
    }

    pub fn test_path(&self) -> PathBuf {
        self.data_dir.join(&self.test_file)
    }

    pub fn n_classes(&self) -> usize {
        self.base_params.n_classes
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "validation_fraction must be in (0, 1), got {}",
                self.validation_fraction
            )));
        }
        if self.cv_folds < 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if self.id_column == self.target_column {
            return Err(PipelineError::InvalidConfig(
                "id and target columns must differ".to_string(),
            ));
        }
        if self.grid.is_empty() {
            return Err(PipelineError::InvalidConfig("the parameter grid is empty".to_string()));
        }
        for params in self.grid.candidates(&self.base_params) {
            params.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.train_path(), PathBuf::from("./data/train.csv"));
        assert_eq!(config.test_path(), PathBuf::from("./data/test.csv"));
        assert_eq!(config.n_classes(), 4);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = PipelineConfig {
            validation_fraction: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            cv_folds: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.grid.subsample = vec![0.0];
        assert!(matches!(config.validate(), Err(PipelineError::Model(_))));
    }
}
