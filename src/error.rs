//! Error types shared by every pipeline stage.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::BoostError;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("The required column '{0}' was not found in the input table.")]
    ColumnNotFound(String),
    #[error("The column '{0}' appears more than once in the header.")]
    DuplicateColumn(String),
    #[error("Row has {found} cells but the table has {expected} columns.")]
    RowWidth { expected: usize, found: usize },
    #[error("Column '{column}' is numeric but contains the value '{value}'.")]
    NonNumericValue { column: String, value: String },
    #[error("Target value '{value}' in row {row} is not a class label in 0..{n_classes}.")]
    InvalidTarget {
        row: usize,
        value: String,
        n_classes: usize,
    },
    #[error("Category '{value}' in column '{column}' was not seen during fitting.")]
    UnseenCategory { column: String, value: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Cannot split {n_samples} samples: {reason}")]
    Split { n_samples: usize, reason: String },
    #[error("Model error: {0}")]
    Model(#[from] BoostError),
}
