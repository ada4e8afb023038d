//! Severity index (`sii`) classifier.
//!
//! Loads a labelled training table and an unlabelled test table, aligns their
//! feature columns, imputes and encodes them with statistics learned on the
//! training rows, grid-searches a softmax gradient-boosted tree classifier
//! with stratified cross-validation and writes one prediction per test row.
//!
//! - [`table`] - CSV loading and missing-value detection
//! - [`features`] - train/test feature alignment
//! - [`impute`], [`encode`], [`preprocess`] - fitted preprocessing
//! - [`split`] - seeded hold-out split and stratified folds
//! - [`model`] - the boosted tree classifier
//! - [`search`] - hyperparameter grid search
//! - [`pipeline`] - the full run

pub mod config;
pub mod encode;
pub mod error;
pub mod features;
pub mod impute;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod preprocess;
pub mod search;
pub mod split;
pub mod submission;
pub mod table;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{run, RunReport};
