//! Gradient-boosted tree classifier.

mod booster;

pub use booster::{BoostError, BoostingParams, GradientBoostedTrees};
