//! Missing-value imputation with statistics learned on training rows.

use std::collections::{BTreeMap, HashMap};

use crate::error::{PipelineError, Result};
use crate::features::FeatureSet;
use crate::table::{ColumnKind, Table};

/// The value written into a missing cell of one feature.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Mean(f64),
    Mode(String),
}

/// Per-feature fill values. Fit once, never refit on the data it fills.
#[derive(Debug, Clone, Default)]
pub struct Imputer {
    fills: HashMap<String, Fill>,
}

impl Imputer {
    pub fn fit(table: &Table, features: &FeatureSet) -> Result<Self> {
        let mut fills = HashMap::with_capacity(features.len());
        for feature in features.iter() {
            let column = table.column(&feature.name)?;
            let fill = match feature.kind {
                ColumnKind::Numeric => {
                    Fill::Mean(column_mean(&feature.name, &column.numeric_values()?))
                }
                ColumnKind::Categorical => Fill::Mode(column_mode(&feature.name, column.cells())),
            };
            fills.insert(feature.name.clone(), fill);
        }
        Ok(Imputer { fills })
    }

    pub fn fill_for(&self, feature: &str) -> Option<&Fill> {
        self.fills.get(feature)
    }

    /// Numeric cells of `feature` with missing entries replaced by the mean.
    pub fn fill_numeric(&self, feature: &str, values: &[Option<f64>]) -> Result<Vec<f64>> {
        match self.fill_for(feature) {
            Some(Fill::Mean(mean)) => Ok(values.iter().map(|v| v.unwrap_or(*mean)).collect()),
            _ => Err(PipelineError::ColumnNotFound(feature.to_string())),
        }
    }

    /// Categorical cells of `feature` with missing entries replaced by the mode.
    pub fn fill_categorical<'a>(
        &'a self,
        feature: &str,
        cells: &'a [Option<String>],
    ) -> Result<Vec<&'a str>> {
        match self.fill_for(feature) {
            Some(Fill::Mode(mode)) => Ok(cells
                .iter()
                .map(|cell| cell.as_deref().unwrap_or(mode.as_str()))
                .collect()),
            _ => Err(PipelineError::ColumnNotFound(feature.to_string())),
        }
    }
}

fn column_mean(name: &str, values: &[Option<f64>]) -> f64 {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        log::warn!("Column '{}' has no values to average, filling with 0", name);
        return 0.0;
    }
    sum / count as f64
}

// Ties resolve to the smallest value.
fn column_mode(name: &str, cells: &[Option<String>]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for cell in cells.iter().flatten() {
        *counts.entry(cell.as_str()).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    match best {
        Some((value, _)) => value.to_string(),
        None => {
            log::warn!("Column '{}' has no values to count, filling with an empty string", name);
            String::new()
        }
    }
}
