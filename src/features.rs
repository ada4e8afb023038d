//! Feature alignment between the training and test tables.

use crate::table::{ColumnKind, Table};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub kind: ColumnKind,
}

/// Ordered features shared by fit and inference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    features: Vec<Feature>,
}

impl FeatureSet {
    pub fn new(features: Vec<Feature>) -> Self {
        FeatureSet { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name.clone()).collect()
    }

    pub fn numeric(&self) -> impl Iterator<Item = &Feature> {
        self.iter().filter(|f| f.kind == ColumnKind::Numeric)
    }

    pub fn categorical(&self) -> impl Iterator<Item = &Feature> {
        self.iter().filter(|f| f.kind == ColumnKind::Categorical)
    }
}

/// Columns present in both tables, minus the identifier and the target,
/// in training-table order. Kinds come from the training table.
///
/// An empty intersection is returned as-is; callers proceed with zero
/// features.
pub fn align_features(
    train: &Table,
    test: &Table,
    id_column: &str,
    target_column: &str,
) -> FeatureSet {
    let features: Vec<Feature> = train
        .column_names()
        .filter(|name| *name != id_column && *name != target_column)
        .filter(|name| test.has_column(name))
        .filter_map(|name| {
            train.column(name).ok().map(|column| Feature {
                name: name.to_string(),
                kind: column.kind(),
            })
        })
        .collect();

    if features.is_empty() {
        log::warn!("Training and test tables share no feature columns");
    }
    FeatureSet::new(features)
}
