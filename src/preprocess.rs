//! Fitted preprocessing: feature selection, imputation and encoding.

use ndarray::Array2;

use crate::encode::CategoryEncoder;
use crate::error::Result;
use crate::features::FeatureSet;
use crate::impute::Imputer;
use crate::table::{ColumnKind, Table};

/// Everything learned from the training table that inference needs.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    features: FeatureSet,
    imputer: Imputer,
    encoder: CategoryEncoder,
}

impl Preprocessor {
    pub fn fit(table: &Table, features: FeatureSet) -> Result<Self> {
        let imputer = Imputer::fit(table, &features)?;

        let mut encoder = CategoryEncoder::new();
        for feature in features.categorical() {
            let column = table.column(&feature.name)?;
            let filled = imputer.fill_categorical(&feature.name, column.cells())?;
            encoder.fit_column(&feature.name, filled);
        }

        log::info!(
            "Fitted preprocessing on {} rows: {} numeric, {} categorical features",
            table.n_rows(),
            features.numeric().count(),
            features.categorical().count()
        );
        Ok(Preprocessor {
            features,
            imputer,
            encoder,
        })
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Dense `[n_rows, n_features]` matrix in feature-set order.
    pub fn transform(&self, table: &Table) -> Result<Array2<f64>> {
        let n_rows = table.n_rows();
        let n_features = self.features.len();
        let mut x = Array2::<f64>::zeros((n_rows, n_features));

        for (j, feature) in self.features.iter().enumerate() {
            let column = table.column(&feature.name)?;
            match feature.kind {
                ColumnKind::Numeric => {
                    let values = self
                        .imputer
                        .fill_numeric(&feature.name, &column.numeric_values()?)?;
                    for (i, v) in values.into_iter().enumerate() {
                        x[[i, j]] = v;
                    }
                }
                ColumnKind::Categorical => {
                    let values = self.imputer.fill_categorical(&feature.name, column.cells())?;
                    for (i, value) in values.into_iter().enumerate() {
                        x[[i, j]] = self.encoder.encode(&feature.name, value)? as f64;
                    }
                }
            }
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::features::align_features;

    fn tables() -> (Table, Table) {
        let train = Table::from_rows(
            ["id", "age", "season", "sii"],
            [
                ["1", "10", "Spring", "0"],
                ["2", "", "Fall", "1"],
                ["3", "20", "", "1"],
                ["4", "30", "Fall", "2"],
            ],
        )
        .unwrap();
        let test = Table::from_rows(
            ["id", "season", "age"],
            [["5", "Spring", ""], ["6", "", "1000"]],
        )
        .unwrap();
        (train, test)
    }

    #[test]
    fn test_transform_train_and_test() {
        let (train, test) = tables();
        let features = align_features(&train, &test, "id", "sii");
        let pre = Preprocessor::fit(&train, features).unwrap();

        let x_train = pre.transform(&train).unwrap();
        assert_eq!(x_train.dim(), (4, 2));
        assert_eq!(x_train.column(0).to_vec(), vec![10.0, 20.0, 20.0, 30.0]);
        // Spring=0, Fall=1; the missing season becomes the mode (Fall).
        assert_eq!(x_train.column(1).to_vec(), vec![0.0, 1.0, 1.0, 1.0]);

        let x_test = pre.transform(&test).unwrap();
        assert_eq!(x_test.dim(), (2, 2));
        assert_eq!(x_test.column(0).to_vec(), vec![20.0, 1000.0]);
        assert_eq!(x_test.column(1).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_unseen_test_category_fails() {
        let (train, _) = tables();
        let test = Table::from_rows(["id", "season", "age"], [["5", "Winter", "3"]]).unwrap();
        let features = align_features(&train, &test, "id", "sii");
        let pre = Preprocessor::fit(&train, features).unwrap();

        let err = pre.transform(&test).unwrap_err();
        assert!(matches!(err, PipelineError::UnseenCategory { .. }));
    }

    #[test]
    fn test_non_numeric_test_value_fails() {
        let (train, _) = tables();
        let test = Table::from_rows(["id", "season", "age"], [["5", "Fall", "old"]]).unwrap();
        let features = align_features(&train, &test, "id", "sii");
        let pre = Preprocessor::fit(&train, features).unwrap();

        assert!(matches!(
            pre.transform(&test).unwrap_err(),
            PipelineError::NonNumericValue { .. }
        ));
    }

    #[test]
    fn test_zero_features() {
        let train = Table::from_rows(["id", "sii"], [["1", "0"]]).unwrap();
        let test = Table::from_rows(["id"], [["2"], ["3"]]).unwrap();
        let features = align_features(&train, &test, "id", "sii");
        let pre = Preprocessor::fit(&train, features).unwrap();
        assert_eq!(pre.transform(&test).unwrap().dim(), (2, 0));
    }
}
