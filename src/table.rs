//! In-memory tabular data read from CSV files.
//!
//! Cells are kept as raw text so that a column can be interpreted the way
//! the training table dictates, even when the test table would have been
//! inferred differently. Missing cells follow the usual CSV conventions:
//! an empty field or one of the NA tokens below.

use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::error::{PipelineError, Result};

const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns true when `raw` denotes a missing value.
pub fn is_missing(raw: &str) -> bool {
    NA_TOKENS.contains(&raw)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    cells: Vec<Option<String>>,
    kind: ColumnKind,
}

impl Column {
    fn new(name: String, cells: Vec<Option<String>>) -> Self {
        let numeric = cells
            .iter()
            .flatten()
            .all(|cell| cell.parse::<f64>().is_ok());
        let kind = if numeric {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        };
        Column { name, cells, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind inferred from the cells when the table was built.
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }

    /// Parses every present cell as a float.
    pub fn numeric_values(&self) -> Result<Vec<Option<f64>>> {
        self.cells
            .iter()
            .map(|cell| match cell {
                None => Ok(None),
                Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| {
                    PipelineError::NonNumericValue {
                        column: self.name.clone(),
                        value: raw.clone(),
                    }
                }),
            })
            .collect()
    }
}

/// A column-major table with a fixed header.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Reads a headed CSV file.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PipelineError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let table = Self::from_rows(headers, rows)?;
        log::debug!(
            "Read {} rows x {} columns from {}",
            table.n_rows(),
            table.n_columns(),
            path.display()
        );
        Ok(table)
    }

    /// Builds a table from a header and row-major raw cells.
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Result<Self>
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for name in &headers {
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::DuplicateColumn(name.clone()));
            }
        }

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        let mut n_rows = 0;
        for row in rows {
            let row: Vec<String> = row.into_iter().map(Into::into).collect();
            if row.len() != headers.len() {
                return Err(PipelineError::RowWidth {
                    expected: headers.len(),
                    found: row.len(),
                });
            }
            for (column, raw) in cells.iter_mut().zip(row) {
                column.push(if is_missing(&raw) { None } else { Some(raw) });
            }
            n_rows += 1;
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, cells)| Column::new(name, cells))
            .collect();
        Ok(Table { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PipelineError::ColumnNotFound(name.to_string()))
    }

    /// Removes every row whose cell in `name` is missing and returns the
    /// number of rows removed. Column kinds are re-inferred on what remains.
    pub fn drop_missing(&mut self, name: &str) -> Result<usize> {
        let keep: Vec<bool> = self.column(name)?.cells.iter().map(Option::is_some).collect();
        let dropped = keep.iter().filter(|&&k| !k).count();
        if dropped == 0 {
            return Ok(0);
        }

        let columns = std::mem::take(&mut self.columns);
        self.columns = columns
            .into_iter()
            .map(|column| {
                let cells = column
                    .cells
                    .into_iter()
                    .zip(&keep)
                    .filter_map(|(cell, &k)| k.then_some(cell))
                    .collect();
                // Kinds stay as inferred on the full file.
                Column {
                    name: column.name,
                    cells,
                    kind: column.kind,
                }
            })
            .collect();
        self.n_rows -= dropped;
        Ok(dropped)
    }
}
