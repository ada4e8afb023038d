//! Integer encoding of categorical features.
//!
//! Codes are handed out in the order values are first seen while fitting.
//! Values that were never seen cannot be encoded: `encode` fails rather than
//! inventing a code.

use std::collections::HashMap;

use crate::error::{PipelineError, Result};

/// String to code mapping for a single column.
#[derive(Debug, Clone, Default)]
pub struct ColumnCodes {
    values: Vec<String>,
    index: HashMap<String, usize>,
}

impl ColumnCodes {
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut codes = ColumnCodes::default();
        for value in values {
            if !codes.index.contains_key(value) {
                codes.index.insert(value.to_string(), codes.values.len());
                codes.values.push(value.to_string());
            }
        }
        codes
    }

    pub fn encode(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.values.get(code).map(String::as_str)
    }
}

/// Encoders for every categorical feature, keyed by column name.
#[derive(Debug, Clone, Default)]
pub struct CategoryEncoder {
    columns: HashMap<String, ColumnCodes>,
}

impl CategoryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit_column<'a, I>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.columns.insert(column.to_string(), ColumnCodes::fit(values));
    }

    pub fn codes(&self, column: &str) -> Option<&ColumnCodes> {
        self.columns.get(column)
    }

    pub fn encode(&self, column: &str, value: &str) -> Result<usize> {
        let codes = self
            .codes(column)
            .ok_or_else(|| PipelineError::ColumnNotFound(column.to_string()))?;
        codes.encode(value).ok_or_else(|| PipelineError::UnseenCategory {
            column: column.to_string(),
            value: value.to_string(),
        })
    }

    pub fn decode(&self, column: &str, code: usize) -> Option<&str> {
        self.codes(column)?.decode(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order() {
        let codes = ColumnCodes::fit(["Winter", "Spring", "Winter", "Fall"]);
        assert_eq!(codes.encode("Winter"), Some(0));
        assert_eq!(codes.encode("Spring"), Some(1));
        assert_eq!(codes.encode("Fall"), Some(2));
        assert_eq!(codes.decode(2), Some("Fall"));
        assert_eq!(codes.decode(3), None);
    }

    #[test]
    fn test_decode_recovers_value() {
        let mut encoder = CategoryEncoder::new();
        encoder.fit_column("season", ["Summer", "Fall", "Summer"]);
        for value in ["Summer", "Fall"] {
            let code = encoder.encode("season", value).unwrap();
            assert_eq!(encoder.decode("season", code), Some(value));
        }
    }

    #[test]
    fn test_unseen_value_fails() {
        let mut encoder = CategoryEncoder::new();
        encoder.fit_column("season", ["Summer"]);
        let err = encoder.encode("season", "Winter").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnseenCategory { ref column, ref value }
                if column == "season" && value == "Winter"
        ));
    }

    #[test]
    fn test_columns_are_independent() {
        let mut encoder = CategoryEncoder::new();
        encoder.fit_column("a", ["x", "y"]);
        encoder.fit_column("b", ["y"]);
        assert_eq!(encoder.encode("a", "y").unwrap(), 1);
        assert_eq!(encoder.encode("b", "y").unwrap(), 0);
        assert!(encoder.encode("b", "x").is_err());
    }
}
