// src/core/data.rs
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{PredictError, Result};

/// A single table value: numeric where the source text parsed as a finite
/// number, text otherwise, or absent when the row had no value for the column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Absent,
}

impl Cell {
    /// Coerces raw text the way the uploader does: trimmed, numeric if it is a
    /// finite number, absent if empty.
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Absent;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Absent => write!(f, "N/A"),
        }
    }
}

/// One table row keyed by column name, in header order.
pub type Row = IndexMap<String, Cell>;

/// An uploaded table plus the column designated as the prediction target.
///
/// Every row carries exactly the dataset's column keys; missing values are
/// stored as [`Cell::Absent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub filename: String,
    columns: Vec<String>,
    rows: Vec<Row>,
    target: Option<String>,
}

impl Dataset {
    /// Builds a dataset from positional records. Records shorter than the
    /// header are padded with `Absent`; extra values are dropped. Duplicate
    /// column names collapse onto the first occurrence, later values winning.
    /// The target defaults to the last column.
    pub fn from_records<S: AsRef<str>>(
        filename: impl Into<String>,
        headers: &[S],
        records: Vec<Vec<Cell>>,
    ) -> Dataset {
        let mut columns: Vec<String> = Vec::with_capacity(headers.len());
        for h in headers {
            let name = h.as_ref().trim().to_string();
            if !columns.contains(&name) {
                columns.push(name);
            }
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let mut row: Row = columns.iter().map(|c| (c.clone(), Cell::Absent)).collect();
                for (header, cell) in headers.iter().zip(record) {
                    row.insert(header.as_ref().trim().to_string(), cell);
                }
                row
            })
            .collect();

        let target = columns.last().cloned();
        Dataset {
            filename: filename.into(),
            columns,
            rows,
            target,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn set_target(&mut self, name: &str) -> Result<()> {
        if !self.has_column(name) {
            return Err(PredictError::MissingTarget(format!(
                "'{}' is not a column of {}",
                name, self.filename
            )));
        }
        self.target = Some(name.to_string());
        Ok(())
    }

    /// All columns except the target, in header order.
    pub fn feature_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| Some(*c) != self.target())
            .collect()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// First `n` rows, for display.
    pub fn preview(&self, n: usize) -> &[Row] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Numeric values of a column, skipping text and absent cells.
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|r| r.get(column).and_then(Cell::as_number))
            .collect()
    }

    /// `(x, y)` pairs from rows where both columns are numeric, in row order.
    pub fn numeric_pairs(&self, x: &str, y: &str) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|r| {
                let xv = r.get(x).and_then(Cell::as_number)?;
                let yv = r.get(y).and_then(Cell::as_number)?;
                Some((xv, yv))
            })
            .collect()
    }

    /// A new dataset holding only the given rows, in the given order.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            filename: self.filename.clone(),
            columns: self.columns.clone(),
            rows: indices.iter().filter_map(|&i| self.rows.get(i).cloned()).collect(),
            target: self.target.clone(),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dataset {} ({} rows, {} columns)",
            self.filename,
            self.rows.len(),
            self.columns.len()
        )?;
        for column in &self.columns {
            if Some(column.as_str()) == self.target() {
                writeln!(f, "  {} (target)", column)?;
            } else {
                writeln!(f, "  {}", column)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_records(
            "sample.csv",
            &["age", "ward", "stay"],
            vec![
                vec![34.0.into(), "icu".into(), 5.0.into()],
                vec![51.0.into(), "general".into()],
                vec![Cell::Absent, "icu".into(), 9.0.into(), 1.0.into()],
            ],
        )
    }

    #[test]
    fn cell_parse_coerces_numbers_text_and_empty() {
        assert_eq!(Cell::parse(" 12.5 "), Cell::Number(12.5));
        assert_eq!(Cell::parse("-3"), Cell::Number(-3.0));
        assert_eq!(Cell::parse("icu "), Cell::Text("icu".to_string()));
        assert_eq!(Cell::parse("   "), Cell::Absent);
        assert_eq!(Cell::parse("inf"), Cell::Text("inf".to_string()));
        assert_eq!(Cell::parse("NaN"), Cell::Text("NaN".to_string()));
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let ds = sample();
        assert_eq!(ds.len(), 3);
        for row in ds.rows() {
            assert_eq!(row.len(), 3);
        }
        assert_eq!(ds.cell(1, "stay"), Some(&Cell::Absent));
        assert_eq!(ds.cell(2, "stay"), Some(&Cell::Number(9.0)));
    }

    #[test]
    fn target_defaults_to_last_column_and_is_validated() {
        let mut ds = sample();
        assert_eq!(ds.target(), Some("stay"));
        assert_eq!(ds.feature_columns(), vec!["age", "ward"]);

        ds.set_target("age").unwrap();
        assert_eq!(ds.feature_columns(), vec!["ward", "stay"]);

        let err = ds.set_target("missing").unwrap_err();
        assert!(matches!(err, PredictError::MissingTarget(_)));
        assert_eq!(ds.target(), Some("age"));
    }

    #[test]
    fn numeric_accessors_skip_non_numeric_cells() {
        let ds = sample();
        assert_eq!(ds.numeric_values("age"), vec![34.0, 51.0]);
        assert_eq!(ds.numeric_values("ward"), Vec::<f64>::new());
        assert_eq!(ds.numeric_pairs("age", "stay"), vec![(34.0, 5.0)]);
    }

    #[test]
    fn duplicate_headers_collapse_with_later_value() {
        let ds = Dataset::from_records(
            "dup.csv",
            &["a", "b", "a"],
            vec![vec![1.0.into(), 2.0.into(), 3.0.into()]],
        );
        assert_eq!(ds.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(ds.cell(0, "a"), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn preview_and_subset() {
        let ds = sample();
        assert_eq!(ds.preview(2).len(), 2);
        assert_eq!(ds.preview(10).len(), 3);

        let sub = ds.subset(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.cell(0, "stay"), Some(&Cell::Number(9.0)));
        assert_eq!(sub.target(), Some("stay"));
    }
}
