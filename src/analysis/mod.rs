// src/analysis/mod.rs
//! Column statistics for charting and for steering the prediction engine.

pub mod histogram;

pub use histogram::Bin;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::{Cell, Dataset, PredictError, Result};

/// Substrings that mark a column name as temporal.
pub const TIME_KEYWORDS: [&str; 5] = ["year", "date", "time", "month", "day"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// True when the column name suggests a temporal value. Names only; values
/// are never parsed as dates.
pub fn is_time_like(name: &str) -> bool {
    let lower = name.to_lowercase();
    TIME_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Column kinds and time-like columns of one dataset, recomputed per call.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureAnalysis<'a> {
    dataset: &'a Dataset,
    numeric_columns: Vec<String>,
    time_like_columns: Vec<String>,
    max_bins: usize,
}

impl<'a> FeatureAnalysis<'a> {
    pub fn analyze(dataset: &'a Dataset) -> Self {
        Self::with_max_bins(dataset, crate::core::PredictionConfig::default().max_histogram_bins)
    }

    pub fn with_max_bins(dataset: &'a Dataset, max_bins: usize) -> Self {
        // A single numeric cell makes the whole column numeric.
        let numeric_columns: Vec<String> = dataset
            .columns()
            .iter()
            .filter(|c| {
                dataset
                    .rows()
                    .iter()
                    .any(|r| matches!(r.get(c.as_str()), Some(Cell::Number(_))))
            })
            .cloned()
            .collect();
        let time_like_columns: Vec<String> = dataset
            .columns()
            .iter()
            .filter(|c| is_time_like(c))
            .cloned()
            .collect();

        debug!(
            "analyzed {}: numeric {:?}, time-like {:?}",
            dataset.filename, numeric_columns, time_like_columns
        );
        FeatureAnalysis {
            dataset,
            numeric_columns,
            time_like_columns,
            max_bins,
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn time_like_columns(&self) -> &[String] {
        &self.time_like_columns
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == column)
    }

    pub fn column_kind(&self, column: &str) -> Result<ColumnKind> {
        self.require(column)?;
        Ok(if self.is_numeric(column) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        })
    }

    /// Equal-width histogram over the column's numeric values.
    pub fn histogram(&self, column: &str) -> Result<Vec<Bin>> {
        self.require(column)?;
        Ok(histogram::equal_width(
            &self.dataset.numeric_values(column),
            self.max_bins,
        ))
    }

    /// Points for a scatter plot, from rows where both columns are numeric.
    pub fn scatter(&self, x: &str, y: &str) -> Result<Vec<(f64, f64)>> {
        self.require(x)?;
        self.require(y)?;
        Ok(self.dataset.numeric_pairs(x, y))
    }

    /// Scatter points ordered by `x`, for a trend line.
    pub fn trend(&self, x: &str, y: &str) -> Result<Vec<(f64, f64)>> {
        let mut points = self.scatter(x, y)?;
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(points)
    }

    fn require(&self, column: &str) -> Result<()> {
        if self.dataset.has_column(column) {
            Ok(())
        } else {
            Err(PredictError::unknown_column(column))
        }
    }
}
