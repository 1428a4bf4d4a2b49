// src/core/config.rs
use serde::{Deserialize, Serialize};

use super::errors::{PredictError, Result};

/// Tuning knobs for analysis, prediction and evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Neighbours averaged by the similarity fallback.
    pub neighbors: usize,
    /// Rows with numeric time and target needed before a trend is fitted.
    pub min_regression_points: usize,
    /// Bucket count for seasonal residuals (month-like).
    pub season_period: i64,
    /// Fraction of the observed time range used as the proximity decay scale.
    pub proximity_scale: f64,
    /// Weight of the per-feature covariate adjustment for sequence models.
    pub covariate_weight: f64,
    pub max_histogram_bins: usize,
    /// Share of rows held out when evaluating a model.
    pub holdout_fraction: f64,
    /// Datasets with at most this many labelled rows are scored leave-one-out.
    pub leave_one_out_max_rows: usize,
    /// Number of (actual, predicted) pairs kept on a model result.
    pub max_prediction_samples: usize,
    pub seed: u64,
    pub preview_rows: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        PredictionConfig {
            neighbors: 5,
            min_regression_points: 3,
            season_period: 12,
            proximity_scale: 0.5,
            covariate_weight: 0.1,
            max_histogram_bins: 10,
            holdout_fraction: 0.2,
            leave_one_out_max_rows: 30,
            max_prediction_samples: 20,
            seed: 42,
            preview_rows: 5,
        }
    }
}

impl PredictionConfig {
    /// Parses a JSON document; omitted fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PredictionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.neighbors == 0 {
            return Err(PredictError::InvalidInput("neighbors must be at least 1".to_string()));
        }
        if self.min_regression_points < 2 {
            return Err(PredictError::InvalidInput(
                "min_regression_points must be at least 2".to_string(),
            ));
        }
        if self.season_period <= 0 {
            return Err(PredictError::InvalidInput("season_period must be positive".to_string()));
        }
        if !(self.proximity_scale > 0.0) {
            return Err(PredictError::InvalidInput("proximity_scale must be positive".to_string()));
        }
        if self.max_histogram_bins == 0 {
            return Err(PredictError::InvalidInput(
                "max_histogram_bins must be at least 1".to_string(),
            ));
        }
        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(PredictError::InvalidInput(format!(
                "holdout_fraction must be in (0, 1), got {}",
                self.holdout_fraction
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PredictionConfig::from_json_str(r#"{"neighbors": 3, "seed": 7}"#).unwrap();
        assert_eq!(config.neighbors, 3);
        assert_eq!(config.seed, 7);
        assert_eq!(config.season_period, 12);
        assert_eq!(config.max_histogram_bins, 10);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            PredictionConfig::from_json_str(r#"{"neighbors": 0}"#),
            Err(PredictError::InvalidInput(_))
        ));
        assert!(matches!(
            PredictionConfig::from_json_str(r#"{"holdout_fraction": 1.0}"#),
            Err(PredictError::InvalidInput(_))
        ));
        assert!(matches!(
            PredictionConfig::from_json_str("{not json"),
            Err(PredictError::Config(_))
        ));
    }
}
