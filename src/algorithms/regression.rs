// src/algorithms/regression.rs
//! Time-aware least-squares trend with a month-like seasonal correction.

use ndarray::Array1;
use std::collections::BTreeMap;

use super::{Estimate, EstimationContext};
use crate::core::{Cell, PredictError, PredictionQuery, Result, Strategy};
use crate::traits::Estimator;
use crate::utils::{clamp_unit, min_max};

/// Bucket of a time value: `round(x) mod period`, always non-negative.
pub fn season_bucket(x: f64, period: i64) -> i64 {
    (x.round() as i64).rem_euclid(period)
}

/// `y = intercept + slope * x` fitted by ordinary least squares, plus the mean
/// residual per seasonal bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTrend {
    pub intercept: f64,
    pub slope: f64,
    pub seasonal: BTreeMap<i64, f64>,
    period: i64,
    x_min: f64,
    x_max: f64,
}

impl LinearTrend {
    pub fn fit(xs: &[f64], ys: &[f64], period: i64) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(PredictError::InvalidInput(format!(
                "time values ({}) and targets ({}) differ in length",
                xs.len(),
                ys.len()
            )));
        }
        if period <= 0 {
            return Err(PredictError::InvalidInput(format!(
                "season period must be positive, got {}",
                period
            )));
        }
        let Some((x_min, x_max)) = min_max(xs.iter().copied()) else {
            return Err(PredictError::InsufficientData {
                required: 1,
                actual: xs.len(),
            });
        };

        let x = Array1::from(xs.to_vec());
        let y = Array1::from(ys.to_vec());
        // Non-empty, so the means exist.
        let x_mean = x.mean().unwrap_or(0.0);
        let y_mean = y.mean().unwrap_or(0.0);
        let dx = x.mapv(|v| v - x_mean);
        let dy = y.mapv(|v| v - y_mean);

        let denom = dx.dot(&dx);
        let slope = if denom != 0.0 { dx.dot(&dy) / denom } else { 0.0 };
        let intercept = y_mean - slope * x_mean;

        let mut groups: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
        for (&xv, &yv) in xs.iter().zip(ys) {
            let entry = groups.entry(season_bucket(xv, period)).or_insert((0.0, 0));
            entry.0 += yv - (intercept + slope * xv);
            entry.1 += 1;
        }
        let seasonal = groups
            .into_iter()
            .map(|(bucket, (sum, n))| (bucket, sum / n as f64))
            .collect();

        Ok(LinearTrend {
            intercept,
            slope,
            seasonal,
            period,
            x_min,
            x_max,
        })
    }

    pub fn trend_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Mean residual of the query's bucket, if that bucket was observed.
    pub fn seasonal_offset(&self, x: f64) -> Option<f64> {
        self.seasonal.get(&season_bucket(x, self.period)).copied()
    }

    pub fn range(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// `exp(-d / (range * scale))`, `d` being the distance outside the
    /// observed time range (0 inside it). A zero range uses 1 as the scale.
    pub fn proximity(&self, x: f64, scale: f64) -> f64 {
        let distance = if x < self.x_min {
            self.x_min - x
        } else if x > self.x_max {
            x - self.x_max
        } else {
            0.0
        };
        let mut decay = self.range() * scale;
        if decay == 0.0 || !decay.is_finite() {
            decay = 1.0;
        }
        clamp_unit((-distance / decay).exp())
    }
}

/// The time-aware path of the decision policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeTrend;

impl TimeTrend {
    /// First time-like feature, in column order, for which the query holds a number.
    fn time_feature<'q>(
        ctx: &EstimationContext<'q>,
        query: &PredictionQuery,
    ) -> Option<(&'q str, f64)> {
        ctx.analysis
            .time_like_columns()
            .iter()
            .filter(|c| c.as_str() != ctx.target)
            .find_map(|c| query.value(c).and_then(Cell::as_number).map(|v| (c.as_str(), v)))
    }

    /// Shifts the trend by each numeric non-time feature's relative deviation
    /// from its mean, scaled by the mean target.
    fn covariate_adjustment(
        ctx: &EstimationContext<'_>,
        query: &PredictionQuery,
    ) -> f64 {
        let dataset = ctx.analysis.dataset();
        query
            .input_values
            .iter()
            .filter(|(k, _)| k.as_str() != ctx.target && !crate::analysis::is_time_like(k))
            .filter_map(|(k, v)| {
                let value = v.as_number()?;
                let pairs = dataset.numeric_pairs(k, ctx.target);
                if pairs.is_empty() {
                    return None;
                }
                let n = pairs.len() as f64;
                let mean_feature = pairs.iter().map(|p| p.0).sum::<f64>() / n;
                let mean_target = pairs.iter().map(|p| p.1).sum::<f64>() / n;
                if mean_feature == 0.0 {
                    return None;
                }
                Some((value - mean_feature) / mean_feature * mean_target * ctx.config.covariate_weight)
            })
            .sum()
    }
}

impl Estimator for TimeTrend {
    fn strategy(&self) -> Strategy {
        Strategy::TimeTrend
    }

    fn estimate(&self, ctx: &EstimationContext<'_>, query: &PredictionQuery) -> Option<Estimate> {
        let (column, x_query) = Self::time_feature(ctx, query)?;
        let (xs, ys): (Vec<f64>, Vec<f64>) = ctx
            .analysis
            .dataset()
            .numeric_pairs(column, ctx.target)
            .into_iter()
            .unzip();
        if xs.len() < ctx.config.min_regression_points {
            log::debug!(
                "{} has {} usable rows, below {}; skipping trend",
                column,
                xs.len(),
                ctx.config.min_regression_points
            );
            return None;
        }

        let trend = LinearTrend::fit(&xs, &ys, ctx.config.season_period).ok()?;
        let mut value = trend.trend_at(x_query);
        if ctx.model.model_type.is_sequence_model() {
            value += trend.seasonal_offset(x_query).unwrap_or(0.0);
            value += Self::covariate_adjustment(ctx, query);
        }
        if !value.is_finite() {
            return None;
        }

        let confidence = ctx.model_accuracy * trend.proximity(x_query, ctx.config.proximity_scale);
        Some(Estimate {
            value,
            confidence: clamp_unit(confidence),
            strategy: Strategy::TimeTrend,
        })
    }
}
