// src/synthetic.rs
//! Generated demo datasets.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::core::{Cell, Dataset, PredictError, Result};

fn noise(std_dev: f64) -> Result<Normal<f64>> {
    // `Normal::new` accepts a negative std dev and mirrors the distribution.
    if !(std_dev >= 0.0) {
        return Err(PredictError::InvalidInput(format!(
            "noise std dev must be non-negative, got {}",
            std_dev
        )));
    }
    Normal::new(0.0, std_dev).map_err(|e| {
        PredictError::InvalidInput(format!("noise std dev {} rejected: {}", std_dev, e))
    })
}

/// `target = intercept + slope * t + N(0, noise_std)` for `t = 1..=n`.
pub fn linear_series(
    time_column: &str,
    target_column: &str,
    n: usize,
    slope: f64,
    intercept: f64,
    noise_std: f64,
    seed: u64,
) -> Result<Dataset> {
    let normal = noise(noise_std)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let records = (1..=n)
        .map(|t| {
            let x = t as f64;
            let y = intercept + slope * x + normal.sample(&mut rng);
            vec![Cell::Number(x), Cell::Number(y)]
        })
        .collect();
    Ok(Dataset::from_records(
        format!("{}_{}.csv", time_column, target_column),
        &[time_column, target_column],
        records,
    ))
}

/// Monthly series: a linear trend plus `amplitude` added on every twelfth
/// month (`t mod 12 == 0`).
pub fn seasonal_series(
    n: usize,
    slope: f64,
    intercept: f64,
    amplitude: f64,
    noise_std: f64,
    seed: u64,
) -> Result<Dataset> {
    let normal = noise(noise_std)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let records = (1..=n)
        .map(|t| {
            let x = t as f64;
            let peak = if t % 12 == 0 { amplitude } else { 0.0 };
            let y = intercept + slope * x + peak + normal.sample(&mut rng);
            vec![Cell::Number(x), Cell::Number(y)]
        })
        .collect();
    Ok(Dataset::from_records("monthly.csv", &["month", "admissions"], records))
}
