// src/utils.rs
//! Small numeric helpers shared by the analyzer, the engine and the trainer.

use ndarray::ArrayView1;

/// Clamps to `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Minimum and maximum of a sequence, `None` when it is empty.
pub fn min_max<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Pearson correlation, 0 when either side has no variance.
pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let (Some(mx), Some(my)) = (x.mean(), y.mean()) else {
        return 0.0;
    };
    let dx = x.mapv(|v| v - mx);
    let dy = y.mapv(|v| v - my);
    let denom = (dx.dot(&dx) * dy.dot(&dy)).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    dx.dot(&dy) / denom
}

/// Correlation ratio (eta) of a numeric response over categorical groups.
pub fn correlation_ratio(groups: &[String], y: ArrayView1<f64>) -> f64 {
    let Some(mean) = y.mean() else {
        return 0.0;
    };
    let ss_total: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    if ss_total == 0.0 {
        return 0.0;
    }

    let mut sums: indexmap::IndexMap<&str, (f64, usize)> = indexmap::IndexMap::new();
    for (g, v) in groups.iter().zip(y.iter()) {
        let entry = sums.entry(g.as_str()).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
    }
    let ss_between: f64 = sums
        .values()
        .map(|(sum, n)| {
            let group_mean = sum / *n as f64;
            *n as f64 * (group_mean - mean).powi(2)
        })
        .sum();
    (ss_between / ss_total).sqrt()
}
