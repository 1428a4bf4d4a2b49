// src/analysis/histogram.rs
use serde::{Deserialize, Serialize};

/// One equal-width histogram bucket covering `[start, end)`; the last bucket
/// also holds `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub label: String,
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Bin {
    fn new(start: f64, end: f64) -> Self {
        Bin {
            label: format!("{:.1}-{:.1}", start, end),
            start,
            end,
            count: 0,
        }
    }
}

/// Equal-width binning with `min(max_bins, ceil(sqrt(n)))` buckets.
///
/// A constant series collapses into one bucket holding every value.
pub fn equal_width(values: &[f64], max_bins: usize) -> Vec<Bin> {
    let Some((min, max)) = crate::utils::min_max(values.iter().copied()) else {
        return Vec::new();
    };

    if min == max {
        let mut bin = Bin::new(min, max);
        bin.count = values.len();
        return vec![bin];
    }

    let bin_count = ((values.len() as f64).sqrt().ceil() as usize).clamp(1, max_bins.max(1));
    let width = (max - min) / bin_count as f64;

    let mut bins: Vec<Bin> = (0..bin_count)
        .map(|i| Bin::new(min + i as f64 * width, min + (i + 1) as f64 * width))
        .collect();

    for v in values {
        let idx = ((v - min) / width).floor() as usize;
        bins[idx.min(bin_count - 1)].count += 1;
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn constant_values_fall_in_one_bin() {
        let bins = equal_width(&[4.0, 4.0, 4.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
        assert_eq!(bins[0].label, "4.0-4.0");
    }

    #[test]
    fn empty_input_has_no_bins() {
        assert!(equal_width(&[], 10).is_empty());
    }

    #[test]
    fn bin_count_follows_square_root_rule() {
        let values: Vec<f64> = (0..9).map(f64::from).collect();
        let bins = equal_width(&values, 10);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![3, 3, 3]);
        assert_eq!(bins[0].label, "0.0-2.7");

        let many: Vec<f64> = (0..500).map(f64::from).collect();
        assert_eq!(equal_width(&many, 10).len(), 10);
    }

    #[test]
    fn maximum_lands_in_last_bin() {
        let bins = equal_width(&[0.0, 10.0], 10);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[1].count, 1);
    }

    proptest! {
        #[test]
        fn counts_sum_to_number_of_values(values in prop::collection::vec(-1e6f64..1e6, 0..300)) {
            let bins = equal_width(&values, 10);
            let total: usize = bins.iter().map(|b| b.count).sum();
            prop_assert_eq!(total, values.len());
            prop_assert!(bins.len() <= 10);
        }
    }
}
