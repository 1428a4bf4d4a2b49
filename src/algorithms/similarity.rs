// src/algorithms/similarity.rs
//! Weighted nearest-neighbour fallback over heterogeneous rows.

use std::collections::HashMap;

use super::{Estimate, EstimationContext};
use crate::core::{Cell, ModelType, PredictionQuery, Strategy};
use crate::traits::Estimator;
use crate::utils::{clamp_unit, min_max};

/// A dataset row scored against the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub similarity: f64,
    pub target: f64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Similarity;

impl Similarity {
    /// Neighbour count: a knn model's `k` when set, the configured default otherwise.
    pub fn neighbors(ctx: &EstimationContext<'_>) -> usize {
        let from_model = match ctx.model.model_type {
            ModelType::Knn => ctx.model.param("k").filter(|k| *k >= 1.0).map(|k| k as usize),
            _ => None,
        };
        from_model.unwrap_or(ctx.config.neighbors).max(1)
    }

    /// Scores every row with a numeric target, most similar first. `None`
    /// when no row shares a single present feature with the query.
    pub fn rank(ctx: &EstimationContext<'_>, query: &PredictionQuery) -> Option<Vec<Neighbor>> {
        let dataset = ctx.analysis.dataset();
        let features: Vec<(&str, &Cell)> = dataset
            .feature_columns()
            .into_iter()
            .filter_map(|c| query.value(c).map(|v| (c, v)))
            .collect();

        let mut ranges: HashMap<&str, f64> = HashMap::new();
        for (column, value) in &features {
            if value.as_number().is_some() {
                let range = min_max(dataset.numeric_values(column))
                    .map(|(lo, hi)| hi - lo)
                    .filter(|r| *r > 0.0)
                    .unwrap_or(1.0);
                ranges.insert(column, range);
            }
        }

        let mut any_compared = false;
        let mut neighbors: Vec<Neighbor> = dataset
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let target = row.get(ctx.target).and_then(Cell::as_number)?;
                let mut score = 0.0;
                let mut compared = 0usize;
                for (column, input) in &features {
                    let Some(cell) = row.get(*column).filter(|c| !c.is_absent()) else {
                        continue;
                    };
                    compared += 1;
                    score += match (input.as_number(), cell.as_number()) {
                        (Some(q), Some(r)) => {
                            let range = ranges.get(column).copied().unwrap_or(1.0);
                            clamp_unit(1.0 - (q - r).abs() / range)
                        }
                        _ if *input == cell => 1.0,
                        _ => 0.0,
                    };
                }
                any_compared |= compared > 0;
                let similarity = if compared > 0 { score / compared as f64 } else { 0.0 };
                Some(Neighbor {
                    index,
                    similarity,
                    target,
                })
            })
            .collect();

        if !any_compared {
            return None;
        }
        neighbors.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        Some(neighbors)
    }
}

impl Estimator for Similarity {
    fn strategy(&self) -> Strategy {
        Strategy::Similarity
    }

    fn estimate(&self, ctx: &EstimationContext<'_>, query: &PredictionQuery) -> Option<Estimate> {
        let ranked = Self::rank(ctx, query)?;
        let top = &ranked[..Self::neighbors(ctx).min(ranked.len())];
        if top.is_empty() {
            return None;
        }

        let weight_sum: f64 = top.iter().map(|n| n.similarity).sum();
        let weighted: f64 = top.iter().map(|n| n.target * n.similarity).sum();
        let value = if weight_sum > 0.0 { weighted / weight_sum } else { 0.0 };
        let mean_similarity = weight_sum / top.len() as f64;

        Some(Estimate {
            value,
            confidence: clamp_unit(ctx.model_accuracy * mean_similarity),
            strategy: Strategy::Similarity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FeatureAnalysis;
    use crate::core::{Dataset, ModelConfig, PredictionConfig};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn patients() -> Dataset {
        Dataset::from_records(
            "patients.csv",
            &["age", "ward", "bmi", "cost"],
            vec![
                vec![30.0.into(), "icu".into(), 22.0.into(), 900.0.into()],
                vec![45.0.into(), "general".into(), 27.0.into(), 400.0.into()],
                vec![60.0.into(), "icu".into(), 31.0.into(), 1500.0.into()],
                vec![25.0.into(), "maternity".into(), 24.0.into(), 300.0.into()],
                vec![70.0.into(), "general".into(), 29.0.into(), 650.0.into()],
            ],
        )
    }

    fn with_ctx<R>(ds: &Dataset, model: ModelConfig, f: impl FnOnce(&EstimationContext<'_>) -> R) -> R {
        let analysis = FeatureAnalysis::analyze(ds);
        let config = PredictionConfig::default();
        let ctx = EstimationContext {
            analysis: &analysis,
            target: "cost",
            config: &config,
            model: &model,
            model_accuracy: 0.8,
        };
        f(&ctx)
    }

    #[test]
    fn exact_match_ranks_first_with_full_similarity() {
        let ds = patients();
        let query = PredictionQuery::new(ModelType::RandomForest)
            .with_value("age", 60.0)
            .with_value("ward", "icu")
            .with_value("bmi", 31.0);
        let ranked = with_ctx(&ds, ModelConfig::new(ModelType::RandomForest), |ctx| {
            Similarity::rank(ctx, &query).unwrap()
        });
        assert_eq!(ranked[0].index, 2);
        assert_abs_diff_eq!(ranked[0].similarity, 1.0, epsilon = 1e-12);
        assert_eq!(ranked.len(), 5);
    }

    #[test]
    fn estimate_is_similarity_weighted_mean() {
        let ds = patients();
        let query = PredictionQuery::new(ModelType::Knn).with_value("ward", "icu");
        let model = ModelConfig::with_defaults(ModelType::Knn).with_param("k", crate::core::Hyperparameter::Number(2.0));
        let estimate = with_ctx(&ds, model, |ctx| Similarity.estimate(ctx, &query).unwrap());
        // Two icu rows match exactly.
        assert_abs_diff_eq!(estimate.value, 1200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(estimate.confidence, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn out_of_range_inputs_do_not_go_negative() {
        let ds = patients();
        let query = PredictionQuery::new(ModelType::Knn).with_value("age", 500.0);
        let ranked = with_ctx(&ds, ModelConfig::new(ModelType::Knn), |ctx| {
            Similarity::rank(ctx, &query).unwrap()
        });
        assert!(ranked.iter().all(|n| n.similarity >= 0.0));
    }

    #[test]
    fn no_overlap_yields_none() {
        let ds = patients();
        let query = PredictionQuery::new(ModelType::Knn).with_value("height", 180.0);
        let result = with_ctx(&ds, ModelConfig::new(ModelType::Knn), |ctx| {
            Similarity.estimate(ctx, &query)
        });
        assert!(result.is_none());
    }

    #[test]
    fn mixed_kinds_score_zero() {
        let ds = patients();
        let query = PredictionQuery::new(ModelType::Knn).with_value("ward", 3.0);
        let estimate = with_ctx(&ds, ModelConfig::new(ModelType::Knn), |ctx| {
            Similarity.estimate(ctx, &query).unwrap()
        });
        assert_eq!(estimate.value, 0.0);
        assert_eq!(estimate.confidence, 0.0);
    }

    proptest! {
        #[test]
        fn prediction_stays_within_target_range(age in 0.0f64..120.0, bmi in 10.0f64..50.0) {
            let ds = patients();
            let query = PredictionQuery::new(ModelType::Xgboost)
                .with_value("age", age)
                .with_value("bmi", bmi);
            let estimate = with_ctx(&ds, ModelConfig::new(ModelType::Xgboost), |ctx| {
                Similarity.estimate(ctx, &query).unwrap()
            });
            prop_assert!((0.0..=1.0).contains(&estimate.confidence));
            if estimate.confidence > 0.0 {
                prop_assert!(estimate.value >= 300.0 - 1e-9 && estimate.value <= 1500.0 + 1e-9);
            }
        }
    }
}
