// src/training.rs
//! Evaluates selected models (leave-one-out or seeded holdout) and derives feature weights.

use indexmap::IndexMap;
use log::info;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::algorithms::PredictionEngine;
use crate::analysis::FeatureAnalysis;
use crate::core::{
    Cell, Dataset, Metrics, ModelConfig, ModelResult, PredictError, PredictionConfig,
    PredictionPair, PredictionQuery, Result,
};
use crate::utils::{clamp_unit, correlation_ratio, pearson};

#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: PredictionConfig,
}

impl Trainer {
    pub fn new(config: Option<PredictionConfig>) -> Self {
        Trainer {
            config: config.unwrap_or_default(),
        }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Produces one result per model, in the order given.
    pub fn train(&self, dataset: &Dataset, models: &[ModelConfig]) -> Result<Vec<ModelResult>> {
        let target = dataset
            .target()
            .ok_or_else(|| PredictError::MissingTarget("no target column selected".to_string()))?;

        let mut labelled: Vec<usize> = (0..dataset.len())
            .filter(|&i| dataset.cell(i, target).and_then(Cell::as_number).is_some())
            .collect();
        if labelled.len() < 2 {
            return Err(PredictError::InsufficientData {
                required: 2,
                actual: labelled.len(),
            });
        }

        let splits: Vec<(Vec<usize>, Dataset)> = self
            .splits(&mut labelled)
            .into_iter()
            .map(|(test_idx, train_idx)| (test_idx, dataset.subset(&train_idx)))
            .collect();
        let importance = feature_importance(dataset, target);

        models
            .iter()
            .map(|model| {
                let mut pairs: Vec<PredictionPair> = Vec::new();
                for (test_idx, train) in &splits {
                    let engine = PredictionEngine::new(train, &self.config);
                    for &i in test_idx {
                        let Some(actual) = dataset.cell(i, target).and_then(Cell::as_number) else {
                            continue;
                        };
                        let query = holdout_query(dataset, i, model);
                        let predicted = engine.estimate(model, 1.0, &query).map_or(0.0, |e| e.value);
                        pairs.push(PredictionPair { actual, predicted });
                    }
                }

                let metrics = score(&pairs);
                info!(
                    "{}: rmse {:.4}, mae {:.4}, r2 {:.4} on {} holdout rows",
                    model.name,
                    metrics.rmse,
                    metrics.mae,
                    metrics.r2,
                    pairs.len()
                );
                Ok(ModelResult {
                    model: model.clone(),
                    metrics,
                    predictions: pairs
                        .into_iter()
                        .take(self.config.max_prediction_samples)
                        .collect(),
                    feature_importance: Some(importance.clone()),
                })
            })
            .collect()
    }

    /// `(test, train)` row index sets: one per row for small datasets, a
    /// single seeded holdout split otherwise. Training rows stay in row order
    /// so a trend fit does not depend on the shuffle.
    fn splits(&self, labelled: &mut [usize]) -> Vec<(Vec<usize>, Vec<usize>)> {
        if labelled.len() <= self.config.leave_one_out_max_rows {
            return (0..labelled.len())
                .map(|k| {
                    let train = labelled
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| *j != k)
                        .map(|(_, &i)| i)
                        .collect();
                    (vec![labelled[k]], train)
                })
                .collect();
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        labelled.shuffle(&mut rng);
        let holdout = ((labelled.len() as f64 * self.config.holdout_fraction).round() as usize)
            .clamp(1, labelled.len() - 1);
        let (test, train) = labelled.split_at(holdout);
        let mut train = train.to_vec();
        train.sort_unstable();
        vec![(test.to_vec(), train)]
    }
}

fn holdout_query(dataset: &Dataset, row: usize, model: &ModelConfig) -> PredictionQuery {
    let mut query = PredictionQuery::new(model.model_type);
    for column in dataset.feature_columns() {
        if let Some(cell) = dataset.cell(row, column).filter(|c| !c.is_absent()) {
            query.input_values.insert(column.to_string(), cell.clone());
        }
    }
    query
}

/// RMSE, MAE, R² (clamped to `[-1, 1]`) and accuracy as `1 - mae / mean|actual|`.
pub fn score(pairs: &[PredictionPair]) -> Metrics {
    if pairs.is_empty() {
        return Metrics { rmse: 0.0, mae: 0.0, r2: 0.0, accuracy: None };
    }
    let actual = Array1::from_iter(pairs.iter().map(|p| p.actual));
    let predicted = Array1::from_iter(pairs.iter().map(|p| p.predicted));
    let errors = &actual - &predicted;
    let n = pairs.len() as f64;

    let mse = errors.dot(&errors) / n;
    let mae = errors.mapv(f64::abs).sum() / n;
    let mean = actual.mean().unwrap_or(0.0);
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let r2 = if ss_tot > 0.0 {
        (1.0 - errors.dot(&errors) / ss_tot).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let scale = actual.mapv(f64::abs).sum() / n;
    let accuracy = (scale > 0.0).then(|| clamp_unit(1.0 - mae / scale));

    Metrics {
        rmse: mse.sqrt(),
        mae,
        r2,
        accuracy,
    }
}

/// Normalised strength of association between each feature and the target:
/// |Pearson r| for numeric features, the correlation ratio for categorical ones.
pub fn feature_importance(dataset: &Dataset, target: &str) -> IndexMap<String, f64> {
    let analysis = FeatureAnalysis::analyze(dataset);
    let mut raw: IndexMap<String, f64> = IndexMap::new();

    for column in dataset.feature_columns() {
        let weight = if analysis.is_numeric(column) {
            let (x, y): (Vec<f64>, Vec<f64>) = dataset.numeric_pairs(column, target).into_iter().unzip();
            pearson(Array1::from(x).view(), Array1::from(y).view()).abs()
        } else {
            let (groups, y): (Vec<String>, Vec<f64>) = dataset
                .rows()
                .iter()
                .filter_map(|r| {
                    let group = match r.get(column)? {
                        Cell::Text(s) => s.clone(),
                        _ => return None,
                    };
                    let y = r.get(target).and_then(Cell::as_number)?;
                    Some((group, y))
                })
                .unzip();
            correlation_ratio(&groups, Array1::from(y).view())
        };
        raw.insert(column.to_string(), if weight.is_finite() { weight } else { 0.0 });
    }

    let total: f64 = raw.values().sum();
    let count = raw.len() as f64;
    for weight in raw.values_mut() {
        *weight = if total > 0.0 { *weight / total } else { 1.0 / count };
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModelType;
    use crate::synthetic::linear_series;
    use approx::assert_abs_diff_eq;

    #[test]
    fn trend_data_scores_well_for_regression() {
        let ds = linear_series("day", "visits", 40, 3.0, 20.0, 0.0, 11).unwrap();
        let trainer = Trainer::new(None);
        let results = trainer
            .train(&ds, &[ModelConfig::with_defaults(ModelType::LinearRegression)])
            .unwrap();
        assert_eq!(results.len(), 1);
        let metrics = results[0].metrics;
        assert_abs_diff_eq!(metrics.rmse, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(metrics.r2, 1.0, epsilon = 1e-9);
        assert_eq!(results[0].predictions.len(), 8);
    }

    #[test]
    fn small_datasets_are_scored_leave_one_out() {
        let ds = Dataset::from_records(
            "sales.csv",
            &["year", "sales"],
            vec![
                vec![2020.0.into(), 100.0.into()],
                vec![2021.0.into(), 110.0.into()],
                vec![2022.0.into(), 120.0.into()],
            ],
        );
        let results = Trainer::new(None)
            .train(&ds, &[ModelConfig::with_defaults(ModelType::LinearRegression)])
            .unwrap();
        let result = &results[0];
        assert_eq!(result.predictions.len(), 3);
        // Two training rows are too few for a trend, so only the middle year
        // is recovered by the similarity fallback.
        assert_abs_diff_eq!(result.predictions[1].predicted, 110.0, epsilon = 1e-9);
        assert!(result.metrics.model_accuracy() > 0.0);
    }

    #[test]
    fn training_is_reproducible_for_a_seed() {
        let ds = linear_series("day", "visits", 30, 1.0, 5.0, 4.0, 3).unwrap();
        let models = [
            ModelConfig::with_defaults(ModelType::Knn),
            ModelConfig::with_defaults(ModelType::Prophet),
        ];
        let trainer = Trainer::new(None);
        let first = trainer.train(&ds, &models).unwrap();
        let second = trainer.train(&ds, &models).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].model.model_type, ModelType::Knn);
        assert_eq!(first[1].model.model_type, ModelType::Prophet);
    }

    #[test]
    fn missing_target_and_tiny_data_are_errors() {
        let ds = Dataset::from_records("one.csv", &["x", "y"], vec![vec![1.0.into(), 2.0.into()]]);
        let err = Trainer::new(None).train(&ds, &[ModelConfig::new(ModelType::Knn)]).unwrap_err();
        assert!(matches!(err, PredictError::InsufficientData { required: 2, actual: 1 }));

        let ds = Dataset::from_records::<&str>("none.csv", &[], Vec::new());
        let err = Trainer::new(None).train(&ds, &[ModelConfig::new(ModelType::Knn)]).unwrap_err();
        assert!(matches!(err, PredictError::MissingTarget(_)));
    }

    #[test]
    fn score_handles_constant_actuals() {
        let pairs = [
            PredictionPair { actual: 5.0, predicted: 4.0 },
            PredictionPair { actual: 5.0, predicted: 6.0 },
        ];
        let m = score(&pairs);
        assert_abs_diff_eq!(m.rmse, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.mae, 1.0, epsilon = 1e-12);
        assert_eq!(m.r2, 0.0);
        assert_abs_diff_eq!(m.accuracy.unwrap(), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn importance_is_normalised_and_favours_signal() {
        let ds = Dataset::from_records(
            "ward.csv",
            &["noise", "ward", "dose", "outcome"],
            vec![
                vec![3.0.into(), "a".into(), 1.0.into(), 10.0.into()],
                vec![1.0.into(), "a".into(), 2.0.into(), 20.0.into()],
                vec![4.0.into(), "b".into(), 3.0.into(), 30.0.into()],
                vec![1.0.into(), "b".into(), 4.0.into(), 40.0.into()],
            ],
        );
        let importance = feature_importance(&ds, "outcome");
        let total: f64 = importance.values().sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        assert!(importance["dose"] > importance["ward"]);
        assert!(importance["dose"] > importance["noise"]);
    }
}
