// src/algorithms/mod.rs
pub mod regression;
pub mod similarity;

pub use regression::{LinearTrend, TimeTrend};
pub use similarity::{Neighbor, Similarity};

use log::warn;

use crate::analysis::FeatureAnalysis;
use crate::core::{
    Dataset, ModelConfig, ModelResult, PredictionConfig, PredictionOutcome, PredictionQuery,
    Strategy,
};
use crate::traits::Estimator;
use crate::utils::clamp_unit;

/// Everything a strategy reads while answering one query.
#[derive(Debug, Clone, Copy)]
pub struct EstimationContext<'a> {
    pub analysis: &'a FeatureAnalysis<'a>,
    pub target: &'a str,
    pub config: &'a PredictionConfig,
    pub model: &'a ModelConfig,
    /// Already clamped to `[0, 1]`.
    pub model_accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: f64,
    pub confidence: f64,
    pub strategy: Strategy,
}

/// Answers prediction queries against one dataset, trying the time-aware
/// trend first and the similarity fallback second.
#[derive(Debug)]
pub struct PredictionEngine<'a> {
    analysis: FeatureAnalysis<'a>,
    config: &'a PredictionConfig,
}

impl<'a> PredictionEngine<'a> {
    pub fn new(dataset: &'a Dataset, config: &'a PredictionConfig) -> Self {
        PredictionEngine {
            analysis: FeatureAnalysis::with_max_bins(dataset, config.max_histogram_bins),
            config,
        }
    }

    pub fn analysis(&self) -> &FeatureAnalysis<'a> {
        &self.analysis
    }

    /// Predicts with the trained result for the query's model type.
    ///
    /// Never fails: a missing result, a missing target or a query sharing no
    /// feature with the data yields a zero-confidence outcome.
    pub fn predict(&self, results: &[ModelResult], query: &PredictionQuery) -> PredictionOutcome {
        let Some(result) = results.iter().find(|r| r.model.model_type == query.model_type) else {
            warn!("no trained result for {}; prediction unavailable", query.model_type);
            return PredictionOutcome::unavailable();
        };

        match self.estimate(&result.model, result.metrics.model_accuracy(), query) {
            Some(estimate) => PredictionOutcome {
                predicted_value: estimate.value,
                confidence: estimate.confidence,
                feature_importance: result.feature_importance.clone(),
                strategy: Some(estimate.strategy),
            },
            None => {
                warn!("no usable feature overlap for {} query", query.model_type);
                PredictionOutcome {
                    feature_importance: result.feature_importance.clone(),
                    ..PredictionOutcome::unavailable()
                }
            }
        }
    }

    /// Runs the decision policy for an explicit model and accuracy.
    pub fn estimate(
        &self,
        model: &ModelConfig,
        model_accuracy: f64,
        query: &PredictionQuery,
    ) -> Option<Estimate> {
        let target = self.analysis.dataset().target()?;
        let ctx = EstimationContext {
            analysis: &self.analysis,
            target,
            config: self.config,
            model,
            model_accuracy: clamp_unit(model_accuracy),
        };

        let strategies: [&dyn Estimator; 2] = [&TimeTrend, &Similarity];
        strategies.iter().find_map(|s| {
            let estimate = s.estimate(&ctx, query);
            if estimate.is_none() {
                log::trace!("{:?} declined query", s.strategy());
            }
            estimate
        })
    }
}
