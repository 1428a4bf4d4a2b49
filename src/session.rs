// src/session.rs
//! The single owner of the prediction panel's state.

use log::info;

use crate::algorithms::PredictionEngine;
use crate::analysis::FeatureAnalysis;
use crate::core::{
    Dataset, ModelConfig, ModelResult, PredictError, PredictionConfig, PredictionOutcome,
    PredictionQuery, Result, Row,
};
use crate::ingest;
use crate::training::Trainer;

/// Workflow tabs, in the order the panel presents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Upload,
    Models,
    Evaluation,
    Visualization,
    FeatureImportance,
    Predict,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Upload,
        Stage::Models,
        Stage::Evaluation,
        Stage::Visualization,
        Stage::FeatureImportance,
        Stage::Predict,
    ];
}

/// Dataset, selected models and their results. Every action replaces state
/// wholesale; nothing is persisted.
#[derive(Debug, Default)]
pub struct Session {
    config: PredictionConfig,
    dataset: Option<Dataset>,
    models: Vec<ModelConfig>,
    results: Vec<ModelResult>,
}

impl Session {
    pub fn new(config: Option<PredictionConfig>) -> Self {
        Session {
            config: config.unwrap_or_default(),
            ..Session::default()
        }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Leading rows of the loaded dataset, `preview_rows` at most.
    pub fn preview(&self) -> &[Row] {
        match &self.dataset {
            Some(dataset) => dataset.preview(self.config.preview_rows),
            None => &[],
        }
    }

    pub fn models(&self) -> &[ModelConfig] {
        &self.models
    }

    pub fn results(&self) -> &[ModelResult] {
        &self.results
    }

    /// Validates and parses an upload. On failure the previous state is kept.
    pub fn upload(&mut self, filename: &str, content_type: Option<&str>, text: &str) -> Result<&Dataset> {
        ingest::check_upload(filename, content_type)?;
        let dataset = ingest::ingest(filename, text)?;
        Ok(self.load_dataset(dataset))
    }

    /// Replaces the dataset and discards models and results trained on the old one.
    pub fn load_dataset(&mut self, dataset: Dataset) -> &Dataset {
        info!(
            "using {} with {} rows and {} columns",
            dataset.filename,
            dataset.len(),
            dataset.columns().len()
        );
        self.models.clear();
        self.results.clear();
        self.dataset.insert(dataset)
    }

    pub fn set_target(&mut self, column: &str) -> Result<()> {
        let dataset = self.dataset.as_mut().ok_or_else(no_dataset)?;
        dataset.set_target(column)?;
        self.models.clear();
        self.results.clear();
        Ok(())
    }

    pub fn analysis(&self) -> Result<FeatureAnalysis<'_>> {
        let dataset = self.dataset.as_ref().ok_or_else(no_dataset)?;
        Ok(FeatureAnalysis::with_max_bins(dataset, self.config.max_histogram_bins))
    }

    /// Evaluates the given models; on success they and their results replace
    /// the previous ones.
    pub fn train(&mut self, models: Vec<ModelConfig>) -> Result<&[ModelResult]> {
        if models.is_empty() {
            return Err(PredictError::InvalidInput("select at least one model".to_string()));
        }
        let dataset = self.dataset.as_ref().ok_or_else(no_dataset)?;
        let results = Trainer::new(Some(self.config.clone())).train(dataset, &models)?;
        info!("{} models trained on {} data points", models.len(), dataset.len());
        self.models = models;
        self.results = results;
        Ok(&self.results)
    }

    /// Results ordered by R², best first.
    pub fn ranked_results(&self) -> Vec<&ModelResult> {
        let mut ranked: Vec<&ModelResult> = self.results.iter().collect();
        ranked.sort_by(|a, b| b.metrics.r2.total_cmp(&a.metrics.r2));
        ranked
    }

    pub fn predict(&self, query: &PredictionQuery) -> PredictionOutcome {
        match &self.dataset {
            Some(dataset) => PredictionEngine::new(dataset, &self.config).predict(&self.results, query),
            None => PredictionOutcome::unavailable(),
        }
    }

    pub fn is_enabled(&self, stage: Stage) -> bool {
        let has_target = self.dataset.as_ref().map_or(false, |d| d.target().is_some());
        match stage {
            Stage::Upload => true,
            Stage::Models | Stage::Visualization => has_target,
            Stage::Evaluation | Stage::FeatureImportance | Stage::Predict => {
                has_target && !self.results.is_empty()
            }
        }
    }
}

fn no_dataset() -> PredictError {
    PredictError::InvalidInput("no dataset loaded".to_string())
}
