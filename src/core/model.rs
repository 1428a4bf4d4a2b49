// src/core/model.rs
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::data::Cell;

/// Model families the panel offers. Only the trend/similarity engine backs
/// them; the type selects evaluation and prediction behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Knn,
    DecisionTree,
    RandomForest,
    Xgboost,
    LinearRegression,
    Lstm,
    Arima,
    Prophet,
}

impl ModelType {
    pub const ALL: [ModelType; 8] = [
        ModelType::Knn,
        ModelType::DecisionTree,
        ModelType::RandomForest,
        ModelType::Xgboost,
        ModelType::LinearRegression,
        ModelType::Lstm,
        ModelType::Arima,
        ModelType::Prophet,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::Knn => "K-Nearest Neighbors",
            ModelType::DecisionTree => "Decision Tree",
            ModelType::RandomForest => "Random Forest",
            ModelType::Xgboost => "XGBoost",
            ModelType::LinearRegression => "Linear Regression",
            ModelType::Lstm => "LSTM",
            ModelType::Arima => "ARIMA",
            ModelType::Prophet => "Prophet",
        }
    }

    /// Sequence models get the seasonal offset and covariate adjustment on
    /// the time-aware path.
    pub fn is_sequence_model(&self) -> bool {
        matches!(self, ModelType::Lstm | ModelType::Arima | ModelType::Prophet)
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Hyperparameter {
    Number(f64),
    Text(String),
}

impl Hyperparameter {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Hyperparameter::Number(v) => Some(*v),
            Hyperparameter::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[serde(default)]
    pub hyperparameters: BTreeMap<String, Hyperparameter>,
}

impl ModelConfig {
    pub fn new(model_type: ModelType) -> Self {
        ModelConfig {
            name: model_type.display_name().to_string(),
            model_type,
            hyperparameters: BTreeMap::new(),
        }
    }

    /// The configuration the model picker starts from.
    pub fn with_defaults(model_type: ModelType) -> Self {
        let defaults: &[(&str, f64)] = match model_type {
            ModelType::Knn => &[("k", 5.0)],
            ModelType::DecisionTree => &[("max_depth", 5.0)],
            ModelType::RandomForest => &[("n_estimators", 100.0), ("max_depth", 10.0)],
            ModelType::Xgboost => &[("n_estimators", 100.0), ("learning_rate", 0.1)],
            _ => &[],
        };
        let mut config = ModelConfig::new(model_type);
        for (key, value) in defaults {
            config
                .hyperparameters
                .insert(key.to_string(), Hyperparameter::Number(*value));
        }
        config
    }

    pub fn with_param(mut self, key: &str, value: Hyperparameter) -> Self {
        self.hyperparameters.insert(key.to_string(), value);
        self
    }

    pub fn param(&self, key: &str) -> Option<f64> {
        self.hyperparameters.get(key).and_then(Hyperparameter::as_number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl Metrics {
    /// Accuracy if reported, R² otherwise, clamped to `[0, 1]`.
    pub fn model_accuracy(&self) -> f64 {
        crate::utils::clamp_unit(self.accuracy.unwrap_or(self.r2))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionPair {
    pub actual: f64,
    pub predicted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResult {
    pub model: ModelConfig,
    pub metrics: Metrics,
    pub predictions: Vec<PredictionPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<IndexMap<String, f64>>,
}

impl ModelResult {
    /// Feature weights, highest first.
    pub fn ranked_importance(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .feature_importance
            .iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionQuery {
    pub input_values: IndexMap<String, Cell>,
    pub model_type: ModelType,
}

impl PredictionQuery {
    pub fn new(model_type: ModelType) -> Self {
        PredictionQuery {
            input_values: IndexMap::new(),
            model_type,
        }
    }

    pub fn with_value(mut self, column: &str, value: impl Into<Cell>) -> Self {
        self.input_values.insert(column.to_string(), value.into());
        self
    }

    /// Builds a query from raw form inputs, coercing each value with
    /// [`Cell::parse`].
    pub fn from_strings<'a, I>(model_type: ModelType, inputs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let input_values = inputs
            .into_iter()
            .map(|(k, v)| (k.to_string(), Cell::parse(v)))
            .collect();
        PredictionQuery {
            input_values,
            model_type,
        }
    }

    pub fn value(&self, column: &str) -> Option<&Cell> {
        self.input_values.get(column).filter(|c| !c.is_absent())
    }
}

/// Which branch of the decision policy produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    TimeTrend,
    Similarity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub predicted_value: f64,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<IndexMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
}

impl PredictionOutcome {
    /// The soft failure returned when no prediction is possible.
    pub fn unavailable() -> Self {
        PredictionOutcome {
            predicted_value: 0.0,
            confidence: 0.0,
            feature_importance: None,
            strategy: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.strategy.is_some()
    }
}

impl fmt::Display for PredictionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prediction:")?;
        writeln!(f, "  Predicted Value: {:.2}", self.predicted_value)?;
        writeln!(f, "  Confidence:      {:.1}%", self.confidence * 100.0)?;
        if let Some(strategy) = self.strategy {
            writeln!(f, "  Strategy:        {:?}", strategy)?;
        }
        Ok(())
    }
}
