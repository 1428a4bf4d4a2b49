// src/core/errors.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    /// Malformed or empty upload. No partial dataset is kept.
    #[error("Parse Error: {0}")]
    Parse(String),
    /// No target column chosen, or the chosen one is not in the dataset.
    #[error("Missing Target: {0}")]
    MissingTarget(String),
    #[error("Unknown Column: {0}")]
    UnknownColumn(String),
    #[error("Insufficient Data: need at least {required} rows, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("Invalid Input: {0}")]
    InvalidInput(String),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Config Error: {0}")]
    Config(#[from] serde_json::Error),
}

impl PredictError {
    pub fn parse(msg: impl Into<String>) -> Self {
        PredictError::Parse(msg.into())
    }

    pub fn unknown_column(name: &str) -> Self {
        PredictError::UnknownColumn(format!("column '{}' is not part of the dataset", name))
    }
}

// Convenience type alias for Result
pub type Result<T> = std::result::Result<T, PredictError>;
