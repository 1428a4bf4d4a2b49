// src/lib.rs

//! `tabular_predict` turns an uploaded CSV table into on-demand predictions.
//!
//! The pipeline is synchronous and in-memory:
//!
//! 1. [`ingest`] parses comma-separated text into a typed [`Dataset`].
//! 2. [`FeatureAnalysis`] classifies columns, spots time-like ones by name and
//!    bins numeric columns for charting.
//! 3. [`PredictionEngine`] answers a [`PredictionQuery`] with a least-squares
//!    trend when the query carries a time value, or a weighted
//!    nearest-neighbour average otherwise.
//!
//! [`Trainer`] scores model selections on a holdout split and [`Session`] owns
//! the whole workflow state.
//!
//! ```
//! use tabular_predict::{ModelConfig, ModelType, PredictionQuery, Session};
//!
//! let csv = "year,sales\n2019,90\n2020,100\n2021,110\n2022,120\n2023,130\n";
//! let mut session = Session::new(None);
//! session.upload("sales.csv", Some("text/csv"), csv)?;
//! session.train(vec![ModelConfig::with_defaults(ModelType::LinearRegression)])?;
//!
//! let query = PredictionQuery::new(ModelType::LinearRegression).with_value("year", 2024.0);
//! let outcome = session.predict(&query);
//! assert!((outcome.predicted_value - 140.0).abs() < 1e-6);
//! # Ok::<(), tabular_predict::PredictError>(())
//! ```

pub mod algorithms;
pub mod analysis;
pub mod core;
pub mod ingest;
pub mod session;
pub mod synthetic;
pub mod training;
pub mod traits;
pub mod utils;

// Re-export key components for easier use by library consumers
pub use crate::algorithms::{Estimate, PredictionEngine};
pub use crate::analysis::{Bin, ColumnKind, FeatureAnalysis};
pub use crate::core::{
    Cell, Dataset, Hyperparameter, Metrics, ModelConfig, ModelResult, ModelType, PredictError,
    PredictionConfig, PredictionOutcome, PredictionPair, PredictionQuery, Result, Row, Strategy,
};
pub use crate::ingest::ingest;
pub use crate::session::{Session, Stage};
pub use crate::traits::Estimator;
pub use crate::training::Trainer;
