// src/traits.rs
use crate::algorithms::{Estimate, EstimationContext};
use crate::core::{PredictionQuery, Strategy};

/// A prediction strategy the engine can try.
///
/// Returning `None` means the strategy's preconditions are not met for this
/// query and the engine should move on to the next one.
pub trait Estimator {
    fn strategy(&self) -> Strategy;

    fn estimate(&self, ctx: &EstimationContext<'_>, query: &PredictionQuery) -> Option<Estimate>;
}
