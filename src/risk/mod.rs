//! Tail-risk analytics over simulated outcome distributions.
//!
//! `var` holds the estimators on sorted slices; [`RiskMetrics`] exposes them on anything that
//! already owns a sorted outcome sample, such as [`SimulationResults`], so no call re-sorts.

pub mod var;

pub use var::{
    TailRisk, conditional_value_at_risk, conditional_value_at_risk_sorted, tail_risk_sorted,
    value_at_risk, value_at_risk_sorted,
};

use crate::mc::SimulationResults;

/// Value-at-Risk and Conditional Value-at-Risk on a sorted outcome sample.
pub trait RiskMetrics {
    /// Outcomes in ascending order.
    fn sorted_outcomes(&self) -> &[f64];

    /// `(1 - confidence)` percentile of the outcomes.
    ///
    /// # Panics
    /// Panics if the sample is empty or `confidence` is outside `[0, 1]`.
    fn value_at_risk(&self, confidence: f64) -> f64 {
        value_at_risk_sorted(self.sorted_outcomes(), confidence)
    }

    /// Mean of the outcomes at or below [`Self::value_at_risk`].
    ///
    /// # Panics
    /// Panics if the sample is empty or `confidence` is outside `[0, 1]`.
    fn conditional_value_at_risk(&self, confidence: f64) -> f64 {
        conditional_value_at_risk_sorted(self.sorted_outcomes(), confidence)
    }

    fn tail_risk(&self, confidence: f64) -> TailRisk {
        tail_risk_sorted(self.sorted_outcomes(), confidence)
    }

    /// One [`TailRisk`] per level, in the given order.
    fn tail_risk_report(&self, levels: &[f64]) -> Vec<TailRisk> {
        levels.iter().map(|&c| self.tail_risk(c)).collect()
    }
}

impl RiskMetrics for SimulationResults {
    fn sorted_outcomes(&self) -> &[f64] {
        self.sorted_values()
    }
}
