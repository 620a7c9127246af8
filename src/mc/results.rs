//! Outcome distribution of a finished simulation.

use serde::{Deserialize, Serialize};

use crate::core::{Result, SimulationError};
use crate::risk::{RiskMetrics, TailRisk};
use crate::stats::{
    ConfidenceInterval, Histogram, OutcomeStatistics, PercentileSet, percentile_sorted, sorted_copy,
};

/// Confidence levels reported by [`SimulationResults::summary`].
pub const SUMMARY_TAIL_LEVELS: [f64; 3] = [0.90, 0.95, 0.99];

/// Outcomes in iteration order, plus a sorted copy and the statistics derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResults {
    values: Vec<f64>,
    sorted: Vec<f64>,
    statistics: OutcomeStatistics,
    percentiles: PercentileSet,
}

impl SimulationResults {
    pub(crate) fn from_outcomes(values: Vec<f64>) -> Self {
        let sorted = sorted_copy(&values);
        let statistics = OutcomeStatistics::from_sorted(&sorted);
        let percentiles = PercentileSet::from_sorted(&sorted);
        Self {
            values,
            sorted,
            statistics,
            percentiles,
        }
    }

    /// Analyzes externally produced outcomes.
    ///
    /// Fails on an empty sample and on the first non-finite value.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(SimulationError::InsufficientIterations);
        }
        if let Some((iteration, &outcome)) = values.iter().enumerate().find(|(_, v)| !v.is_finite())
        {
            return Err(SimulationError::InvalidModel {
                iteration,
                inputs: Vec::new(),
                outcome,
            });
        }
        Ok(Self::from_outcomes(values))
    }

    /// Outcomes in iteration order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Outcomes in ascending order.
    pub fn sorted_values(&self) -> &[f64] {
        &self.sorted
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn statistics(&self) -> &OutcomeStatistics {
        &self.statistics
    }

    pub fn percentiles(&self) -> &PercentileSet {
        &self.percentiles
    }

    /// R-7 percentile at level `p`.
    ///
    /// # Panics
    /// Panics if `p` is outside `[0, 1]`.
    pub fn percentile(&self, p: f64) -> f64 {
        percentile_sorted(&self.sorted, p)
    }

    pub fn mean(&self) -> f64 {
        self.statistics.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.statistics.std_dev
    }

    /// Fraction of outcomes strictly greater than `threshold`.
    pub fn probability_above(&self, threshold: f64) -> f64 {
        let at_or_below = self.sorted.partition_point(|&x| x <= threshold);
        self.fraction(self.sorted.len() - at_or_below)
    }

    /// Fraction of outcomes strictly less than `threshold`.
    pub fn probability_below(&self, threshold: f64) -> f64 {
        self.fraction(self.sorted.partition_point(|&x| x < threshold))
    }

    /// Fraction of outcomes in `[lower, upper]`; zero when `lower > upper`.
    pub fn probability_between(&self, lower: f64, upper: f64) -> f64 {
        if lower > upper {
            return 0.0;
        }
        let lo = self.sorted.partition_point(|&x| x < lower);
        let hi = self.sorted.partition_point(|&x| x <= upper);
        self.fraction(hi - lo)
    }

    fn fraction(&self, count: usize) -> f64 {
        if self.sorted.is_empty() {
            return f64::NAN;
        }
        count as f64 / self.sorted.len() as f64
    }

    /// Equal-width histogram of the outcomes.
    ///
    /// # Panics
    /// Panics if `bins == 0`.
    pub fn histogram(&self, bins: usize) -> Histogram {
        Histogram::from_sorted(&self.sorted, bins)
    }

    /// Normal-approximation outcome interval `mean ± z * s`.
    ///
    /// # Panics
    /// Panics unless `level` lies in `(0, 1)`.
    pub fn confidence_interval(&self, level: f64) -> ConfidenceInterval {
        self.statistics.confidence_interval(level)
    }

    /// Interval for the estimated mean, `mean ± z * s / sqrt(n)`.
    ///
    /// # Panics
    /// Panics unless `level` lies in `(0, 1)`.
    pub fn mean_confidence_interval(&self, level: f64) -> ConfidenceInterval {
        self.statistics.mean_confidence_interval(level)
    }

    /// Serializable snapshot of statistics, percentiles, and tail risk at 90/95/99%.
    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            statistics: self.statistics,
            percentiles: self.percentiles,
            mean_confidence_interval: self.mean_confidence_interval(0.95),
            tail_risk: self.tail_risk_report(&SUMMARY_TAIL_LEVELS),
        }
    }
}

/// Report-ready digest of a [`SimulationResults`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub statistics: OutcomeStatistics,
    pub percentiles: PercentileSet,
    /// 95% interval for the mean.
    pub mean_confidence_interval: ConfidenceInterval,
    pub tail_risk: Vec<TailRisk>,
}
