//! Central tendency, dispersion, shape, and normal-approximation confidence intervals.
//!
//! Conventions:
//! - variance and standard deviation use the sample (`n - 1`) denominator and are zero for a
//!   single observation;
//! - skewness is `(1/n) * sum(((x_i - mean) / s)^3)` where `s` is the sample standard
//!   deviation, and zero when `s` is zero. For `[1, 2, 3, 4, 10]` this gives
//!   `36 / 12.5^1.5 = 0.814593...`.

use serde::{Deserialize, Serialize};

use crate::math::two_tailed_z;
use crate::stats::percentile::{percentile_sorted, sorted_copy};

/// Symmetric interval around the mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Confidence level in `(0, 1)`.
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, x: f64) -> bool {
        (self.lower..=self.upper).contains(&x)
    }
}

/// Descriptive statistics of a simulated outcome sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: f64,
}

impl OutcomeStatistics {
    /// Computes statistics from ascending values. An empty slice yields `count == 0` and NaN
    /// moments.
    pub fn from_sorted(sorted: &[f64]) -> Self {
        let count = sorted.len();
        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                median: f64::NAN,
                std_dev: f64::NAN,
                variance: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
                skewness: f64::NAN,
            };
        }

        let n = count as f64;
        let mean = sorted.iter().sum::<f64>() / n;

        let mut m2 = 0.0;
        let mut m3 = 0.0;
        for &x in sorted {
            let d = x - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
        }

        let variance = if count > 1 { m2 / (n - 1.0) } else { 0.0 };
        let std_dev = variance.sqrt();
        let skewness = if std_dev > 0.0 {
            (m3 / n) / (std_dev * std_dev * std_dev)
        } else {
            0.0
        };

        Self {
            count,
            mean,
            median: percentile_sorted(sorted, 0.5),
            std_dev,
            variance,
            min: sorted[0],
            max: sorted[count - 1],
            skewness,
        }
    }

    /// Computes statistics from values in any order.
    pub fn from_values(values: &[f64]) -> Self {
        Self::from_sorted(&sorted_copy(values))
    }

    /// Standard error of the mean, `s / sqrt(n)`.
    pub fn standard_error(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.std_dev / (self.count as f64).sqrt()
    }

    /// Parametric outcome interval `mean ± z * s`.
    ///
    /// This describes the spread of individual outcomes under a normal approximation. It is
    /// not a tail-risk estimate; use the empirical VaR in [`crate::risk`] for that.
    ///
    /// # Panics
    /// Panics unless `level` lies in `(0, 1)`.
    pub fn confidence_interval(&self, level: f64) -> ConfidenceInterval {
        let half = two_tailed_z(level) * self.std_dev;
        ConfidenceInterval {
            level,
            lower: self.mean - half,
            upper: self.mean + half,
        }
    }

    /// Interval for the mean itself, `mean ± z * s / sqrt(n)`.
    ///
    /// # Panics
    /// Panics unless `level` lies in `(0, 1)`.
    pub fn mean_confidence_interval(&self, level: f64) -> ConfidenceInterval {
        let half = two_tailed_z(level) * self.standard_error();
        ConfidenceInterval {
            level,
            lower: self.mean - half,
            upper: self.mean + half,
        }
    }
}
