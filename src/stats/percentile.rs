//! R-7 (Hyndman-Fan type 7) percentile estimator.
//!
//! Every quantile in the crate, including medians and Value-at-Risk, goes through
//! [`percentile_sorted`] so that percentiles and tail metrics never disagree at the same
//! level.

use serde::{Deserialize, Serialize};

/// Linear-interpolation percentile of ascending `sorted` values.
///
/// Position `(n - 1) * p` (0-based) is interpolated between its floor and ceiling order
/// statistics. `n == 1` returns the single value for any `p`; `p = 0` is the minimum and
/// `p = 1` the maximum. An empty slice yields NaN.
///
/// The input must already be sorted ascending; use [`percentile`] for unsorted data.
///
/// # Panics
/// Panics if `p` is NaN or outside `[0, 1]`.
///
/// # Examples
/// ```rust
/// use ferricsim::stats::percentile_sorted;
///
/// let sorted = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(percentile_sorted(&sorted, 0.5), 2.5);
/// assert_eq!(percentile_sorted(&sorted, 1.0), 4.0);
/// ```
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!((0.0..=1.0).contains(&p), "p must be in [0, 1]");

    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = p * (n as f64 - 1.0);
            let lo = rank.floor() as usize;
            let hi = (rank.ceil() as usize).min(n - 1);
            if lo == hi {
                sorted[lo]
            } else {
                let w = rank - lo as f64;
                let (a, b) = (sorted[lo], sorted[hi]);
                (a + w * (b - a)).clamp(a, b)
            }
        }
    }
}

/// Percentile of unsorted `values`; sorts a copy first.
///
/// # Panics
/// Panics if `p` is NaN or outside `[0, 1]`.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    percentile_sorted(&sorted_copy(values), p)
}

/// Ascending copy of `values` using IEEE total ordering.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Standard percentile levels reported for every simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileSet {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
}

impl PercentileSet {
    /// Builds the set from ascending values.
    pub fn from_sorted(sorted: &[f64]) -> Self {
        let q = |p: f64| percentile_sorted(sorted, p);
        Self {
            p5: q(0.05),
            p10: q(0.10),
            p25: q(0.25),
            p50: q(0.50),
            p75: q(0.75),
            p90: q(0.90),
            p95: q(0.95),
            p99: q(0.99),
            min: q(0.0),
            max: q(1.0),
        }
    }

    /// Interquartile range `p75 - p25`.
    pub fn interquartile_range(&self) -> f64 {
        self.p75 - self.p25
    }

    /// `(level, value)` pairs in ascending level order, min and max included.
    pub fn levels(&self) -> [(f64, f64); 10] {
        [
            (0.0, self.min),
            (0.05, self.p5),
            (0.10, self.p10),
            (0.25, self.p25),
            (0.50, self.p50),
            (0.75, self.p75),
            (0.90, self.p90),
            (0.95, self.p95),
            (0.99, self.p99),
            (1.0, self.max),
        ]
    }
}
