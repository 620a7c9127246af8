//! Empirical Value-at-Risk and Conditional Value-at-Risk on simulated outcomes.
//!
//! Outcomes are read in their natural sign (higher is better), so the tail of interest is
//! the lower one:
//! - `VaR(c)` is the R-7 percentile of the outcomes at `1 - c` (95% VaR = 5th percentile),
//! - `CVaR(c)` is the mean of all outcomes at or below that same `VaR(c)`.
//!
//! Both come from one percentile routine, so `CVaR(c) <= VaR(c)` holds for every level.
//!
//! Numerical notes: empirical tail metrics are sample-size sensitive; at high confidence the
//! CVaR averages very few order statistics.
//!
//! References:
//! - McNeil, Frey, Embrechts, *Quantitative Risk Management* (2005/2015), VaR/ES theory.
//! - Hyndman and Fan (1996), *Sample quantiles in statistical packages*.

use serde::{Deserialize, Serialize};

use crate::stats::{percentile_sorted, sorted_copy};

/// VaR and CVaR at one confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailRisk {
    pub confidence: f64,
    pub value_at_risk: f64,
    pub conditional_value_at_risk: f64,
}

/// Value-at-Risk of ascending outcomes.
///
/// # Panics
/// Panics if `sorted` is empty or `confidence` is outside `[0, 1]`.
///
/// # Examples
/// ```rust
/// use ferricsim::risk::value_at_risk_sorted;
///
/// let sorted = (1..=21).map(f64::from).collect::<Vec<_>>();
/// assert!((value_at_risk_sorted(&sorted, 0.95) - 2.0).abs() < 1e-12);
/// ```
pub fn value_at_risk_sorted(sorted: &[f64], confidence: f64) -> f64 {
    validate_inputs(sorted, confidence);
    percentile_sorted(sorted, tail_level(confidence))
}

/// Complementary level `1 - c` snapped to a 1e-12 grid, so `VaR(0.95)` reads the same
/// percentile as a literal `0.05`.
fn tail_level(confidence: f64) -> f64 {
    ((1.0 - confidence) * 1e12).round() / 1e12
}

/// Conditional Value-at-Risk (expected shortfall) of ascending outcomes.
///
/// # Panics
/// Panics if `sorted` is empty or `confidence` is outside `[0, 1]`.
pub fn conditional_value_at_risk_sorted(sorted: &[f64], confidence: f64) -> f64 {
    let var = value_at_risk_sorted(sorted, confidence);
    tail_mean(sorted, var)
}

/// VaR and CVaR sharing one percentile evaluation.
///
/// # Panics
/// Panics if `sorted` is empty or `confidence` is outside `[0, 1]`.
pub fn tail_risk_sorted(sorted: &[f64], confidence: f64) -> TailRisk {
    let var = value_at_risk_sorted(sorted, confidence);
    TailRisk {
        confidence,
        value_at_risk: var,
        conditional_value_at_risk: tail_mean(sorted, var),
    }
}

/// [`value_at_risk_sorted`] for outcomes in any order.
pub fn value_at_risk(outcomes: &[f64], confidence: f64) -> f64 {
    value_at_risk_sorted(&sorted_copy(outcomes), confidence)
}

/// [`conditional_value_at_risk_sorted`] for outcomes in any order.
pub fn conditional_value_at_risk(outcomes: &[f64], confidence: f64) -> f64 {
    conditional_value_at_risk_sorted(&sorted_copy(outcomes), confidence)
}

fn tail_mean(sorted: &[f64], threshold: f64) -> f64 {
    // The threshold is interpolated between order statistics >= min, so the tail always
    // holds at least one value.
    let count = sorted.partition_point(|&x| x <= threshold).max(1);
    let mean = sorted[..count].iter().sum::<f64>() / count as f64;
    mean.min(threshold)
}

fn validate_inputs(sorted: &[f64], confidence: f64) {
    assert!(!sorted.is_empty(), "outcomes must not be empty");
    assert!(
        (0.0..=1.0).contains(&confidence),
        "confidence must be in [0,1]"
    );
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, StandardNormal};

    use super::*;

    #[test]
    fn var_matches_standard_normal_quantiles() {
        let mut rng = StdRng::seed_from_u64(42);
        let outcomes: Vec<f64> = (0..20_000).map(|_| StandardNormal.sample(&mut rng)).collect();

        assert!((value_at_risk(&outcomes, 0.95) + 1.645).abs() < 0.06);
        assert!((value_at_risk(&outcomes, 0.99) + 2.326).abs() < 0.1);
        // Normal ES at 95%: -phi(1.645) / 0.05 = -2.063
        assert!((conditional_value_at_risk(&outcomes, 0.95) + 2.063).abs() < 0.08);
    }

    #[test]
    fn var_reads_the_same_percentile_as_the_literal_level() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sorted: Vec<f64> = (0..10_000).map(|_| StandardNormal.sample(&mut rng)).collect();
        sorted.sort_by(f64::total_cmp);

        for (confidence, level) in [(0.90, 0.10), (0.95, 0.05), (0.99, 0.01), (0.975, 0.025)] {
            assert_eq!(
                value_at_risk_sorted(&sorted, confidence).to_bits(),
                percentile_sorted(&sorted, level).to_bits(),
                "confidence {confidence}"
            );
        }
        assert_eq!(value_at_risk_sorted(&sorted, 1.0), sorted[0]);
        assert_eq!(value_at_risk_sorted(&sorted, 0.0), sorted[sorted.len() - 1]);
    }

    #[test]
    fn small_sample_reference_values() {
        let sorted = (1..=10).map(f64::from).collect::<Vec<_>>();
        // position 9 * 0.1 = 0.9 -> 1 + 0.9 * (2 - 1)
        assert_relative_eq!(value_at_risk_sorted(&sorted, 0.9), 1.9, epsilon = 1e-12);
        assert_relative_eq!(conditional_value_at_risk_sorted(&sorted, 0.9), 1.0, epsilon = 1e-12);
        // position 4.5 -> 5.5; tail is 1..=5
        assert_relative_eq!(value_at_risk_sorted(&sorted, 0.5), 5.5, epsilon = 1e-12);
        assert_relative_eq!(conditional_value_at_risk_sorted(&sorted, 0.5), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn extreme_levels_hit_the_sample_bounds() {
        let sorted = [-4.0, -1.0, 2.0, 8.0];
        assert_eq!(value_at_risk_sorted(&sorted, 1.0), -4.0);
        assert_eq!(conditional_value_at_risk_sorted(&sorted, 1.0), -4.0);
        assert_eq!(value_at_risk_sorted(&sorted, 0.0), 8.0);
        assert_relative_eq!(conditional_value_at_risk_sorted(&sorted, 0.0), 1.25, epsilon = 1e-12);
    }

    #[test]
    fn single_outcome_is_its_own_tail() {
        let risk = tail_risk_sorted(&[7.0], 0.99);
        assert_eq!(risk.value_at_risk, 7.0);
        assert_eq!(risk.conditional_value_at_risk, 7.0);
    }

    #[test]
    #[should_panic(expected = "confidence must be in [0,1]")]
    fn rejects_confidence_above_one() {
        value_at_risk_sorted(&[1.0, 2.0], 1.5);
    }

    #[test]
    #[should_panic(expected = "outcomes must not be empty")]
    fn rejects_empty_outcomes() {
        conditional_value_at_risk_sorted(&[], 0.95);
    }
}
