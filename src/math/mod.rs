//! Numerical building blocks: normal distribution helpers, random streams, ranking, and
//! correlation matrices.

use std::f64::consts::SQRT_2;

use statrs::function::erf::{erf_inv, erfc};

pub mod correlation;
pub mod ranks;
pub mod rng;

pub use correlation::{
    CORRELATION_TOLERANCE, CholeskyFactor, CorrelationMatrix, PsdProjectionConfig,
    cholesky_lower, is_valid_correlation_matrix, min_eigenvalue, nearest_correlation_matrix,
    validate_correlation_matrix,
};
pub use ranks::{average_ranks, ordinal_ranks, pearson_correlation, spearman_correlation};
pub use rng::{SimRng, Stream, resolve_base_seed, sample_standard_normal, stream_rng, stream_seed};

/// Standard normal density.
pub fn normal_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Inverse standard normal CDF for `p` in `(0, 1)`.
pub fn normal_inv_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    SQRT_2 * erf_inv(2.0 * p - 1.0)
}

/// Two-tailed critical value `z` with `P(|Z| <= z) = level`.
///
/// # Panics
/// Panics unless `level` lies in `(0, 1)`.
pub fn two_tailed_z(level: f64) -> f64 {
    assert!(
        level > 0.0 && level < 1.0,
        "confidence level must be in (0, 1)"
    );
    SQRT_2 * erf_inv(level)
}
