//! ferricsim is a correlated Monte Carlo simulation library: it samples uncertain numeric
//! inputs (independently or with a target correlation structure), pushes each draw through a
//! user-supplied model, and summarizes the outcome distribution with percentiles, moments,
//! confidence intervals, and tail-risk metrics.
//!
//! The crate is organized bottom-up:
//! - `core`: error types shared by every module,
//! - `math`: normal-distribution helpers, seedable random streams, ranking, and correlation
//!   matrix validation / Cholesky factorization,
//! - `stats`: R-7 percentiles, outcome statistics, and histograms,
//! - `mc`: inputs, correlated sampling, Iman-Conover reordering, and the simulation engine,
//! - `risk`: empirical VaR and CVaR on sorted outcomes.
//!
//! References used across modules include:
//! - Glasserman (2004) for Monte Carlo estimators and Cholesky-based correlated sampling.
//! - Iman and Conover (1982) for distribution-free rank-correlation induction.
//! - Higham (2002) for nearest-correlation-matrix repair.
//! - Hyndman and Fan (1996) for the type-7 sample quantile.
//!
//! Numerical considerations:
//! - Correlation checks use an absolute tolerance of `1e-10`; nothing is repaired silently.
//! - Iman-Conover induces rank correlation; the Pearson correlation of non-normal marginals
//!   will differ slightly from the target.
//! - Every quantile (percentiles, median, VaR) goes through one R-7 routine.
//!
//! # Feature Flags
//! - `parallel` (default): spreads iteration chunks and per-column work over Rayon. Seeded
//!   runs produce identical outcomes with or without it.
//!
//! # Quick Start
//! Sum of two correlated normals:
//! ```rust
//! use ferricsim::prelude::*;
//!
//! let a = SimulationInput::from_spec("a", &InputDistribution::Normal { mean: 100.0, std_dev: 10.0 })
//!     .unwrap();
//! let b = SimulationInput::from_spec("b", &InputDistribution::Normal { mean: 50.0, std_dev: 5.0 })
//!     .unwrap();
//!
//! let results = MonteCarloSimulation::new(10_000, |x: &[f64]| x[0] + x[1])
//!     .with_input(a)
//!     .with_input(b)
//!     .with_correlation(vec![vec![1.0, 0.8], vec![0.8, 1.0]])
//!     .with_seed(7)
//!     .run()
//!     .unwrap();
//!
//! assert!((results.mean() - 150.0).abs() < 1.0);
//! assert!(results.conditional_value_at_risk(0.95) <= results.value_at_risk(0.95));
//! ```
//!
//! Validate a correlation matrix before use:
//! ```rust
//! use ferricsim::core::CorrelationMatrixError;
//! use ferricsim::math::validate_correlation_matrix;
//!
//! let err = validate_correlation_matrix(&[vec![1.0, 0.9], vec![0.9, 0.5]]).unwrap_err();
//! assert!(matches!(err, CorrelationMatrixError::BadDiagonal { index: 1, .. }));
//! ```
//!
//! Query the outcome distribution:
//! ```rust
//! use ferricsim::mc::SimulationResults;
//!
//! let results = SimulationResults::new(vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]).unwrap();
//! assert_eq!(results.percentile(0.5), 3.5);
//! assert_eq!(results.probability_above(5.0), 0.25);
//! ```

pub mod core;
pub mod math;
pub mod mc;
pub mod risk;
pub mod stats;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::math::{CorrelationMatrix, SimRng};
    pub use crate::mc::*;
    pub use crate::risk::{RiskMetrics, TailRisk};
    pub use crate::stats::{ConfidenceInterval, Histogram, OutcomeStatistics, PercentileSet};
}
