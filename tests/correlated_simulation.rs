//! End-to-end simulation tests.
//!
//! Reference setup: A ~ N(100, 10), B ~ N(50, 5), corr(A, B) = 0.8, outcome = A + B.
//! Then E[A + B] = 150 and sd(A + B) = sqrt(100 + 25 + 2 * 0.8 * 10 * 5) = sqrt(205).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ferricsim::core::{CorrelationMatrixError, SimulationError};
use ferricsim::math::{CorrelationMatrix, pearson_correlation, spearman_correlation};
use ferricsim::mc::{
    CancellationToken, InputDistribution, MonteCarloSimulation, SimulationConfig, SimulationInput,
};
use ferricsim::risk::RiskMetrics;

const ITERATIONS: usize = 10_000;

fn normal(name: &str, mean: f64, std_dev: f64) -> SimulationInput {
    SimulationInput::from_spec(name, &InputDistribution::Normal { mean, std_dev }).unwrap()
}

fn sum_of_two(rho: f64, seed: u64) -> MonteCarloSimulation {
    MonteCarloSimulation::new(ITERATIONS, |x: &[f64]| x[0] + x[1])
        .with_input(normal("a", 100.0, 10.0))
        .with_input(normal("b", 50.0, 5.0))
        .with_correlation(vec![vec![1.0, rho], vec![rho, 1.0]])
        .with_seed(seed)
}

#[test]
fn correlated_sum_hits_target_correlation_and_mean() {
    let sim = sum_of_two(0.8, 2024);
    let samples = sim.sample_inputs().unwrap();
    let r = pearson_correlation(samples.column(0), samples.column(1));
    assert!((r - 0.8).abs() < 0.05, "column correlation {r}");

    let results = sim.run().unwrap();
    let se = 205.0_f64.sqrt() / (ITERATIONS as f64).sqrt();
    assert!(
        (results.mean() - 150.0).abs() < 4.0 * se,
        "mean {} outside 4 standard errors",
        results.mean()
    );
    assert!((results.std_dev() - 205.0_f64.sqrt()).abs() < 0.5);
    assert_eq!(results.len(), ITERATIONS);
}

#[test]
fn identity_correlation_behaves_like_independent_sampling() {
    let sim = sum_of_two(0.0, 11);
    let samples = sim.sample_inputs().unwrap();
    let r = pearson_correlation(samples.column(0), samples.column(1));
    assert!(r.abs() < 0.05, "identity produced correlation {r}");

    let independent = MonteCarloSimulation::new(ITERATIONS, |x: &[f64]| x[0] + x[1])
        .with_input(normal("a", 100.0, 10.0))
        .with_input(normal("b", 50.0, 5.0))
        .with_seed(11);
    let samples = independent.sample_inputs().unwrap();
    let r = pearson_correlation(samples.column(0), samples.column(1));
    assert!(r.abs() < 0.05, "independent run produced correlation {r}");

    let sd = 125.0_f64.sqrt();
    assert!((independent.run().unwrap().std_dev() - sd).abs() < 0.4);
    assert!((sim.run().unwrap().std_dev() - sd).abs() < 0.4);
}

#[test]
fn rank_correlation_survives_skewed_marginals() {
    let lognormal =
        SimulationInput::from_spec("cost", &InputDistribution::LogNormal { mu: 0.0, sigma: 1.0 })
            .unwrap();
    let exponential =
        SimulationInput::from_spec("delay", &InputDistribution::Exponential { rate: 0.5 }).unwrap();
    let sim = MonteCarloSimulation::new(ITERATIONS, |x: &[f64]| x[0] * x[1])
        .with_input(lognormal)
        .with_input(exponential)
        .with_correlation(vec![vec![1.0, 0.6], vec![0.6, 1.0]])
        .with_seed(5);

    let samples = sim.sample_inputs().unwrap();
    let rs = spearman_correlation(samples.column(0), samples.column(1));
    assert!((rs - 0.6).abs() < 0.05, "spearman {rs}");
    assert!(samples.column(0).iter().all(|&x| x > 0.0));
    assert!(samples.column(1).iter().all(|&x| x >= 0.0));
}

#[test]
fn invalid_diagonal_fails_before_any_sampling_or_evaluation() {
    let model_calls = Arc::new(AtomicUsize::new(0));
    let sample_calls = Arc::new(AtomicUsize::new(0));
    let seen_model = Arc::clone(&model_calls);
    let seen_sample = Arc::clone(&sample_calls);

    let counted = move |name: &str| {
        let seen = Arc::clone(&seen_sample);
        SimulationInput::new(name, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            1.0
        })
    };

    let sim = MonteCarloSimulation::new(ITERATIONS, move |x: &[f64]| {
        seen_model.fetch_add(1, Ordering::SeqCst);
        x[0] + x[1]
    })
    .with_input(counted("a"))
    .with_input(counted("b"))
    .with_correlation(vec![vec![1.0, 0.5], vec![0.5, 0.9]]);

    let err = sim.run().unwrap_err();
    assert!(matches!(
        err,
        SimulationError::InvalidCorrelationMatrix(CorrelationMatrixError::BadDiagonal { index: 1, .. })
    ));
    assert!(err.to_string().contains("bad-diagonal"), "{err}");
    assert!(err.is_validation_error());
    assert_eq!(model_calls.load(Ordering::SeqCst), 0);
    assert_eq!(sample_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn non_psd_matrix_is_reported_as_inconsistent() {
    let rows = vec![
        vec![1.0, 0.9, -0.9],
        vec![0.9, 1.0, 0.9],
        vec![-0.9, 0.9, 1.0],
    ];
    let sim = MonteCarloSimulation::new(100, |x: &[f64]| x.iter().sum())
        .with_inputs((0..3).map(|i| normal(&format!("x{i}"), 0.0, 1.0)))
        .with_correlation(rows);

    match sim.run().unwrap_err() {
        SimulationError::InvalidCorrelationMatrix(inner) => {
            assert!(matches!(
                inner,
                CorrelationMatrixError::NotPositiveSemidefinite { .. }
            ));
            assert!(!inner.is_malformed());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn dimension_mismatch_is_reported_after_matrix_validation() {
    let corr = CorrelationMatrix::identity(3).unwrap();
    let sim = MonteCarloSimulation::new(100, |x: &[f64]| x[0])
        .with_input(normal("a", 0.0, 1.0))
        .with_input(normal("b", 0.0, 1.0))
        .with_correlation_matrix(&corr);
    assert_eq!(
        sim.run().unwrap_err(),
        SimulationError::CorrelationDimensionMismatch {
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn non_finite_outcome_aborts_with_offending_inputs() {
    let sim = MonteCarloSimulation::new(500, |x: &[f64]| x[0].ln())
        .with_input(normal("x", 0.0, 1.0))
        .with_seed(1);

    match sim.run().unwrap_err() {
        SimulationError::InvalidModel {
            iteration,
            inputs,
            outcome,
        } => {
            let samples = sim.sample_inputs().unwrap();
            let first_negative = (0..samples.rows())
                .find(|&i| samples.get(i, 0) < 0.0)
                .unwrap();
            assert_eq!(iteration, first_negative);
            assert_eq!(inputs, vec![samples.get(first_negative, 0)]);
            assert!(outcome.is_nan());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn equal_seeds_reproduce_and_unseeded_runs_differ() {
    let a = sum_of_two(0.5, 77).run().unwrap();
    let b = sum_of_two(0.5, 77).run().unwrap();
    assert_eq!(a.values(), b.values());

    let unseeded = || {
        MonteCarloSimulation::new(1_000, |x: &[f64]| x[0])
            .with_input(normal("a", 0.0, 1.0))
            .run()
            .unwrap()
    };
    assert_ne!(unseeded().values(), unseeded().values());
}

#[test]
fn correlated_outcomes_do_not_depend_on_chunk_size() {
    let small = sum_of_two(0.8, 3)
        .with_config(SimulationConfig::seeded(3).with_chunk_size(100))
        .run()
        .unwrap();
    let large = sum_of_two(0.8, 3)
        .with_config(SimulationConfig::seeded(3).with_chunk_size(4096))
        .run()
        .unwrap();
    assert_eq!(small.values(), large.values());
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_feature_does_not_change_outcomes() {
    for rho in [None, Some(0.3)] {
        let build = |parallel: bool| {
            let mut sim = MonteCarloSimulation::new(20_000, |x: &[f64]| x[0] * x[1] - x[0])
                .with_input(normal("a", 1.0, 0.2))
                .with_input(normal("b", 3.0, 1.0))
                .with_seed(404)
                .with_chunk_size(333)
                .with_parallel(parallel);
            if let Some(r) = rho {
                sim = sim.with_correlation(vec![vec![1.0, r], vec![r, 1.0]]);
            }
            sim.run().unwrap()
        };
        assert_eq!(build(true).values(), build(false).values());
    }
}

#[test]
fn pre_cancelled_run_returns_no_partial_results() {
    let token = CancellationToken::new();
    token.cancel();
    let err = sum_of_two(0.8, 1)
        .with_cancellation(token)
        .run()
        .unwrap_err();
    assert_eq!(
        err,
        SimulationError::Cancelled {
            completed: 0,
            requested: ITERATIONS
        }
    );
    assert!(!err.is_validation_error());
}

#[test]
fn tail_risk_is_consistent_with_percentiles() {
    let results = sum_of_two(0.8, 9).run().unwrap();
    let percentiles = results.percentiles();
    let levels = [
        (0.9, percentiles.p10),
        (0.95, percentiles.p5),
        (0.99, results.percentile(0.01)),
    ];
    for (c, p) in levels {
        let var = results.value_at_risk(c);
        assert_eq!(var.to_bits(), p.to_bits(), "VaR({c}) differs from its percentile");
        assert!(results.conditional_value_at_risk(c) <= var);
        assert!(results.probability_below(var) <= 1.0 - c + 1e-3);
    }

    let summary = results.summary();
    assert_eq!(summary.tail_risk.len(), 3);
    assert_eq!(summary.statistics.count, ITERATIONS);
    assert!(summary.mean_confidence_interval.contains(summary.statistics.mean));
}
