//! Property tests for the estimators and the correlation machinery.

use ferricsim::math::{CorrelationMatrix, Stream, stream_rng};
use ferricsim::mc::{SampleMatrix, impose_rank_correlation};
use ferricsim::risk::{conditional_value_at_risk_sorted, value_at_risk_sorted};
use ferricsim::stats::{percentile_sorted, sorted_copy};
use proptest::prelude::*;

/// Finite values of a size typical for small outcome samples.
fn finite_vec(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-1.0e6..1.0e6_f64, min_len..=max_len)
}

/// Random valid correlation matrix: `A A^T + eps I` rescaled to a unit diagonal.
fn correlation_rows(max_dim: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1..=max_dim).prop_flat_map(|n| {
        proptest::collection::vec(-1.0..1.0_f64, n * n).prop_map(move |a| {
            let mut m = vec![vec![0.0; n]; n];
            for i in 0..n {
                for j in 0..=i {
                    let dot = (0..n).map(|k| a[i * n + k] * a[j * n + k]).sum::<f64>();
                    let v = if i == j { dot + 1.0e-3 } else { dot };
                    m[i][j] = v;
                    m[j][i] = v;
                }
            }
            let d = (0..n).map(|i| m[i][i].sqrt()).collect::<Vec<_>>();
            (0..n)
                .map(|i| {
                    (0..n)
                        .map(|j| if i == j { 1.0 } else { m[i][j] / (d[i] * d[j]) })
                        .collect()
                })
                .collect()
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn percentile_is_monotone_in_level(
        values in finite_vec(1, 200),
        p1 in 0.0..=1.0_f64,
        p2 in 0.0..=1.0_f64,
    ) {
        let sorted = sorted_copy(&values);
        let (lo, hi) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
        prop_assert!(percentile_sorted(&sorted, lo) <= percentile_sorted(&sorted, hi));
    }

    #[test]
    fn single_value_percentile_is_identity(value in -1.0e9..1.0e9_f64, p in 0.0..=1.0_f64) {
        prop_assert_eq!(percentile_sorted(&[value], p), value);
    }

    #[test]
    fn percentile_stays_within_sample_range(values in finite_vec(1, 100), p in 0.0..=1.0_f64) {
        let sorted = sorted_copy(&values);
        let q = percentile_sorted(&sorted, p);
        prop_assert!(q >= sorted[0] && q <= sorted[sorted.len() - 1]);
    }

    #[test]
    fn cvar_never_exceeds_var(values in finite_vec(1, 300), c in 0.0..=1.0_f64) {
        let sorted = sorted_copy(&values);
        let var = value_at_risk_sorted(&sorted, c);
        let cvar = conditional_value_at_risk_sorted(&sorted, c);
        prop_assert!(cvar <= var, "cvar {} > var {}", cvar, var);
        prop_assert!(cvar >= sorted[0] - 1.0e-9 * sorted[0].abs().max(1.0));
    }

    #[test]
    fn cholesky_reconstructs_valid_matrices(rows in correlation_rows(6)) {
        let corr = CorrelationMatrix::new(rows.clone()).unwrap();
        let err = corr.factor().max_reconstruction_error(&rows);
        prop_assert!(err < 1.0e-8, "reconstruction error {}", err);
    }

    #[test]
    fn iman_conover_preserves_every_marginal(
        m in 2_usize..60,
        k in 2_usize..5,
        rho in -0.3..0.9_f64,
        seed in any::<u64>(),
    ) {
        let mut rng = stream_rng(seed, Stream::Marginal, 0);
        let columns = (0..k)
            .map(|j| {
                (0..m)
                    .map(|i| ((i * 31 + j * 17) % 13) as f64 + ferricsim::math::sample_standard_normal(&mut rng))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let before = columns.iter().map(|c| sorted_copy(c)).collect::<Vec<_>>();

        let rows = (0..k)
            .map(|i| (0..k).map(|j| if i == j { 1.0 } else { rho }).collect())
            .collect();
        let corr = CorrelationMatrix::new(rows).unwrap();

        let mut samples = SampleMatrix::from_columns(columns);
        let mut score_rng = stream_rng(seed, Stream::RankScores, 0);
        impose_rank_correlation(&mut samples, &corr, &mut score_rng).unwrap();

        for (j, expected) in before.iter().enumerate() {
            prop_assert_eq!(&sorted_copy(samples.column(j)), expected);
        }
    }
}
