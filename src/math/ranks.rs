//! Ranking and sample dependence measures.

/// Zero-based ordinal ranks: `ranks[i]` is the position of `values[i]` in ascending order.
///
/// Ties are broken by original index, so the result is always a permutation of
/// `0..values.len()`.
pub fn ordinal_ranks(values: &[f64]) -> Vec<usize> {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

    let mut ranks = vec![0usize; values.len()];
    for (rank, &row) in order.iter().enumerate() {
        ranks[row] = rank;
    }
    ranks
}

/// Fractional ranks (1-based, ties share the average rank).
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order = (0..n).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut start = 0usize;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end (0-based) share rank mean(start+1..=end).
        let avg = (start + end + 1) as f64 / 2.0;
        for &row in &order[start..end] {
            ranks[row] = avg;
        }
        start = end;
    }
    ranks
}

/// Pearson product-moment correlation. Returns NaN when either series is constant or the
/// lengths differ or fewer than two points are given.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }
    sxy / (sxx * syy).sqrt()
}

/// Spearman rank correlation (Pearson correlation of average ranks).
pub fn spearman_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() {
        return f64::NAN;
    }
    pearson_correlation(&average_ranks(x), &average_ranks(y))
}
