//! Equal-width histogram binning.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }
}

/// Equal-width bins spanning `[min, max]` of a sample.
///
/// Bins are half-open `[lower, upper)` except the last, which also includes `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    bins: Vec<HistogramBin>,
    total: usize,
}

impl Histogram {
    /// Bins ascending `sorted` values into `bins` equal-width buckets.
    ///
    /// A sample whose minimum equals its maximum collapses into a single bin; an empty sample
    /// yields no bins.
    ///
    /// # Panics
    /// Panics if `bins == 0`.
    pub fn from_sorted(sorted: &[f64], bins: usize) -> Self {
        assert!(bins > 0, "histogram requires at least one bin");

        let total = sorted.len();
        if total == 0 {
            return Self {
                bins: Vec::new(),
                total,
            };
        }

        let min = sorted[0];
        let max = sorted[total - 1];
        if max <= min {
            return Self {
                bins: vec![HistogramBin {
                    lower: min,
                    upper: max,
                    count: total,
                }],
                total,
            };
        }

        let width = (max - min) / bins as f64;
        let mut out = (0..bins)
            .map(|k| HistogramBin {
                lower: min + k as f64 * width,
                upper: if k + 1 == bins {
                    max
                } else {
                    min + (k + 1) as f64 * width
                },
                count: 0,
            })
            .collect::<Vec<_>>();

        for &x in sorted {
            let k = (((x - min) / width).floor() as usize).min(bins - 1);
            out[k].count += 1;
        }

        Self { bins: out, total }
    }

    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    /// Number of binned observations.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Fraction of observations in each bin.
    pub fn frequencies(&self) -> Vec<f64> {
        if self.total == 0 {
            return Vec::new();
        }
        let n = self.total as f64;
        self.bins.iter().map(|b| b.count as f64 / n).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sum_to_sample_size() {
        let mut sorted = (0..1000).map(|i| (i as f64 * 0.37).sin()).collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        let h = Histogram::from_sorted(&sorted, 17);
        assert_eq!(h.bins().len(), 17);
        assert_eq!(h.bins().iter().map(|b| b.count).sum::<usize>(), 1000);
        assert_eq!(h.total(), 1000);
        assert_eq!(h.bins()[16].upper, sorted[999]);
    }

    #[test]
    fn maximum_lands_in_last_bin() {
        let h = Histogram::from_sorted(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        let counts = h.bins().iter().map(|b| b.count).collect::<Vec<_>>();
        assert_eq!(counts, vec![1, 1, 1, 2]);
        assert_eq!(h.bins()[0].lower, 0.0);
        assert_eq!(h.bins()[0].upper, 1.0);
        assert_eq!(h.bins()[1].midpoint(), 1.5);
    }

    #[test]
    fn constant_sample_collapses_to_one_bin() {
        let h = Histogram::from_sorted(&[2.0; 8], 10);
        assert_eq!(h.bins().len(), 1);
        assert_eq!(h.bins()[0].count, 8);
        assert_eq!(h.frequencies(), vec![1.0]);
    }

    #[test]
    fn empty_sample_has_no_bins() {
        let h = Histogram::from_sorted(&[], 5);
        assert!(h.bins().is_empty());
        assert!(h.frequencies().is_empty());
    }
}
