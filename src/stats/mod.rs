//! Sample statistics over simulated outcomes: R-7 percentiles, moments, confidence
//! intervals, and histograms.

pub mod histogram;
pub mod percentile;
pub mod summary;

pub use histogram::{Histogram, HistogramBin};
pub use percentile::{PercentileSet, percentile, percentile_sorted, sorted_copy};
pub use summary::{ConfidenceInterval, OutcomeStatistics};
