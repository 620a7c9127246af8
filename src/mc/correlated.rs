//! Correlated multivariate normal sampling via the Cholesky factor `L` of the correlation
//! matrix: `x = mu + L z` with `z ~ N(0, I)`.

use crate::core::{Result, SimulationError};
use crate::math::{CholeskyFactor, CorrelationMatrix, SimRng, sample_standard_normal};

/// Draws vectors whose components have unit variance, the given means, and the correlation
/// structure of a validated [`CorrelationMatrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatedNormalGenerator {
    means: Vec<f64>,
    factor: CholeskyFactor,
}

impl CorrelatedNormalGenerator {
    /// Pairs `means` with an already validated matrix.
    ///
    /// # Examples
    /// ```rust
    /// use ferricsim::math::{CorrelationMatrix, Stream, stream_rng};
    /// use ferricsim::mc::CorrelatedNormalGenerator;
    ///
    /// let corr = CorrelationMatrix::new(vec![vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap();
    /// let generator = CorrelatedNormalGenerator::new(vec![0.0, 10.0], &corr).unwrap();
    /// let mut rng = stream_rng(7, Stream::RankScores, 0);
    /// assert_eq!(generator.sample(&mut rng).len(), 2);
    /// ```
    pub fn new(means: Vec<f64>, correlation: &CorrelationMatrix) -> Result<Self> {
        if means.len() != correlation.dimension() {
            return Err(SimulationError::CorrelationDimensionMismatch {
                expected: means.len(),
                actual: correlation.dimension(),
            });
        }
        Ok(Self {
            means,
            factor: correlation.factor().clone(),
        })
    }

    /// Zero-mean generator.
    pub fn standard(correlation: &CorrelationMatrix) -> Self {
        Self {
            means: vec![0.0; correlation.dimension()],
            factor: correlation.factor().clone(),
        }
    }

    /// Validates raw `rows` first, then checks their size against `means`.
    pub fn from_rows(means: Vec<f64>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let correlation = CorrelationMatrix::new(rows)?;
        Self::new(means, &correlation)
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn sample(&self, rng: &mut SimRng) -> Vec<f64> {
        let n = self.dimension();
        let mut z = vec![0.0; n];
        let mut out = vec![0.0; n];
        self.sample_into(rng, &mut z, &mut out);
        out
    }

    /// Allocation-free draw: fills `z` with independent normals and writes the correlated
    /// vector into `out`.
    pub fn sample_into(&self, rng: &mut SimRng, z: &mut [f64], out: &mut [f64]) {
        for zi in z.iter_mut() {
            *zi = sample_standard_normal(rng);
        }
        self.factor.apply(z, out);
        for (o, m) in out.iter_mut().zip(&self.means) {
            *o += m;
        }
    }
}
