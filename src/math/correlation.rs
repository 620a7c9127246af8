//! Correlation-matrix validation, Cholesky factorization, and repair.
//!
//! References:
//! - Higham, N. (2002), *Computing the nearest correlation matrix*.
//! - Glasserman, P. (2004), *Monte Carlo Methods in Financial Engineering*, Sec. 2.3.3.
//!
//! A [`CorrelationMatrix`] can only be built from a matrix that passes every invariant:
//! square, symmetric, unit diagonal, entries in `[-1, 1]`, and positive semi-definite.
//! Positive semi-definiteness is established constructively by the Cholesky factorization
//! itself, so a valid matrix always carries its [`CholeskyFactor`].
//!
//! All comparisons use [`CORRELATION_TOLERANCE`]; matrices estimated from data or typed by
//! hand routinely carry rounding noise of that order.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::core::CorrelationMatrixError;

/// Absolute tolerance for symmetry, diagonal, bounds, and negative pivots.
pub const CORRELATION_TOLERANCE: f64 = 1.0e-10;

/// Pivots below this are treated as exact zeros of a singular PSD matrix.
const PIVOT_FLOOR: f64 = 1.0e-8;

/// Largest residual tolerated below a zero pivot.
const SINGULAR_RESIDUAL_TOLERANCE: f64 = 1.0e-8;

/// Configuration for nearest-correlation projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsdProjectionConfig {
    /// Convergence tolerance in Frobenius norm.
    pub tol: f64,
    /// Maximum number of Higham alternating-projection iterations.
    pub max_iterations: usize,
}

impl Default for PsdProjectionConfig {
    fn default() -> Self {
        Self {
            tol: 1.0e-10,
            max_iterations: 100,
        }
    }
}

/// Lower-triangular `L` with `L L^T ~= M`.
#[derive(Debug, Clone, PartialEq)]
pub struct CholeskyFactor {
    lower: Vec<Vec<f64>>,
}

impl CholeskyFactor {
    /// Matrix dimension.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Row `i` of `L`; entries past the diagonal are zero.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.lower[i]
    }

    /// Rows of `L`.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.lower
    }

    /// Writes `L z` into `out`.
    ///
    /// `z` and `out` must both have length [`Self::dimension`].
    #[inline]
    pub fn apply(&self, z: &[f64], out: &mut [f64]) {
        for (i, out_i) in out.iter_mut().enumerate().take(self.lower.len()) {
            let mut sum = 0.0;
            for (lij, zj) in self.lower[i].iter().zip(z.iter()).take(i + 1) {
                sum += lij * zj;
            }
            *out_i = sum;
        }
    }

    /// Rebuilds `L L^T`.
    pub fn reconstruct(&self) -> Vec<Vec<f64>> {
        let n = self.lower.len();
        let mut out = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..=i {
                let v = self.lower[i]
                    .iter()
                    .zip(self.lower[j].iter())
                    .take(j + 1)
                    .map(|(a, b)| a * b)
                    .sum::<f64>();
                out[i][j] = v;
                out[j][i] = v;
            }
        }
        out
    }

    /// Largest absolute entry of `L L^T - matrix`.
    pub fn max_reconstruction_error(&self, matrix: &[Vec<f64>]) -> f64 {
        self.reconstruct()
            .iter()
            .zip(matrix.iter())
            .flat_map(|(a, b)| a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()))
            .fold(0.0, f64::max)
    }
}

/// A validated correlation matrix together with its Cholesky factor.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    rows: Vec<Vec<f64>>,
    factor: CholeskyFactor,
}

impl CorrelationMatrix {
    /// Validates `rows` and factorizes them.
    ///
    /// # Examples
    /// ```rust
    /// use ferricsim::math::CorrelationMatrix;
    ///
    /// let corr = CorrelationMatrix::new(vec![vec![1.0, 0.8], vec![0.8, 1.0]]).unwrap();
    /// assert_eq!(corr.dimension(), 2);
    /// assert!((corr.factor().row(1)[1] - 0.6).abs() < 1e-12);
    /// ```
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, CorrelationMatrixError> {
        check_structure(&rows)?;
        let factor = cholesky_lower(&rows)?;
        Ok(Self { rows, factor })
    }

    /// The `n x n` identity (independent variables).
    pub fn identity(n: usize) -> Result<Self, CorrelationMatrixError> {
        let rows = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        Self::new(rows)
    }

    /// Matrix dimension.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    /// Entry `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// The Cholesky factor computed during validation.
    pub fn factor(&self) -> &CholeskyFactor {
        &self.factor
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}

impl TryFrom<Vec<Vec<f64>>> for CorrelationMatrix {
    type Error = CorrelationMatrixError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

/// Checks every correlation-matrix invariant and reports the first one violated.
///
/// Order: emptiness, squareness, symmetry, unit diagonal, bounds, positive
/// semi-definiteness.
pub fn validate_correlation_matrix(rows: &[Vec<f64>]) -> Result<(), CorrelationMatrixError> {
    check_structure(rows)?;
    cholesky_lower(rows).map(|_| ())
}

/// `true` when `rows` is a valid correlation matrix.
pub fn is_valid_correlation_matrix(rows: &[Vec<f64>]) -> bool {
    validate_correlation_matrix(rows).is_ok()
}

fn check_structure(rows: &[Vec<f64>]) -> Result<(), CorrelationMatrixError> {
    let n = rows.len();
    if n == 0 {
        return Err(CorrelationMatrixError::Empty);
    }
    if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
        return Err(CorrelationMatrixError::NotSquare {
            row,
            len: r.len(),
            expected: n,
        });
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let upper = rows[i][j];
            let lower = rows[j][i];
            if (upper - lower).abs() > CORRELATION_TOLERANCE {
                return Err(CorrelationMatrixError::NotSymmetric { i, j, upper, lower });
            }
        }
    }

    for (index, row) in rows.iter().enumerate() {
        let value = row[index];
        if !value.is_finite() || (value - 1.0).abs() > CORRELATION_TOLERANCE {
            return Err(CorrelationMatrixError::BadDiagonal { index, value });
        }
    }

    for (i, row) in rows.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            if !value.is_finite() || value.abs() > 1.0 + CORRELATION_TOLERANCE {
                return Err(CorrelationMatrixError::OutOfRange { i, j, value });
            }
        }
    }

    Ok(())
}

/// Cholesky decomposition for symmetric positive semi-definite matrices.
///
/// Assumes a square, symmetric input (only the lower triangle is read). A pivot whose
/// residual falls below `-CORRELATION_TOLERANCE` rejects the matrix. Zero pivots are
/// accepted for singular matrices, provided the entries below them have nothing left to
/// explain.
pub fn cholesky_lower(matrix: &[Vec<f64>]) -> Result<CholeskyFactor, CorrelationMatrixError> {
    let n = matrix.len();
    if n == 0 {
        return Err(CorrelationMatrixError::Empty);
    }
    if let Some((row, r)) = matrix.iter().enumerate().find(|(_, r)| r.len() != n) {
        return Err(CorrelationMatrixError::NotSquare {
            row,
            len: r.len(),
            expected: n,
        });
    }

    let mut l = vec![vec![0.0_f64; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[i][j];
            for (&lik, &ljk) in l[i].iter().zip(l[j].iter()).take(j) {
                sum -= lik * ljk;
            }

            if i == j {
                if sum < -CORRELATION_TOLERANCE {
                    return Err(CorrelationMatrixError::NotPositiveSemidefinite {
                        pivot: i,
                        value: sum,
                    });
                }
                l[i][i] = sum.max(0.0).sqrt();
            } else if l[j][j] > PIVOT_FLOOR {
                l[i][j] = sum / l[j][j];
            } else if sum.abs() > SINGULAR_RESIDUAL_TOLERANCE {
                return Err(CorrelationMatrixError::NotPositiveSemidefinite {
                    pivot: j,
                    value: sum,
                });
            }
        }
    }

    Ok(CholeskyFactor { lower: l })
}

/// Smallest eigenvalue of a symmetric matrix.
pub fn min_eigenvalue(matrix: &[Vec<f64>]) -> Option<f64> {
    let n = matrix.len();
    if n == 0 || matrix.iter().any(|row| row.len() != n) {
        return None;
    }

    let eig = SymmetricEigen::new(to_dmatrix(matrix));
    eig.eigenvalues.iter().copied().reduce(f64::min)
}

/// Nearest correlation matrix by Higham (2002) alternating projections.
///
/// Alternates between the PSD cone and the unit-diagonal affine space with Dykstra's
/// correction, then clips and re-validates the result. Use this to repair an estimated
/// matrix explicitly; the simulation engine never repairs matrices on its own.
pub fn nearest_correlation_matrix(
    matrix: &[Vec<f64>],
    cfg: PsdProjectionConfig,
) -> Result<CorrelationMatrix, CorrelationMatrixError> {
    let n = matrix.len();
    if n == 0 {
        return Err(CorrelationMatrixError::Empty);
    }
    if let Some((row, r)) = matrix.iter().enumerate().find(|(_, r)| r.len() != n) {
        return Err(CorrelationMatrixError::NotSquare {
            row,
            len: r.len(),
            expected: n,
        });
    }
    for (i, row) in matrix.iter().enumerate() {
        if let Some((j, &value)) = row.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(CorrelationMatrixError::OutOfRange { i, j, value });
        }
    }

    let mut y = symmetrize(&to_dmatrix(matrix));
    set_unit_diagonal(&mut y);

    let mut delta_s = DMatrix::<f64>::zeros(n, n);

    for _ in 0..cfg.max_iterations {
        let r = symmetrize(&(&y - &delta_s));
        let x = project_psd(&r);
        delta_s = &x - &r;

        let mut y_next = x;
        set_unit_diagonal(&mut y_next);
        y_next = symmetrize(&y_next);

        let diff = frobenius_norm(&(&y_next - &y));
        y = y_next;
        if diff < cfg.tol {
            break;
        }
    }

    y = project_psd(&symmetrize(&y));
    set_unit_diagonal(&mut y);

    let mut out = vec![vec![0.0; n]; n];
    for i in 0..n {
        out[i][i] = 1.0;
        for j in (i + 1)..n {
            let rho = (0.5 * (y[(i, j)] + y[(j, i)])).clamp(-1.0, 1.0);
            out[i][j] = rho;
            out[j][i] = rho;
        }
    }

    CorrelationMatrix::new(out)
}

fn to_dmatrix(matrix: &[Vec<f64>]) -> DMatrix<f64> {
    let n = matrix.len();
    let data = matrix
        .iter()
        .flat_map(|row| row.iter().copied())
        .collect::<Vec<_>>();
    DMatrix::from_row_slice(n, n, &data)
}

fn set_unit_diagonal(m: &mut DMatrix<f64>) {
    for i in 0..m.nrows() {
        m[(i, i)] = 1.0;
    }
}

fn symmetrize(m: &DMatrix<f64>) -> DMatrix<f64> {
    (m + m.transpose()) * 0.5
}

fn project_psd(m: &DMatrix<f64>) -> DMatrix<f64> {
    let eig = SymmetricEigen::new(symmetrize(m));
    let vals = eig
        .eigenvalues
        .iter()
        .map(|v| v.max(0.0))
        .collect::<Vec<_>>();
    let d = DMatrix::from_diagonal(&DVector::from_vec(vals));
    symmetrize(&(&eig.eigenvectors * d * eig.eigenvectors.transpose()))
}

fn frobenius_norm(m: &DMatrix<f64>) -> f64 {
    m.iter().map(|x| x * x).sum::<f64>().sqrt()
}
