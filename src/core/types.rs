use thiserror::Error;

/// Reason a matrix was rejected as a correlation matrix.
///
/// Variants are ordered the way validation runs: shape first, then symmetry, diagonal,
/// bounds, and finally positive semi-definiteness.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorrelationMatrixError {
    /// The matrix has no rows.
    #[error("correlation matrix is empty")]
    Empty,
    /// Row `row` has `len` entries instead of `expected`.
    #[error("correlation matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
    /// `m[i][j]` and `m[j][i]` differ by more than the tolerance.
    #[error("correlation matrix is not symmetric at ({i}, {j}): {upper} vs {lower}")]
    NotSymmetric {
        i: usize,
        j: usize,
        upper: f64,
        lower: f64,
    },
    /// Diagonal entry is not 1.
    #[error("correlation matrix diagonal must be 1, found {value} at index {index}")]
    BadDiagonal { index: usize, value: f64 },
    /// Entry is non-finite or outside `[-1, 1]`.
    #[error("correlation entry ({i}, {j}) = {value} is outside [-1, 1]")]
    OutOfRange { i: usize, j: usize, value: f64 },
    /// Cholesky factorization failed at `pivot`; `value` is the offending residual.
    #[error("correlation matrix is not positive semi-definite (pivot {pivot}, residual {value})")]
    NotPositiveSemidefinite { pivot: usize, value: f64 },
}

impl CorrelationMatrixError {
    /// Short name of the violated invariant.
    pub fn invariant(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::NotSquare { .. } => "not-square",
            Self::NotSymmetric { .. } => "not-symmetric",
            Self::BadDiagonal { .. } => "bad-diagonal",
            Self::OutOfRange { .. } => "out-of-range",
            Self::NotPositiveSemidefinite { .. } => "not-positive-semidefinite",
        }
    }

    /// `true` when the matrix is structurally malformed rather than mathematically
    /// inconsistent.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::NotPositiveSemidefinite { .. })
    }
}

/// Errors surfaced by simulation setup and execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Iteration count was zero.
    #[error("iterations must be > 0")]
    InsufficientIterations,
    /// No inputs were registered.
    #[error("simulation requires at least one input")]
    NoInputs,
    /// Correlation matrix size differs from the number of inputs (or means).
    #[error("correlation matrix dimension {actual} does not match {expected} inputs")]
    CorrelationDimensionMismatch { expected: usize, actual: usize },
    /// A caller-supplied sample matrix has the wrong number of columns.
    #[error("sample matrix has {actual} columns but the simulation has {expected} inputs")]
    SampleDimensionMismatch { expected: usize, actual: usize },
    /// Correlation matrix failed validation.
    #[error("invalid correlation matrix ({kind}): {0}", kind = .0.invariant())]
    InvalidCorrelationMatrix(#[from] CorrelationMatrixError),
    /// The model returned NaN or an infinity.
    #[error("model produced non-finite outcome {outcome} at iteration {iteration} for inputs {inputs:?}")]
    InvalidModel {
        iteration: usize,
        inputs: Vec<f64>,
        outcome: f64,
    },
    /// Distribution parameters were rejected.
    #[error("invalid distribution for input '{name}': {reason}")]
    InvalidDistribution { name: String, reason: String },
    /// Engine configuration is inconsistent.
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
    /// The run was cancelled before all iterations completed.
    #[error("simulation cancelled after {completed} of {requested} iterations")]
    Cancelled { completed: usize, requested: usize },
}

impl SimulationError {
    /// `true` for failures detected before any sampling takes place.
    pub fn is_validation_error(&self) -> bool {
        !matches!(self, Self::InvalidModel { .. } | Self::Cancelled { .. })
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SimulationError>;
