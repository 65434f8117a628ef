//! Numerical errors raised by interpolation, linear algebra and root search.

use thiserror::Error;

/// Result alias for the numerical routines of this crate.
pub type MathResult<T> = Result<T, MathError>;

/// Failure of a numerical routine.
#[derive(Error, Debug, Clone)]
pub enum MathError {
    /// A root search ended with the residual norm above tolerance.
    #[error("Root search did not converge in {steps} steps (|F| = {residual_norm:.2e})")]
    ConvergenceFailed {
        /// Steps taken before giving up.
        steps: u32,
        /// Residual norm at the last accepted point.
        residual_norm: f64,
    },

    /// LU factorization failed or produced non-finite values.
    #[error("Singular matrix")]
    SingularMatrix,

    /// Operand shapes do not fit together.
    #[error("Shape mismatch: {}x{} against {}x{}", .left.0, .left.1, .right.0, .right.1)]
    DimensionMismatch {
        /// Rows and columns of the left operand.
        left: (usize, usize),
        /// Rows and columns of the right operand.
        right: (usize, usize),
    },

    /// Query outside the node range of an interpolator that does not extrapolate.
    #[error("{x} is outside the node range [{min}, {max}]")]
    OutOfRange {
        /// Query abscissa.
        x: f64,
        /// First node.
        min: f64,
        /// Last node.
        max: f64,
    },

    /// Too few nodes.
    #[error("Need at least {required} nodes, got {actual}")]
    InsufficientData {
        /// Minimum node count.
        required: usize,
        /// Nodes supplied.
        actual: usize,
    },

    /// Rejected argument.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What was wrong.
        reason: String,
    },
}

impl MathError {
    /// Root search failure after `steps` steps.
    #[must_use]
    pub fn convergence_failed(steps: u32, residual_norm: f64) -> Self {
        Self::ConvergenceFailed {
            steps,
            residual_norm,
        }
    }

    /// Invalid argument with a reason.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Too few nodes.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Shapes of two operands, as (rows, columns) each.
    #[must_use]
    pub fn dimension_mismatch(rows1: usize, cols1: usize, rows2: usize, cols2: usize) -> Self {
        Self::DimensionMismatch {
            left: (rows1, cols1),
            right: (rows2, cols2),
        }
    }
}
