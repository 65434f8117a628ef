//! Linear algebra utilities.
//!
//! Dense solves used by the calibration engine: Newton steps and the
//! inversion of unit Jacobians when building transition matrices.

use crate::error::{MathError, MathResult};
use nalgebra::{DMatrix, DVector};

fn check_square(a: &DMatrix<f64>) -> MathResult<usize> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(MathError::dimension_mismatch(a.nrows(), a.ncols(), a.ncols(), a.nrows()));
    }
    Ok(n)
}

/// Solves a linear system Ax = b using LU decomposition with partial pivoting.
///
/// # Errors
///
/// `DimensionMismatch` if A is not square or b has the wrong length,
/// `SingularMatrix` if A cannot be factorized or the solution is not finite.
pub fn solve_linear_system(a: &DMatrix<f64>, b: &DVector<f64>) -> MathResult<DVector<f64>> {
    let n = check_square(a)?;
    if n != b.len() {
        return Err(MathError::dimension_mismatch(n, n, b.len(), 1));
    }

    let x = a.clone().lu().solve(b).ok_or(MathError::SingularMatrix)?;
    if x.iter().any(|v| !v.is_finite()) {
        return Err(MathError::SingularMatrix);
    }

    Ok(x)
}

/// Inverts a square matrix.
pub fn invert(a: &DMatrix<f64>) -> MathResult<DMatrix<f64>> {
    check_square(a)?;

    let inverse = a.clone().lu().try_inverse().ok_or(MathError::SingularMatrix)?;
    if inverse.iter().any(|v| !v.is_finite()) {
        return Err(MathError::SingularMatrix);
    }

    Ok(inverse)
}
