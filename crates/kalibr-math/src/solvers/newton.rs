//! Newton's method for systems of equations.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::error::MathError;
use crate::linear_algebra::solve_linear_system;
use crate::solvers::{
    backtrack, converged_full_step, dimension_check, VectorSolverConfig, VectorSolverResult,
};

/// Newton root search with an analytic Jacobian.
///
/// Each step solves `J(x) δ = -F(x)` and backtracks along δ until the
/// residual norm decreases.
///
/// # Arguments
///
/// * `f` - Residual function
/// * `jacobian` - Jacobian of the residual function
/// * `x0` - Starting point
/// * `config` - Solver configuration
///
/// # Errors
///
/// Errors from the initial residual or any Jacobian evaluation are
/// propagated. `ConvergenceFailed` if the line search stalls or `max_steps`
/// is reached; `SingularMatrix` if a Jacobian cannot be solved.
pub fn newton_system<F, J, E>(
    f: F,
    jacobian: J,
    x0: DVector<f64>,
    config: &VectorSolverConfig,
) -> Result<VectorSolverResult, E>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
    J: Fn(&DVector<f64>) -> Result<DMatrix<f64>, E>,
    E: From<MathError>,
{
    let mut x = x0;
    let mut fx = f(&x)?;
    dimension_check::<E>(&x, &fx)?;
    let mut norm = fx.norm();

    for step in 1..=config.max_steps {
        if norm <= config.absolute_tolerance {
            return Ok(VectorSolverResult {
                root: x,
                iterations: step - 1,
                residual_norm: norm,
            });
        }

        let j = jacobian(&x)?;
        let delta = solve_linear_system(&j, &(-&fx))?;

        if let Some((root, residual_norm)) = converged_full_step(&f, &x, &delta, config) {
            debug!("newton step {step}: converged on step size, |F| = {residual_norm:.3e}");
            return Ok(VectorSolverResult {
                root,
                iterations: step,
                residual_norm,
            });
        }

        let Some(accepted) = backtrack(&f, &x, &delta, norm) else {
            warn!("newton step {step}: line search stalled at |F| = {norm:.3e}");
            return Err(MathError::convergence_failed(step, norm).into());
        };

        debug!(
            "newton step {step}: |F| = {:.3e}, lambda = {}",
            accepted.norm, accepted.lambda
        );

        let full_step = accepted.lambda >= 1.0;
        x = accepted.x;
        fx = accepted.fx;
        norm = accepted.norm;

        if norm <= config.absolute_tolerance
            || (full_step && config.step_converged(delta.norm(), &x))
        {
            return Ok(VectorSolverResult {
                root: x,
                iterations: step,
                residual_norm: norm,
            });
        }
    }

    if norm <= config.absolute_tolerance {
        return Ok(VectorSolverResult {
            root: x,
            iterations: config.max_steps,
            residual_norm: norm,
        });
    }

    warn!(
        "newton search failed after {} steps, |F| = {norm:.3e}",
        config.max_steps
    );
    Err(MathError::convergence_failed(config.max_steps, norm).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::tests::{circle_jacobian, circle_residual};
    use approx::assert_relative_eq;

    #[test]
    fn test_newton_circle() {
        let result = newton_system(
            circle_residual,
            circle_jacobian,
            DVector::from_vec(vec![1.0, 0.5]),
            &VectorSolverConfig::default(),
        )
        .unwrap();

        assert_relative_eq!(result.root[0], std::f64::consts::SQRT_2, epsilon = 1e-10);
        assert_relative_eq!(result.root[1], std::f64::consts::SQRT_2, epsilon = 1e-10);
        assert!(result.residual_norm <= 1e-10);
        assert!(result.iterations < 10);
    }

    #[test]
    fn test_newton_linear_system_one_step() {
        let f = |x: &DVector<f64>| -> Result<DVector<f64>, MathError> {
            Ok(DVector::from_vec(vec![2.0 * x[0] + x[1] - 5.0, x[0] + 3.0 * x[1] - 5.0]))
        };
        let j = |_: &DVector<f64>| -> Result<DMatrix<f64>, MathError> {
            Ok(DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]))
        };

        let result =
            newton_system(f, j, DVector::zeros(2), &VectorSolverConfig::default()).unwrap();

        assert_eq!(result.iterations, 1);
        assert_relative_eq!(result.root[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(result.root[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_newton_steps_back_from_invalid_region() {
        let f = |x: &DVector<f64>| -> Result<DVector<f64>, MathError> {
            if x[0] <= 0.0 {
                return Err(MathError::invalid_input("log of non-positive"));
            }
            Ok(DVector::from_element(1, x[0].ln()))
        };
        let j = |x: &DVector<f64>| -> Result<DMatrix<f64>, MathError> {
            Ok(DMatrix::from_element(1, 1, 1.0 / x[0]))
        };

        let result =
            newton_system(f, j, DVector::from_element(1, 3.0), &VectorSolverConfig::default())
                .unwrap();

        assert_relative_eq!(result.root[0], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_newton_step_cap() {
        let config = VectorSolverConfig::default().with_max_steps(1);
        let result = newton_system(
            circle_residual,
            circle_jacobian,
            DVector::from_vec(vec![5.0, 0.1]),
            &config,
        );

        assert!(matches!(result, Err(MathError::ConvergenceFailed { .. })));
    }

    #[test]
    fn test_newton_caller_error_type() {
        #[derive(Debug)]
        enum PricingError {
            Math(MathError),
        }

        impl From<MathError> for PricingError {
            fn from(err: MathError) -> Self {
                Self::Math(err)
            }
        }

        let f = |_: &DVector<f64>| -> Result<DVector<f64>, PricingError> {
            Ok(DVector::from_element(1, 1.0))
        };
        let j = |_: &DVector<f64>| -> Result<DMatrix<f64>, PricingError> {
            Ok(DMatrix::zeros(1, 1))
        };

        let result = newton_system(f, j, DVector::zeros(1), &VectorSolverConfig::default());
        assert!(matches!(result, Err(PricingError::Math(MathError::SingularMatrix))));
    }
}
