//! Broyden's method for systems of equations.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::error::MathError;
use crate::linear_algebra::solve_linear_system;
use crate::solvers::{
    backtrack, converged_full_step, dimension_check, VectorSolverConfig, VectorSolverResult,
};

/// Broyden root search seeded by an analytic Jacobian.
///
/// The Jacobian is evaluated once at the start and then maintained with
/// rank-one updates:
///
/// ```text
/// J ← J + (ΔF - J Δx) Δxᵀ / (Δxᵀ Δx)
/// ```
///
/// When the line search fails on an updated Jacobian, the analytic Jacobian
/// is evaluated again at the current point and the step is retried.
///
/// # Arguments
///
/// * `f` - Residual function
/// * `jacobian` - Jacobian of the residual function, used at the start and
///   after a failed step
/// * `x0` - Starting point
/// * `config` - Solver configuration
///
/// # Errors
///
/// Errors from the initial residual or any Jacobian evaluation are
/// propagated. `ConvergenceFailed` if the line search stalls on a freshly
/// evaluated Jacobian or `max_steps` is reached; `SingularMatrix` if a
/// freshly evaluated Jacobian cannot be solved.
pub fn broyden_system<F, J, E>(
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

    let mut j = jacobian(&x)?;
    let mut fresh = true;

    for step in 1..=config.max_steps {
        if norm <= config.absolute_tolerance {
            return Ok(VectorSolverResult {
                root: x,
                iterations: step - 1,
                residual_norm: norm,
            });
        }

        let delta = match solve_linear_system(&j, &(-&fx)) {
            Ok(delta) => delta,
            Err(err) if fresh => {
                warn!("broyden step {step}: jacobian is singular at |F| = {norm:.3e}");
                return Err(err.into());
            }
            Err(_) => {
                debug!("broyden step {step}: singular update, reevaluating jacobian");
                j = jacobian(&x)?;
                fresh = true;
                continue;
            }
        };

        if let Some((root, residual_norm)) = converged_full_step(&f, &x, &delta, config) {
            debug!("broyden step {step}: converged on step size, |F| = {residual_norm:.3e}");
            return Ok(VectorSolverResult {
                root,
                iterations: step,
                residual_norm,
            });
        }

        let Some(accepted) = backtrack(&f, &x, &delta, norm) else {
            if fresh {
                warn!("broyden step {step}: line search stalled at |F| = {norm:.3e}");
                return Err(MathError::convergence_failed(step, norm).into());
            }
            debug!("broyden step {step}: line search failed, reevaluating jacobian");
            j = jacobian(&x)?;
            fresh = true;
            continue;
        };

        debug!(
            "broyden step {step}: |F| = {:.3e}, lambda = {}",
            accepted.norm, accepted.lambda
        );

        let dx = &accepted.x - &x;
        let df = &accepted.fx - &fx;
        let dx_norm2 = dx.norm_squared();
        if dx_norm2 > 0.0 {
            let correction = (df - &j * &dx) * dx.transpose() / dx_norm2;
            j += correction;
            fresh = false;
        }

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
        "broyden search failed after {} steps, |F| = {norm:.3e}",
        config.max_steps
    );
    Err(MathError::convergence_failed(config.max_steps, norm).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::tests::{circle_jacobian, circle_residual};
    use crate::solvers::newton_system;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    #[test]
    fn test_broyden_circle() {
        let result = broyden_system(
            circle_residual,
            circle_jacobian,
            DVector::from_vec(vec![1.0, 0.5]),
            &VectorSolverConfig::default(),
        )
        .unwrap();

        assert_relative_eq!(result.root[0], std::f64::consts::SQRT_2, epsilon = 1e-9);
        assert_relative_eq!(result.root[1], std::f64::consts::SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn test_broyden_evaluates_fewer_jacobians() {
        let f = |x: &DVector<f64>| -> Result<DVector<f64>, MathError> {
            Ok(DVector::from_vec(vec![
                x[0].exp() - 1.5,
                x[0] + 2.0 * x[1] - 0.3 * x[1] * x[1],
            ]))
        };

        let broyden_calls = Cell::new(0u32);
        let jacobian = |x: &DVector<f64>| -> Result<DMatrix<f64>, MathError> {
            broyden_calls.set(broyden_calls.get() + 1);
            Ok(DMatrix::from_row_slice(
                2,
                2,
                &[x[0].exp(), 0.0, 1.0, 2.0 - 0.6 * x[1]],
            ))
        };
        let broyden = broyden_system(f, jacobian, DVector::zeros(2), &VectorSolverConfig::default())
            .unwrap();

        let newton = newton_system(
            f,
            |x: &DVector<f64>| -> Result<DMatrix<f64>, MathError> {
                Ok(DMatrix::from_row_slice(
                    2,
                    2,
                    &[x[0].exp(), 0.0, 1.0, 2.0 - 0.6 * x[1]],
                ))
            },
            DVector::zeros(2),
            &VectorSolverConfig::default(),
        )
        .unwrap();

        assert_relative_eq!(broyden.root[0], newton.root[0], epsilon = 1e-9);
        assert_relative_eq!(broyden.root[1], newton.root[1], epsilon = 1e-9);
        assert!(broyden_calls.get() < broyden.iterations);
    }

    #[test]
    fn test_broyden_step_cap() {
        let config = VectorSolverConfig::default().with_max_steps(1);
        let result = broyden_system(
            circle_residual,
            circle_jacobian,
            DVector::from_vec(vec![5.0, 0.1]),
            &config,
        );

        assert!(matches!(
            result,
            Err(MathError::ConvergenceFailed { steps: 1, .. })
        ));
    }

    #[test]
    fn test_broyden_singular_start() {
        let f = |x: &DVector<f64>| -> Result<DVector<f64>, MathError> {
            Ok(DVector::from_vec(vec![x[0] + x[1] - 1.0, x[0] + x[1] - 2.0]))
        };
        let j = |_: &DVector<f64>| -> Result<DMatrix<f64>, MathError> {
            Ok(DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]))
        };

        let result = broyden_system(f, j, DVector::zeros(2), &VectorSolverConfig::default());
        assert!(matches!(result, Err(MathError::SingularMatrix)));
    }
}
