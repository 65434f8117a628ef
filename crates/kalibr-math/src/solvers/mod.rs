//! Multi-dimensional root finding.
//!
//! Curve calibration solves F(x) = 0 where x stacks the parameters of every
//! curve in a unit and F stacks the par spreads of its instruments. Both
//! solvers here take the residual function and its analytic Jacobian:
//!
//! - [`newton_system`]: Newton with the Jacobian recomputed at every step
//! - [`broyden_system`]: Broyden rank-one updates, starting from (and
//!   falling back to) the analytic Jacobian
//!
//! Both backtrack on the residual norm. A point where the residual cannot
//! be evaluated counts as an infinite residual, so the line search steps
//! back into the valid region.
//!
//! The solvers are generic over the caller's error type, which only needs
//! to absorb [`MathError`].
//!
//! # Example
//!
//! ```rust
//! use kalibr_math::solvers::{newton_system, VectorSolverConfig};
//! use kalibr_math::MathError;
//! use nalgebra::{DMatrix, DVector};
//!
//! // x² + y² = 4, x = y
//! let f = |x: &DVector<f64>| -> Result<DVector<f64>, MathError> {
//!     Ok(DVector::from_vec(vec![x[0] * x[0] + x[1] * x[1] - 4.0, x[0] - x[1]]))
//! };
//! let jacobian = |x: &DVector<f64>| -> Result<DMatrix<f64>, MathError> {
//!     Ok(DMatrix::from_row_slice(2, 2, &[2.0 * x[0], 2.0 * x[1], 1.0, -1.0]))
//! };
//!
//! let result = newton_system(f, jacobian, DVector::from_vec(vec![1.0, 0.5]),
//!     &VectorSolverConfig::default()).unwrap();
//! assert!((result.root[0] - std::f64::consts::SQRT_2).abs() < 1e-10);
//! ```

mod broyden;
mod newton;

pub use broyden::broyden_system;
pub use newton::newton_system;

use std::fmt;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::MathError;

/// Default absolute tolerance on the residual norm.
pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 1e-10;

/// Default relative tolerance on the step size.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-10;

/// Default maximum number of steps.
pub const DEFAULT_MAX_STEPS: u32 = 100;

/// Maximum number of step halvings in the line search.
const MAX_HALVINGS: u32 = 30;

/// Configuration for the vector root finders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorSolverConfig {
    /// Convergence when the residual norm falls to this level.
    pub absolute_tolerance: f64,
    /// Convergence when a full step is this small relative to the root.
    pub relative_tolerance: f64,
    /// Maximum number of steps.
    pub max_steps: u32,
}

impl Default for VectorSolverConfig {
    fn default() -> Self {
        Self {
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl VectorSolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(absolute_tolerance: f64, relative_tolerance: f64, max_steps: u32) -> Self {
        Self {
            absolute_tolerance,
            relative_tolerance,
            max_steps,
        }
    }

    /// Sets the absolute tolerance.
    #[must_use]
    pub fn with_absolute_tolerance(mut self, tolerance: f64) -> Self {
        self.absolute_tolerance = tolerance;
        self
    }

    /// Sets the relative tolerance.
    #[must_use]
    pub fn with_relative_tolerance(mut self, tolerance: f64) -> Self {
        self.relative_tolerance = tolerance;
        self
    }

    /// Sets the maximum number of steps.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// True if a full step of size `step_norm` from `x` counts as converged.
    fn step_converged(&self, step_norm: f64, x: &DVector<f64>) -> bool {
        step_norm <= self.relative_tolerance * (1.0 + x.norm())
    }
}

/// Choice of vector root finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RootFinderKind {
    /// Newton with the analytic Jacobian at every step.
    #[default]
    Newton,
    /// Broyden rank-one updates seeded by the analytic Jacobian.
    Broyden,
}

impl fmt::Display for RootFinderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Newton => write!(f, "Newton"),
            Self::Broyden => write!(f, "Broyden"),
        }
    }
}

/// Result of a vector root search.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSolverResult {
    /// The root found.
    pub root: DVector<f64>,
    /// Number of steps used.
    pub iterations: u32,
    /// Euclidean norm of the residual at the root.
    pub residual_norm: f64,
}

/// An accepted line-search point.
struct AcceptedStep {
    x: DVector<f64>,
    fx: DVector<f64>,
    norm: f64,
    lambda: f64,
}

/// Backtracks along `delta` from `x` until the residual norm decreases.
///
/// Returns `None` if no point along the direction improves on `norm`.
fn backtrack<F, E>(f: &F, x: &DVector<f64>, delta: &DVector<f64>, norm: f64) -> Option<AcceptedStep>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
{
    let mut lambda = 1.0;
    for _ in 0..=MAX_HALVINGS {
        let candidate = x + delta * lambda;
        if let Ok(fx) = f(&candidate) {
            let candidate_norm = fx.norm();
            if candidate_norm.is_finite() && candidate_norm < norm {
                return Some(AcceptedStep {
                    x: candidate,
                    fx,
                    norm: candidate_norm,
                    lambda,
                });
            }
        }
        lambda *= 0.5;
    }
    None
}

/// Takes the full step when it is already below the relative tolerance.
///
/// Rounding can make the residual norm flat at that scale, so the step is
/// accepted without the descent requirement.
fn converged_full_step<F, E>(
    f: &F,
    x: &DVector<f64>,
    delta: &DVector<f64>,
    config: &VectorSolverConfig,
) -> Option<(DVector<f64>, f64)>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
{
    if !config.step_converged(delta.norm(), x) {
        return None;
    }
    let candidate = x + delta;
    let norm = f(&candidate).ok()?.norm();
    norm.is_finite().then_some((candidate, norm))
}

fn dimension_check<E: From<MathError>>(x0: &DVector<f64>, fx: &DVector<f64>) -> Result<(), E> {
    if x0.is_empty() {
        return Err(MathError::invalid_input("root search needs at least one unknown").into());
    }
    if fx.len() != x0.len() {
        return Err(MathError::dimension_mismatch(fx.len(), 1, x0.len(), 1).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    pub(super) fn circle_residual(x: &DVector<f64>) -> Result<DVector<f64>, MathError> {
        Ok(DVector::from_vec(vec![
            x[0] * x[0] + x[1] * x[1] - 4.0,
            x[0] - x[1],
        ]))
    }

    pub(super) fn circle_jacobian(x: &DVector<f64>) -> Result<DMatrix<f64>, MathError> {
        Ok(DMatrix::from_row_slice(
            2,
            2,
            &[2.0 * x[0], 2.0 * x[1], 1.0, -1.0],
        ))
    }

    #[test]
    fn test_config_builders() {
        let config = VectorSolverConfig::default()
            .with_absolute_tolerance(1e-8)
            .with_relative_tolerance(1e-9)
            .with_max_steps(50);

        assert_eq!(config, VectorSolverConfig::new(1e-8, 1e-9, 50));
        assert_eq!(VectorSolverConfig::default().max_steps, 100);
    }

    #[test]
    fn test_root_finder_kind() {
        assert_eq!(RootFinderKind::default(), RootFinderKind::Newton);
        assert_eq!(RootFinderKind::Broyden.to_string(), "Broyden");
    }

    #[test]
    fn test_backtrack_halves_into_valid_region() {
        // ln(x) is undefined for x <= 0
        let f = |x: &DVector<f64>| -> Result<DVector<f64>, MathError> {
            if x[0] <= 0.0 {
                return Err(MathError::invalid_input("negative"));
            }
            Ok(DVector::from_element(1, x[0].ln()))
        };
        let x = DVector::from_element(1, 3.0);
        let delta = DVector::from_element(1, -3.3);

        let step = backtrack(&f, &x, &delta, 3.0f64.ln()).unwrap();
        assert!((step.lambda - 0.5).abs() < 1e-15);
        assert!(step.x[0] > 0.0);
    }

    #[test]
    fn test_dimension_check() {
        let x = DVector::from_vec(vec![1.0, 2.0]);
        let fx = DVector::from_vec(vec![1.0]);
        assert!(dimension_check::<MathError>(&x, &fx).is_err());
        assert!(dimension_check::<MathError>(&x, &x).is_ok());
    }
}
