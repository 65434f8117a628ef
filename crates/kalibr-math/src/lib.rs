//! # Kalibr Math
//!
//! Mathematical utilities for the Kalibr curve calibration engine.
//!
//! This crate provides:
//!
//! - **Interpolation**: Node-based interpolators with exact node sensitivities,
//!   and the Nelson-Siegel parametric model
//! - **Linear Algebra**: Pivoted linear solves and matrix inversion
//! - **Solvers**: Multi-dimensional root finding (Newton, Broyden) driven by
//!   analytic Jacobians
//!
//! ## Design Philosophy
//!
//! - **Derivatives first**: every interpolated value can report how it moves
//!   with its inputs, so calibration Jacobians are assembled analytically
//! - **Numerical Stability**: Careful handling of edge cases
//! - **Error-generic solvers**: callers keep their own error types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod interpolation;
pub mod linear_algebra;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{
        CubicSpline, InterpolationMethod, Interpolator, LinearInterpolator,
        LogLinearInterpolator, NelsonSiegel,
    };
    pub use crate::linear_algebra::{invert, solve_linear_system};
    pub use crate::solvers::{
        broyden_system, newton_system, RootFinderKind, VectorSolverConfig, VectorSolverResult,
    };
}

pub use error::{MathError, MathResult};
