//! Interpolation methods for curve construction.
//!
//! This module provides the interpolation algorithms used by node-based
//! calibrated curves. Besides values and derivatives, every node-based
//! interpolator reports its **node sensitivity**: the partial derivatives of
//! the interpolated value with respect to each node value. Calibration
//! Jacobians are assembled from these.
//!
//! # Available Methods
//!
//! - [`LinearInterpolator`]: Simple linear interpolation
//! - [`LogLinearInterpolator`]: Log-linear interpolation (interpolates log of values)
//! - [`CubicSpline`]: Natural cubic spline interpolation
//!
//! **Parametric Models:**
//! - [`NelsonSiegel`]: Nelson-Siegel parametric curve
//!
//! # Choosing an Interpolation Method
//!
//! | Method | Smoothness | Positive values | Typical use |
//! |--------|------------|-----------------|-------------|
//! | Linear | C0 | No | Zero rates, index levels |
//! | Log-Linear | C0 | Yes | Discount factors |
//! | Cubic Spline | C2 | No | Smooth zero curves |
//! | Nelson-Siegel | C∞ | Usually | Parametric government curves |

mod cubic_spline;
mod linear;
mod log_linear;
mod parametric;

pub use cubic_spline::CubicSpline;
pub use linear::LinearInterpolator;
pub use log_linear::LogLinearInterpolator;
pub use parametric::NelsonSiegel;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};

/// Trait for interpolation methods.
///
/// All interpolation methods implement this trait, providing a unified
/// interface for curve construction.
pub trait Interpolator: Send + Sync + fmt::Debug {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Returns the first derivative at x.
    fn derivative(&self, x: f64) -> MathResult<f64>;

    /// Returns the sensitivity of the interpolated value at x to each node value.
    ///
    /// The returned vector has one entry per node. Parametric models without
    /// nodes return an empty vector.
    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>>;

    /// Returns true if extrapolation is allowed.
    fn allows_extrapolation(&self) -> bool {
        false
    }

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Checks if x is within the interpolation range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// Node-based interpolation method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InterpolationMethod {
    /// Linear interpolation on node values.
    #[default]
    Linear,
    /// Linear interpolation on the logarithm of node values.
    LogLinear,
    /// Natural cubic spline.
    NaturalCubicSpline,
}

impl InterpolationMethod {
    /// Minimum number of nodes the method needs.
    #[must_use]
    pub fn min_points(&self) -> usize {
        match self {
            Self::Linear | Self::LogLinear => 2,
            Self::NaturalCubicSpline => 3,
        }
    }

    /// Builds an interpolator with extrapolation enabled.
    ///
    /// A natural cubic spline on fewer than three nodes falls back to
    /// linear interpolation.
    pub fn build(&self, xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Box<dyn Interpolator>> {
        let interpolator: Box<dyn Interpolator> = match self {
            Self::Linear => Box::new(LinearInterpolator::new(xs, ys)?.with_extrapolation()),
            Self::LogLinear => Box::new(LogLinearInterpolator::new(xs, ys)?.with_extrapolation()),
            Self::NaturalCubicSpline if xs.len() < 3 => {
                Box::new(LinearInterpolator::new(xs, ys)?.with_extrapolation())
            }
            Self::NaturalCubicSpline => Box::new(CubicSpline::new(xs, ys)?.with_extrapolation()),
        };
        Ok(interpolator)
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::LogLinear => write!(f, "LogLinear"),
            Self::NaturalCubicSpline => write!(f, "NaturalCubicSpline"),
        }
    }
}

/// Validates node coordinates shared by all node-based interpolators.
pub(crate) fn validate_nodes(xs: &[f64], ys: &[f64], required: usize) -> MathResult<()> {
    if xs.len() < required {
        return Err(MathError::insufficient_data(required, xs.len()));
    }
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MathError::invalid_input(
            "x values must be strictly increasing",
        ));
    }
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("node values must be finite"));
    }
    Ok(())
}

/// Finds the index i such that xs[i] <= x < xs[i+1], clamped to the end segments.
pub(crate) fn find_segment(xs: &[f64], x: f64) -> usize {
    match xs.binary_search_by(|node| node.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal)) {
        Ok(i) => i.min(xs.len() - 2),
        Err(i) => (i.saturating_sub(1)).min(xs.len() - 2),
    }
}

/// Checks the extrapolation policy for x.
pub(crate) fn check_range(xs: &[f64], x: f64, allow_extrapolation: bool) -> MathResult<()> {
    let min = xs[0];
    let max = xs[xs.len() - 1];
    if !allow_extrapolation && (x < min || x > max) {
        return Err(MathError::OutOfRange { x, min, max });
    }
    Ok(())
}
