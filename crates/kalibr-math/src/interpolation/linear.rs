//! Linear interpolation.

use crate::error::MathResult;
use crate::interpolation::{check_range, find_segment, validate_nodes, Interpolator};

/// Linear interpolation between data points.
///
/// The simplest form of interpolation, connecting consecutive points
/// with straight lines. The value at x is a weighted sum of the two
/// bracketing node values, so the node sensitivity is just those weights.
///
/// # Example
///
/// ```rust
/// use kalibr_math::interpolation::{LinearInterpolator, Interpolator};
///
/// let xs = vec![0.0, 1.0, 2.0, 3.0];
/// let ys = vec![0.0, 1.0, 4.0, 9.0];
///
/// let interp = LinearInterpolator::new(xs, ys).unwrap();
/// let y = interp.interpolate(1.5).unwrap();
/// assert!((y - 2.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    allow_extrapolation: bool,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// # Arguments
    ///
    /// * `xs` - X coordinates (must be sorted in ascending order)
    /// * `ys` - Y coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points or if lengths differ.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;

        Ok(Self {
            xs,
            ys,
            allow_extrapolation: false,
        })
    }

    /// Enables extrapolation beyond the data range.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    /// Returns the segment index and the weight of its right node at x.
    fn weights(&self, x: f64) -> (usize, f64) {
        let i = find_segment(&self.xs, x);
        let t = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        (i, t)
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;

        let (i, t) = self.weights(x);
        Ok(self.ys[i] + t * (self.ys[i + 1] - self.ys[i]))
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;

        let i = find_segment(&self.xs, x);
        Ok((self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i]))
    }

    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x, self.allow_extrapolation)?;

        let (i, t) = self.weights(x);
        let mut sensitivity = vec![0.0; self.ys.len()];
        sensitivity[i] = 1.0 - t;
        sensitivity[i + 1] = t;
        Ok(sensitivity)
    }

    fn allows_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_interpolation() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 2.0, 4.0];

        let interp = LinearInterpolator::new(xs, ys).unwrap();

        // Test at exact points
        assert_relative_eq!(interp.interpolate(0.0).unwrap(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(1.0).unwrap(), 2.0, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(2.0).unwrap(), 4.0, epsilon = 1e-10);

        // Test interpolation
        assert_relative_eq!(interp.interpolate(0.5).unwrap(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(1.5).unwrap(), 3.0, epsilon = 1e-10);
        assert_relative_eq!(interp.derivative(1.5).unwrap(), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_extrapolation_disabled() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 1.0, 2.0];

        let interp = LinearInterpolator::new(xs, ys).unwrap();

        assert!(interp.interpolate(-0.5).is_err());
        assert!(interp.interpolate(2.5).is_err());
        assert!(interp.node_sensitivity(2.5).is_err());
    }

    #[test]
    fn test_extrapolation_enabled() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 1.0, 2.0];

        let interp = LinearInterpolator::new(xs, ys)
            .unwrap()
            .with_extrapolation();

        // Should extrapolate linearly
        assert_relative_eq!(interp.interpolate(-1.0).unwrap(), -1.0, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(3.0).unwrap(), 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_node_sensitivity_weights() {
        let interp = LinearInterpolator::new(vec![1.0, 2.0, 4.0], vec![0.01, 0.02, 0.03]).unwrap();

        let sensitivity = interp.node_sensitivity(3.0).unwrap();
        assert_relative_eq!(sensitivity[0], 0.0);
        assert_relative_eq!(sensitivity[1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(sensitivity[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_insufficient_points() {
        let xs = vec![0.0];
        let ys = vec![1.0];

        assert!(LinearInterpolator::new(xs, ys).is_err());
    }

    #[test]
    fn test_unsorted_error() {
        let xs = vec![1.0, 0.0, 2.0]; // Not sorted
        let ys = vec![1.0, 0.0, 2.0];

        assert!(LinearInterpolator::new(xs, ys).is_err());
    }
}
