//! Log-linear interpolation.
//!
//! Interpolates the logarithm of values, which is useful for discount factors
//! as it ensures positive values and can produce more stable forward rates.

use crate::error::{MathError, MathResult};
use crate::interpolation::{check_range, find_segment, validate_nodes, Interpolator};

/// Log-linear interpolation between data points.
///
/// Interpolates the natural logarithm of y values, then exponentiates the result.
/// This is commonly used for discount factor interpolation as it:
/// - Guarantees positive interpolated values
/// - Produces piecewise constant forward rates
///
/// The interpolation formula is:
/// ```text
/// y(x) = exp(linear_interpolate(x, ln(y)))
/// ```
///
/// # Example
///
/// ```rust
/// use kalibr_math::interpolation::{LogLinearInterpolator, Interpolator};
///
/// // Discount factors at different maturities
/// let times = vec![0.0, 1.0, 2.0, 3.0];
/// let discount_factors = vec![1.0, 0.97, 0.94, 0.91];
///
/// let interp = LogLinearInterpolator::new(times, discount_factors).unwrap();
/// let df = interp.interpolate(1.5).unwrap();
/// assert!(df > 0.0);  // Always positive
/// ```
#[derive(Debug, Clone)]
pub struct LogLinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Precomputed log(y) values
    log_ys: Vec<f64>,
    allow_extrapolation: bool,
}

impl LogLinearInterpolator {
    /// Creates a new log-linear interpolator.
    ///
    /// # Arguments
    ///
    /// * `xs` - X coordinates (must be sorted in ascending order)
    /// * `ys` - Y coordinates (must all be positive)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There are fewer than 2 points
    /// - Lengths differ
    /// - Any y value is non-positive
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;

        // Check that all y values are positive and compute log
        let mut log_ys = Vec::with_capacity(ys.len());
        for (i, &y) in ys.iter().enumerate() {
            if y <= 0.0 {
                return Err(MathError::invalid_input(format!(
                    "y[{i}] = {y} is not positive; log-linear requires positive values"
                )));
            }
            log_ys.push(y.ln());
        }

        Ok(Self {
            xs,
            ys,
            log_ys,
            allow_extrapolation: false,
        })
    }

    /// Enables extrapolation beyond the data range.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    /// Returns the original y values.
    #[must_use]
    pub fn y_values(&self) -> &[f64] {
        &self.ys
    }

    /// Returns the segment, the right-node weight and the interpolated value at x.
    fn evaluate(&self, x: f64) -> (usize, f64, f64) {
        let i = find_segment(&self.xs, x);
        let t = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        let log_y = self.log_ys[i] + t * (self.log_ys[i + 1] - self.log_ys[i]);
        (i, t, log_y.exp())
    }
}

impl Interpolator for LogLinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;

        let (_, _, y) = self.evaluate(x);
        Ok(y)
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;

        // dy/dx = y(x) * (log_y1 - log_y0) / (x1 - x0)
        let (i, _, y) = self.evaluate(x);
        let d_log_y = (self.log_ys[i + 1] - self.log_ys[i]) / (self.xs[i + 1] - self.xs[i]);

        Ok(y * d_log_y)
    }

    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x, self.allow_extrapolation)?;

        // y = exp((1 - t) ln y0 + t ln y1)  =>  dy/dy0 = y (1 - t) / y0, dy/dy1 = y t / y1
        let (i, t, y) = self.evaluate(x);
        let mut sensitivity = vec![0.0; self.ys.len()];
        sensitivity[i] = y * (1.0 - t) / self.ys[i];
        sensitivity[i + 1] = y * t / self.ys[i + 1];
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
    fn test_log_linear_through_points() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![1.0, 0.97, 0.94, 0.91];

        let interp = LogLinearInterpolator::new(xs.clone(), ys.clone()).unwrap();

        // Should pass through all data points
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_relative_eq!(interp.interpolate(*x).unwrap(), *y, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_log_linear_node_sensitivity() {
        let interp =
            LogLinearInterpolator::new(vec![1.0, 2.0, 3.0], vec![0.97, 0.94, 0.91]).unwrap();

        // Halfway between nodes the value is the geometric mean
        let y = interp.interpolate(1.5).unwrap();
        assert_relative_eq!(y, (0.97f64 * 0.94).sqrt(), epsilon = 1e-14);

        let sensitivity = interp.node_sensitivity(1.5).unwrap();
        assert_relative_eq!(sensitivity[0], 0.5 * y / 0.97, epsilon = 1e-14);
        assert_relative_eq!(sensitivity[1], 0.5 * y / 0.94, epsilon = 1e-14);
        assert_relative_eq!(sensitivity[2], 0.0);
    }

    #[test]
    fn test_log_linear_exponential_decay() {
        // For y = exp(-r*t), log-linear should exactly reproduce
        let r: f64 = 0.05;
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|&t: &f64| (-r * t).exp()).collect();

        let interp = LogLinearInterpolator::new(xs, ys).unwrap();

        // Check at intermediate point
        let t = 1.5;
        let expected = (-r * t).exp();
        assert_relative_eq!(interp.interpolate(t).unwrap(), expected, epsilon = 1e-10);
    }

    #[test]
    fn test_log_linear_derivative() {
        // For y = exp(-r*t), dy/dt = -r * exp(-r*t)
        let r: f64 = 0.05;
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|&t: &f64| (-r * t).exp()).collect();

        let interp = LogLinearInterpolator::new(xs, ys).unwrap();

        let t = 1.5;
        let expected_derivative = -r * (-r * t).exp();
        assert_relative_eq!(
            interp.derivative(t).unwrap(),
            expected_derivative,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_log_linear_rejects_non_positive() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![1.0, 0.0, -1.0]; // Contains non-positive values

        assert!(LogLinearInterpolator::new(xs, ys).is_err());
    }

    #[test]
    fn test_log_linear_extrapolation_enabled() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![1.0, 0.9, 0.81];

        let interp = LogLinearInterpolator::new(xs, ys)
            .unwrap()
            .with_extrapolation();

        // Should allow extrapolation and produce positive values
        let y_left = interp.interpolate(-0.5).unwrap();
        let y_right = interp.interpolate(2.5).unwrap();

        assert!(y_left > 0.0);
        assert!(y_right > 0.0);
    }

    #[test]
    fn test_log_linear_discount_factors() {
        // Realistic discount factor curve
        let times = vec![0.25, 0.5, 1.0, 2.0, 3.0, 5.0];
        let dfs = vec![0.9975, 0.9950, 0.9901, 0.9802, 0.9706, 0.9512];

        let interp = LogLinearInterpolator::new(times.clone(), dfs.clone()).unwrap();

        // Interpolated values should be monotonically decreasing
        let mut prev = interp.interpolate(times[0]).unwrap();
        for t in [0.3, 0.75, 1.5, 2.5, 4.0] {
            let current = interp.interpolate(t).unwrap();
            assert!(
                current < prev,
                "DF should decrease: DF({}) = {} should be < {}",
                t,
                current,
                prev
            );
            prev = current;
        }
    }
}
