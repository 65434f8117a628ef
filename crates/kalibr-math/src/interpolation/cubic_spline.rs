//! Natural cubic spline interpolation.

use crate::error::MathResult;
use crate::interpolation::{check_range, find_segment, validate_nodes, Interpolator};

/// Natural cubic spline interpolation.
///
/// Constructs a smooth curve through data points using piecewise cubic
/// polynomials with continuous first and second derivatives.
///
/// "Natural" means the second derivative is zero at the endpoints.
///
/// The knot second derivatives are linear in the node values, so the
/// spline keeps the matrix `d y2[i] / d y[j]` alongside them. Node
/// sensitivities are then exact and cost one pass over a row.
///
/// # Example
///
/// ```rust
/// use kalibr_math::interpolation::{CubicSpline, Interpolator};
///
/// let xs = vec![0.0, 1.0, 2.0, 3.0];
/// let ys = vec![0.0, 1.0, 4.0, 9.0];
///
/// let spline = CubicSpline::new(xs, ys).unwrap();
/// let y = spline.interpolate(1.5).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot
    y2s: Vec<f64>,
    /// `y2_sensitivity[i][j]` = d y2s[i] / d ys[j]
    y2_sensitivity: Vec<Vec<f64>>,
    allow_extrapolation: bool,
}

impl CubicSpline {
    /// Creates a natural cubic spline interpolator.
    ///
    /// # Arguments
    ///
    /// * `xs` - X coordinates (must be sorted in ascending order)
    /// * `ys` - Y coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 3 points or if lengths differ.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 3)?;

        let n = xs.len();
        let y2s = compute_second_derivatives(&xs, &ys);

        let mut y2_sensitivity = vec![vec![0.0; n]; n];
        let mut unit = vec![0.0; n];
        for j in 0..n {
            unit[j] = 1.0;
            let column = compute_second_derivatives(&xs, &unit);
            for (i, value) in column.into_iter().enumerate() {
                y2_sensitivity[i][j] = value;
            }
            unit[j] = 0.0;
        }

        Ok(Self {
            xs,
            ys,
            y2s,
            y2_sensitivity,
            allow_extrapolation: false,
        })
    }

    /// Enables extrapolation beyond the data range.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    /// Returns (segment, h, a, b) for x, where a and b are the spline weights
    /// of the left and right knots.
    fn locate(&self, x: f64) -> (usize, f64, f64, f64) {
        let i = find_segment(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        (i, h, a, b)
    }
}

impl Interpolator for CubicSpline {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;

        let (i, h, a, b) = self.locate(x);
        let y = a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.y2s[i] + (b * b * b - b) * self.y2s[i + 1]) * (h * h)
                / 6.0;

        Ok(y)
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;

        let (i, h, a, b) = self.locate(x);
        let dy = (self.ys[i + 1] - self.ys[i]) / h - (3.0 * a * a - 1.0) * h * self.y2s[i] / 6.0
            + (3.0 * b * b - 1.0) * h * self.y2s[i + 1] / 6.0;

        Ok(dy)
    }

    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x, self.allow_extrapolation)?;

        let (i, h, a, b) = self.locate(x);
        let c_lo = (a * a * a - a) * h * h / 6.0;
        let c_hi = (b * b * b - b) * h * h / 6.0;

        let mut sensitivity: Vec<f64> = self.y2_sensitivity[i]
            .iter()
            .zip(self.y2_sensitivity[i + 1].iter())
            .map(|(lo, hi)| c_lo * lo + c_hi * hi)
            .collect();
        sensitivity[i] += a;
        sensitivity[i + 1] += b;

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

/// Computes the knot second derivatives of a natural cubic spline.
///
/// Tridiagonal sweep with y2[0] = y2[n-1] = 0.
fn compute_second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut y2s = vec![0.0; n];
    let mut u = vec![0.0; n - 1];

    for i in 1..n - 1 {
        let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
        let p = sig * y2s[i - 1] + 2.0;
        y2s[i] = (sig - 1.0) / p;
        let slope_change =
            (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]) - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
        u[i] = (6.0 * slope_change / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
    }

    for i in (0..n - 1).rev() {
        y2s[i] = y2s[i] * y2s[i + 1] + u[i];
    }

    y2s
}
