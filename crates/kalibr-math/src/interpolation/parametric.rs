//! Parametric yield curve models.
//!
//! Parametric models are calibrated by moving their parameters rather than
//! node values, so besides the usual interpolator interface they expose the
//! sensitivity of the zero rate to each parameter.

use crate::error::{MathError, MathResult};
use crate::interpolation::Interpolator;

/// Nelson-Siegel yield curve model.
///
/// The model parameterizes the zero rate curve as:
/// ```text
/// z(t) = β₀ + β₁ * ((1 - e^(-t/τ)) / (t/τ))
///           + β₂ * ((1 - e^(-t/τ)) / (t/τ) - e^(-t/τ))
/// ```
///
/// Where:
/// - β₀: Long-term level (asymptotic zero rate)
/// - β₁: Short-term component (slope)
/// - β₂: Medium-term component (curvature/hump)
/// - τ: Decay factor (controls where the hump occurs)
///
/// # Example
///
/// ```rust
/// use kalibr_math::interpolation::{NelsonSiegel, Interpolator};
///
/// let ns = NelsonSiegel::new(0.045, -0.02, 0.01, 2.0).unwrap();
///
/// let short_rate = ns.interpolate(0.25).unwrap();
/// let long_rate = ns.interpolate(30.0).unwrap();
/// assert!(short_rate < long_rate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelsonSiegel {
    beta0: f64,
    beta1: f64,
    beta2: f64,
    tau: f64,
}

impl NelsonSiegel {
    /// Number of model parameters.
    pub const PARAMETER_COUNT: usize = 4;

    /// Creates a new Nelson-Siegel curve.
    ///
    /// # Errors
    ///
    /// Returns an error if tau is not strictly positive or any parameter is
    /// not finite.
    pub fn new(beta0: f64, beta1: f64, beta2: f64, tau: f64) -> MathResult<Self> {
        if !(tau > 0.0) || !tau.is_finite() {
            return Err(MathError::invalid_input(format!(
                "tau must be positive, got {tau}"
            )));
        }
        if ![beta0, beta1, beta2].iter().all(|b| b.is_finite()) {
            return Err(MathError::invalid_input("betas must be finite"));
        }

        Ok(Self {
            beta0,
            beta1,
            beta2,
            tau,
        })
    }

    /// Creates the model from a parameter slice ordered (β₀, β₁, β₂, τ).
    pub fn from_parameters(parameters: &[f64]) -> MathResult<Self> {
        match parameters {
            [beta0, beta1, beta2, tau] => Self::new(*beta0, *beta1, *beta2, *tau),
            _ => Err(MathError::invalid_input(format!(
                "Nelson-Siegel needs {} parameters, got {}",
                Self::PARAMETER_COUNT,
                parameters.len()
            ))),
        }
    }

    /// Returns the instantaneous forward rate at time t.
    ///
    /// ```text
    /// f(t) = β₀ + β₁ * e^(-t/τ) + β₂ * (t/τ) * e^(-t/τ)
    /// ```
    pub fn forward_rate(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return self.beta0 + self.beta1;
        }

        let x = t / self.tau;
        let exp_x = (-x).exp();

        self.beta0 + self.beta1 * exp_x + self.beta2 * x * exp_x
    }

    /// Returns the model parameters as [β₀, β₁, β₂, τ].
    pub fn parameters(&self) -> [f64; 4] {
        [self.beta0, self.beta1, self.beta2, self.tau]
    }

    /// Sensitivity of the zero rate at t to [β₀, β₁, β₂, τ].
    pub fn parameter_sensitivity(&self, t: f64) -> [f64; 4] {
        if t <= 0.0 {
            return [1.0, 1.0, 0.0, 0.0];
        }

        let x = t / self.tau;
        let (l1, l2) = (Self::loading_factor_1(x), Self::loading_factor_2(x));
        let (dl1, dl2) = Self::loading_derivatives(x);

        // dx/dτ = -t/τ²
        let dx_dtau = -t / (self.tau * self.tau);
        let dz_dtau = (self.beta1 * dl1 + self.beta2 * dl2) * dx_dtau;

        [1.0, l1, l2, dz_dtau]
    }

    /// (1 - e^(-x)) / x
    fn loading_factor_1(x: f64) -> f64 {
        if x.abs() < 1e-10 {
            1.0 - x / 2.0 + x * x / 6.0
        } else {
            (1.0 - (-x).exp()) / x
        }
    }

    /// (1 - e^(-x)) / x - e^(-x)
    fn loading_factor_2(x: f64) -> f64 {
        if x.abs() < 1e-10 {
            x / 2.0 - x * x / 3.0
        } else {
            Self::loading_factor_1(x) - (-x).exp()
        }
    }

    /// Derivatives of both loadings with respect to x.
    fn loading_derivatives(x: f64) -> (f64, f64) {
        if x.abs() < 1e-8 {
            return (-0.5 + x / 3.0, 0.5 - 2.0 * x / 3.0);
        }
        let exp_x = (-x).exp();
        let dl1 = (exp_x - Self::loading_factor_1(x)) / x;
        (dl1, dl1 + exp_x)
    }
}

impl Interpolator for NelsonSiegel {
    fn interpolate(&self, t: f64) -> MathResult<f64> {
        if t <= 0.0 {
            return Ok(self.beta0 + self.beta1);
        }

        let x = t / self.tau;

        Ok(self.beta0
            + self.beta1 * Self::loading_factor_1(x)
            + self.beta2 * Self::loading_factor_2(x))
    }

    fn derivative(&self, t: f64) -> MathResult<f64> {
        if t <= 0.0 {
            return Ok(0.0);
        }

        let (dl1, dl2) = Self::loading_derivatives(t / self.tau);
        Ok((self.beta1 * dl1 + self.beta2 * dl2) / self.tau)
    }

    fn node_sensitivity(&self, _x: f64) -> MathResult<Vec<f64>> {
        Ok(Vec::new())
    }

    fn allows_extrapolation(&self) -> bool {
        true
    }

    fn min_x(&self) -> f64 {
        0.0
    }

    fn max_x(&self) -> f64 {
        f64::INFINITY
    }
}
