//! Error types for curve operations.
//!
//! This module provides error handling for curve construction, provider
//! access, instrument pricing and calibration.

use kalibr_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone)]
pub enum CurveError {
    /// Curve calibration failed to converge.
    #[error(
        "Calibration failed after {iterations} iterations (residual: {residual:.2e}): {message}"
    )]
    CalibrationFailure {
        /// Number of iterations attempted.
        iterations: usize,
        /// Final residual value.
        residual: f64,
        /// Description of failure.
        message: String,
    },

    /// Not enough data points to build a curve.
    #[error("Insufficient points: need at least {required}, got {got}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        got: usize,
    },

    /// Node times are not strictly increasing.
    #[error("Non-monotonic tenors at index {index}: {prev:.4} >= {current:.4}")]
    NonMonotonicTenors {
        /// Index where monotonicity violation occurred.
        index: usize,
        /// Previous tenor value.
        prev: f64,
        /// Current tenor value.
        current: f64,
    },

    /// Invalid calibration instrument.
    #[error("Invalid instrument: {reason}")]
    InvalidInstrument {
        /// Description of what's wrong with the instrument.
        reason: String,
    },

    /// Invalid value (NaN, Inf, or domain error).
    #[error("Invalid value: {reason}")]
    InvalidValue {
        /// Description of why value is invalid.
        reason: String,
    },

    /// Mathematical error.
    #[error("Math error: {reason}")]
    MathError {
        /// Description of the mathematical error.
        reason: String,
    },

    /// Builder error.
    #[error("Builder error: {reason}")]
    BuilderError {
        /// Description of the builder error.
        reason: String,
    },

    /// Curve not found in a provider or bundle.
    #[error("Curve not found: {name}")]
    CurveNotFound {
        /// Name/identifier of the missing curve.
        name: String,
    },

    /// The provider flavour has no slot for the role.
    #[error("Provider {provider} does not support curve role {role}")]
    UnsupportedCurveRole {
        /// Provider flavour.
        provider: String,
        /// The rejected role.
        role: String,
    },

    /// A curve of the wrong kind was used.
    #[error("Curve {name} has kind {got}, expected {expected}")]
    IncompatibleCurveKind {
        /// Curve name.
        name: String,
        /// Expected kind.
        expected: String,
        /// Actual kind.
        got: String,
    },

    /// Generator parameters do not match what the calibration supplies.
    #[error("Curve {name}: {expected} parameters expected, got {got}")]
    ParameterCountMismatch {
        /// Curve name.
        name: String,
        /// Expected count.
        expected: usize,
        /// Supplied count.
        got: usize,
    },

    /// Configuration could not be parsed.
    #[error("Configuration error: {reason}")]
    ConfigError {
        /// Description of the configuration problem.
        reason: String,
    },
}

impl CurveError {
    /// Creates a calibration failure error.
    #[must_use]
    pub fn calibration_failed(
        iterations: usize,
        residual: f64,
        message: impl Into<String>,
    ) -> Self {
        Self::CalibrationFailure {
            iterations,
            residual,
            message: message.into(),
        }
    }

    /// Creates an insufficient points error.
    #[must_use]
    pub fn insufficient_points(required: usize, got: usize) -> Self {
        Self::InsufficientPoints { required, got }
    }

    /// Creates a non-monotonic tenors error.
    #[must_use]
    pub fn non_monotonic_tenors(index: usize, prev: f64, current: f64) -> Self {
        Self::NonMonotonicTenors {
            index,
            prev,
            current,
        }
    }

    /// Creates an invalid instrument error.
    #[must_use]
    pub fn invalid_instrument(reason: impl Into<String>) -> Self {
        Self::InvalidInstrument {
            reason: reason.into(),
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }

    /// Creates a math error.
    #[must_use]
    pub fn math_error(reason: impl Into<String>) -> Self {
        Self::MathError {
            reason: reason.into(),
        }
    }

    /// Creates a builder error.
    #[must_use]
    pub fn builder_error(reason: impl Into<String>) -> Self {
        Self::BuilderError {
            reason: reason.into(),
        }
    }

    /// Creates a curve not found error.
    #[must_use]
    pub fn curve_not_found(name: impl Into<String>) -> Self {
        Self::CurveNotFound { name: name.into() }
    }

    /// Creates an unsupported role error.
    #[must_use]
    pub fn unsupported_role(provider: impl Into<String>, role: impl ToString) -> Self {
        Self::UnsupportedCurveRole {
            provider: provider.into(),
            role: role.to_string(),
        }
    }

    /// Creates an incompatible curve kind error.
    #[must_use]
    pub fn incompatible_kind(
        name: impl Into<String>,
        expected: impl ToString,
        got: impl ToString,
    ) -> Self {
        Self::IncompatibleCurveKind {
            name: name.into(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Creates a parameter count mismatch error.
    #[must_use]
    pub fn parameter_count_mismatch(name: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::ParameterCountMismatch {
            name: name.into(),
            expected,
            got,
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }
}

impl From<MathError> for CurveError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ConvergenceFailed {
                steps,
                residual_norm,
            } => Self::calibration_failed(
                steps as usize,
                residual_norm,
                "root search did not converge",
            ),
            other => Self::math_error(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CurveError {
    fn from(err: serde_json::Error) -> Self {
        Self::config_error(err.to_string())
    }
}

impl From<toml::de::Error> for CurveError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_error(err.to_string())
    }
}
