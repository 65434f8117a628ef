//! Calibration configuration.
//!
//! Settings can be built in code or loaded from JSON or TOML. Missing fields
//! take their defaults, so a file only needs to list what it overrides:
//!
//! ```toml
//! absolute_tolerance = 1e-12
//! root_finder = "Broyden"
//! ```

use serde::{Deserialize, Serialize};

use kalibr_math::solvers::{
    RootFinderKind, VectorSolverConfig, DEFAULT_ABSOLUTE_TOLERANCE, DEFAULT_MAX_STEPS,
    DEFAULT_RELATIVE_TOLERANCE,
};

use crate::error::{CurveError, CurveResult};

fn default_absolute_tolerance() -> f64 {
    DEFAULT_ABSOLUTE_TOLERANCE
}

fn default_relative_tolerance() -> f64 {
    DEFAULT_RELATIVE_TOLERANCE
}

fn default_max_steps() -> u32 {
    DEFAULT_MAX_STEPS
}

fn default_repricing_tolerance() -> f64 {
    1e-8
}

/// Settings for the curve building repository.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Residual norm at which a unit counts as calibrated.
    #[serde(default = "default_absolute_tolerance")]
    pub absolute_tolerance: f64,

    /// Relative step size at which a unit counts as calibrated.
    #[serde(default = "default_relative_tolerance")]
    pub relative_tolerance: f64,

    /// Maximum number of root-finding steps per unit.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Root finder used for each unit.
    #[serde(default)]
    pub root_finder: RootFinderKind,

    /// Largest absolute par spread accepted by the repricing report.
    #[serde(default = "default_repricing_tolerance")]
    pub repricing_tolerance: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            absolute_tolerance: default_absolute_tolerance(),
            relative_tolerance: default_relative_tolerance(),
            max_steps: default_max_steps(),
            root_finder: RootFinderKind::default(),
            repricing_tolerance: default_repricing_tolerance(),
        }
    }
}

impl CalibrationConfig {
    /// Creates a configuration with the given tolerances and step cap.
    #[must_use]
    pub fn new(absolute_tolerance: f64, relative_tolerance: f64, max_steps: u32) -> Self {
        Self {
            absolute_tolerance,
            relative_tolerance,
            max_steps,
            ..Self::default()
        }
    }

    /// Sets the root finder.
    #[must_use]
    pub fn with_root_finder(mut self, root_finder: RootFinderKind) -> Self {
        self.root_finder = root_finder;
        self
    }

    /// Sets the repricing tolerance.
    #[must_use]
    pub fn with_repricing_tolerance(mut self, tolerance: f64) -> Self {
        self.repricing_tolerance = tolerance;
        self
    }

    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> CurveResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Parses a TOML configuration.
    pub fn from_toml(text: &str) -> CurveResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()
    }

    /// Returns the solver settings.
    #[must_use]
    pub fn solver_config(&self) -> VectorSolverConfig {
        VectorSolverConfig::new(
            self.absolute_tolerance,
            self.relative_tolerance,
            self.max_steps,
        )
    }

    fn validate(self) -> CurveResult<Self> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.absolute_tolerance) || !positive(self.relative_tolerance) {
            return Err(CurveError::config_error("tolerances must be positive"));
        }
        if self.max_steps == 0 {
            return Err(CurveError::config_error("max_steps must be at least 1"));
        }
        if !positive(self.repricing_tolerance) {
            return Err(CurveError::config_error(
                "repricing_tolerance must be positive",
            ));
        }
        Ok(self)
    }
}
