//! Parametric curves: Nelson-Siegel and constant.

use kalibr_math::interpolation::{Interpolator, NelsonSiegel};
use nalgebra::DVector;

use super::{Curve, CurveKind};
use crate::error::CurveResult;

/// Zero curve following the Nelson-Siegel model.
///
/// Parameters are ordered (β₀, β₁, β₂, τ).
#[derive(Debug, Clone)]
pub struct NelsonSiegelCurve {
    name: String,
    model: NelsonSiegel,
}

impl NelsonSiegelCurve {
    /// Creates a curve from its four parameters.
    pub fn new(name: impl Into<String>, parameters: &[f64]) -> CurveResult<Self> {
        Ok(Self {
            name: name.into(),
            model: NelsonSiegel::from_parameters(parameters)?,
        })
    }

    /// Underlying model.
    #[must_use]
    pub fn model(&self) -> &NelsonSiegel {
        &self.model
    }
}

impl Curve for NelsonSiegelCurve {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> CurveKind {
        CurveKind::Yield
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        Ok(self.model.interpolate(t)?)
    }

    fn parameters(&self) -> Vec<f64> {
        self.model.parameters().to_vec()
    }

    fn parameter_count(&self) -> usize {
        NelsonSiegel::PARAMETER_COUNT
    }

    fn parameter_sensitivity(&self, t: f64) -> CurveResult<DVector<f64>> {
        Ok(DVector::from_row_slice(&self.model.parameter_sensitivity(t)))
    }
}

/// A curve with one flat level.
#[derive(Debug, Clone)]
pub struct ConstantCurve {
    name: String,
    kind: CurveKind,
    level: f64,
}

impl ConstantCurve {
    /// Creates a flat curve.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CurveKind, level: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            level,
        }
    }
}

impl Curve for ConstantCurve {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> CurveKind {
        self.kind
    }

    fn value(&self, _t: f64) -> CurveResult<f64> {
        Ok(self.level)
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.level]
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn parameter_sensitivity(&self, _t: f64) -> CurveResult<DVector<f64>> {
        Ok(DVector::from_element(1, 1.0))
    }
}
