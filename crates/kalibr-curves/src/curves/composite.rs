//! Sum of calibrated curves.

use std::sync::Arc;

use nalgebra::DVector;

use super::{require_kind, Curve, CurveKind};
use crate::error::{CurveError, CurveResult};

/// Native value = Σ component(t), with every component calibrated.
///
/// Parameters are the components' parameters concatenated in order.
#[derive(Debug, Clone)]
pub struct CompositeCurve {
    name: String,
    kind: CurveKind,
    components: Vec<Arc<dyn Curve>>,
}

impl CompositeCurve {
    /// Creates a composite from at least one component of a common kind.
    pub fn new(name: impl Into<String>, components: Vec<Arc<dyn Curve>>) -> CurveResult<Self> {
        let name = name.into();
        let Some(first) = components.first() else {
            return Err(CurveError::insufficient_points(1, 0));
        };
        let kind = first.kind();
        for component in &components {
            require_kind(component.name(), component.kind(), kind)?;
        }
        Ok(Self {
            name,
            kind,
            components,
        })
    }

    /// The components in parameter order.
    #[must_use]
    pub fn components(&self) -> &[Arc<dyn Curve>] {
        &self.components
    }
}

impl Curve for CompositeCurve {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> CurveKind {
        self.kind
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        self.components
            .iter()
            .try_fold(0.0, |sum, component| Ok(sum + component.value(t)?))
    }

    fn parameters(&self) -> Vec<f64> {
        self.components
            .iter()
            .flat_map(|component| component.parameters())
            .collect()
    }

    fn parameter_count(&self) -> usize {
        self.components.iter().map(|c| c.parameter_count()).sum()
    }

    fn parameter_sensitivity(&self, t: f64) -> CurveResult<DVector<f64>> {
        let mut sensitivity = Vec::with_capacity(self.parameter_count());
        for component in &self.components {
            sensitivity.extend(component.parameter_sensitivity(t)?.iter());
        }
        Ok(DVector::from_vec(sensitivity))
    }

    fn underlying_curves(&self) -> Vec<Arc<dyn Curve>> {
        self.components
            .iter()
            .flat_map(|component| component.underlying_curves())
            .collect()
    }
}
