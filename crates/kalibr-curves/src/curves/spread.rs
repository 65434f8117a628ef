//! Calibrated spread over a fixed base curve.

use std::sync::Arc;

use nalgebra::DVector;

use super::{require_kind, Curve, CurveKind};
use crate::error::CurveResult;

/// Native value = base(t) + spread(t).
///
/// Only the spread is calibrated. The base is exposed through
/// [`Curve::underlying_curves`], so sensitivities flow back to whatever
/// calibrated it.
///
/// Typical uses are issuer curves over a government curve and basis curves
/// over a discounting curve.
#[derive(Debug, Clone)]
pub struct SpreadCurve {
    name: String,
    base: Arc<dyn Curve>,
    spread: Arc<dyn Curve>,
}

impl SpreadCurve {
    /// Creates a spread curve. Base and spread must have the same kind.
    pub fn new(
        name: impl Into<String>,
        base: Arc<dyn Curve>,
        spread: Arc<dyn Curve>,
    ) -> CurveResult<Self> {
        let name = name.into();
        require_kind(spread.name(), spread.kind(), base.kind())?;
        Ok(Self { name, base, spread })
    }

    /// The fixed base curve.
    #[must_use]
    pub fn base(&self) -> &Arc<dyn Curve> {
        &self.base
    }

    /// The calibrated spread curve.
    #[must_use]
    pub fn spread(&self) -> &Arc<dyn Curve> {
        &self.spread
    }
}

impl Curve for SpreadCurve {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> CurveKind {
        self.base.kind()
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        Ok(self.base.value(t)? + self.spread.value(t)?)
    }

    fn parameters(&self) -> Vec<f64> {
        self.spread.parameters()
    }

    fn parameter_count(&self) -> usize {
        self.spread.parameter_count()
    }

    fn parameter_sensitivity(&self, t: f64) -> CurveResult<DVector<f64>> {
        self.spread.parameter_sensitivity(t)
    }

    fn underlying_curves(&self) -> Vec<Arc<dyn Curve>> {
        let mut curves = vec![Arc::clone(&self.base)];
        curves.extend(self.spread.underlying_curves());
        curves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::ConstantCurve;
    use approx::assert_relative_eq;

    #[test]
    fn test_spread_over_base() {
        let base: Arc<dyn Curve> = Arc::new(ConstantCurve::new("GOVT", CurveKind::Yield, 0.03));
        let spread: Arc<dyn Curve> =
            Arc::new(ConstantCurve::new("ISSUER-SPREAD", CurveKind::Yield, 0.01));
        let curve = SpreadCurve::new("ISSUER", base, spread).unwrap();

        assert_relative_eq!(curve.value(4.0).unwrap(), 0.04, epsilon = 1e-15);
        assert_eq!(curve.parameter_count(), 1);
        let underlying = curve.underlying_curves();
        assert_eq!(underlying.len(), 1);
        assert_eq!(underlying[0].name(), "GOVT");
    }

    #[test]
    fn test_kind_mismatch() {
        let base: Arc<dyn Curve> = Arc::new(ConstantCurve::new("GOVT", CurveKind::Yield, 0.03));
        let spread: Arc<dyn Curve> =
            Arc::new(ConstantCurve::new("CPI", CurveKind::PriceIndex, 100.0));
        assert!(SpreadCurve::new("bad", base, spread).is_err());
    }
}
