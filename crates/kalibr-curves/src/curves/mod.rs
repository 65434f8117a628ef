//! Calibratable curves.
//!
//! Every curve exposes a single **native value** per time:
//!
//! | Kind | Native value |
//! |------|--------------|
//! | [`CurveKind::Yield`] | Continuously compounded zero rate r(t), DF(t) = e^(-r t) |
//! | [`CurveKind::PriceIndex`] | Index level I(t) |
//!
//! Instruments report their sensitivities to native values ("point
//! sensitivities"). A curve turns these into sensitivities to its own
//! parameters through [`Curve::parameter_sensitivity`].
//!
//! Implementations:
//!
//! - [`InterpolatedCurve`]: node values interpolated in time
//! - [`NelsonSiegelCurve`]: four-parameter parametric zero curve
//! - [`ConstantCurve`]: a single flat level
//! - [`SpreadCurve`]: calibrated spread over a fixed base curve
//! - [`CompositeCurve`]: sum of calibrated components

mod composite;
mod interpolated;
mod parametric;
mod spread;

pub use composite::CompositeCurve;
pub use interpolated::{InterpolatedCurve, NodeRepresentation};
pub use parametric::{ConstantCurve, NelsonSiegelCurve};
pub use spread::SpreadCurve;

use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

/// What a curve's native value represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    /// Continuously compounded zero rates.
    Yield,
    /// Price index levels.
    PriceIndex,
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yield => write!(f, "Yield"),
            Self::PriceIndex => write!(f, "PriceIndex"),
        }
    }
}

/// A curve produced by a generator from a parameter vector.
///
/// All times are year fractions from the valuation date.
pub trait Curve: Send + Sync + fmt::Debug {
    /// Name under which the curve is calibrated and reported.
    fn name(&self) -> &str;

    /// What the native value represents.
    fn kind(&self) -> CurveKind;

    /// Native value at time t.
    fn value(&self, t: f64) -> CurveResult<f64>;

    /// Calibrated parameters.
    fn parameters(&self) -> Vec<f64>;

    /// Number of calibrated parameters.
    fn parameter_count(&self) -> usize {
        self.parameters().len()
    }

    /// Sensitivity of the native value at t to each parameter.
    fn parameter_sensitivity(&self, t: f64) -> CurveResult<DVector<f64>>;

    /// Fixed curves whose native values enter this curve additively.
    ///
    /// A point sensitivity to this curve is also a point sensitivity to each
    /// of these.
    fn underlying_curves(&self) -> Vec<Arc<dyn Curve>> {
        Vec::new()
    }

    /// Discount factor to time t. Yield curves only.
    fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        require_kind(self.name(), self.kind(), CurveKind::Yield)?;
        if t <= 0.0 {
            return Ok(1.0);
        }
        Ok((-self.value(t)? * t).exp())
    }

    /// Simply compounded forward rate between t1 and t2. Yield curves only.
    fn forward_rate(&self, t1: f64, t2: f64) -> CurveResult<f64> {
        if t2 <= t1 {
            return Err(CurveError::invalid_value(format!(
                "forward period end {t2} must be after start {t1}"
            )));
        }
        let df1 = self.discount_factor(t1)?;
        let df2 = self.discount_factor(t2)?;
        Ok((df1 / df2 - 1.0) / (t2 - t1))
    }
}

/// Fails unless `got` matches `expected`.
pub(crate) fn require_kind(name: &str, got: CurveKind, expected: CurveKind) -> CurveResult<()> {
    if got == expected {
        Ok(())
    } else {
        Err(CurveError::incompatible_kind(name, expected, got))
    }
}
