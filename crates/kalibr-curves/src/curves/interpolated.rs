//! Curves defined by interpolated node values.

use std::fmt;

use kalibr_math::interpolation::{InterpolationMethod, Interpolator};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use super::{Curve, CurveKind};
use crate::error::{CurveError, CurveResult};

/// What the node values of an [`InterpolatedCurve`] are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRepresentation {
    /// Continuously compounded zero rates.
    ZeroRate,
    /// Discount factors; the native value is r(t) = -ln DF(t) / t.
    DiscountFactor,
    /// Price index levels.
    PriceIndex,
}

impl NodeRepresentation {
    /// Kind of curve the representation produces.
    #[must_use]
    pub fn kind(&self) -> CurveKind {
        match self {
            Self::ZeroRate | Self::DiscountFactor => CurveKind::Yield,
            Self::PriceIndex => CurveKind::PriceIndex,
        }
    }
}

/// A curve interpolated through calibrated node values.
///
/// An optional anchor node (for instance today's index fixing) takes part
/// in the interpolation but is not a parameter. Outside the node range the
/// native value is held flat. A curve with a single node is flat.
pub struct InterpolatedCurve {
    name: String,
    representation: NodeRepresentation,
    method: InterpolationMethod,
    times: Vec<f64>,
    values: Vec<f64>,
    anchor: Option<(f64, f64)>,
    node_times: Vec<f64>,
    node_values: Vec<f64>,
    interpolator: Option<Box<dyn Interpolator>>,
}

impl fmt::Debug for InterpolatedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpolatedCurve")
            .field("name", &self.name)
            .field("representation", &self.representation)
            .field("method", &self.method)
            .field("times", &self.times)
            .field("values", &self.values)
            .field("anchor", &self.anchor)
            .finish()
    }
}

impl InterpolatedCurve {
    /// Creates an interpolated curve.
    ///
    /// # Errors
    ///
    /// Fails if there are no nodes, the lengths differ, node times (anchor
    /// included) are not strictly increasing, or discount factor nodes are
    /// not positive at positive times.
    pub fn new(
        name: impl Into<String>,
        representation: NodeRepresentation,
        method: InterpolationMethod,
        times: Vec<f64>,
        values: Vec<f64>,
        anchor: Option<(f64, f64)>,
    ) -> CurveResult<Self> {
        let name = name.into();
        if times.is_empty() {
            return Err(CurveError::insufficient_points(1, 0));
        }
        if times.len() != values.len() {
            return Err(CurveError::parameter_count_mismatch(
                &name,
                times.len(),
                values.len(),
            ));
        }

        let mut node_times = Vec::with_capacity(times.len() + 1);
        let mut node_values = Vec::with_capacity(times.len() + 1);
        if let Some((t, v)) = anchor {
            node_times.push(t);
            node_values.push(v);
        }
        node_times.extend_from_slice(&times);
        node_values.extend_from_slice(&values);

        for (i, w) in node_times.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(CurveError::non_monotonic_tenors(i + 1, w[0], w[1]));
            }
        }
        if node_values.iter().any(|v| !v.is_finite()) {
            return Err(CurveError::invalid_value(format!(
                "curve {name} has non-finite node values"
            )));
        }
        if representation == NodeRepresentation::DiscountFactor
            && node_times
                .iter()
                .zip(node_values.iter())
                .any(|(t, df)| *t <= 0.0 || *df <= 0.0)
        {
            return Err(CurveError::invalid_value(format!(
                "curve {name}: discount factor nodes need positive times and values"
            )));
        }

        let interpolator = if node_times.len() >= 2 {
            Some(method.build(node_times.clone(), node_values.clone())?)
        } else {
            None
        };

        Ok(Self {
            name,
            representation,
            method,
            times,
            values,
            anchor,
            node_times,
            node_values,
            interpolator,
        })
    }

    /// Node representation.
    #[must_use]
    pub fn representation(&self) -> NodeRepresentation {
        self.representation
    }

    /// Interpolation method.
    #[must_use]
    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Calibrated node times (anchor excluded).
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    fn clamp(&self, t: f64) -> f64 {
        let first = self.node_times[0];
        let last = self.node_times[self.node_times.len() - 1];
        t.clamp(first, last)
    }

    /// Interpolated node quantity at the clamped time.
    fn node_quantity(&self, tc: f64) -> CurveResult<f64> {
        match &self.interpolator {
            Some(interpolator) => Ok(interpolator.interpolate(tc)?),
            None => Ok(self.node_values[0]),
        }
    }
}

impl Curve for InterpolatedCurve {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> CurveKind {
        self.representation.kind()
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        let tc = self.clamp(t);
        let y = self.node_quantity(tc)?;
        match self.representation {
            NodeRepresentation::ZeroRate | NodeRepresentation::PriceIndex => Ok(y),
            NodeRepresentation::DiscountFactor => {
                if y <= 0.0 {
                    return Err(CurveError::invalid_value(format!(
                        "curve {}: non-positive discount factor at {tc}",
                        self.name
                    )));
                }
                Ok(-y.ln() / tc)
            }
        }
    }

    fn parameters(&self) -> Vec<f64> {
        self.values.clone()
    }

    fn parameter_count(&self) -> usize {
        self.values.len()
    }

    fn parameter_sensitivity(&self, t: f64) -> CurveResult<DVector<f64>> {
        let tc = self.clamp(t);
        let mut nodes = match &self.interpolator {
            Some(interpolator) => interpolator.node_sensitivity(tc)?,
            None => vec![1.0],
        };
        if self.anchor.is_some() {
            nodes.remove(0);
        }

        if self.representation == NodeRepresentation::DiscountFactor {
            // r = -ln D / t  =>  dr/dD_i = -(dD/dD_i) / (t D)
            let y = self.node_quantity(tc)?;
            let factor = -1.0 / (tc * y);
            nodes.iter_mut().for_each(|s| *s *= factor);
        }

        Ok(DVector::from_vec(nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn zero_curve(method: InterpolationMethod) -> InterpolatedCurve {
        InterpolatedCurve::new(
            "USD-OIS",
            NodeRepresentation::ZeroRate,
            method,
            vec![0.5, 1.0, 2.0, 5.0],
            vec![0.02, 0.022, 0.025, 0.03],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_flat_extrapolation() {
        let curve = zero_curve(InterpolationMethod::Linear);

        assert_relative_eq!(curve.value(0.1).unwrap(), 0.02);
        assert_relative_eq!(curve.value(30.0).unwrap(), 0.03);
        assert_relative_eq!(curve.value(1.5).unwrap(), 0.0235, epsilon = 1e-15);

        let sensitivity = curve.parameter_sensitivity(30.0).unwrap();
        assert_relative_eq!(sensitivity[3], 1.0);
        assert_relative_eq!(sensitivity.sum(), 1.0);
    }

    #[test]
    fn test_single_node_is_flat() {
        let curve = InterpolatedCurve::new(
            "flat",
            NodeRepresentation::ZeroRate,
            InterpolationMethod::NaturalCubicSpline,
            vec![1.0],
            vec![0.04],
            None,
        )
        .unwrap();

        assert_relative_eq!(curve.value(7.0).unwrap(), 0.04);
        assert_eq!(curve.parameter_sensitivity(0.3).unwrap().as_slice(), &[1.0]);
    }

    #[test]
    fn test_discount_factor_representation() {
        let dfs: Vec<f64> = [1.0f64, 2.0, 3.0].iter().map(|t| (-0.03 * t).exp()).collect();
        let curve = InterpolatedCurve::new(
            "EUR-DSC",
            NodeRepresentation::DiscountFactor,
            InterpolationMethod::LogLinear,
            vec![1.0, 2.0, 3.0],
            dfs.clone(),
            None,
        )
        .unwrap();

        assert_relative_eq!(curve.value(2.5).unwrap(), 0.03, epsilon = 1e-14);
        assert_relative_eq!(curve.discount_factor(2.5).unwrap(), (-0.075f64).exp(), epsilon = 1e-14);

        // Bump each discount factor node and compare
        let h = 1e-8;
        let sensitivity = curve.parameter_sensitivity(1.7).unwrap();
        for j in 0..3 {
            let mut up = dfs.clone();
            up[j] += h;
            let bumped = InterpolatedCurve::new(
                "EUR-DSC",
                NodeRepresentation::DiscountFactor,
                InterpolationMethod::LogLinear,
                vec![1.0, 2.0, 3.0],
                up,
                None,
            )
            .unwrap();
            let fd = (bumped.value(1.7).unwrap() - curve.value(1.7).unwrap()) / h;
            assert_relative_eq!(sensitivity[j], fd, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_anchor_is_not_a_parameter() {
        let curve = InterpolatedCurve::new(
            "US-CPI",
            NodeRepresentation::PriceIndex,
            InterpolationMethod::Linear,
            vec![1.0, 2.0],
            vec![102.0, 104.5],
            Some((0.0, 100.0)),
        )
        .unwrap();

        assert_eq!(curve.kind(), CurveKind::PriceIndex);
        assert_eq!(curve.parameter_count(), 2);
        assert_relative_eq!(curve.value(0.5).unwrap(), 101.0, epsilon = 1e-12);

        let sensitivity = curve.parameter_sensitivity(0.5).unwrap();
        assert_eq!(sensitivity.len(), 2);
        assert_relative_eq!(sensitivity[0], 0.5, epsilon = 1e-15);
        assert_relative_eq!(sensitivity[1], 0.0);
    }

    #[test]
    fn test_invalid_nodes() {
        assert!(matches!(
            InterpolatedCurve::new(
                "bad",
                NodeRepresentation::ZeroRate,
                InterpolationMethod::Linear,
                vec![1.0, 1.0],
                vec![0.01, 0.02],
                None,
            ),
            Err(CurveError::NonMonotonicTenors { .. })
        ));
        assert!(InterpolatedCurve::new(
            "bad",
            NodeRepresentation::DiscountFactor,
            InterpolationMethod::LogLinear,
            vec![1.0, 2.0],
            vec![0.99, -0.1],
            None,
        )
        .is_err());
        assert!(InterpolatedCurve::new(
            "bad",
            NodeRepresentation::ZeroRate,
            InterpolationMethod::Linear,
            vec![],
            vec![],
            None,
        )
        .is_err());
    }
}
