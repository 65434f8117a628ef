//! Point, parameter and market quote sensitivities.
//!
//! Sensitivities flow in three stages:
//!
//! 1. An instrument reports a [`CurveSensitivity`]: derivatives with respect
//!    to curve native values at given times.
//! 2. [`parameter_sensitivity`] maps those onto each curve's parameters,
//!    following [`Curve::underlying_curves`] so fixed base curves receive
//!    their share.
//! 3. [`market_quote_sensitivity`] maps parameter sensitivities onto the
//!    quotes of the calibrating instruments through the Jacobians stored in
//!    a [`CurveBuildingBlockBundle`].

use std::collections::BTreeMap;

use log::debug;
use nalgebra::DVector;

use crate::building::CurveBuildingBlockBundle;
use crate::curves::Curve;
use crate::error::{CurveError, CurveResult};
use crate::provider::CalibrationProvider;

/// Sensitivities to curve native values, as (time, derivative) points per
/// curve name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveSensitivity {
    points: BTreeMap<String, Vec<(f64, f64)>>,
}

impl CurveSensitivity {
    /// Creates an empty sensitivity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single point.
    #[must_use]
    pub fn of(name: impl Into<String>, time: f64, value: f64) -> Self {
        let mut sensitivity = Self::new();
        sensitivity.add_point(name, time, value);
        sensitivity
    }

    /// Adds a point to a curve's list.
    pub fn add_point(&mut self, name: impl Into<String>, time: f64, value: f64) {
        self.points.entry(name.into()).or_default().push((time, value));
    }

    /// Sum of two sensitivities.
    #[must_use]
    pub fn plus(mut self, other: &Self) -> Self {
        for (name, points) in &other.points {
            self.points
                .entry(name.clone())
                .or_default()
                .extend_from_slice(points);
        }
        self
    }

    /// Every point scaled by `factor`.
    #[must_use]
    pub fn multiplied_by(mut self, factor: f64) -> Self {
        for points in self.points.values_mut() {
            for (_, value) in points.iter_mut() {
                *value *= factor;
            }
        }
        self
    }

    /// Points of one curve.
    #[must_use]
    pub fn points(&self, name: &str) -> &[(f64, f64)] {
        self.points.get(name).map_or(&[], Vec::as_slice)
    }

    /// Curves with at least one point.
    pub fn curve_names(&self) -> impl Iterator<Item = &str> {
        self.points.keys().map(String::as_str)
    }

    /// True if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Sensitivity vectors keyed by curve name.
///
/// Used both for parameter sensitivities and, after propagation, for market
/// quote sensitivities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSensitivity {
    values: BTreeMap<String, DVector<f64>>,
}

impl ParameterSensitivity {
    /// Creates an empty sensitivity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vector to a curve's entry.
    ///
    /// # Errors
    ///
    /// `MathError` if the curve already has an entry of a different length.
    pub fn add(&mut self, name: impl Into<String>, values: DVector<f64>) -> CurveResult<()> {
        let name = name.into();
        match self.values.get_mut(&name) {
            Some(existing) if existing.len() != values.len() => {
                Err(CurveError::math_error(format!(
                    "sensitivity to {name} has length {}, cannot add length {}",
                    existing.len(),
                    values.len()
                )))
            }
            Some(existing) => {
                *existing += values;
                Ok(())
            }
            None => {
                self.values.insert(name, values);
                Ok(())
            }
        }
    }

    /// Sum of two sensitivities.
    pub fn plus(mut self, other: &Self) -> CurveResult<Self> {
        for (name, values) in &other.values {
            self.add(name.clone(), values.clone())?;
        }
        Ok(self)
    }

    /// Every entry scaled by `factor`.
    #[must_use]
    pub fn multiplied_by(mut self, factor: f64) -> Self {
        for values in self.values.values_mut() {
            *values *= factor;
        }
        self
    }

    /// Entry of one curve.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DVector<f64>> {
        self.values.get(name)
    }

    /// Curves with an entry.
    pub fn curve_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates over (curve name, vector).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DVector<f64>)> {
        self.values.iter().map(|(name, values)| (name.as_str(), values))
    }

    /// True if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Converts point sensitivities into parameter sensitivities.
///
/// Each curve named in `point` is looked up in `provider`. Points are also
/// forwarded to the curve's underlying curves, recursively.
///
/// # Errors
///
/// `CurveNotFound` if a curve is missing from the provider, or any error
/// from the curves' parameter sensitivities.
pub fn parameter_sensitivity<P: CalibrationProvider>(
    point: &CurveSensitivity,
    provider: &P,
) -> CurveResult<ParameterSensitivity> {
    let mut result = ParameterSensitivity::new();
    for name in point.curve_names() {
        let curve = provider
            .curve(name)
            .ok_or_else(|| CurveError::curve_not_found(name))?;
        accumulate(curve.as_ref(), point.points(name), &mut result)?;
    }
    Ok(result)
}

fn accumulate(
    curve: &dyn Curve,
    points: &[(f64, f64)],
    result: &mut ParameterSensitivity,
) -> CurveResult<()> {
    let count = curve.parameter_count();
    if count > 0 {
        let mut total = DVector::zeros(count);
        for &(time, value) in points {
            total += curve.parameter_sensitivity(time)? * value;
        }
        result.add(curve.name(), total)?;
    }
    for underlying in curve.underlying_curves() {
        accumulate(underlying.as_ref(), points, result)?;
    }
    Ok(())
}

/// Converts parameter sensitivities into market quote sensitivities.
///
/// For each curve with a block, the sensitivity s is mapped to sᵀ · ∂x/∂q
/// and split over the curves listed in the block. Curves without a block
/// (fixed inputs) are skipped.
///
/// # Errors
///
/// `MathError` if a vector's length does not match its curve's Jacobian.
pub fn market_quote_sensitivity(
    parameter_sensitivity: &ParameterSensitivity,
    blocks: &CurveBuildingBlockBundle,
) -> CurveResult<ParameterSensitivity> {
    let mut result = ParameterSensitivity::new();
    for (name, sensitivity) in parameter_sensitivity.iter() {
        let (Some(block), Some(matrix)) = (blocks.block(name), blocks.matrix(name)) else {
            debug!("no building block for {name}, skipped in quote sensitivity");
            continue;
        };
        if matrix.nrows() != sensitivity.len() {
            return Err(CurveError::math_error(format!(
                "sensitivity to {name} has length {}, Jacobian has {} rows",
                sensitivity.len(),
                matrix.nrows()
            )));
        }
        let quotes = matrix.tr_mul(sensitivity);
        for entry in block.entries() {
            result.add(
                entry.name.clone(),
                quotes.rows(entry.start, entry.count).into_owned(),
            )?;
        }
    }
    Ok(result)
}
