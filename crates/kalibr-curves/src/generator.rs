//! Curve generators.
//!
//! A generator is the strategy that turns a parameter vector into a curve.
//! Node-based generators are bound to the node times of their calibrating
//! instruments with [`CurveGenerator::finalize`] before calibration starts;
//! parametric generators ignore the node times.
//!
//! ```rust
//! use kalibr_curves::generator::{CurveGenerator, InterpolatedGenerator};
//! use kalibr_math::interpolation::InterpolationMethod;
//!
//! let generator = InterpolatedGenerator::yield_interpolated(InterpolationMethod::Linear)
//!     .finalize(&[0.5, 1.0, 2.0])
//!     .unwrap();
//! assert_eq!(generator.parameter_count(), 3);
//!
//! let curve = generator.generate("USD-OIS", &[0.02, 0.021, 0.023]).unwrap();
//! assert!((curve.value(0.75).unwrap() - 0.0205).abs() < 1e-12);
//! ```

use std::fmt;
use std::sync::Arc;

use kalibr_math::interpolation::InterpolationMethod;

use crate::curves::{
    CompositeCurve, ConstantCurve, Curve, CurveKind, InterpolatedCurve, NelsonSiegelCurve,
    NodeRepresentation, SpreadCurve,
};
use crate::error::{CurveError, CurveResult};

/// Default zero rate guess for yield curves.
const DEFAULT_RATE_GUESS: f64 = 0.01;

/// Default level guess for price index curves without an anchor.
const DEFAULT_INDEX_GUESS: f64 = 100.0;

/// Strategy that builds a curve from parameters.
pub trait CurveGenerator: Send + Sync + fmt::Debug {
    /// Kind of curve produced.
    fn kind(&self) -> CurveKind;

    /// Binds the generator to the node times of its calibrating instruments.
    fn finalize(&self, node_times: &[f64]) -> CurveResult<Arc<dyn CurveGenerator>>;

    /// Number of parameters the generated curve takes.
    fn parameter_count(&self) -> usize;

    /// Starting point used when a bundle carries no initial guess.
    fn initial_guess(&self) -> Vec<f64>;

    /// Builds the curve.
    fn generate(&self, name: &str, parameters: &[f64]) -> CurveResult<Arc<dyn Curve>>;
}

fn check_parameter_count(name: &str, expected: usize, parameters: &[f64]) -> CurveResult<()> {
    if parameters.len() == expected {
        Ok(())
    } else {
        Err(CurveError::parameter_count_mismatch(
            name,
            expected,
            parameters.len(),
        ))
    }
}

fn check_increasing(times: &[f64]) -> CurveResult<()> {
    if times.is_empty() {
        return Err(CurveError::insufficient_points(1, 0));
    }
    for (i, w) in times.windows(2).enumerate() {
        if w[1] <= w[0] {
            return Err(CurveError::non_monotonic_tenors(i + 1, w[0], w[1]));
        }
    }
    Ok(())
}

/// Generator for [`InterpolatedCurve`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedGenerator {
    representation: NodeRepresentation,
    method: InterpolationMethod,
    nodes: Option<Vec<f64>>,
    anchor: Option<(f64, f64)>,
}

impl InterpolatedGenerator {
    /// Interpolated zero rates.
    #[must_use]
    pub fn yield_interpolated(method: InterpolationMethod) -> Self {
        Self {
            representation: NodeRepresentation::ZeroRate,
            method,
            nodes: None,
            anchor: None,
        }
    }

    /// Interpolated discount factors.
    #[must_use]
    pub fn discount_factor_interpolated(method: InterpolationMethod) -> Self {
        Self {
            representation: NodeRepresentation::DiscountFactor,
            method,
            nodes: None,
            anchor: None,
        }
    }

    /// Interpolated index levels through a known fixing at `anchor_time`.
    #[must_use]
    pub fn price_index_interpolated(
        method: InterpolationMethod,
        anchor_time: f64,
        anchor_level: f64,
    ) -> Self {
        Self {
            representation: NodeRepresentation::PriceIndex,
            method,
            nodes: None,
            anchor: Some((anchor_time, anchor_level)),
        }
    }

    /// Uses explicit node times instead of the instruments' node times.
    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<f64>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Node times, once bound.
    #[must_use]
    pub fn nodes(&self) -> Option<&[f64]> {
        self.nodes.as_deref()
    }
}

impl CurveGenerator for InterpolatedGenerator {
    fn kind(&self) -> CurveKind {
        self.representation.kind()
    }

    fn finalize(&self, node_times: &[f64]) -> CurveResult<Arc<dyn CurveGenerator>> {
        let nodes = match &self.nodes {
            Some(nodes) => nodes.clone(),
            None => node_times.to_vec(),
        };
        check_increasing(&nodes)?;
        Ok(Arc::new(Self {
            nodes: Some(nodes),
            ..self.clone()
        }))
    }

    fn parameter_count(&self) -> usize {
        self.nodes.as_ref().map_or(0, Vec::len)
    }

    fn initial_guess(&self) -> Vec<f64> {
        let nodes = self.nodes.as_deref().unwrap_or_default();
        match self.representation {
            NodeRepresentation::ZeroRate => vec![DEFAULT_RATE_GUESS; nodes.len()],
            NodeRepresentation::DiscountFactor => nodes
                .iter()
                .map(|t| (-DEFAULT_RATE_GUESS * t).exp())
                .collect(),
            NodeRepresentation::PriceIndex => {
                let level = self.anchor.map_or(DEFAULT_INDEX_GUESS, |(_, level)| level);
                vec![level; nodes.len()]
            }
        }
    }

    fn generate(&self, name: &str, parameters: &[f64]) -> CurveResult<Arc<dyn Curve>> {
        let Some(nodes) = &self.nodes else {
            return Err(CurveError::builder_error(format!(
                "generator for {name} used before its nodes were bound"
            )));
        };
        check_parameter_count(name, nodes.len(), parameters)?;
        Ok(Arc::new(InterpolatedCurve::new(
            name,
            self.representation,
            self.method,
            nodes.clone(),
            parameters.to_vec(),
            self.anchor,
        )?))
    }
}

/// Generator for [`NelsonSiegelCurve`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelsonSiegelGenerator {
    guess: [f64; 4],
}

impl Default for NelsonSiegelGenerator {
    fn default() -> Self {
        // A zero curvature makes the τ loading a multiple of the β₂ loading.
        Self {
            guess: [0.03, -0.01, 0.01, 2.0],
        }
    }
}

impl NelsonSiegelGenerator {
    /// Creates a generator with the default guess.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default guess (β₀, β₁, β₂, τ).
    ///
    /// β₂ should be non-zero: at β₂ = 0 the calibration Jacobian is singular.
    #[must_use]
    pub fn with_guess(mut self, guess: [f64; 4]) -> Self {
        self.guess = guess;
        self
    }
}

impl CurveGenerator for NelsonSiegelGenerator {
    fn kind(&self) -> CurveKind {
        CurveKind::Yield
    }

    fn finalize(&self, _node_times: &[f64]) -> CurveResult<Arc<dyn CurveGenerator>> {
        Ok(Arc::new(*self))
    }

    fn parameter_count(&self) -> usize {
        4
    }

    fn initial_guess(&self) -> Vec<f64> {
        self.guess.to_vec()
    }

    fn generate(&self, name: &str, parameters: &[f64]) -> CurveResult<Arc<dyn Curve>> {
        check_parameter_count(name, 4, parameters)?;
        Ok(Arc::new(NelsonSiegelCurve::new(name, parameters)?))
    }
}

/// Generator for [`ConstantCurve`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantGenerator {
    kind: CurveKind,
    guess: f64,
}

impl ConstantGenerator {
    /// Flat zero rate.
    #[must_use]
    pub fn yield_constant() -> Self {
        Self {
            kind: CurveKind::Yield,
            guess: DEFAULT_RATE_GUESS,
        }
    }

    /// Sets the default guess.
    #[must_use]
    pub fn with_guess(mut self, guess: f64) -> Self {
        self.guess = guess;
        self
    }
}

impl CurveGenerator for ConstantGenerator {
    fn kind(&self) -> CurveKind {
        self.kind
    }

    fn finalize(&self, _node_times: &[f64]) -> CurveResult<Arc<dyn CurveGenerator>> {
        Ok(Arc::new(*self))
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn initial_guess(&self) -> Vec<f64> {
        vec![self.guess]
    }

    fn generate(&self, name: &str, parameters: &[f64]) -> CurveResult<Arc<dyn Curve>> {
        check_parameter_count(name, 1, parameters)?;
        Ok(Arc::new(ConstantCurve::new(name, self.kind, parameters[0])))
    }
}

/// Generator for a calibrated spread over an already built curve.
#[derive(Debug, Clone)]
pub struct SpreadGenerator {
    base: Arc<dyn Curve>,
    spread: Arc<dyn CurveGenerator>,
}

impl SpreadGenerator {
    /// Spread generated by `spread` on top of `base`.
    pub fn new(base: Arc<dyn Curve>, spread: Arc<dyn CurveGenerator>) -> CurveResult<Self> {
        if base.kind() != spread.kind() {
            return Err(CurveError::incompatible_kind(
                base.name(),
                spread.kind(),
                base.kind(),
            ));
        }
        Ok(Self { base, spread })
    }
}

impl CurveGenerator for SpreadGenerator {
    fn kind(&self) -> CurveKind {
        self.base.kind()
    }

    fn finalize(&self, node_times: &[f64]) -> CurveResult<Arc<dyn CurveGenerator>> {
        Ok(Arc::new(Self {
            base: Arc::clone(&self.base),
            spread: self.spread.finalize(node_times)?,
        }))
    }

    fn parameter_count(&self) -> usize {
        self.spread.parameter_count()
    }

    fn initial_guess(&self) -> Vec<f64> {
        vec![0.0; self.spread.parameter_count()]
    }

    fn generate(&self, name: &str, parameters: &[f64]) -> CurveResult<Arc<dyn Curve>> {
        let spread = self.spread.generate(&format!("{name}#spread"), parameters)?;
        Ok(Arc::new(SpreadCurve::new(
            name,
            Arc::clone(&self.base),
            spread,
        )?))
    }
}

/// Generator for the sum of several calibrated curves.
///
/// Every component is bound to the same node times, so node-based
/// components normally carry explicit nodes.
#[derive(Debug, Clone)]
pub struct CompositeGenerator {
    components: Vec<Arc<dyn CurveGenerator>>,
}

impl CompositeGenerator {
    /// Creates a composite of at least one component of a common kind.
    pub fn new(components: Vec<Arc<dyn CurveGenerator>>) -> CurveResult<Self> {
        let Some(first) = components.first() else {
            return Err(CurveError::builder_error("composite generator needs components"));
        };
        let kind = first.kind();
        if let Some(other) = components.iter().find(|c| c.kind() != kind) {
            return Err(CurveError::incompatible_kind("composite", kind, other.kind()));
        }
        Ok(Self { components })
    }
}

impl CurveGenerator for CompositeGenerator {
    fn kind(&self) -> CurveKind {
        self.components[0].kind()
    }

    fn finalize(&self, node_times: &[f64]) -> CurveResult<Arc<dyn CurveGenerator>> {
        let components = self
            .components
            .iter()
            .map(|component| component.finalize(node_times))
            .collect::<CurveResult<Vec<_>>>()?;
        Ok(Arc::new(Self { components }))
    }

    fn parameter_count(&self) -> usize {
        self.components.iter().map(|c| c.parameter_count()).sum()
    }

    fn initial_guess(&self) -> Vec<f64> {
        self.components
            .iter()
            .flat_map(|c| c.initial_guess())
            .collect()
    }

    fn generate(&self, name: &str, parameters: &[f64]) -> CurveResult<Arc<dyn Curve>> {
        check_parameter_count(name, self.parameter_count(), parameters)?;
        let mut curves = Vec::with_capacity(self.components.len());
        let mut start = 0;
        for (i, component) in self.components.iter().enumerate() {
            let count = component.parameter_count();
            curves.push(component.generate(&format!("{name}#{i}"), &parameters[start..start + count])?);
            start += count;
        }
        Ok(Arc::new(CompositeCurve::new(name, curves)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_interpolated_needs_binding() {
        let generator = InterpolatedGenerator::yield_interpolated(InterpolationMethod::Linear);
        assert_eq!(generator.parameter_count(), 0);
        assert!(generator.generate("x", &[]).is_err());

        assert!(matches!(
            generator.finalize(&[1.0, 0.5]),
            Err(CurveError::NonMonotonicTenors { .. })
        ));
    }

    #[test]
    fn test_explicit_nodes_win() {
        let generator = InterpolatedGenerator::yield_interpolated(InterpolationMethod::Linear)
            .with_nodes(vec![2.0, 10.0])
            .finalize(&[1.0, 2.0, 3.0])
            .unwrap();
        assert_eq!(generator.parameter_count(), 2);
    }

    #[test]
    fn test_initial_guesses() {
        let df = InterpolatedGenerator::discount_factor_interpolated(InterpolationMethod::LogLinear)
            .finalize(&[1.0, 2.0])
            .unwrap();
        assert_relative_eq!(df.initial_guess()[1], (-0.02f64).exp(), epsilon = 1e-15);

        let cpi =
            InterpolatedGenerator::price_index_interpolated(InterpolationMethod::Linear, 0.0, 250.0)
                .finalize(&[1.0, 2.0])
                .unwrap();
        assert_eq!(cpi.kind(), CurveKind::PriceIndex);
        assert_eq!(cpi.initial_guess(), vec![250.0, 250.0]);
    }

    #[test]
    fn test_parameter_count_checked() {
        let generator = NelsonSiegelGenerator::new();
        assert!(matches!(
            generator.generate("ns", &[0.03, 0.0, 0.0]),
            Err(CurveError::ParameterCountMismatch { expected: 4, got: 3, .. })
        ));
    }

    #[test]
    fn test_nelson_siegel_default_guess_is_regular() {
        let generator = NelsonSiegelGenerator::new();
        let guess = generator.initial_guess();
        assert!(guess[2].abs() > 0.0);

        let curve = generator.generate("ns", &guess).unwrap();
        let times = [0.5, 2.0, 5.0, 10.0];
        let rows: Vec<_> = times
            .iter()
            .map(|t| curve.parameter_sensitivity(*t).unwrap().transpose())
            .collect();
        let jacobian = nalgebra::DMatrix::from_rows(&rows);
        assert!(kalibr_math::linear_algebra::invert(&jacobian).is_ok());
    }

    #[test]
    fn test_spread_generator() {
        let base: Arc<dyn Curve> = Arc::new(ConstantCurve::new("GOVT", CurveKind::Yield, 0.02));
        let generator = SpreadGenerator::new(base, Arc::new(ConstantGenerator::yield_constant()))
            .unwrap()
            .finalize(&[5.0])
            .unwrap();

        let curve = generator.generate("CORP", &[0.015]).unwrap();
        assert_eq!(curve.name(), "CORP");
        assert_relative_eq!(curve.value(5.0).unwrap(), 0.035, epsilon = 1e-15);
        assert_eq!(curve.underlying_curves()[0].name(), "GOVT");
    }

    #[test]
    fn test_composite_generator_splits_parameters() {
        let generator = CompositeGenerator::new(vec![
            Arc::new(NelsonSiegelGenerator::new()),
            Arc::new(
                InterpolatedGenerator::yield_interpolated(InterpolationMethod::Linear)
                    .with_nodes(vec![1.0, 5.0]),
            ),
        ])
        .unwrap()
        .finalize(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .unwrap();

        assert_eq!(generator.parameter_count(), 6);
        let curve = generator
            .generate("sum", &[0.04, 0.0, 0.0, 1.0, 0.001, 0.002])
            .unwrap();
        assert_relative_eq!(curve.value(3.0).unwrap(), 0.04 + 0.0015, epsilon = 1e-14);
    }
}
