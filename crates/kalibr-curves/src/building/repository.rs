//! Sequential calibration of curve units.

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use kalibr_math::linear_algebra::invert;
use kalibr_math::solvers::{broyden_system, newton_system, RootFinderKind, VectorSolverResult};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{CurveBuildingBlock, CurveBuildingBlockBundle, MultiCurveBundle};
use crate::config::CalibrationConfig;
use crate::error::{CurveError, CurveResult};
use crate::generator::CurveGenerator;
use crate::instruments::CalibrationInstrument;
use crate::provider::{
    CalibrationProvider, CurveRole, CurveRoles, HullWhiteProvider, InflationIssuerProvider,
    InflationProvider, IssuerProvider, MulticurveProvider,
};
use crate::repricing::{RepricingCheck, RepricingReport, UnitCalibrationReport};
use crate::sensitivity::{parameter_sensitivity, ParameterSensitivity};

/// Repository for discounting and forward curves.
pub type MulticurveBuildingRepository = CurveBuildingRepository<MulticurveProvider>;
/// Repository for issuer curves.
pub type IssuerBuildingRepository = CurveBuildingRepository<IssuerProvider>;
/// Repository for curves calibrated to futures with Hull-White convexity.
pub type HullWhiteBuildingRepository = CurveBuildingRepository<HullWhiteProvider>;
/// Repository for price index curves.
pub type InflationBuildingRepository = CurveBuildingRepository<InflationProvider>;
/// Repository for price index and issuer curves.
pub type InflationIssuerBuildingRepository = CurveBuildingRepository<InflationIssuerProvider>;

/// Result of [`CurveBuildingRepository::make_curves_from_instruments`].
#[derive(Debug, Clone)]
pub struct CalibrationOutput<P> {
    /// The known curves plus every calibrated curve.
    pub provider: P,
    /// Known blocks plus the blocks of every calibrated curve.
    pub blocks: CurveBuildingBlockBundle,
    /// One report per unit, in calibration order.
    pub reports: Vec<UnitCalibrationReport>,
}

/// Calibrates units of curves into a provider of flavour `P`.
#[derive(Debug, Clone)]
pub struct CurveBuildingRepository<P> {
    config: CalibrationConfig,
    _provider: PhantomData<fn() -> P>,
}

impl<P: CalibrationProvider> Default for CurveBuildingRepository<P> {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

impl<P: CalibrationProvider> CurveBuildingRepository<P> {
    /// Creates a repository.
    #[must_use]
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            _provider: PhantomData,
        }
    }

    /// The calibration settings.
    #[must_use]
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Calibrates `units` in order on top of `known_provider`.
    ///
    /// Each curve is stored in the provider under its roles from `roles`.
    /// `known_blocks` holds the blocks of curves calibrated earlier; curves
    /// of the known provider without a block are treated as fixed inputs
    /// with no quote dependency.
    ///
    /// # Errors
    ///
    /// `BuilderError` or `ParameterCountMismatch` for an invalid unit,
    /// `CalibrationFailure` if a unit does not converge, and
    /// `SingularMatrix` errors if a unit's Jacobian cannot be inverted.
    pub fn make_curves_from_instruments(
        &self,
        units: &[MultiCurveBundle<P>],
        known_provider: &P,
        known_blocks: &CurveBuildingBlockBundle,
        roles: &CurveRoles,
    ) -> CurveResult<CalibrationOutput<P>> {
        let mut provider = known_provider.clone();
        let mut blocks = known_blocks.clone();
        let mut order = calibration_order(known_blocks);
        let mut reports = Vec::with_capacity(units.len());

        for unit in units {
            let start = Instant::now();
            let prepared = PreparedUnit::new(unit, &provider, roles)?;
            let solution = self.solve(&prepared, &provider)?;
            let calibrated = prepared.build_provider(&provider, &solution.root)?;
            let unit_blocks = prepared.building_blocks(&calibrated, &blocks, &order)?;
            let repricing = prepared.repricing(&calibrated, self.config.repricing_tolerance)?;

            let curve_names = unit.curve_names();
            info!(
                "calibrated [{}] with {} instruments in {} steps, |F| = {:.3e}",
                curve_names.join(", "),
                prepared.instruments.len(),
                solution.iterations,
                solution.residual_norm
            );

            blocks.add_all(&unit_blocks);
            order.extend(curve_names.iter().cloned());
            reports.push(UnitCalibrationReport {
                curve_names,
                iterations: solution.iterations,
                residual_norm: solution.residual_norm,
                repricing,
                build_duration: start.elapsed(),
            });
            provider = calibrated;
        }

        Ok(CalibrationOutput {
            provider,
            blocks,
            reports,
        })
    }

    fn solve(&self, unit: &PreparedUnit<'_, P>, base: &P) -> CurveResult<VectorSolverResult> {
        let residuals = |x: &DVector<f64>| unit.residuals(&unit.build_provider(base, x)?);
        let jacobian = |x: &DVector<f64>| unit.jacobian(&unit.build_provider(base, x)?);
        let solver = self.config.solver_config();
        let x0 = unit.initial_guess.clone();

        let result = match self.config.root_finder {
            RootFinderKind::Newton => newton_system(residuals, jacobian, x0, &solver),
            RootFinderKind::Broyden => broyden_system(residuals, jacobian, x0, &solver),
        };
        result.map_err(|err| match err {
            CurveError::CalibrationFailure {
                iterations,
                residual,
                message,
            } => CurveError::calibration_failed(
                iterations,
                residual,
                format!("{message} (unit {})", unit.names().join(", ")),
            ),
            other => other,
        })
    }
}

/// Names of the known blocks' curves, dependencies first.
fn calibration_order(blocks: &CurveBuildingBlockBundle) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for name in blocks.names() {
        if let Some(block) = blocks.block(name) {
            for entry in block.names() {
                if !order.iter().any(|n| n == entry) {
                    order.push(entry.to_string());
                }
            }
        }
    }
    order
}

/// A curve of a validated unit.
struct PreparedCurve<'a> {
    name: &'a str,
    generator: Arc<dyn CurveGenerator>,
    roles: &'a [CurveRole],
    start: usize,
    count: usize,
}

/// A validated unit with finalized generators and its parameter layout.
struct PreparedUnit<'a, P> {
    curves: Vec<PreparedCurve<'a>>,
    instruments: Vec<&'a dyn CalibrationInstrument<P>>,
    initial_guess: DVector<f64>,
}

impl<'a, P: CalibrationProvider> PreparedUnit<'a, P> {
    fn new(unit: &'a MultiCurveBundle<P>, provider: &P, roles: &'a CurveRoles) -> CurveResult<Self> {
        if unit.curves().is_empty() {
            return Err(CurveError::builder_error("calibration unit has no curves"));
        }

        let mut seen = BTreeSet::new();
        let mut curves = Vec::with_capacity(unit.curves().len());
        let mut instruments = Vec::with_capacity(unit.instrument_count());
        let mut guess = Vec::with_capacity(unit.instrument_count());

        for bundle in unit.curves() {
            let name = bundle.name();
            if !seen.insert(name) {
                return Err(CurveError::builder_error(format!(
                    "curve {name} appears twice in the unit"
                )));
            }
            if provider.curve(name).is_some() {
                return Err(CurveError::builder_error(format!(
                    "curve {name} is already in the provider"
                )));
            }
            let curve_roles = roles.roles(name);
            if curve_roles.is_empty() {
                return Err(CurveError::builder_error(format!("curve {name} has no role")));
            }
            if bundle.instruments().is_empty() {
                return Err(CurveError::builder_error(format!(
                    "curve {name} has no instruments"
                )));
            }

            let node_times: Vec<f64> = bundle.instruments().iter().map(|i| i.node_time()).collect();
            let generator = bundle.generator().finalize(&node_times)?;
            let count = generator.parameter_count();
            if count != node_times.len() {
                return Err(CurveError::parameter_count_mismatch(name, node_times.len(), count));
            }
            let curve_guess = bundle
                .initial_guess()
                .map_or_else(|| generator.initial_guess(), <[f64]>::to_vec);
            if curve_guess.len() != count {
                return Err(CurveError::parameter_count_mismatch(name, count, curve_guess.len()));
            }

            curves.push(PreparedCurve {
                name,
                generator,
                roles: curve_roles,
                start: guess.len(),
                count,
            });
            guess.extend(curve_guess);
            instruments.extend(bundle.instruments().iter().map(|i| &**i));
        }

        Ok(Self {
            curves,
            instruments,
            initial_guess: DVector::from_vec(guess),
        })
    }

    fn names(&self) -> Vec<&str> {
        self.curves.iter().map(|c| c.name).collect()
    }

    fn size(&self) -> usize {
        self.initial_guess.len()
    }

    fn curve(&self, name: &str) -> Option<&PreparedCurve<'a>> {
        self.curves.iter().find(|c| c.name == name)
    }

    /// The base provider with the unit's curves generated from `x`.
    fn build_provider(&self, base: &P, x: &DVector<f64>) -> CurveResult<P> {
        let mut provider = base.clone();
        let parameters = x.as_slice();
        for curve in &self.curves {
            let generated = curve
                .generator
                .generate(curve.name, &parameters[curve.start..curve.start + curve.count])?;
            for role in curve.roles {
                provider.set_curve(role, Arc::clone(&generated))?;
            }
        }
        Ok(provider)
    }

    fn residuals(&self, provider: &P) -> CurveResult<DVector<f64>> {
        #[cfg(feature = "parallel")]
        let values = self
            .instruments
            .par_iter()
            .map(|i| i.par_spread(provider))
            .collect::<CurveResult<Vec<f64>>>()?;
        #[cfg(not(feature = "parallel"))]
        let values = self
            .instruments
            .iter()
            .map(|i| i.par_spread(provider))
            .collect::<CurveResult<Vec<f64>>>()?;
        Ok(DVector::from_vec(values))
    }

    /// Parameter sensitivities of each instrument's par spread.
    fn sensitivities(&self, provider: &P) -> CurveResult<Vec<ParameterSensitivity>> {
        let row = |i: &&dyn CalibrationInstrument<P>| {
            parameter_sensitivity(&i.par_spread_sensitivity(provider)?, provider)
        };
        #[cfg(feature = "parallel")]
        let rows = self.instruments.par_iter().map(row).collect();
        #[cfg(not(feature = "parallel"))]
        let rows = self.instruments.iter().map(row).collect();
        rows
    }

    /// ∂F/∂x over the unit's own parameters.
    fn jacobian(&self, provider: &P) -> CurveResult<DMatrix<f64>> {
        let rows = self.sensitivities(provider)?;
        Ok(self.unit_jacobian(&rows))
    }

    fn unit_jacobian(&self, rows: &[ParameterSensitivity]) -> DMatrix<f64> {
        let n = self.size();
        let mut jacobian = DMatrix::zeros(n, n);
        for (i, row) in rows.iter().enumerate() {
            for curve in &self.curves {
                if let Some(values) = row.get(curve.name) {
                    for (k, value) in values.iter().enumerate().take(curve.count) {
                        jacobian[(i, curve.start + k)] = *value;
                    }
                }
            }
        }
        jacobian
    }

    /// Blocks of the unit's curves: dx/dq = J⁻¹ [ −Σ_d ∂F/∂x_d T_d | I ].
    fn building_blocks(
        &self,
        provider: &P,
        bundle: &CurveBuildingBlockBundle,
        order: &[String],
    ) -> CurveResult<CurveBuildingBlockBundle> {
        let n = self.size();
        let rows = self.sensitivities(provider)?;
        let jacobian = self.unit_jacobian(&rows);

        // ∂F/∂x_d for each previously calibrated curve d the unit depends on.
        let mut direct: BTreeMap<&str, DMatrix<f64>> = BTreeMap::new();
        for (i, row) in rows.iter().enumerate() {
            for (name, values) in row.iter() {
                if self.curve(name).is_some() {
                    continue;
                }
                if !bundle.contains(name) {
                    debug!("{name} has no building block, treated as fixed");
                    continue;
                }
                let derivative = direct
                    .entry(name)
                    .or_insert_with(|| DMatrix::zeros(n, values.len()));
                for (k, value) in values.iter().enumerate() {
                    derivative[(i, k)] += *value;
                }
            }
        }

        // Transitive dependencies with their quote counts.
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut pending: Vec<&str> = direct.keys().copied().collect();
        while let Some(name) = pending.pop() {
            let Some(block) = bundle.block(name) else {
                continue;
            };
            for entry in block.entries() {
                if !counts.contains_key(&entry.name) {
                    counts.insert(entry.name.clone(), entry.count);
                    pending.push(entry.name.as_str());
                }
            }
        }

        let mut dependencies: Vec<String> =
            order.iter().filter(|n| counts.contains_key(*n)).cloned().collect();
        for name in counts.keys() {
            if !dependencies.contains(name) {
                dependencies.push(name.clone());
            }
        }
        if !dependencies.is_empty() {
            debug!(
                "unit [{}] depends on [{}]",
                self.names().join(", "),
                dependencies.join(", ")
            );
        }

        let mut block = CurveBuildingBlock::new();
        for name in &dependencies {
            block.push(name.clone(), counts.get(name).copied().unwrap_or(0));
        }
        let dependency_quotes = block.total();
        for curve in &self.curves {
            block.push(curve.name, curve.count);
        }

        let mut rhs = DMatrix::zeros(n, dependency_quotes + n);
        for (name, derivative) in &direct {
            let (Some(dep_block), Some(transition)) = (bundle.block(name), bundle.matrix(name))
            else {
                continue;
            };
            if derivative.ncols() != transition.nrows() {
                return Err(CurveError::math_error(format!(
                    "{name} has {} parameters in the unit, {} in its block",
                    derivative.ncols(),
                    transition.nrows()
                )));
            }
            let product = derivative * transition;
            for entry in dep_block.entries() {
                let Some(target) = block.entry(&entry.name) else {
                    continue;
                };
                for r in 0..n {
                    for c in 0..entry.count.min(target.count) {
                        rhs[(r, target.start + c)] -= product[(r, entry.start + c)];
                    }
                }
            }
        }
        for i in 0..n {
            rhs[(i, dependency_quotes + i)] = 1.0;
        }

        let sensitivity = invert(&jacobian)? * rhs;
        let mut result = CurveBuildingBlockBundle::new();
        for curve in &self.curves {
            let matrix = sensitivity.rows(curve.start, curve.count).into_owned();
            result.add(curve.name, block.clone(), matrix)?;
        }
        Ok(result)
    }

    fn repricing(&self, provider: &P, tolerance: f64) -> CurveResult<RepricingReport> {
        let checks = self
            .instruments
            .iter()
            .map(|i| RepricingCheck::from_instrument(*i, provider, tolerance))
            .collect::<CurveResult<Vec<_>>>()?;
        Ok(RepricingReport::new(checks))
    }
}
