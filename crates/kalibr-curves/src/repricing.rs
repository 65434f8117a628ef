//! Repricing validation of calibrated units.
//!
//! Every calibrated unit comes with a report of how well its curves reprice
//! the instruments they were calibrated to. A unit whose instruments do not
//! reprice within tolerance has not been calibrated, whatever the solver
//! reported.
//!
//! # Usage
//!
//! ```rust,ignore
//! let output = repository.make_curves_from_instruments(&units, &known, &blocks, &roles)?;
//!
//! for report in &output.reports {
//!     if !report.repricing.is_valid() {
//!         eprintln!("Failed instruments: {:?}", report.repricing.failed_instruments());
//!     }
//! }
//! ```

use std::fmt;
use std::time::Duration;

use crate::error::CurveResult;
use crate::instruments::{CalibrationInstrument, InstrumentType};

/// Repricing of a single instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct RepricingCheck {
    /// Description of the instrument.
    pub description: String,

    /// Type of instrument.
    pub instrument_type: InstrumentType,

    /// Market quote.
    pub quote: f64,

    /// Quote implied by the calibrated curves.
    pub model_quote: f64,

    /// Model quote − market quote.
    pub residual: f64,

    /// Tolerance on |residual|.
    pub tolerance: f64,

    /// Whether |residual| is within tolerance.
    pub passed: bool,
}

impl RepricingCheck {
    /// Creates a check from its quotes.
    #[must_use]
    pub fn new(
        description: String,
        instrument_type: InstrumentType,
        quote: f64,
        model_quote: f64,
        tolerance: f64,
    ) -> Self {
        let residual = model_quote - quote;
        Self {
            description,
            instrument_type,
            quote,
            model_quote,
            residual,
            tolerance,
            passed: residual.abs() <= tolerance,
        }
    }

    /// Reprices an instrument against a provider.
    pub fn from_instrument<P>(
        instrument: &dyn CalibrationInstrument<P>,
        provider: &P,
        tolerance: f64,
    ) -> CurveResult<Self> {
        Ok(Self::new(
            instrument.description(),
            instrument.instrument_type(),
            instrument.quote(),
            instrument.model_quote(provider)?,
            tolerance,
        ))
    }
}

impl fmt::Display for RepricingCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "✓" } else { "✗" };
        write!(
            f,
            "{} {} | model: {:.8} | residual: {:.2e} (tol: {:.2e})",
            status, self.description, self.model_quote, self.residual, self.tolerance
        )
    }
}

/// Repricing checks of every instrument of a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepricingReport {
    checks: Vec<RepricingCheck>,
}

impl RepricingReport {
    /// Creates a report from individual checks.
    #[must_use]
    pub fn new(checks: Vec<RepricingCheck>) -> Self {
        Self { checks }
    }

    /// True if every instrument reprices within tolerance.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// The individual checks, in instrument order.
    #[must_use]
    pub fn checks(&self) -> &[RepricingCheck] {
        &self.checks
    }

    /// Largest |residual|; 0 for an empty report.
    #[must_use]
    pub fn max_abs_residual(&self) -> f64 {
        self.checks
            .iter()
            .map(|c| c.residual.abs())
            .fold(0.0_f64, f64::max)
    }

    /// Root mean square of the residuals.
    #[must_use]
    pub fn rms_residual(&self) -> f64 {
        if self.checks.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.checks.iter().map(|c| c.residual * c.residual).sum();
        (sum_sq / self.checks.len() as f64).sqrt()
    }

    /// Checks outside tolerance.
    #[must_use]
    pub fn failed(&self) -> Vec<&RepricingCheck> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// Descriptions of the instruments outside tolerance.
    #[must_use]
    pub fn failed_instruments(&self) -> Vec<&str> {
        self.failed()
            .into_iter()
            .map(|c| c.description.as_str())
            .collect()
    }
}

impl fmt::Display for RepricingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        writeln!(f, "Repricing Report")?;
        writeln!(f, "================")?;
        writeln!(f, "Status: {}", if self.is_valid() { "PASSED" } else { "FAILED" })?;
        writeln!(f, "Instruments: {}/{} passed", passed, self.checks.len())?;
        writeln!(f, "Max Residual: {:.2e}", self.max_abs_residual())?;
        writeln!(f, "RMS Residual: {:.2e}", self.rms_residual())?;

        if !self.checks.is_empty() {
            writeln!(f)?;
            writeln!(f, "Details:")?;
            for check in &self.checks {
                writeln!(f, "  {check}")?;
            }
        }

        Ok(())
    }
}

/// Outcome of calibrating one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCalibrationReport {
    /// Curves calibrated together, in parameter order.
    pub curve_names: Vec<String>,

    /// Root-finding steps taken.
    pub iterations: u32,

    /// Euclidean norm of the par spreads at the solution.
    pub residual_norm: f64,

    /// Repricing of the unit's instruments.
    pub repricing: RepricingReport,

    /// Time spent solving and building the unit's blocks.
    pub build_duration: Duration,
}

impl fmt::Display for UnitCalibrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Unit [{}]: {} steps, |F| = {:.2e}, {:?}",
            self.curve_names.join(", "),
            self.iterations,
            self.residual_norm,
            self.build_duration
        )?;
        write!(f, "{}", self.repricing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn check(residual: f64) -> RepricingCheck {
        RepricingCheck::new(
            format!("Deposit {residual}"),
            InstrumentType::Deposit,
            0.02,
            0.02 + residual,
            1e-8,
        )
    }

    #[test]
    fn test_check() {
        let ok = check(1e-10);
        assert!(ok.passed);
        assert_relative_eq!(ok.residual, 1e-10, epsilon = 1e-15);
        assert!(!check(-1e-6).passed);
    }

    #[test]
    fn test_report() {
        let report = RepricingReport::new(vec![check(1e-10), check(-1e-6), check(3e-9)]);

        assert!(!report.is_valid());
        assert_relative_eq!(report.max_abs_residual(), 1e-6, epsilon = 1e-15);
        assert_eq!(report.failed().len(), 1);
        assert_eq!(report.failed_instruments().len(), 1);
        assert!(report.to_string().contains("FAILED"));
    }

    #[test]
    fn test_empty_report() {
        let report = RepricingReport::default();
        assert!(report.is_valid());
        assert_relative_eq!(report.max_abs_residual(), 0.0);
        assert_relative_eq!(report.rms_residual(), 0.0);
    }
}
