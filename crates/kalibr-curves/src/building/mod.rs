//! Curve building: calibration units, blocks and the repository.
//!
//! Curves are calibrated in **units**. The curves of one unit are solved
//! simultaneously from their instruments; units are solved in sequence, each
//! one seeing the curves of the units before it as fixed.
//!
//! Next to the curves, calibration produces a [`CurveBuildingBlockBundle`]:
//! for each curve, the Jacobian of its parameters with respect to the quotes
//! of every instrument it depends on, directly or through earlier units.

mod block;
mod bundle;
mod repository;

pub use block::{BlockEntry, CurveBuildingBlock};
pub use bundle::CurveBuildingBlockBundle;
pub use repository::{
    CalibrationOutput, CurveBuildingRepository, HullWhiteBuildingRepository,
    InflationBuildingRepository, InflationIssuerBuildingRepository, IssuerBuildingRepository,
    MulticurveBuildingRepository,
};

use std::fmt;
use std::sync::Arc;

use crate::generator::CurveGenerator;
use crate::instruments::CalibrationInstrument;

/// One curve to calibrate: its name, generator and instruments.
///
/// After finalization the generator must take exactly one parameter per
/// instrument.
pub struct SingleCurveBundle<P> {
    name: String,
    generator: Arc<dyn CurveGenerator>,
    instruments: Vec<Arc<dyn CalibrationInstrument<P>>>,
    initial_guess: Option<Vec<f64>>,
}

impl<P> SingleCurveBundle<P> {
    /// Creates a bundle with no instruments.
    #[must_use]
    pub fn new(name: impl Into<String>, generator: Arc<dyn CurveGenerator>) -> Self {
        Self {
            name: name.into(),
            generator,
            instruments: Vec::new(),
            initial_guess: None,
        }
    }

    /// Adds an instrument.
    #[must_use]
    pub fn with_instrument<I>(mut self, instrument: I) -> Self
    where
        I: CalibrationInstrument<P> + 'static,
    {
        self.instruments.push(Arc::new(instrument));
        self
    }

    /// Adds shared instruments.
    #[must_use]
    pub fn with_instruments(
        mut self,
        instruments: impl IntoIterator<Item = Arc<dyn CalibrationInstrument<P>>>,
    ) -> Self {
        self.instruments.extend(instruments);
        self
    }

    /// Overrides the generator's starting point.
    #[must_use]
    pub fn with_initial_guess(mut self, guess: Vec<f64>) -> Self {
        self.initial_guess = Some(guess);
        self
    }

    /// Curve name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generator of the curve.
    #[must_use]
    pub fn generator(&self) -> &Arc<dyn CurveGenerator> {
        &self.generator
    }

    /// Instruments in node order.
    #[must_use]
    pub fn instruments(&self) -> &[Arc<dyn CalibrationInstrument<P>>] {
        &self.instruments
    }

    /// Explicit starting point, if any.
    #[must_use]
    pub fn initial_guess(&self) -> Option<&[f64]> {
        self.initial_guess.as_deref()
    }
}

impl<P> Clone for SingleCurveBundle<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            generator: Arc::clone(&self.generator),
            instruments: self.instruments.clone(),
            initial_guess: self.initial_guess.clone(),
        }
    }
}

impl<P> fmt::Debug for SingleCurveBundle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleCurveBundle")
            .field("name", &self.name)
            .field("generator", &self.generator)
            .field("instruments", &self.instruments.len())
            .field("initial_guess", &self.initial_guess)
            .finish()
    }
}

/// Curves calibrated simultaneously.
pub struct MultiCurveBundle<P> {
    curves: Vec<SingleCurveBundle<P>>,
}

impl<P> MultiCurveBundle<P> {
    /// Creates a unit from its curves, in parameter order.
    #[must_use]
    pub fn new(curves: Vec<SingleCurveBundle<P>>) -> Self {
        Self { curves }
    }

    /// A unit of one curve.
    #[must_use]
    pub fn single(curve: SingleCurveBundle<P>) -> Self {
        Self::new(vec![curve])
    }

    /// The curves.
    #[must_use]
    pub fn curves(&self) -> &[SingleCurveBundle<P>] {
        &self.curves
    }

    /// Curve names in parameter order.
    #[must_use]
    pub fn curve_names(&self) -> Vec<String> {
        self.curves.iter().map(|c| c.name.clone()).collect()
    }

    /// Total number of instruments.
    #[must_use]
    pub fn instrument_count(&self) -> usize {
        self.curves.iter().map(|c| c.instruments.len()).sum()
    }
}

impl<P> Clone for MultiCurveBundle<P> {
    fn clone(&self) -> Self {
        Self {
            curves: self.curves.clone(),
        }
    }
}

impl<P> fmt::Debug for MultiCurveBundle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.curves).finish()
    }
}
