//! Regular period schedules with a short front stub.

use crate::error::{CurveError, CurveResult};

/// Period boundaries closer than this are treated as equal.
pub(crate) const TIME_EPSILON: f64 = 1e-8;

/// One accrual period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccrualPeriod {
    /// Accrual start.
    pub start: f64,
    /// Accrual end, also the payment time.
    pub end: f64,
}

impl AccrualPeriod {
    /// Year fraction of the period.
    #[must_use]
    pub fn accrual(&self) -> f64 {
        self.end - self.start
    }
}

/// Periods generated backwards from the maturity in steps of `1 / frequency`
/// years.
///
/// If the start does not fall on the grid, the first period is a short
/// stub. A grid point within [`TIME_EPSILON`] of the start is the start.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    periods: Vec<AccrualPeriod>,
}

impl Schedule {
    /// Builds the schedule.
    ///
    /// # Errors
    ///
    /// `InvalidInstrument` if the maturity is not after the start or the
    /// frequency is zero.
    pub fn new(start: f64, maturity: f64, frequency: u32) -> CurveResult<Self> {
        if frequency == 0 {
            return Err(CurveError::invalid_instrument("payment frequency must be positive"));
        }
        if !(maturity - start > TIME_EPSILON) {
            return Err(CurveError::invalid_instrument(format!(
                "maturity {maturity} must be after start {start}"
            )));
        }
        let step = 1.0 / f64::from(frequency);

        let mut ends = vec![maturity];
        let mut k = 1.0;
        loop {
            let t = maturity - k * step;
            if t <= start + TIME_EPSILON {
                break;
            }
            ends.push(t);
            k += 1.0;
        }
        ends.reverse();

        let mut periods = Vec::with_capacity(ends.len());
        let mut previous = start;
        for end in ends {
            periods.push(AccrualPeriod {
                start: previous,
                end,
            });
            previous = end;
        }
        Ok(Self { periods })
    }

    /// The periods in time order.
    #[must_use]
    pub fn periods(&self) -> &[AccrualPeriod] {
        &self.periods
    }

    /// Payment times.
    pub fn payment_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.periods.iter().map(|p| p.end)
    }
}
