//! Calibration instruments.
//!
//! Each instrument prices its own quote from a provider and reports the
//! analytic sensitivity of that price to the curves' native values. The
//! repository drives the par spread (model quote − market quote) of every
//! instrument in a unit to zero.
//!
//! # Available Instruments
//!
//! ## Money Market
//! - [`Deposit`]: Simple rate on the discounting curve
//! - [`Fra`]: Forward rate on an Ibor curve, including the Ibor fixing
//! - [`RateFuture`]: Futures price with model convexity
//!
//! ## Swaps
//! - [`FixedIborSwap`], [`FixedOvernightSwap`]: Par rates
//! - [`IborBasisSwap`]: Spread between two term indices
//!
//! ## Bonds
//! - [`Bill`]: Money market yield on an issuer curve
//! - [`FixedCouponBond`]: Price on an issuer curve
//!
//! ## Inflation
//! - [`ZeroCouponInflationSwap`]: Par rate on a price index
//! - [`InflationIndexedBond`]: Price on an issuer curve and a price index
//!
//! All instruments start today (t = 0) unless stated otherwise, and times are
//! year fractions.

mod bonds;
mod inflation;
mod rates;
mod schedule;

pub use bonds::{Bill, FixedCouponBond};
pub use inflation::{InflationIndexedBond, ZeroCouponInflationSwap};
pub use rates::{Deposit, FixedIborSwap, FixedOvernightSwap, Fra, IborBasisSwap, RateFuture};
pub use schedule::{AccrualPeriod, Schedule};

use std::fmt;

use crate::curves::Curve;
use crate::error::CurveResult;
use crate::sensitivity::CurveSensitivity;

/// Instrument type for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstrumentType {
    /// Money market deposit
    Deposit,
    /// Forward Rate Agreement
    Fra,
    /// Interest rate future
    Future,
    /// Fixed vs Ibor swap
    IborSwap,
    /// Fixed vs overnight swap
    OvernightSwap,
    /// Ibor vs Ibor basis swap
    BasisSwap,
    /// Discount bill
    Bill,
    /// Fixed coupon bond
    Bond,
    /// Zero-coupon inflation swap
    InflationSwap,
    /// Inflation-indexed bond
    InflationBond,
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => write!(f, "Deposit"),
            Self::Fra => write!(f, "FRA"),
            Self::Future => write!(f, "Future"),
            Self::IborSwap => write!(f, "IRS"),
            Self::OvernightSwap => write!(f, "OIS"),
            Self::BasisSwap => write!(f, "BasisSwap"),
            Self::Bill => write!(f, "Bill"),
            Self::Bond => write!(f, "Bond"),
            Self::InflationSwap => write!(f, "ZCIS"),
            Self::InflationBond => write!(f, "Linker"),
        }
    }
}

/// An instrument a curve can be calibrated to, priced from a provider `P`.
///
/// `par_spread` is the root-finding residual and vanishes when the curves
/// reprice the quote. `par_spread_sensitivity` is its derivative with
/// respect to curve native values (zero rates for yield curves, index levels
/// for price index curves).
pub trait CalibrationInstrument<P>: Send + Sync + fmt::Debug {
    /// Time of the curve node the instrument pins down.
    fn node_time(&self) -> f64;

    /// Market quote.
    fn quote(&self) -> f64;

    /// Instrument type.
    fn instrument_type(&self) -> InstrumentType;

    /// Quote implied by the provider's curves.
    fn model_quote(&self, provider: &P) -> CurveResult<f64>;

    /// Model quote − market quote.
    fn par_spread(&self, provider: &P) -> CurveResult<f64> {
        Ok(self.model_quote(provider)? - self.quote())
    }

    /// Sensitivity of the par spread to curve native values.
    fn par_spread_sensitivity(&self, provider: &P) -> CurveResult<CurveSensitivity>;

    /// Short description for reports.
    fn description(&self) -> String {
        format!(
            "{} {:.2}Y @ {:.6}",
            self.instrument_type(),
            self.node_time(),
            self.quote()
        )
    }
}

/// Records `weight · ∂DF(t)/∂r(t)` on a yield curve, with `df` = DF(t).
pub(crate) fn add_discount_point(
    sensitivity: &mut CurveSensitivity,
    curve: &dyn Curve,
    t: f64,
    df: f64,
    weight: f64,
) {
    if t > 0.0 && weight != 0.0 {
        sensitivity.add_point(curve.name(), t, -t * df * weight);
    }
}

/// Σ α DF(end) over the periods.
pub(crate) fn annuity(discount: &dyn Curve, periods: &[AccrualPeriod]) -> CurveResult<f64> {
    periods.iter().try_fold(0.0, |sum, p| {
        Ok(sum + p.accrual() * discount.discount_factor(p.end)?)
    })
}

pub(crate) fn add_annuity_sensitivity(
    sensitivity: &mut CurveSensitivity,
    discount: &dyn Curve,
    periods: &[AccrualPeriod],
    weight: f64,
) -> CurveResult<()> {
    for p in periods {
        let df = discount.discount_factor(p.end)?;
        add_discount_point(sensitivity, discount, p.end, df, weight * p.accrual());
    }
    Ok(())
}

/// Σ α F DF(end) with F the simple forward of the projection curve.
pub(crate) fn floating_leg(
    projection: &dyn Curve,
    discount: &dyn Curve,
    periods: &[AccrualPeriod],
) -> CurveResult<f64> {
    periods.iter().try_fold(0.0, |sum, p| {
        let growth = projection.discount_factor(p.start)? / projection.discount_factor(p.end)?;
        Ok(sum + (growth - 1.0) * discount.discount_factor(p.end)?)
    })
}

pub(crate) fn add_floating_leg_sensitivity(
    sensitivity: &mut CurveSensitivity,
    projection: &dyn Curve,
    discount: &dyn Curve,
    periods: &[AccrualPeriod],
    weight: f64,
) -> CurveResult<()> {
    for p in periods {
        let p_start = projection.discount_factor(p.start)?;
        let p_end = projection.discount_factor(p.end)?;
        let d_end = discount.discount_factor(p.end)?;

        add_discount_point(sensitivity, discount, p.end, d_end, weight * (p_start / p_end - 1.0));
        add_discount_point(sensitivity, projection, p.start, p_start, weight * d_end / p_end);
        add_discount_point(
            sensitivity,
            projection,
            p.end,
            p_end,
            -weight * d_end * p_start / (p_end * p_end),
        );
    }
    Ok(())
}
