//! Inflation instruments.

use super::{add_discount_point, CalibrationInstrument, InstrumentType, Schedule};
use crate::curves::Curve;
use crate::error::{CurveError, CurveResult};
use crate::index::{LegalEntity, PriceIndex};
use crate::provider::{InflationAccess, IssuerAccess};
use crate::sensitivity::CurveSensitivity;

fn check_base_level(base_level: f64) -> CurveResult<()> {
    if base_level.is_finite() && base_level > 0.0 {
        Ok(())
    } else {
        Err(CurveError::invalid_instrument(format!(
            "base index level must be positive, got {base_level}"
        )))
    }
}

fn positive_level(curve: &dyn Curve, t: f64) -> CurveResult<f64> {
    let level = curve.value(t)?;
    if level > 0.0 {
        Ok(level)
    } else {
        Err(CurveError::invalid_value(format!(
            "{} level at {t} is {level}",
            curve.name()
        )))
    }
}

/// Zero-coupon inflation swap, quoted as the annual rate matching index
/// growth to maturity.
///
/// ```text
/// rate = (I(T) / I₀)^(1/T) − 1
/// ```
///
/// Both legs pay at maturity, so discounting cancels.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroCouponInflationSwap {
    index: PriceIndex,
    maturity: f64,
    rate: f64,
    base_level: f64,
}

impl ZeroCouponInflationSwap {
    /// Creates the swap with the index level fixed today at `base_level`.
    pub fn new(index: PriceIndex, maturity: f64, rate: f64, base_level: f64) -> CurveResult<Self> {
        check_base_level(base_level)?;
        if !(maturity > 0.0) {
            return Err(CurveError::invalid_instrument(format!(
                "swap maturity must be positive, got {maturity}"
            )));
        }
        Ok(Self {
            index,
            maturity,
            rate,
            base_level,
        })
    }
}

impl<P: InflationAccess> CalibrationInstrument<P> for ZeroCouponInflationSwap {
    fn node_time(&self) -> f64 {
        self.maturity
    }

    fn quote(&self) -> f64 {
        self.rate
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::InflationSwap
    }

    fn model_quote(&self, provider: &P) -> CurveResult<f64> {
        let curve = provider.price_index_curve(&self.index)?;
        let level = positive_level(curve, self.maturity)?;
        Ok((level / self.base_level).powf(1.0 / self.maturity) - 1.0)
    }

    fn par_spread_sensitivity(&self, provider: &P) -> CurveResult<CurveSensitivity> {
        let curve = provider.price_index_curve(&self.index)?;
        let level = positive_level(curve, self.maturity)?;
        let growth = (level / self.base_level).powf(1.0 / self.maturity);
        Ok(CurveSensitivity::of(
            curve.name(),
            self.maturity,
            growth / (self.maturity * level),
        ))
    }
}

/// Inflation-indexed bond, quoted as the price per unit notional of its
/// remaining cash flows.
///
/// Coupons and principal are scaled by the index ratio and discounted on
/// the issuer curve in the index currency:
///
/// ```text
/// price = Σ c α_k (I(t_k)/I₀) DF(t_k) + (I(T)/I₀) DF(T)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InflationIndexedBond {
    issuer: LegalEntity,
    index: PriceIndex,
    maturity: f64,
    real_coupon: f64,
    base_level: f64,
    price: f64,
    schedule: Schedule,
}

impl InflationIndexedBond {
    /// Creates a bond paying `real_coupon` `frequency` times a year.
    pub fn new(
        issuer: LegalEntity,
        index: PriceIndex,
        maturity: f64,
        real_coupon: f64,
        frequency: u32,
        base_level: f64,
        price: f64,
    ) -> CurveResult<Self> {
        check_base_level(base_level)?;
        let schedule = Schedule::new(0.0, maturity, frequency)?;
        Ok(Self {
            issuer,
            index,
            maturity,
            real_coupon,
            base_level,
            price,
            schedule,
        })
    }

    /// Payment times with their real amounts per unit notional.
    fn cash_flows(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.schedule
            .periods()
            .iter()
            .map(|p| (p.end, self.real_coupon * p.accrual()))
            .chain(std::iter::once((self.maturity, 1.0)))
    }
}

impl<P: InflationAccess + IssuerAccess> CalibrationInstrument<P> for InflationIndexedBond {
    fn node_time(&self) -> f64 {
        self.maturity
    }

    fn quote(&self) -> f64 {
        self.price
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::InflationBond
    }

    fn model_quote(&self, provider: &P) -> CurveResult<f64> {
        let index_curve = provider.price_index_curve(&self.index)?;
        let discount = provider.issuer_curve(&self.issuer, self.index.currency)?;
        self.cash_flows().try_fold(0.0, |price, (t, amount)| {
            let ratio = index_curve.value(t)? / self.base_level;
            Ok(price + amount * ratio * discount.discount_factor(t)?)
        })
    }

    fn par_spread_sensitivity(&self, provider: &P) -> CurveResult<CurveSensitivity> {
        let index_curve = provider.price_index_curve(&self.index)?;
        let discount = provider.issuer_curve(&self.issuer, self.index.currency)?;
        let mut sensitivity = CurveSensitivity::new();
        for (t, amount) in self.cash_flows() {
            let level = index_curve.value(t)?;
            let df = discount.discount_factor(t)?;
            sensitivity.add_point(index_curve.name(), t, amount * df / self.base_level);
            add_discount_point(
                &mut sensitivity,
                discount,
                t,
                df,
                amount * level / self.base_level,
            );
        }
        Ok(sensitivity)
    }
}
