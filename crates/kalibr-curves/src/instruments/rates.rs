//! Money market instruments and swaps.

use super::{
    add_annuity_sensitivity, add_discount_point, add_floating_leg_sensitivity, annuity,
    floating_leg, CalibrationInstrument, InstrumentType, Schedule,
};
use crate::curves::Curve;
use crate::error::{CurveError, CurveResult};
use crate::index::{Currency, IborIndex, OvernightIndex};
use crate::provider::MulticurveAccess;
use crate::sensitivity::CurveSensitivity;

use super::schedule::TIME_EPSILON;

fn check_period(start: f64, end: f64) -> CurveResult<()> {
    if start >= 0.0 && end - start > TIME_EPSILON {
        Ok(())
    } else {
        Err(CurveError::invalid_instrument(format!(
            "period [{start}, {end}] must start at or after today and have positive length"
        )))
    }
}

/// Simple forward (DF(s)/DF(e) − 1)/τ.
fn simple_forward(curve: &dyn Curve, start: f64, end: f64) -> CurveResult<f64> {
    let df_start = curve.discount_factor(start)?;
    let df_end = curve.discount_factor(end)?;
    Ok((df_start / df_end - 1.0) / (end - start))
}

fn add_simple_forward_sensitivity(
    sensitivity: &mut CurveSensitivity,
    curve: &dyn Curve,
    start: f64,
    end: f64,
    weight: f64,
) -> CurveResult<()> {
    let tau = end - start;
    let df_start = curve.discount_factor(start)?;
    let df_end = curve.discount_factor(end)?;
    add_discount_point(sensitivity, curve, start, df_start, weight / (tau * df_end));
    add_discount_point(
        sensitivity,
        curve,
        end,
        df_end,
        -weight * df_start / (tau * df_end * df_end),
    );
    Ok(())
}

/// A money market deposit, quoted as a simple rate on the discounting curve.
///
/// ```text
/// rate = (DF(start) / DF(end) − 1) / (end − start)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Deposit {
    currency: Currency,
    start: f64,
    end: f64,
    rate: f64,
}

impl Deposit {
    /// Creates a deposit over `[start, end]`.
    pub fn new(currency: Currency, start: f64, end: f64, rate: f64) -> CurveResult<Self> {
        check_period(start, end)?;
        Ok(Self {
            currency,
            start,
            end,
            rate,
        })
    }

    /// Currency of the deposit.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }
}

impl<P: MulticurveAccess> CalibrationInstrument<P> for Deposit {
    fn node_time(&self) -> f64 {
        self.end
    }

    fn quote(&self) -> f64 {
        self.rate
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Deposit
    }

    fn model_quote(&self, provider: &P) -> CurveResult<f64> {
        simple_forward(provider.discount_curve(self.currency)?, self.start, self.end)
    }

    fn par_spread_sensitivity(&self, provider: &P) -> CurveResult<CurveSensitivity> {
        let mut sensitivity = CurveSensitivity::new();
        let curve = provider.discount_curve(self.currency)?;
        add_simple_forward_sensitivity(&mut sensitivity, curve, self.start, self.end, 1.0)?;
        Ok(sensitivity)
    }
}

/// A forward rate agreement on a term index, quoted as the forward rate of
/// the index's curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Fra {
    index: IborIndex,
    start: f64,
    end: f64,
    rate: f64,
}

impl Fra {
    /// Creates a FRA over `[start, end]`.
    pub fn new(index: IborIndex, start: f64, end: f64, rate: f64) -> CurveResult<Self> {
        check_period(start, end)?;
        Ok(Self {
            index,
            start,
            end,
            rate,
        })
    }

    /// The index fixing today, over one index tenor.
    pub fn ibor_fixing(index: IborIndex, rate: f64) -> CurveResult<Self> {
        let end = index.tenor_years();
        Self::new(index, 0.0, end, rate)
    }

    /// The index.
    #[must_use]
    pub fn index(&self) -> &IborIndex {
        &self.index
    }
}

impl<P: MulticurveAccess> CalibrationInstrument<P> for Fra {
    fn node_time(&self) -> f64 {
        self.end
    }

    fn quote(&self) -> f64 {
        self.rate
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Fra
    }

    fn model_quote(&self, provider: &P) -> CurveResult<f64> {
        simple_forward(provider.ibor_curve(&self.index)?, self.start, self.end)
    }

    fn par_spread_sensitivity(&self, provider: &P) -> CurveResult<CurveSensitivity> {
        let mut sensitivity = CurveSensitivity::new();
        let curve = provider.ibor_curve(&self.index)?;
        add_simple_forward_sensitivity(&mut sensitivity, curve, self.start, self.end, 1.0)?;
        Ok(sensitivity)
    }
}

/// A futures contract on a term index, quoted as a price (1 − rate).
///
/// The futures rate is the forward adjusted by the provider's convexity
/// factor γ: (γ (1 + δ F) − 1) / δ.
#[derive(Debug, Clone, PartialEq)]
pub struct RateFuture {
    index: IborIndex,
    fixing: f64,
    price: f64,
}

impl RateFuture {
    /// Creates a future fixing at `fixing`, on the period of one index tenor.
    pub fn new(index: IborIndex, fixing: f64, price: f64) -> CurveResult<Self> {
        check_period(fixing, fixing + index.tenor_years())?;
        Ok(Self {
            index,
            fixing,
            price,
        })
    }

    fn period_end(&self) -> f64 {
        self.fixing + self.index.tenor_years()
    }

    fn convexity<P: MulticurveAccess>(&self, provider: &P) -> f64 {
        provider.futures_convexity_factor(
            &self.index,
            self.fixing,
            self.fixing,
            self.period_end(),
        )
    }
}

impl<P: MulticurveAccess> CalibrationInstrument<P> for RateFuture {
    fn node_time(&self) -> f64 {
        self.period_end()
    }

    fn quote(&self) -> f64 {
        self.price
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Future
    }

    fn model_quote(&self, provider: &P) -> CurveResult<f64> {
        let delta = self.index.tenor_years();
        let forward = simple_forward(provider.ibor_curve(&self.index)?, self.fixing, self.period_end())?;
        let gamma = self.convexity(provider);
        Ok(1.0 - (gamma * (1.0 + delta * forward) - 1.0) / delta)
    }

    fn par_spread_sensitivity(&self, provider: &P) -> CurveResult<CurveSensitivity> {
        let mut sensitivity = CurveSensitivity::new();
        let curve = provider.ibor_curve(&self.index)?;
        let gamma = self.convexity(provider);
        add_simple_forward_sensitivity(
            &mut sensitivity,
            curve,
            self.fixing,
            self.period_end(),
            -gamma,
        )?;
        Ok(sensitivity)
    }
}

/// Fixed vs term index swap starting today, quoted as the par rate.
///
/// The fixed leg pays `fixed_frequency` times a year, the floating leg at
/// the index tenor. Both legs are discounted on the index currency's
/// discounting curve.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedIborSwap {
    index: IborIndex,
    maturity: f64,
    rate: f64,
    fixed: Schedule,
    floating: Schedule,
}

impl FixedIborSwap {
    /// Creates the swap.
    pub fn new(
        index: IborIndex,
        maturity: f64,
        fixed_frequency: u32,
        rate: f64,
    ) -> CurveResult<Self> {
        let fixed = Schedule::new(0.0, maturity, fixed_frequency)?;
        let floating = Schedule::new(0.0, maturity, index.periods_per_year())?;
        Ok(Self {
            index,
            maturity,
            rate,
            fixed,
            floating,
        })
    }
}

impl<P: MulticurveAccess> CalibrationInstrument<P> for FixedIborSwap {
    fn node_time(&self) -> f64 {
        self.maturity
    }

    fn quote(&self) -> f64 {
        self.rate
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::IborSwap
    }

    fn model_quote(&self, provider: &P) -> CurveResult<f64> {
        let discount = provider.discount_curve(self.index.currency)?;
        let projection = provider.ibor_curve(&self.index)?;
        let floating = floating_leg(projection, discount, self.floating.periods())?;
        Ok(floating / annuity(discount, self.fixed.periods())?)
    }

    fn par_spread_sensitivity(&self, provider: &P) -> CurveResult<CurveSensitivity> {
        let discount = provider.discount_curve(self.index.currency)?;
        let projection = provider.ibor_curve(&self.index)?;
        let floating = floating_leg(projection, discount, self.floating.periods())?;
        let annuity = annuity(discount, self.fixed.periods())?;

        let mut sensitivity = CurveSensitivity::new();
        add_floating_leg_sensitivity(
            &mut sensitivity,
            projection,
            discount,
            self.floating.periods(),
            1.0 / annuity,
        )?;
        add_annuity_sensitivity(
            &mut sensitivity,
            discount,
            self.fixed.periods(),
            -floating / (annuity * annuity),
        )?;
        Ok(sensitivity)
    }
}

/// Fixed vs compounded overnight swap starting today, quoted as the par
/// rate. Both legs share the fixed schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedOvernightSwap {
    index: OvernightIndex,
    maturity: f64,
    rate: f64,
    schedule: Schedule,
}

impl FixedOvernightSwap {
    /// Creates the swap.
    pub fn new(
        index: OvernightIndex,
        maturity: f64,
        frequency: u32,
        rate: f64,
    ) -> CurveResult<Self> {
        let schedule = Schedule::new(0.0, maturity, frequency)?;
        Ok(Self {
            index,
            maturity,
            rate,
            schedule,
        })
    }
}

impl<P: MulticurveAccess> CalibrationInstrument<P> for FixedOvernightSwap {
    fn node_time(&self) -> f64 {
        self.maturity
    }

    fn quote(&self) -> f64 {
        self.rate
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::OvernightSwap
    }

    fn model_quote(&self, provider: &P) -> CurveResult<f64> {
        let discount = provider.discount_curve(self.index.currency)?;
        let projection = provider.overnight_curve(&self.index)?;
        let periods = self.schedule.periods();
        Ok(floating_leg(projection, discount, periods)? / annuity(discount, periods)?)
    }

    fn par_spread_sensitivity(&self, provider: &P) -> CurveResult<CurveSensitivity> {
        let discount = provider.discount_curve(self.index.currency)?;
        let projection = provider.overnight_curve(&self.index)?;
        let periods = self.schedule.periods();
        let floating = floating_leg(projection, discount, periods)?;
        let annuity = annuity(discount, periods)?;

        let mut sensitivity = CurveSensitivity::new();
        add_floating_leg_sensitivity(&mut sensitivity, projection, discount, periods, 1.0 / annuity)?;
        add_annuity_sensitivity(
            &mut sensitivity,
            discount,
            periods,
            -floating / (annuity * annuity),
        )?;
        Ok(sensitivity)
    }
}

/// Term index vs term index swap starting today, quoted as the spread on the
/// first leg that equates both legs.
///
/// ```text
/// spread = (FL(second) − FL(first)) / A(first)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IborBasisSwap {
    first: IborIndex,
    second: IborIndex,
    maturity: f64,
    spread: f64,
    first_schedule: Schedule,
    second_schedule: Schedule,
}

impl IborBasisSwap {
    /// Creates the swap. Both indices must share a currency.
    pub fn new(
        first: IborIndex,
        second: IborIndex,
        maturity: f64,
        spread: f64,
    ) -> CurveResult<Self> {
        if first.currency != second.currency {
            return Err(CurveError::invalid_instrument(format!(
                "basis swap legs {first} and {second} are in different currencies"
            )));
        }
        let first_schedule = Schedule::new(0.0, maturity, first.periods_per_year())?;
        let second_schedule = Schedule::new(0.0, maturity, second.periods_per_year())?;
        Ok(Self {
            first,
            second,
            maturity,
            spread,
            first_schedule,
            second_schedule,
        })
    }
}

impl<P: MulticurveAccess> CalibrationInstrument<P> for IborBasisSwap {
    fn node_time(&self) -> f64 {
        self.maturity
    }

    fn quote(&self) -> f64 {
        self.spread
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::BasisSwap
    }

    fn model_quote(&self, provider: &P) -> CurveResult<f64> {
        let discount = provider.discount_curve(self.first.currency)?;
        let first = floating_leg(
            provider.ibor_curve(&self.first)?,
            discount,
            self.first_schedule.periods(),
        )?;
        let second = floating_leg(
            provider.ibor_curve(&self.second)?,
            discount,
            self.second_schedule.periods(),
        )?;
        Ok((second - first) / annuity(discount, self.first_schedule.periods())?)
    }

    fn par_spread_sensitivity(&self, provider: &P) -> CurveResult<CurveSensitivity> {
        let discount = provider.discount_curve(self.first.currency)?;
        let first_curve = provider.ibor_curve(&self.first)?;
        let second_curve = provider.ibor_curve(&self.second)?;
        let first = floating_leg(first_curve, discount, self.first_schedule.periods())?;
        let second = floating_leg(second_curve, discount, self.second_schedule.periods())?;
        let annuity = annuity(discount, self.first_schedule.periods())?;

        let mut sensitivity = CurveSensitivity::new();
        add_floating_leg_sensitivity(
            &mut sensitivity,
            second_curve,
            discount,
            self.second_schedule.periods(),
            1.0 / annuity,
        )?;
        add_floating_leg_sensitivity(
            &mut sensitivity,
            first_curve,
            discount,
            self.first_schedule.periods(),
            -1.0 / annuity,
        )?;
        add_annuity_sensitivity(
            &mut sensitivity,
            discount,
            self.first_schedule.periods(),
            -(second - first) / (annuity * annuity),
        )?;
        Ok(sensitivity)
    }
}
