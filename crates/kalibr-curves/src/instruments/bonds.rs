//! Issuer instruments.

use super::{
    add_annuity_sensitivity, add_discount_point, annuity, CalibrationInstrument, InstrumentType,
    Schedule,
};
use crate::error::{CurveError, CurveResult};
use crate::index::{Currency, LegalEntity};
use crate::provider::IssuerAccess;
use crate::sensitivity::CurveSensitivity;

/// A discount bill, quoted as a simple money market yield.
///
/// ```text
/// yield = (1 / DF(T) − 1) / T
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    issuer: LegalEntity,
    currency: Currency,
    maturity: f64,
    yield_quote: f64,
}

impl Bill {
    /// Creates a bill maturing at `maturity`.
    pub fn new(
        issuer: LegalEntity,
        currency: Currency,
        maturity: f64,
        yield_quote: f64,
    ) -> CurveResult<Self> {
        if !(maturity > 0.0) {
            return Err(CurveError::invalid_instrument(format!(
                "bill maturity must be positive, got {maturity}"
            )));
        }
        Ok(Self {
            issuer,
            currency,
            maturity,
            yield_quote,
        })
    }
}

impl<P: IssuerAccess> CalibrationInstrument<P> for Bill {
    fn node_time(&self) -> f64 {
        self.maturity
    }

    fn quote(&self) -> f64 {
        self.yield_quote
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Bill
    }

    fn model_quote(&self, provider: &P) -> CurveResult<f64> {
        let df = provider
            .issuer_curve(&self.issuer, self.currency)?
            .discount_factor(self.maturity)?;
        Ok((1.0 / df - 1.0) / self.maturity)
    }

    fn par_spread_sensitivity(&self, provider: &P) -> CurveResult<CurveSensitivity> {
        let curve = provider.issuer_curve(&self.issuer, self.currency)?;
        let df = curve.discount_factor(self.maturity)?;
        let mut sensitivity = CurveSensitivity::new();
        add_discount_point(
            &mut sensitivity,
            curve,
            self.maturity,
            df,
            -1.0 / (df * df * self.maturity),
        );
        Ok(sensitivity)
    }
}

/// A fixed coupon bond, quoted as the price per unit notional of its
/// remaining cash flows on the issuer curve.
///
/// Coupons accrue from today; a first period shorter than the coupon
/// period pays a proportionally smaller coupon.
///
/// ```text
/// price = Σ c α_k DF(t_k) + DF(T)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FixedCouponBond {
    issuer: LegalEntity,
    currency: Currency,
    maturity: f64,
    coupon: f64,
    price: f64,
    schedule: Schedule,
}

impl FixedCouponBond {
    /// Creates a bond paying `coupon` `frequency` times a year.
    pub fn new(
        issuer: LegalEntity,
        currency: Currency,
        maturity: f64,
        coupon: f64,
        frequency: u32,
        price: f64,
    ) -> CurveResult<Self> {
        let schedule = Schedule::new(0.0, maturity, frequency)?;
        Ok(Self {
            issuer,
            currency,
            maturity,
            coupon,
            price,
            schedule,
        })
    }

    /// Annual coupon rate.
    #[must_use]
    pub fn coupon(&self) -> f64 {
        self.coupon
    }
}

impl<P: IssuerAccess> CalibrationInstrument<P> for FixedCouponBond {
    fn node_time(&self) -> f64 {
        self.maturity
    }

    fn quote(&self) -> f64 {
        self.price
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Bond
    }

    fn model_quote(&self, provider: &P) -> CurveResult<f64> {
        let curve = provider.issuer_curve(&self.issuer, self.currency)?;
        Ok(self.coupon * annuity(curve, self.schedule.periods())?
            + curve.discount_factor(self.maturity)?)
    }

    fn par_spread_sensitivity(&self, provider: &P) -> CurveResult<CurveSensitivity> {
        let curve = provider.issuer_curve(&self.issuer, self.currency)?;
        let mut sensitivity = CurveSensitivity::new();
        add_annuity_sensitivity(&mut sensitivity, curve, self.schedule.periods(), self.coupon)?;
        let df = curve.discount_factor(self.maturity)?;
        add_discount_point(&mut sensitivity, curve, self.maturity, df, 1.0);
        Ok(sensitivity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{Curve, CurveKind};
    use crate::instruments::test_support::{check_node_sensitivity, node_curve};
    use crate::provider::{CurveRole, IssuerProvider};
    use approx::assert_relative_eq;

    const TIMES: [f64; 3] = [0.5, 2.0, 10.0];
    const RATES: [f64; 3] = [0.040, 0.042, 0.045];

    fn ust() -> LegalEntity {
        LegalEntity::new("UST")
    }

    fn ust_provider(rates: &[f64]) -> IssuerProvider {
        IssuerProvider::new()
            .with_curve(
                &CurveRole::Issuer(ust(), Currency::USD),
                node_curve("UST", CurveKind::Yield, &TIMES, rates),
            )
            .unwrap()
    }

    #[test]
    fn test_bill() {
        let bill = Bill::new(ust(), Currency::USD, 0.5, 0.04).unwrap();
        let provider = ust_provider(&RATES);
        let df = (-0.04f64 * 0.5).exp();

        assert_relative_eq!(
            bill.model_quote(&provider).unwrap(),
            (1.0 / df - 1.0) / 0.5,
            epsilon = 1e-14
        );
        let point = bill.par_spread_sensitivity(&provider).unwrap();
        assert_relative_eq!(point.points("UST")[0].1, 1.0 / df, epsilon = 1e-12);
        check_node_sensitivity(&bill, &provider, "UST", &RATES, |v| ust_provider(v), 1e-6);
        assert!(Bill::new(ust(), Currency::USD, 0.0, 0.04).is_err());
    }

    #[test]
    fn test_bond_price() {
        let bond = FixedCouponBond::new(ust(), Currency::USD, 1.5, 0.05, 2, 1.0).unwrap();
        let provider = ust_provider(&RATES);
        let curve = provider.issuer_curve(&ust(), Currency::USD).unwrap();
        let expected = 0.025
            * (curve.discount_factor(0.5).unwrap()
                + curve.discount_factor(1.0).unwrap()
                + curve.discount_factor(1.5).unwrap())
            + curve.discount_factor(1.5).unwrap();

        assert_relative_eq!(bond.model_quote(&provider).unwrap(), expected, epsilon = 1e-14);
        check_node_sensitivity(&bond, &provider, "UST", &RATES, |v| ust_provider(v), 1e-6);
    }

    #[test]
    fn test_bond_front_stub() {
        let bond = FixedCouponBond::new(ust(), Currency::USD, 1.25, 0.04, 2, 1.0).unwrap();
        let provider = ust_provider(&RATES);
        let curve = provider.issuer_curve(&ust(), Currency::USD).unwrap();
        let expected = 0.04
            * (0.25 * curve.discount_factor(0.25).unwrap()
                + 0.5 * curve.discount_factor(0.75).unwrap()
                + 0.5 * curve.discount_factor(1.25).unwrap())
            + curve.discount_factor(1.25).unwrap();

        assert_relative_eq!(bond.model_quote(&provider).unwrap(), expected, epsilon = 1e-14);
        check_node_sensitivity(&bond, &provider, "UST", &RATES, |v| ust_provider(v), 1e-6);
    }
}
