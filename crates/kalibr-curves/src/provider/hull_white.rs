//! Hull-White one-factor model for futures convexity.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{CalibrationProvider, CurveRole, MulticurveAccess, MulticurveProvider};
use crate::curves::Curve;
use crate::error::{CurveError, CurveResult};
use crate::index::{Currency, IborIndex, OvernightIndex};

/// Hull-White one-factor parameters with piecewise-constant volatility.
///
/// `volatility[i]` applies on `[volatility_times[i-1], volatility_times[i])`,
/// with an implicit 0 before the first time and +∞ after the last, so there
/// is one more volatility than there are times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullWhiteOneFactorParameters {
    mean_reversion: f64,
    volatility: Vec<f64>,
    volatility_times: Vec<f64>,
}

impl HullWhiteOneFactorParameters {
    /// Creates the parameters.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if the mean reversion is not positive, a volatility is
    /// negative, the times are not strictly increasing and positive, or the
    /// lengths do not match.
    pub fn new(
        mean_reversion: f64,
        volatility: Vec<f64>,
        volatility_times: Vec<f64>,
    ) -> CurveResult<Self> {
        if !(mean_reversion.is_finite() && mean_reversion > 0.0) {
            return Err(CurveError::invalid_value(format!(
                "mean reversion must be positive, got {mean_reversion}"
            )));
        }
        if volatility.is_empty() || volatility.len() != volatility_times.len() + 1 {
            return Err(CurveError::invalid_value(format!(
                "expected {} volatilities for {} times, got {}",
                volatility_times.len() + 1,
                volatility_times.len(),
                volatility.len()
            )));
        }
        if let Some(sigma) = volatility.iter().find(|s| !(s.is_finite() && **s >= 0.0)) {
            return Err(CurveError::invalid_value(format!(
                "volatility must be non-negative, got {sigma}"
            )));
        }
        let mut previous = 0.0;
        for (i, &t) in volatility_times.iter().enumerate() {
            if !(t.is_finite() && t > previous) {
                return Err(CurveError::non_monotonic_tenors(i, previous, t));
            }
            previous = t;
        }
        Ok(Self {
            mean_reversion,
            volatility,
            volatility_times,
        })
    }

    /// Constant volatility.
    pub fn constant(mean_reversion: f64, volatility: f64) -> CurveResult<Self> {
        Self::new(mean_reversion, vec![volatility], Vec::new())
    }

    /// Mean reversion speed.
    #[must_use]
    pub fn mean_reversion(&self) -> f64 {
        self.mean_reversion
    }

    /// Volatility levels.
    #[must_use]
    pub fn volatility(&self) -> &[f64] {
        &self.volatility
    }

    /// Volatility change times.
    #[must_use]
    pub fn volatility_times(&self) -> &[f64] {
        &self.volatility_times
    }

    /// Futures convexity factor γ for a fixing at `t0` on the period
    /// `[t1, t2]`.
    ///
    /// The futures rate is (γ (1 + δ F) − 1) / δ for the forward F over a
    /// period of length δ. γ is 1 for fixings at or before today.
    #[must_use]
    pub fn futures_convexity_factor(&self, t0: f64, t1: f64, t2: f64) -> f64 {
        if t0 <= 0.0 {
            return 1.0;
        }
        let a = self.mean_reversion;
        let mut sum = 0.0;
        let mut s_lo = 0.0;
        for (i, sigma) in self.volatility.iter().enumerate() {
            let s_hi = self
                .volatility_times
                .get(i)
                .copied()
                .unwrap_or(f64::INFINITY)
                .min(t0);
            if s_hi > s_lo {
                sum += sigma
                    * sigma
                    * ((a * s_hi).exp() - (a * s_lo).exp())
                    * (2.0 - (-a * (t2 - s_hi)).exp() - (-a * (t2 - s_lo)).exp());
            }
            s_lo = s_hi;
            if s_lo >= t0 {
                break;
            }
        }
        let factor = ((-a * t1).exp() - (-a * t2).exp()) / (2.0 * a * a * a);
        (factor * sum).exp()
    }
}

/// Multicurve data with a Hull-White model for futures convexity in one
/// currency.
#[derive(Debug, Clone)]
pub struct HullWhiteProvider {
    multicurve: MulticurveProvider,
    parameters: HullWhiteOneFactorParameters,
    currency: Currency,
}

impl HullWhiteProvider {
    /// Creates a provider with no curves.
    #[must_use]
    pub fn new(parameters: HullWhiteOneFactorParameters, currency: Currency) -> Self {
        Self {
            multicurve: MulticurveProvider::new(),
            parameters,
            currency,
        }
    }

    /// Stores a curve for a role, builder style.
    pub fn with_curve(mut self, role: &CurveRole, curve: Arc<dyn Curve>) -> CurveResult<Self> {
        self.set_curve(role, curve)?;
        Ok(self)
    }

    /// The model parameters.
    #[must_use]
    pub fn parameters(&self) -> &HullWhiteOneFactorParameters {
        &self.parameters
    }

    /// Currency the model applies to.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }
}

impl CalibrationProvider for HullWhiteProvider {
    fn flavour(&self) -> &'static str {
        "HullWhite"
    }

    fn set_curve(&mut self, role: &CurveRole, curve: Arc<dyn Curve>) -> CurveResult<()> {
        self.multicurve.set_curve_as(self.flavour(), role, curve)
    }

    fn curve(&self, name: &str) -> Option<&Arc<dyn Curve>> {
        self.multicurve.curve(name)
    }

    fn curve_names(&self) -> Vec<String> {
        self.multicurve.curve_names()
    }
}

impl MulticurveAccess for HullWhiteProvider {
    fn discount_curve(&self, currency: Currency) -> CurveResult<&dyn Curve> {
        self.multicurve.discount_curve(currency)
    }

    fn ibor_curve(&self, index: &IborIndex) -> CurveResult<&dyn Curve> {
        self.multicurve.ibor_curve(index)
    }

    fn overnight_curve(&self, index: &OvernightIndex) -> CurveResult<&dyn Curve> {
        self.multicurve.overnight_curve(index)
    }

    fn futures_convexity_factor(&self, index: &IborIndex, t0: f64, t1: f64, t2: f64) -> f64 {
        if index.currency == self.currency {
            self.parameters.futures_convexity_factor(t0, t1, t2)
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn constant_vol_factor(a: f64, sigma: f64, t0: f64, t1: f64, t2: f64) -> f64 {
        let factor = ((-a * t1).exp() - (-a * t2).exp()) / (2.0 * a * a * a);
        let sum = sigma
            * sigma
            * ((a * t0).exp() - 1.0)
            * (2.0 - (-a * (t2 - t0)).exp() - (-a * t2).exp());
        (factor * sum).exp()
    }

    #[test]
    fn test_constant_volatility() {
        let params = HullWhiteOneFactorParameters::constant(0.03, 0.01).unwrap();
        let gamma = params.futures_convexity_factor(2.0, 2.0, 2.25);

        assert_relative_eq!(
            gamma,
            constant_vol_factor(0.03, 0.01, 2.0, 2.0, 2.25),
            epsilon = 1e-15
        );
        assert!(gamma > 1.0);
        assert_relative_eq!(params.futures_convexity_factor(0.0, 0.0, 0.25), 1.0);
    }

    #[test]
    fn test_piecewise_matches_constant_when_flat() {
        let flat = HullWhiteOneFactorParameters::constant(0.05, 0.012).unwrap();
        let piecewise =
            HullWhiteOneFactorParameters::new(0.05, vec![0.012; 3], vec![0.5, 1.5]).unwrap();

        for t0 in [0.25, 1.0, 3.0] {
            assert_relative_eq!(
                piecewise.futures_convexity_factor(t0, t0, t0 + 0.25),
                flat.futures_convexity_factor(t0, t0, t0 + 0.25),
                epsilon = 1e-14
            );
        }
    }

    #[test]
    fn test_convexity_grows_with_expiry_and_volatility() {
        let low = HullWhiteOneFactorParameters::constant(0.03, 0.005).unwrap();
        let high = HullWhiteOneFactorParameters::constant(0.03, 0.015).unwrap();

        assert!(
            high.futures_convexity_factor(2.0, 2.0, 2.25)
                > low.futures_convexity_factor(2.0, 2.0, 2.25)
        );
        assert!(
            low.futures_convexity_factor(5.0, 5.0, 5.25)
                > low.futures_convexity_factor(1.0, 1.0, 1.25)
        );
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(HullWhiteOneFactorParameters::constant(0.0, 0.01).is_err());
        assert!(HullWhiteOneFactorParameters::constant(0.03, -0.01).is_err());
        assert!(HullWhiteOneFactorParameters::new(0.03, vec![0.01], vec![1.0]).is_err());
        assert!(
            HullWhiteOneFactorParameters::new(0.03, vec![0.01; 3], vec![2.0, 1.0]).is_err()
        );
    }

    #[test]
    fn test_provider_convexity_by_currency() {
        let params = HullWhiteOneFactorParameters::constant(0.03, 0.01).unwrap();
        let provider = HullWhiteProvider::new(params.clone(), Currency::EUR);
        let euribor = IborIndex::new("EURIBOR", Currency::EUR, 3);
        let libor = IborIndex::new("LIBOR", Currency::USD, 3);

        assert_relative_eq!(
            provider.futures_convexity_factor(&euribor, 1.0, 1.0, 1.25),
            params.futures_convexity_factor(1.0, 1.0, 1.25)
        );
        assert_relative_eq!(provider.futures_convexity_factor(&libor, 1.0, 1.0, 1.25), 1.0);
        assert_eq!(provider.flavour(), "HullWhite");
    }
}
