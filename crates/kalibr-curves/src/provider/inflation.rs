//! Providers with price index curves.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    CalibrationProvider, CurveRole, InflationAccess, IssuerAccess, IssuerProvider,
    MulticurveAccess, MulticurveProvider,
};
use crate::curves::{require_kind, Curve, CurveKind};
use crate::error::{CurveError, CurveResult};
use crate::index::{Currency, IborIndex, LegalEntity, OvernightIndex, PriceIndex};

/// Price index curves keyed by index, with their names.
#[derive(Debug, Clone, Default)]
struct PriceIndexCurves {
    by_index: BTreeMap<PriceIndex, Arc<dyn Curve>>,
    by_name: BTreeMap<String, Arc<dyn Curve>>,
}

impl PriceIndexCurves {
    fn set(&mut self, index: &PriceIndex, curve: Arc<dyn Curve>) -> CurveResult<()> {
        require_kind(curve.name(), curve.kind(), CurveKind::PriceIndex)?;
        self.by_index.insert(index.clone(), Arc::clone(&curve));
        self.by_name.insert(curve.name().to_string(), curve);
        Ok(())
    }

    fn get(&self, index: &PriceIndex) -> CurveResult<&dyn Curve> {
        self.by_index
            .get(index)
            .map(AsRef::as_ref)
            .ok_or_else(|| CurveError::curve_not_found(format!("price index {index}")))
    }
}

fn merge_names(mut names: Vec<String>, extra: &BTreeMap<String, Arc<dyn Curve>>) -> Vec<String> {
    names.extend(extra.keys().cloned());
    names.sort();
    names.dedup();
    names
}

/// Multicurve data plus price index curves.
#[derive(Debug, Clone, Default)]
pub struct InflationProvider {
    multicurve: MulticurveProvider,
    price_indices: PriceIndexCurves,
}

impl InflationProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps existing multicurve data.
    #[must_use]
    pub fn from_multicurve(multicurve: MulticurveProvider) -> Self {
        Self {
            multicurve,
            ..Self::default()
        }
    }

    /// Stores a curve for a role, builder style.
    pub fn with_curve(mut self, role: &CurveRole, curve: Arc<dyn Curve>) -> CurveResult<Self> {
        self.set_curve(role, curve)?;
        Ok(self)
    }
}

impl CalibrationProvider for InflationProvider {
    fn flavour(&self) -> &'static str {
        "Inflation"
    }

    fn set_curve(&mut self, role: &CurveRole, curve: Arc<dyn Curve>) -> CurveResult<()> {
        match role {
            CurveRole::PriceIndex(index) => self.price_indices.set(index, curve),
            _ => self.multicurve.set_curve_as(self.flavour(), role, curve),
        }
    }

    fn curve(&self, name: &str) -> Option<&Arc<dyn Curve>> {
        self.price_indices
            .by_name
            .get(name)
            .or_else(|| self.multicurve.curve(name))
    }

    fn curve_names(&self) -> Vec<String> {
        merge_names(self.multicurve.curve_names(), &self.price_indices.by_name)
    }
}

impl MulticurveAccess for InflationProvider {
    fn discount_curve(&self, currency: Currency) -> CurveResult<&dyn Curve> {
        self.multicurve.discount_curve(currency)
    }

    fn ibor_curve(&self, index: &IborIndex) -> CurveResult<&dyn Curve> {
        self.multicurve.ibor_curve(index)
    }

    fn overnight_curve(&self, index: &OvernightIndex) -> CurveResult<&dyn Curve> {
        self.multicurve.overnight_curve(index)
    }
}

impl InflationAccess for InflationProvider {
    fn price_index_curve(&self, index: &PriceIndex) -> CurveResult<&dyn Curve> {
        self.price_indices.get(index)
    }
}

/// Issuer data plus price index curves, for inflation-linked bonds.
#[derive(Debug, Clone, Default)]
pub struct InflationIssuerProvider {
    issuer: IssuerProvider,
    price_indices: PriceIndexCurves,
}

impl InflationIssuerProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps existing issuer data.
    #[must_use]
    pub fn from_issuer(issuer: IssuerProvider) -> Self {
        Self {
            issuer,
            ..Self::default()
        }
    }

    /// Stores a curve for a role, builder style.
    pub fn with_curve(mut self, role: &CurveRole, curve: Arc<dyn Curve>) -> CurveResult<Self> {
        self.set_curve(role, curve)?;
        Ok(self)
    }
}

impl CalibrationProvider for InflationIssuerProvider {
    fn flavour(&self) -> &'static str {
        "InflationIssuer"
    }

    fn set_curve(&mut self, role: &CurveRole, curve: Arc<dyn Curve>) -> CurveResult<()> {
        match role {
            CurveRole::PriceIndex(index) => self.price_indices.set(index, curve),
            _ => self.issuer.set_curve_as(self.flavour(), role, curve),
        }
    }

    fn curve(&self, name: &str) -> Option<&Arc<dyn Curve>> {
        self.price_indices
            .by_name
            .get(name)
            .or_else(|| self.issuer.curve(name))
    }

    fn curve_names(&self) -> Vec<String> {
        merge_names(self.issuer.curve_names(), &self.price_indices.by_name)
    }
}

impl MulticurveAccess for InflationIssuerProvider {
    fn discount_curve(&self, currency: Currency) -> CurveResult<&dyn Curve> {
        self.issuer.discount_curve(currency)
    }

    fn ibor_curve(&self, index: &IborIndex) -> CurveResult<&dyn Curve> {
        self.issuer.ibor_curve(index)
    }

    fn overnight_curve(&self, index: &OvernightIndex) -> CurveResult<&dyn Curve> {
        self.issuer.overnight_curve(index)
    }
}

impl IssuerAccess for InflationIssuerProvider {
    fn issuer_curve(&self, issuer: &LegalEntity, currency: Currency) -> CurveResult<&dyn Curve> {
        self.issuer.issuer_curve(issuer, currency)
    }
}

impl InflationAccess for InflationIssuerProvider {
    fn price_index_curve(&self, index: &PriceIndex) -> CurveResult<&dyn Curve> {
        self.price_indices.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::ConstantCurve;

    fn cpi_curve() -> Arc<dyn Curve> {
        Arc::new(ConstantCurve::new("US-CPI", CurveKind::PriceIndex, 250.0))
    }

    #[test]
    fn test_inflation_provider() {
        let cpi = PriceIndex::new("US-CPI", Currency::USD);
        let ois: Arc<dyn Curve> = Arc::new(ConstantCurve::new("USD-OIS", CurveKind::Yield, 0.02));
        let provider = InflationProvider::new()
            .with_curve(&CurveRole::PriceIndex(cpi.clone()), cpi_curve())
            .unwrap()
            .with_curve(&CurveRole::Discounting(Currency::USD), ois)
            .unwrap();

        assert_eq!(provider.price_index_curve(&cpi).unwrap().name(), "US-CPI");
        assert_eq!(provider.curve_names(), vec!["US-CPI".to_string(), "USD-OIS".to_string()]);
        assert!(matches!(
            provider.clone().set_curve(
                &CurveRole::Issuer(LegalEntity::new("UST"), Currency::USD),
                cpi_curve()
            ),
            Err(CurveError::UnsupportedCurveRole { .. })
        ));
    }

    #[test]
    fn test_price_index_kind_is_checked() {
        let cpi = PriceIndex::new("US-CPI", Currency::USD);
        let wrong: Arc<dyn Curve> = Arc::new(ConstantCurve::new("US-CPI", CurveKind::Yield, 0.02));
        assert!(matches!(
            InflationProvider::new().set_curve(&CurveRole::PriceIndex(cpi), wrong),
            Err(CurveError::IncompatibleCurveKind { .. })
        ));
    }

    #[test]
    fn test_inflation_issuer_provider() {
        let cpi = PriceIndex::new("US-CPI", Currency::USD);
        let ust = LegalEntity::new("UST");
        let govt: Arc<dyn Curve> = Arc::new(ConstantCurve::new("UST", CurveKind::Yield, 0.03));
        let provider = InflationIssuerProvider::new()
            .with_curve(&CurveRole::PriceIndex(cpi.clone()), cpi_curve())
            .unwrap()
            .with_curve(&CurveRole::Issuer(ust.clone(), Currency::USD), govt)
            .unwrap();

        assert_eq!(provider.issuer_curve(&ust, Currency::USD).unwrap().name(), "UST");
        assert_eq!(provider.price_index_curve(&cpi).unwrap().name(), "US-CPI");
        assert!(provider.curve("UST").is_some());
        assert_eq!(provider.flavour(), "InflationIssuer");
    }
}
