//! Discounting and forward curves.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{CalibrationProvider, CurveRole, MulticurveAccess};
use crate::curves::{require_kind, Curve, CurveKind};
use crate::error::{CurveError, CurveResult};
use crate::index::{Currency, IborIndex, OvernightIndex};

/// Discounting curves per currency and forward curves per index.
#[derive(Debug, Clone, Default)]
pub struct MulticurveProvider {
    discounting: BTreeMap<Currency, Arc<dyn Curve>>,
    ibor: BTreeMap<IborIndex, Arc<dyn Curve>>,
    overnight: BTreeMap<OvernightIndex, Arc<dyn Curve>>,
    curves: BTreeMap<String, Arc<dyn Curve>>,
}

impl MulticurveProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a curve for a role, builder style.
    pub fn with_curve(mut self, role: &CurveRole, curve: Arc<dyn Curve>) -> CurveResult<Self> {
        self.set_curve(role, curve)?;
        Ok(self)
    }

    /// True if the role is one this provider serves.
    pub(crate) fn supports(role: &CurveRole) -> bool {
        matches!(
            role,
            CurveRole::Discounting(_) | CurveRole::ForwardIbor(_) | CurveRole::ForwardOvernight(_)
        )
    }

    /// Stores a curve, failing with `flavour` in the message for foreign roles.
    pub(crate) fn set_curve_as(
        &mut self,
        flavour: &str,
        role: &CurveRole,
        curve: Arc<dyn Curve>,
    ) -> CurveResult<()> {
        if !Self::supports(role) {
            return Err(CurveError::unsupported_role(flavour, role));
        }
        require_kind(curve.name(), curve.kind(), CurveKind::Yield)?;
        match role {
            CurveRole::Discounting(ccy) => {
                self.discounting.insert(*ccy, Arc::clone(&curve));
            }
            CurveRole::ForwardIbor(index) => {
                self.ibor.insert(index.clone(), Arc::clone(&curve));
            }
            CurveRole::ForwardOvernight(index) => {
                self.overnight.insert(index.clone(), Arc::clone(&curve));
            }
            CurveRole::Issuer(..) | CurveRole::PriceIndex(_) => {
                return Err(CurveError::unsupported_role(flavour, role));
            }
        }
        self.curves.insert(curve.name().to_string(), curve);
        Ok(())
    }
}

impl CalibrationProvider for MulticurveProvider {
    fn flavour(&self) -> &'static str {
        "Multicurve"
    }

    fn set_curve(&mut self, role: &CurveRole, curve: Arc<dyn Curve>) -> CurveResult<()> {
        self.set_curve_as(self.flavour(), role, curve)
    }

    fn curve(&self, name: &str) -> Option<&Arc<dyn Curve>> {
        self.curves.get(name)
    }

    fn curve_names(&self) -> Vec<String> {
        self.curves.keys().cloned().collect()
    }
}

impl MulticurveAccess for MulticurveProvider {
    fn discount_curve(&self, currency: Currency) -> CurveResult<&dyn Curve> {
        self.discounting
            .get(&currency)
            .map(AsRef::as_ref)
            .ok_or_else(|| CurveError::curve_not_found(format!("discounting {currency}")))
    }

    fn ibor_curve(&self, index: &IborIndex) -> CurveResult<&dyn Curve> {
        self.ibor
            .get(index)
            .map(AsRef::as_ref)
            .ok_or_else(|| CurveError::curve_not_found(format!("forward {index}")))
    }

    fn overnight_curve(&self, index: &OvernightIndex) -> CurveResult<&dyn Curve> {
        self.overnight
            .get(index)
            .map(AsRef::as_ref)
            .ok_or_else(|| CurveError::curve_not_found(format!("forward {index}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::ConstantCurve;
    use crate::index::{LegalEntity, PriceIndex};

    #[test]
    fn test_set_and_get() {
        let curve: Arc<dyn Curve> = Arc::new(ConstantCurve::new("EUR-OIS", CurveKind::Yield, 0.02));
        let estr = OvernightIndex::new("ESTR", Currency::EUR);
        let provider = MulticurveProvider::new()
            .with_curve(&CurveRole::Discounting(Currency::EUR), Arc::clone(&curve))
            .unwrap()
            .with_curve(&CurveRole::ForwardOvernight(estr.clone()), curve)
            .unwrap();

        assert_eq!(provider.curve_names(), vec!["EUR-OIS".to_string()]);
        assert_eq!(provider.discount_curve(Currency::EUR).unwrap().name(), "EUR-OIS");
        assert_eq!(provider.overnight_curve(&estr).unwrap().name(), "EUR-OIS");
        assert!(matches!(
            provider.discount_curve(Currency::USD),
            Err(CurveError::CurveNotFound { .. })
        ));
        let euribor = IborIndex::new("EURIBOR", Currency::EUR, 3);
        assert!((provider.futures_convexity_factor(&euribor, 1.0, 1.0, 1.25) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_rejects_foreign_roles_and_kinds() {
        let mut provider = MulticurveProvider::new();
        let yield_curve: Arc<dyn Curve> = Arc::new(ConstantCurve::new("GOVT", CurveKind::Yield, 0.02));
        let cpi: Arc<dyn Curve> = Arc::new(ConstantCurve::new("CPI", CurveKind::PriceIndex, 100.0));

        assert!(matches!(
            provider.set_curve(
                &CurveRole::Issuer(LegalEntity::new("UST"), Currency::USD),
                yield_curve
            ),
            Err(CurveError::UnsupportedCurveRole { .. })
        ));
        assert!(matches!(
            provider.set_curve(&CurveRole::Discounting(Currency::USD), cpi.clone()),
            Err(CurveError::IncompatibleCurveKind { .. })
        ));
        assert!(matches!(
            provider.set_curve(&CurveRole::PriceIndex(PriceIndex::new("CPI", Currency::USD)), cpi),
            Err(CurveError::UnsupportedCurveRole { .. })
        ));
    }
}
