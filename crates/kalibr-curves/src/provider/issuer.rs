//! Multicurve provider with issuer curves.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{CalibrationProvider, CurveRole, IssuerAccess, MulticurveAccess, MulticurveProvider};
use crate::curves::{require_kind, Curve, CurveKind};
use crate::error::{CurveError, CurveResult};
use crate::index::{Currency, IborIndex, LegalEntity, OvernightIndex};

/// Multicurve data plus one discounting curve per (issuer, currency).
#[derive(Debug, Clone, Default)]
pub struct IssuerProvider {
    multicurve: MulticurveProvider,
    issuers: BTreeMap<(LegalEntity, Currency), Arc<dyn Curve>>,
    curves: BTreeMap<String, Arc<dyn Curve>>,
}

impl IssuerProvider {
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

    /// The multicurve part.
    #[must_use]
    pub fn multicurve(&self) -> &MulticurveProvider {
        &self.multicurve
    }

    pub(crate) fn set_curve_as(
        &mut self,
        flavour: &str,
        role: &CurveRole,
        curve: Arc<dyn Curve>,
    ) -> CurveResult<()> {
        if MulticurveProvider::supports(role) {
            return self.multicurve.set_curve_as(flavour, role, curve);
        }
        let CurveRole::Issuer(issuer, ccy) = role else {
            return Err(CurveError::unsupported_role(flavour, role));
        };
        require_kind(curve.name(), curve.kind(), CurveKind::Yield)?;
        self.issuers
            .insert((issuer.clone(), *ccy), Arc::clone(&curve));
        self.curves.insert(curve.name().to_string(), curve);
        Ok(())
    }
}

impl CalibrationProvider for IssuerProvider {
    fn flavour(&self) -> &'static str {
        "Issuer"
    }

    fn set_curve(&mut self, role: &CurveRole, curve: Arc<dyn Curve>) -> CurveResult<()> {
        self.set_curve_as(self.flavour(), role, curve)
    }

    fn curve(&self, name: &str) -> Option<&Arc<dyn Curve>> {
        self.curves
            .get(name)
            .or_else(|| self.multicurve.curve(name))
    }

    fn curve_names(&self) -> Vec<String> {
        let mut names = self.multicurve.curve_names();
        names.extend(self.curves.keys().cloned());
        names.sort();
        names.dedup();
        names
    }
}

impl MulticurveAccess for IssuerProvider {
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

impl IssuerAccess for IssuerProvider {
    fn issuer_curve(&self, issuer: &LegalEntity, currency: Currency) -> CurveResult<&dyn Curve> {
        self.issuers
            .get(&(issuer.clone(), currency))
            .map(AsRef::as_ref)
            .ok_or_else(|| CurveError::curve_not_found(format!("issuer {issuer} {currency}")))
    }
}
