//! Curve providers.
//!
//! A provider holds the curves pricing needs, keyed by what they are used
//! for. Each flavour supports a fixed set of [`CurveRole`]s:
//!
//! | Provider | Roles |
//! |----------|-------|
//! | [`MulticurveProvider`] | discounting, Ibor forwards, overnight forwards |
//! | [`IssuerProvider`] | multicurve roles + issuer curves |
//! | [`HullWhiteProvider`] | multicurve roles, with futures convexity |
//! | [`InflationProvider`] | multicurve roles + price indices |
//! | [`InflationIssuerProvider`] | all of the above except Hull-White |
//!
//! Instruments do not see the flavours directly. They price through the
//! access traits ([`MulticurveAccess`], [`IssuerAccess`],
//! [`InflationAccess`]), so one instrument type calibrates against any
//! provider that can serve it.

mod hull_white;
mod inflation;
mod issuer;
mod multicurve;

pub use hull_white::{HullWhiteOneFactorParameters, HullWhiteProvider};
pub use inflation::{InflationIssuerProvider, InflationProvider};
pub use issuer::IssuerProvider;
pub use multicurve::MulticurveProvider;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::curves::Curve;
use crate::error::CurveResult;
use crate::index::{Currency, IborIndex, LegalEntity, OvernightIndex, PriceIndex};

/// What a curve is used for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CurveRole {
    /// Discounting in a currency.
    Discounting(Currency),
    /// Forward rates of a term index.
    ForwardIbor(IborIndex),
    /// Forward rates of an overnight index.
    ForwardOvernight(OvernightIndex),
    /// Discounting of an issuer's bonds.
    Issuer(LegalEntity, Currency),
    /// Projection of a price index.
    PriceIndex(PriceIndex),
}

impl fmt::Display for CurveRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discounting(ccy) => write!(f, "Discounting({ccy})"),
            Self::ForwardIbor(index) => write!(f, "ForwardIbor({index})"),
            Self::ForwardOvernight(index) => write!(f, "ForwardOvernight({index})"),
            Self::Issuer(issuer, ccy) => write!(f, "Issuer({issuer}, {ccy})"),
            Self::PriceIndex(index) => write!(f, "PriceIndex({index})"),
        }
    }
}

/// Roles of each calibrated curve, by curve name.
///
/// A curve may have several roles, for example an OIS curve used both for
/// discounting and for overnight forwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveRoles {
    roles: BTreeMap<String, Vec<CurveRole>>,
}

impl CurveRoles {
    /// Creates an empty role map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role for a curve.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, role: CurveRole) -> Self {
        self.insert(name, role);
        self
    }

    /// Adds a role for a curve.
    pub fn insert(&mut self, name: impl Into<String>, role: CurveRole) {
        let roles = self.roles.entry(name.into()).or_default();
        if !roles.contains(&role) {
            roles.push(role);
        }
    }

    /// Roles of a curve; empty if it has none.
    #[must_use]
    pub fn roles(&self, name: &str) -> &[CurveRole] {
        self.roles.get(name).map_or(&[], Vec::as_slice)
    }

    /// Names with at least one role.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }
}

/// A provider the curve building repository can calibrate into.
pub trait CalibrationProvider: Clone + Send + Sync + fmt::Debug {
    /// Flavour name used in error messages.
    fn flavour(&self) -> &'static str;

    /// Stores a curve for a role, replacing any previous curve for it.
    ///
    /// # Errors
    ///
    /// `UnsupportedCurveRole` if the flavour has no such role and
    /// `IncompatibleCurveKind` if the curve is of the wrong kind.
    fn set_curve(&mut self, role: &CurveRole, curve: Arc<dyn Curve>) -> CurveResult<()>;

    /// Looks a curve up by name.
    fn curve(&self, name: &str) -> Option<&Arc<dyn Curve>>;

    /// Names of all curves held.
    fn curve_names(&self) -> Vec<String>;
}

/// Discounting and forward curves.
pub trait MulticurveAccess {
    /// Discounting curve of a currency.
    fn discount_curve(&self, currency: Currency) -> CurveResult<&dyn Curve>;

    /// Forward curve of a term index.
    fn ibor_curve(&self, index: &IborIndex) -> CurveResult<&dyn Curve>;

    /// Forward curve of an overnight index.
    fn overnight_curve(&self, index: &OvernightIndex) -> CurveResult<&dyn Curve>;

    /// Ratio between futures and forward (1 + δ F) for a future fixing at
    /// `t0` on the period `[t1, t2]`.
    fn futures_convexity_factor(&self, _index: &IborIndex, _t0: f64, _t1: f64, _t2: f64) -> f64 {
        1.0
    }
}

/// Issuer discounting curves.
pub trait IssuerAccess: MulticurveAccess {
    /// Discounting curve of an issuer's bonds in a currency.
    fn issuer_curve(&self, issuer: &LegalEntity, currency: Currency) -> CurveResult<&dyn Curve>;
}

/// Price index curves.
pub trait InflationAccess: MulticurveAccess {
    /// Projection curve of a price index.
    fn price_index_curve(&self, index: &PriceIndex) -> CurveResult<&dyn Curve>;
}
