//! Currencies, rate indices, price indices and issuers.
//!
//! These are the keys under which providers store their curves. Conventions
//! beyond the tenor (day counts, fixing lags, calendars) are not modelled:
//! all accruals are plain year fractions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Currency {
    /// United States Dollar
    #[default]
    USD,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// Japanese Yen
    JPY,
    /// Swiss Franc
    CHF,
    /// Canadian Dollar
    CAD,
    /// Australian Dollar
    AUD,
}

impl Currency {
    /// Returns the ISO 4217 3-letter code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A term rate index such as EURIBOR 6M.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IborIndex {
    /// Index name (e.g., "EURIBOR")
    pub name: String,
    /// Currency of the index
    pub currency: Currency,
    /// Tenor in months
    pub tenor_months: u32,
}

impl IborIndex {
    /// Creates a new term rate index.
    #[must_use]
    pub fn new(name: impl Into<String>, currency: Currency, tenor_months: u32) -> Self {
        Self {
            name: name.into(),
            currency,
            tenor_months,
        }
    }

    /// Returns the tenor in years.
    #[must_use]
    pub fn tenor_years(&self) -> f64 {
        f64::from(self.tenor_months) / 12.0
    }

    /// Number of index periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        (12 / self.tenor_months.max(1)).max(1)
    }
}

impl fmt::Display for IborIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}M", self.name, self.tenor_months)
    }
}

/// An overnight rate index such as SOFR or ESTR.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OvernightIndex {
    /// Index name
    pub name: String,
    /// Currency of the index
    pub currency: Currency,
}

impl OvernightIndex {
    /// Creates a new overnight index.
    #[must_use]
    pub fn new(name: impl Into<String>, currency: Currency) -> Self {
        Self {
            name: name.into(),
            currency,
        }
    }
}

impl fmt::Display for OvernightIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A consumer price index such as US CPI-U.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PriceIndex {
    /// Index name
    pub name: String,
    /// Currency of the index
    pub currency: Currency,
}

impl PriceIndex {
    /// Creates a new price index.
    #[must_use]
    pub fn new(name: impl Into<String>, currency: Currency) -> Self {
        Self {
            name: name.into(),
            currency,
        }
    }
}

impl fmt::Display for PriceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A bond issuer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LegalEntity {
    /// Issuer name
    pub name: String,
}

impl LegalEntity {
    /// Creates a new issuer.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for LegalEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
