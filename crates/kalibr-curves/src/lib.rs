//! # Kalibr Curves
//!
//! Multi-curve interest rate and inflation curve calibration.
//!
//! This crate provides:
//!
//! - **Curves**: Interpolated, parametric, spread and composite curves with
//!   analytic parameter sensitivities
//! - **Generators**: Strategies that turn parameter vectors into curves
//! - **Providers**: Discounting, forward, issuer and price index curves keyed
//!   by currency, index and issuer, with Hull-White futures convexity
//! - **Instruments**: Deposits, FRAs, futures, swaps, bills, bonds and
//!   inflation instruments with analytic par spread sensitivities
//! - **Building**: Simultaneous calibration of curve units by Newton or
//!   Broyden root search, producing the Jacobian of every curve's parameters
//!   with respect to the market quotes it depends on
//! - **Sensitivities**: Point, parameter and market quote sensitivities
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kalibr_curves::prelude::*;
//! use kalibr_math::interpolation::InterpolationMethod;
//!
//! let sofr = OvernightIndex::new("SOFR", Currency::USD);
//! let roles = CurveRoles::new()
//!     .with("USD-OIS", CurveRole::Discounting(Currency::USD))
//!     .with("USD-OIS", CurveRole::ForwardOvernight(sofr.clone()));
//!
//! let unit = MultiCurveBundle::single(
//!     SingleCurveBundle::new(
//!         "USD-OIS",
//!         Arc::new(InterpolatedGenerator::yield_interpolated(InterpolationMethod::Linear)),
//!     )
//!     .with_instrument(Deposit::new(Currency::USD, 0.0, 0.25, 0.020).unwrap())
//!     .with_instrument(FixedOvernightSwap::new(sofr.clone(), 1.0, 1, 0.022).unwrap())
//!     .with_instrument(FixedOvernightSwap::new(sofr, 5.0, 1, 0.028).unwrap()),
//! );
//!
//! let output = MulticurveBuildingRepository::default()
//!     .make_curves_from_instruments(
//!         &[unit],
//!         &MulticurveProvider::new(),
//!         &CurveBuildingBlockBundle::new(),
//!         &roles,
//!     )
//!     .unwrap();
//!
//! assert!(output.reports[0].repricing.is_valid());
//! let df = output.provider.discount_curve(Currency::USD).unwrap().discount_factor(5.0).unwrap();
//! assert!(df < 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]

pub mod building;
pub mod config;
pub mod curves;
pub mod error;
pub mod generator;
pub mod index;
pub mod instruments;
pub mod provider;
pub mod repricing;
pub mod sensitivity;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::building::{
        CalibrationOutput, CurveBuildingBlock, CurveBuildingBlockBundle, CurveBuildingRepository,
        HullWhiteBuildingRepository, InflationBuildingRepository,
        InflationIssuerBuildingRepository, IssuerBuildingRepository, MultiCurveBundle,
        MulticurveBuildingRepository, SingleCurveBundle,
    };
    pub use crate::config::CalibrationConfig;
    pub use crate::curves::{
        CompositeCurve, ConstantCurve, Curve, CurveKind, InterpolatedCurve, NelsonSiegelCurve,
        NodeRepresentation, SpreadCurve,
    };
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::generator::{
        CompositeGenerator, ConstantGenerator, CurveGenerator, InterpolatedGenerator,
        NelsonSiegelGenerator, SpreadGenerator,
    };
    pub use crate::index::{Currency, IborIndex, LegalEntity, OvernightIndex, PriceIndex};
    pub use crate::instruments::{
        Bill, CalibrationInstrument, Deposit, FixedCouponBond, FixedIborSwap,
        FixedOvernightSwap, Fra, IborBasisSwap, InflationIndexedBond, InstrumentType,
        RateFuture, ZeroCouponInflationSwap,
    };
    pub use crate::provider::{
        CalibrationProvider, CurveRole, CurveRoles, HullWhiteOneFactorParameters,
        HullWhiteProvider, InflationAccess, InflationIssuerProvider, InflationProvider,
        IssuerAccess, IssuerProvider, MulticurveAccess, MulticurveProvider,
    };
    pub use crate::repricing::{RepricingCheck, RepricingReport, UnitCalibrationReport};
    pub use crate::sensitivity::{
        market_quote_sensitivity, parameter_sensitivity, CurveSensitivity, ParameterSensitivity,
    };
}

pub use building::{CurveBuildingBlockBundle, CurveBuildingRepository};
pub use curves::Curve;
pub use error::{CurveError, CurveResult};
