//! Integration test: US CPI curves from zero-coupon swaps and from
//! inflation-indexed bonds discounted on a calibrated UST curve.

use std::sync::Arc;

use approx::assert_relative_eq;
use kalibr_curves::prelude::*;
use kalibr_math::interpolation::InterpolationMethod;

const BASE_LEVEL: f64 = 100.0;
const SWAP_TENORS: [f64; 4] = [1.0, 2.0, 5.0, 10.0];
const SWAP_RATES: [f64; 4] = [0.0250, 0.0240, 0.0230, 0.0225];

/// CPI node times and levels used to quote the linkers.
const CPI_TIMES: [f64; 4] = [1.0, 3.0, 5.0, 10.0];
const CPI_LEVELS: [f64; 4] = [102.4, 107.3, 112.1, 125.6];

fn cpi() -> PriceIndex {
    PriceIndex::new("US-CPI", Currency::USD)
}

fn ust() -> LegalEntity {
    LegalEntity::new("UST")
}

fn roles() -> CurveRoles {
    CurveRoles::new()
        .with("US-CPI", CurveRole::PriceIndex(cpi()))
        .with("UST", CurveRole::Issuer(ust(), Currency::USD))
}

fn cpi_generator() -> Arc<dyn CurveGenerator> {
    Arc::new(InterpolatedGenerator::price_index_interpolated(
        InterpolationMethod::Linear,
        0.0,
        BASE_LEVEL,
    ))
}

fn swaps<P: InflationAccess + 'static>() -> Vec<Arc<dyn CalibrationInstrument<P>>> {
    SWAP_TENORS
        .iter()
        .zip(SWAP_RATES)
        .map(|(tenor, rate)| {
            Arc::new(ZeroCouponInflationSwap::new(cpi(), *tenor, rate, BASE_LEVEL).unwrap())
                as Arc<dyn CalibrationInstrument<P>>
        })
        .collect()
}

fn ust_unit() -> MultiCurveBundle<InflationIssuerProvider> {
    let instruments: Vec<Arc<dyn CalibrationInstrument<InflationIssuerProvider>>> = vec![
        Arc::new(Bill::new(ust(), Currency::USD, 0.5, 0.0375).unwrap()),
        Arc::new(FixedCouponBond::new(ust(), Currency::USD, 2.0, 0.0350, 2, 0.995).unwrap()),
        Arc::new(FixedCouponBond::new(ust(), Currency::USD, 5.0, 0.0375, 2, 0.990).unwrap()),
        Arc::new(FixedCouponBond::new(ust(), Currency::USD, 10.0, 0.0400, 2, 0.985).unwrap()),
    ];
    MultiCurveBundle::single(
        SingleCurveBundle::new(
            "UST",
            Arc::new(InterpolatedGenerator::yield_interpolated(
                InterpolationMethod::Linear,
            )),
        )
        .with_instruments(instruments),
    )
}

/// A 1Y swap, then 3Y 5Y 10Y linkers paying a 1% real coupon.
fn linker_instruments(quotes: &[f64; 4]) -> Vec<Arc<dyn CalibrationInstrument<InflationIssuerProvider>>> {
    let mut instruments: Vec<Arc<dyn CalibrationInstrument<InflationIssuerProvider>>> = vec![
        Arc::new(ZeroCouponInflationSwap::new(cpi(), 1.0, quotes[0], BASE_LEVEL).unwrap()),
    ];
    for (maturity, price) in CPI_TIMES[1..].iter().zip(&quotes[1..]) {
        instruments.push(Arc::new(
            InflationIndexedBond::new(ust(), cpi(), *maturity, 0.01, 1, BASE_LEVEL, *price)
                .unwrap(),
        ));
    }
    instruments
}

#[test]
fn test_swap_curve_hits_compounded_levels() {
    let output = InflationBuildingRepository::default()
        .make_curves_from_instruments(
            &[MultiCurveBundle::single(
                SingleCurveBundle::new("US-CPI", cpi_generator()).with_instruments(swaps()),
            )],
            &InflationProvider::new(),
            &CurveBuildingBlockBundle::new(),
            &roles(),
        )
        .unwrap();

    assert!(output.reports[0].repricing.is_valid(), "{}", output.reports[0]);
    let curve = output.provider.price_index_curve(&cpi()).unwrap();
    assert_eq!(curve.kind(), CurveKind::PriceIndex);
    assert_relative_eq!(curve.value(0.0).unwrap(), BASE_LEVEL, epsilon = 1e-12);
    for (tenor, rate) in SWAP_TENORS.iter().zip(SWAP_RATES) {
        let expected = BASE_LEVEL * (1.0 + rate).powf(*tenor);
        assert_relative_eq!(curve.value(*tenor).unwrap(), expected, epsilon = 1e-6);
    }
    assert!(curve.discount_factor(1.0).is_err());

    for (i, swap) in swaps::<InflationProvider>().iter().enumerate() {
        let point = swap.par_spread_sensitivity(&output.provider).unwrap();
        let parameters = parameter_sensitivity(&point, &output.provider).unwrap();
        let quotes = market_quote_sensitivity(&parameters, &output.blocks).unwrap();
        let own = quotes.get("US-CPI").unwrap();
        for k in 0..4 {
            let expected = if k == i { 1.0 } else { 0.0 };
            assert_relative_eq!(own[k], expected, epsilon = 1e-8);
        }
    }
}

#[test]
fn test_linkers_recover_index_curve() {
    let repository = InflationIssuerBuildingRepository::default();
    let govt = repository
        .make_curves_from_instruments(
            &[ust_unit()],
            &InflationIssuerProvider::new(),
            &CurveBuildingBlockBundle::new(),
            &roles(),
        )
        .unwrap();

    // Quote the instruments off a known index curve.
    let truth = InterpolatedCurve::new(
        "US-CPI",
        NodeRepresentation::PriceIndex,
        InterpolationMethod::Linear,
        CPI_TIMES.to_vec(),
        CPI_LEVELS.to_vec(),
        Some((0.0, BASE_LEVEL)),
    )
    .unwrap();
    let quoting = govt
        .provider
        .clone()
        .with_curve(&CurveRole::PriceIndex(cpi()), Arc::new(truth))
        .unwrap();
    let mut quotes = [0.0; 4];
    for (quote, instrument) in quotes.iter_mut().zip(linker_instruments(&[0.0; 4])) {
        *quote = instrument.model_quote(&quoting).unwrap();
    }

    let output = repository
        .make_curves_from_instruments(
            &[MultiCurveBundle::single(
                SingleCurveBundle::new("US-CPI", cpi_generator())
                    .with_instruments(linker_instruments(&quotes)),
            )],
            &govt.provider,
            &govt.blocks,
            &roles(),
        )
        .unwrap();

    assert!(output.reports[0].repricing.is_valid(), "{}", output.reports[0]);
    let fitted = output.provider.curve("US-CPI").unwrap().parameters();
    for (fitted, expected) in fitted.iter().zip(CPI_LEVELS) {
        assert_relative_eq!(*fitted, expected, epsilon = 1e-6);
    }

    let block = output.blocks.block("US-CPI").unwrap();
    assert_eq!(block.names().collect::<Vec<_>>(), vec!["UST", "US-CPI"]);
    assert_eq!(output.blocks.matrix("US-CPI").unwrap().shape(), (4, 8));

    // The swap is discount-independent; the linkers are not.
    let matrix = output.blocks.matrix("US-CPI").unwrap();
    for c in 0..4 {
        assert_relative_eq!(matrix[(0, c)], 0.0, epsilon = 1e-12);
    }
    assert!((0..4).any(|c| matrix[(3, c)].abs() > 1e-6));

    for (i, instrument) in linker_instruments(&quotes).iter().enumerate() {
        let point = instrument.par_spread_sensitivity(&output.provider).unwrap();
        let parameters = parameter_sensitivity(&point, &output.provider).unwrap();
        let sensitivities = market_quote_sensitivity(&parameters, &output.blocks).unwrap();
        let own = sensitivities.get("US-CPI").unwrap();
        let discounting = sensitivities.get("UST").unwrap();
        for k in 0..4 {
            let expected = if k == i { 1.0 } else { 0.0 };
            assert_relative_eq!(own[k], expected, epsilon = 1e-8);
            assert_relative_eq!(discounting[k], 0.0, epsilon = 1e-8);
        }
    }
}

#[test]
fn test_price_index_role_needs_price_index_curve() {
    let result = InflationProvider::new().with_curve(
        &CurveRole::PriceIndex(cpi()),
        Arc::new(ConstantCurve::new("US-CPI", CurveKind::Yield, 0.02)),
    );
    assert!(matches!(result, Err(CurveError::IncompatibleCurveKind { .. })));
}
