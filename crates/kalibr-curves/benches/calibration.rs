//! Benchmarks for curve calibration.
//!
//! Run with: cargo bench -p kalibr-curves

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use kalibr_curves::prelude::*;
use kalibr_math::interpolation::InterpolationMethod;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

type Instruments = Vec<Arc<dyn CalibrationInstrument<MulticurveProvider>>>;

fn sofr() -> OvernightIndex {
    OvernightIndex::new("SOFR", Currency::USD)
}

fn libor3m() -> IborIndex {
    IborIndex::new("USD-LIBOR3M", Currency::USD, 3)
}

fn roles() -> CurveRoles {
    CurveRoles::new()
        .with("USD-OIS", CurveRole::Discounting(Currency::USD))
        .with("USD-OIS", CurveRole::ForwardOvernight(sofr()))
        .with("USD-LIBOR3M", CurveRole::ForwardIbor(libor3m()))
}

fn generator(method: InterpolationMethod) -> Arc<dyn CurveGenerator> {
    Arc::new(InterpolatedGenerator::yield_interpolated(method))
}

/// OIS and 3M swaps out to `years`, one per year, on a gently rising curve.
fn create_units(years: u32, method: InterpolationMethod) -> Vec<MultiCurveBundle<MulticurveProvider>> {
    let mut ois: Instruments = vec![Arc::new(
        Deposit::new(Currency::USD, 0.0, 0.5, 0.020).unwrap(),
    )];
    let mut libor: Instruments = vec![Arc::new(Fra::ibor_fixing(libor3m(), 0.024).unwrap())];
    for year in 1..=years {
        let t = f64::from(year);
        let ois_rate = 0.021 + 0.001 * t.sqrt();
        ois.push(Arc::new(
            FixedOvernightSwap::new(sofr(), t, 1, ois_rate).unwrap(),
        ));
        libor.push(Arc::new(
            FixedIborSwap::new(libor3m(), t, 1, ois_rate + 0.003).unwrap(),
        ));
    }

    vec![
        MultiCurveBundle::single(
            SingleCurveBundle::new("USD-OIS", generator(method)).with_instruments(ois),
        ),
        MultiCurveBundle::single(
            SingleCurveBundle::new("USD-LIBOR3M", generator(method)).with_instruments(libor),
        ),
    ]
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_two_unit_calibration(c: &mut Criterion) {
    let repository = MulticurveBuildingRepository::default();
    let roles = roles();
    let known = MulticurveProvider::new();
    let blocks = CurveBuildingBlockBundle::new();

    let mut group = c.benchmark_group("two_unit_calibration");
    for years in [5, 10, 30] {
        let units = create_units(years, InterpolationMethod::Linear);
        group.bench_with_input(BenchmarkId::from_parameter(years), &units, |b, units| {
            b.iter(|| {
                repository
                    .make_curves_from_instruments(black_box(units), &known, &blocks, &roles)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_interpolation_methods(c: &mut Criterion) {
    let repository = MulticurveBuildingRepository::default();
    let roles = roles();
    let known = MulticurveProvider::new();
    let blocks = CurveBuildingBlockBundle::new();

    let mut group = c.benchmark_group("interpolation_method");
    for method in [
        InterpolationMethod::Linear,
        InterpolationMethod::LogLinear,
        InterpolationMethod::NaturalCubicSpline,
    ] {
        let units = create_units(10, method);
        group.bench_function(format!("{method:?}"), |b| {
            b.iter(|| {
                repository
                    .make_curves_from_instruments(black_box(&units), &known, &blocks, &roles)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_quote_sensitivity(c: &mut Criterion) {
    let output = MulticurveBuildingRepository::default()
        .make_curves_from_instruments(
            &create_units(10, InterpolationMethod::Linear),
            &MulticurveProvider::new(),
            &CurveBuildingBlockBundle::new(),
            &roles(),
        )
        .unwrap();
    let swap = FixedIborSwap::new(libor3m(), 7.5, 1, 0.03).unwrap();

    c.bench_function("swap_market_quote_sensitivity", |b| {
        b.iter(|| {
            let point = swap.par_spread_sensitivity(black_box(&output.provider)).unwrap();
            let parameters = parameter_sensitivity(&point, &output.provider).unwrap();
            market_quote_sensitivity(&parameters, &output.blocks).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_two_unit_calibration,
    bench_interpolation_methods,
    bench_quote_sensitivity,
);
criterion_main!(benches);
