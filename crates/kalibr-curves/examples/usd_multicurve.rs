//! USD Multi-Curve Construction Example
//!
//! Builds the USD OIS discounting curve and the LIBOR 3M projection curve
//! in two units, then reports the market quote risk of an off-market swap.
//!
//! | Curve       | Instruments                               |
//! |-------------|-------------------------------------------|
//! | USD-OIS     | 6M deposit, 1Y 2Y 3Y 5Y 7Y 10Y OIS        |
//! | USD-LIBOR3M | 3M fixing, 6x9 FRA, 2Y 3Y 5Y 7Y 10Y swaps |
//!
//! Run with: cargo run --example usd_multicurve

use std::sync::Arc;

use kalibr_curves::prelude::*;
use kalibr_math::interpolation::InterpolationMethod;

type Instruments = Vec<Arc<dyn CalibrationInstrument<MulticurveProvider>>>;

fn main() -> Result<(), CurveError> {
    println!("===========================================");
    println!("  USD Multi-Curve Construction Example");
    println!("===========================================\n");

    let sofr = OvernightIndex::new("SOFR", Currency::USD);
    let libor3m = IborIndex::new("USD-LIBOR3M", Currency::USD, 3);

    let roles = CurveRoles::new()
        .with("USD-OIS", CurveRole::Discounting(Currency::USD))
        .with("USD-OIS", CurveRole::ForwardOvernight(sofr.clone()))
        .with("USD-LIBOR3M", CurveRole::ForwardIbor(libor3m.clone()));

    // OIS unit
    let mut ois: Instruments = vec![Arc::new(Deposit::new(Currency::USD, 0.0, 0.5, 0.0430)?)];
    for (tenor, rate) in [
        (1.0, 0.0415),
        (2.0, 0.0390),
        (3.0, 0.0375),
        (5.0, 0.0365),
        (7.0, 0.0368),
        (10.0, 0.0375),
    ] {
        ois.push(Arc::new(FixedOvernightSwap::new(sofr.clone(), tenor, 1, rate)?));
    }

    // LIBOR 3M unit
    let mut libor: Instruments = vec![
        Arc::new(Fra::ibor_fixing(libor3m.clone(), 0.0455)?),
        Arc::new(Fra::new(libor3m.clone(), 0.5, 0.75, 0.0440)?),
    ];
    for (tenor, rate) in [
        (2.0, 0.0420),
        (3.0, 0.0405),
        (5.0, 0.0395),
        (7.0, 0.0398),
        (10.0, 0.0405),
    ] {
        libor.push(Arc::new(FixedIborSwap::new(libor3m.clone(), tenor, 1, rate)?));
    }

    let linear = || -> Arc<dyn CurveGenerator> {
        Arc::new(InterpolatedGenerator::yield_interpolated(
            InterpolationMethod::Linear,
        ))
    };
    let units = [
        MultiCurveBundle::single(SingleCurveBundle::new("USD-OIS", linear()).with_instruments(ois)),
        MultiCurveBundle::single(
            SingleCurveBundle::new("USD-LIBOR3M", linear()).with_instruments(libor),
        ),
    ];

    let output = MulticurveBuildingRepository::default().make_curves_from_instruments(
        &units,
        &MulticurveProvider::new(),
        &CurveBuildingBlockBundle::new(),
        &roles,
    )?;

    for report in &output.reports {
        println!("{report}");
    }

    // =========================================================================
    // Calibrated curves
    // =========================================================================
    let discount = output.provider.discount_curve(Currency::USD)?;
    let projection = output.provider.ibor_curve(&libor3m)?;

    println!("{:<8} {:<12} {:<12} {:<12}", "Tenor", "OIS (CC)", "OIS DF", "3M Fwd");
    println!("{}", "-".repeat(48));
    for (tenor, label) in [(0.5, "6M"), (1.0, "1Y"), (2.0, "2Y"), (5.0, "5Y"), (10.0, "10Y")] {
        let forward = projection.forward_rate(tenor, tenor + 0.25)?;
        println!(
            "{:<8} {:<12.4} {:<12.6} {:<12.4}",
            label,
            discount.value(tenor)? * 100.0,
            discount.discount_factor(tenor)?,
            forward * 100.0
        );
    }

    println!("\nBuilding blocks:");
    for name in output.blocks.names() {
        if let Some(block) = output.blocks.block(name) {
            println!("  {name}: {block}");
        }
    }

    // =========================================================================
    // Market quote risk of a 6Y swap
    // =========================================================================
    let swap = FixedIborSwap::new(libor3m, 6.0, 1, 0.0400)?;
    let point = swap.par_spread_sensitivity(&output.provider)?;
    let parameters = parameter_sensitivity(&point, &output.provider)?;
    let quotes = market_quote_sensitivity(&parameters, &output.blocks)?;

    println!("\n6Y swap par rate sensitivity to market quotes:");
    for (name, values) in quotes.iter() {
        let formatted: Vec<String> = values.iter().map(|v| format!("{v:+.4}")).collect();
        println!("  {name:<12} [{}]", formatted.join(", "));
    }

    Ok(())
}
