//! End-to-end pricing tests driving the engines through the façade.

use std::sync::Arc;

use quantfd::instruments::{
    Exercise, OptionType, PlainVanillaPayoff, PricingEngine, VanillaOption,
};
use quantfd::methods::lattices::BinomialVariant;
use quantfd::pricingengines::{
    black_scholes_merton, AnalyticEuropeanEngine, BinomialVanillaEngine, ConvertibleBond,
    FdAmericanEngine, FdEuropeanEngine, FdShoutEngine, TsiveriotisFernandesEngine,
};
use quantfd::processes::GeneralizedBlackScholesProcess;
use quantfd::termstructures::{BlackConstantVol, BlackVarianceCurve, FlatForward};

fn process(spot: f64, r: f64, q: f64, sigma: f64) -> Arc<GeneralizedBlackScholesProcess> {
    Arc::new(GeneralizedBlackScholesProcess::new(
        spot,
        Arc::new(FlatForward::new(r)),
        Arc::new(FlatForward::new(q)),
        Arc::new(BlackConstantVol::new(sigma)),
    ))
}

fn vanilla(option_type: OptionType, strike: f64, exercise: Exercise) -> VanillaOption {
    VanillaOption::new(
        Arc::new(PlainVanillaPayoff::new(option_type, strike)),
        exercise,
    )
}

#[test]
fn fd_european_put_matches_the_closed_form() {
    // strike 40, spot 36, r 6%, σ 20%, T 1y
    let engine = FdEuropeanEngine::new(process(36.0, 0.06, 0.0, 0.20), 100, 100);
    let fd = engine
        .calculate(&vanilla(OptionType::Put, 40.0, Exercise::european(1.0)))
        .unwrap();
    let (analytic, ..) = black_scholes_merton(OptionType::Put, 36.0, 40.0, 0.06, 0.0, 0.20, 1.0);
    assert!(
        (fd.value - analytic).abs() < 1e-2,
        "fd = {}, closed form = {}",
        fd.value,
        analytic
    );
}

#[test]
fn american_dominates_european_across_engines() {
    let p = process(36.0, 0.06, 0.0, 0.20);
    let european = FdEuropeanEngine::new(Arc::clone(&p), 100, 100)
        .calculate(&vanilla(OptionType::Put, 40.0, Exercise::european(1.0)))
        .unwrap()
        .value;

    let fd_american = FdAmericanEngine::new(Arc::clone(&p), 100, 100)
        .calculate(&vanilla(OptionType::Put, 40.0, Exercise::american(1.0)))
        .unwrap()
        .value;
    assert!(fd_american > european);

    let tree_american =
        BinomialVanillaEngine::new(p, BinomialVariant::CoxRossRubinstein, 400)
            .calculate(&vanilla(OptionType::Put, 40.0, Exercise::american(1.0)))
            .unwrap()
            .value;
    assert!(tree_american > european);

    // the two American prices should agree with each other as well
    assert!(
        (fd_american - tree_american).abs() < 0.02,
        "fd {} vs tree {}",
        fd_american,
        tree_american
    );
}

#[test]
fn analytic_and_lattice_engines_agree_on_a_european_call() {
    let p = process(100.0, 0.05, 0.02, 0.25);
    let option = vanilla(OptionType::Call, 105.0, Exercise::european(0.75));

    let analytic = AnalyticEuropeanEngine::new(Arc::clone(&p))
        .calculate(&option)
        .unwrap();
    let tree = BinomialVanillaEngine::new(Arc::clone(&p), BinomialVariant::LeisenReimer, 101)
        .calculate(&option)
        .unwrap();
    let fd = FdEuropeanEngine::new(p, 100, 200)
        .calculate(&option)
        .unwrap();

    assert!((tree.value - analytic.value).abs() < 5e-3);
    assert!((fd.value - analytic.value).abs() < 1e-2);
    assert!((tree.delta.unwrap() - analytic.delta.unwrap()).abs() < 5e-3);
    assert!((fd.delta.unwrap() - analytic.delta.unwrap()).abs() < 5e-3);
}

#[test]
fn shout_sits_between_european_and_its_locked_floor() {
    let p = process(100.0, 0.05, 0.0, 0.30);
    let option = vanilla(OptionType::Put, 100.0, Exercise::american(1.0));
    let shout = FdShoutEngine::new(Arc::clone(&p), 100, 100)
        .calculate(&option)
        .unwrap()
        .value;
    let european = FdEuropeanEngine::new(p, 100, 100)
        .calculate(&vanilla(OptionType::Put, 100.0, Exercise::european(1.0)))
        .unwrap()
        .value;
    assert!(shout >= european - 1e-9, "shout {shout} < european {european}");
}

#[test]
fn engines_accept_a_term_structure_of_volatility() {
    // upward-sloping vol curve; the 1y engines must pick up the 1y vol
    let curve = BlackVarianceCurve::new(vec![0.25, 0.5, 1.0], vec![0.15, 0.18, 0.20]).unwrap();
    let p = Arc::new(GeneralizedBlackScholesProcess::new(
        100.0,
        Arc::new(FlatForward::new(0.05)),
        Arc::new(FlatForward::new(0.0)),
        Arc::new(curve),
    ));
    let option = vanilla(OptionType::Call, 100.0, Exercise::european(1.0));
    let value = AnalyticEuropeanEngine::new(p)
        .calculate(&option)
        .unwrap()
        .value;
    let (flat_20, ..) = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0);
    assert!((value - flat_20).abs() < 1e-10, "{value} vs {flat_20}");
}

#[test]
fn convertible_bond_blends_debt_and_equity() {
    let engine = TsiveriotisFernandesEngine::new(process(100.0, 0.05, 0.0, 0.20), 200);
    let value = engine
        .calculate(&ConvertibleBond {
            conversion_ratio: 1.0,
            redemption: 100.0,
            maturity: 1.0,
            credit_spread: 0.03,
        })
        .unwrap()
        .value;
    // above the pure risky bond, above the conversion floor
    let dt: f64 = 1.0 / 200.0;
    let risky_bond = 100.0 * (1.0 / (1.0 + 0.08 * dt)).powi(200);
    assert!(value > risky_bond, "{value} <= {risky_bond}");
    assert!(value >= 100.0, "{value} below the conversion floor");
}
