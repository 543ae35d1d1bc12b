//! Numerical property tests for the operators, conditions, and lattices.

use std::sync::Arc;

use proptest::prelude::*;
use quantfd::core::Real;
use quantfd::methods::finite_differences::{CurveReference, StepCondition, TridiagonalOperator};
use quantfd::methods::lattices::{BinomialTree, BlackScholesLattice, Tree};
use quantfd::processes::GeneralizedBlackScholesProcess;
use quantfd::termstructures::{BlackConstantVol, FlatForward};

fn process(r: f64, sigma: f64) -> GeneralizedBlackScholesProcess {
    GeneralizedBlackScholesProcess::new(
        100.0,
        Arc::new(FlatForward::new(r)),
        Arc::new(FlatForward::new(0.0)),
        Arc::new(BlackConstantVol::new(sigma)),
    )
}

fn dominant_operator(lower: &[Real], diag_slack: &[Real], upper: &[Real]) -> TridiagonalOperator {
    let n = diag_slack.len();
    let mut op = TridiagonalOperator::new(n);
    op.set_first_row(1.0 + diag_slack[0], upper[0]);
    for i in 1..n - 1 {
        let d = lower[i - 1].abs() + upper[i].abs() + diag_slack[i] + 1.0;
        op.set_mid_row(i, lower[i - 1], d, upper[i]);
    }
    op.set_last_row(lower[n - 2], 1.0 + lower[n - 2].abs() + diag_slack[n - 1]);
    op
}

proptest! {
    // solve then apply must reproduce the right-hand side for any
    // diagonally dominant system
    #[test]
    fn tridiagonal_solve_round_trips(
        lower in prop::collection::vec(-1.0..1.0_f64, 7),
        slack in prop::collection::vec(0.0..2.0_f64, 8),
        upper in prop::collection::vec(-1.0..1.0_f64, 7),
        rhs in prop::collection::vec(-10.0..10.0_f64, 8),
    ) {
        let op = dominant_operator(&lower, &slack, &upper);
        let x = op.solve_for(&rhs).unwrap();
        let back = op.apply_to(&x).unwrap();
        for (b, r) in back.iter().zip(rhs.iter()) {
            prop_assert!((b - r).abs() < 1e-8, "{b} vs {r}");
        }
    }

    // binomial probabilities stay in [0, 1] whenever construction succeeds
    #[test]
    fn binomial_probabilities_are_valid(
        r in 0.0..0.15_f64,
        sigma in 0.05..0.6_f64,
        steps in 10usize..200,
    ) {
        let p = process(r, sigma);
        if let Ok(tree) = BinomialTree::cox_ross_rubinstein(&p, 1.0, steps) {
            let pu = tree.probability(0, 0, 1);
            let pd = tree.probability(0, 0, 0);
            prop_assert!((0.0..=1.0).contains(&pu));
            prop_assert!((pu + pd - 1.0).abs() < 1e-12);
        }
    }
}

#[test]
fn operator_composition_is_linear() {
    let mut a = TridiagonalOperator::new(5);
    let mut b = TridiagonalOperator::new(5);
    a.set_first_row(2.0, -1.0);
    b.set_first_row(0.5, 0.25);
    for i in 1..4 {
        a.set_mid_row(i, -1.0, 2.0, -1.0);
        b.set_mid_row(i, 0.25, 0.5, 0.25);
    }
    a.set_last_row(-1.0, 2.0);
    b.set_last_row(0.25, 0.5);

    let v: Vec<Real> = vec![1.0, -2.0, 3.0, -4.0, 5.0];
    let sum = a.add(&b).unwrap();
    let lhs = sum.apply_to(&v).unwrap();
    let ra = a.apply_to(&v).unwrap();
    let rb = b.apply_to(&v).unwrap();
    for i in 0..5 {
        assert!((lhs[i] - (ra[i] + rb[i])).abs() < 1e-14);
    }

    let scaled = a.multiply(3.0);
    let ls = scaled.apply_to(&v).unwrap();
    for i in 0..5 {
        assert!((ls[i] - 3.0 * ra[i]).abs() < 1e-14);
    }
}

#[test]
fn state_prices_conserve_mass_under_unit_discount() {
    let p = process(0.0, 0.25);
    let tree = BinomialTree::cox_ross_rubinstein(&p, 2.0, 80).unwrap();
    let mut lattice = BlackScholesLattice::new(tree, 0.0, 2.0, 80);
    for i in [1, 20, 40, 80] {
        let total: Real = lattice.state_prices(i).iter().sum();
        assert!((total - 1.0).abs() < 1e-12, "slice {i}: {total}");
    }
}

#[test]
fn shout_clamp_is_undiscounted_at_the_reset_time() {
    let reset = 0.4;
    let condition = StepCondition::Shout {
        reset_time: reset,
        rate: 0.06,
        intrinsic: CurveReference::Values(vec![3.0, 7.0]),
    };
    let mut a = vec![0.0, 0.0];
    condition.apply_to(&mut a, reset).unwrap();
    assert_eq!(a, vec![3.0, 7.0]);

    // later application discounts the locked-in intrinsic
    let mut b = vec![0.0, 0.0];
    condition.apply_to(&mut b, reset + 0.5).unwrap();
    let disc = (-0.06_f64 * 0.5).exp();
    assert!((b[0] - 3.0 * disc).abs() < 1e-12);
    assert!((b[1] - 7.0 * disc).abs() < 1e-12);
}
