//! Binomial-tree engine for vanilla options.
//!
//! Rolls a [`DiscretizedVanillaOption`] back on a [`BlackScholesLattice`],
//! stopping at the second and first time slices to read delta and gamma
//! off the tree nodes before finishing the rollback to today. Theta comes
//! from the pricing PDE identity.

use std::sync::Arc;

use qf_core::{ensure, Result};
use qf_instruments::{OneAssetResults, PricingEngine, VanillaOption};
use qf_methods::lattices::{BinomialVariant, BlackScholesLattice, DiscretizedAsset, Lattice};
use qf_processes::{GeneralizedBlackScholesProcess, StochasticProcess1D};

use crate::discretized_vanilla_option::DiscretizedVanillaOption;

/// Binomial-tree pricing engine, parameterized over the tree variant.
#[derive(Debug)]
pub struct BinomialVanillaEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    variant: BinomialVariant,
    steps: usize,
}

impl BinomialVanillaEngine {
    /// Create an engine building `steps`-step trees of the given variant.
    pub fn new(
        process: Arc<GeneralizedBlackScholesProcess>,
        variant: BinomialVariant,
        steps: usize,
    ) -> Self {
        Self {
            process,
            variant,
            steps,
        }
    }
}

impl PricingEngine for BinomialVanillaEngine {
    fn calculate(&self, option: &VanillaOption) -> Result<OneAssetResults> {
        ensure!(self.steps >= 2, "at least 2 steps required ({})", self.steps);
        let maturity = option.exercise.last_time();
        ensure!(maturity > 0.0, "non-positive time to maturity ({maturity})");
        let strike = option.payoff.strike();

        let r = self.process.risk_free_rate().zero_rate(maturity);
        let tree = self
            .variant
            .build(self.process.as_ref(), maturity, self.steps, strike)?;
        // Leisen-Reimer and Joshi force an odd step count
        let steps = tree.steps();
        let mut lattice = BlackScholesLattice::new(tree, r, maturity, steps);

        let mut asset =
            DiscretizedVanillaOption::new(Arc::clone(&option.payoff), option.exercise.clone());
        lattice.initialize(&mut asset, maturity);

        // stop two steps from today: the three nodes give the one-sided
        // deltas and hence gamma at the tree center
        let t2 = lattice.time_grid().time(2);
        lattice.rollback(&mut asset, t2);
        let va2 = asset.values().to_vec();
        let p2 = lattice.grid(t2);
        let delta_plus = (va2[2] - va2[1]) / (p2[2] - p2[1]);
        let delta_minus = (va2[1] - va2[0]) / (p2[1] - p2[0]);
        let gamma = (delta_plus - delta_minus) / ((p2[2] - p2[0]) / 2.0);

        let t1 = lattice.time_grid().time(1);
        lattice.rollback(&mut asset, t1);
        let va1 = asset.values().to_vec();
        let p1 = lattice.grid(t1);
        let delta = (va1[1] - va1[0]) / (p1[1] - p1[0]);

        lattice.rollback(&mut asset, 0.0);
        let value = asset.values()[0];

        let s = self.process.x0();
        let q = self.process.dividend_yield().zero_rate(maturity);
        let sigma = self.process.black_volatility().black_vol(maturity, strike);
        let theta = r * value - (r - q) * s * delta - 0.5 * sigma * sigma * s * s * gamma;

        Ok(OneAssetResults {
            value,
            delta: Some(delta),
            gamma: Some(gamma),
            theta: Some(theta),
            vega: None,
            rho: None,
            price_curve: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european::black_scholes_merton;
    use qf_instruments::{Exercise, OptionType, PlainVanillaPayoff};
    use qf_termstructures::{BlackConstantVol, FlatForward};

    fn process(spot: f64, r: f64, q: f64, sigma: f64) -> Arc<GeneralizedBlackScholesProcess> {
        Arc::new(GeneralizedBlackScholesProcess::new(
            spot,
            Arc::new(FlatForward::new(r)),
            Arc::new(FlatForward::new(q)),
            Arc::new(BlackConstantVol::new(sigma)),
        ))
    }

    fn option(option_type: OptionType, strike: f64, exercise: Exercise) -> VanillaOption {
        VanillaOption::new(
            Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            exercise,
        )
    }

    #[test]
    fn european_call_converges_to_closed_form() {
        let (expected, an_delta, an_gamma, ..) =
            black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0);
        for variant in [
            BinomialVariant::CoxRossRubinstein,
            BinomialVariant::JarrowRudd,
            BinomialVariant::Trigeorgis,
            BinomialVariant::Tian,
        ] {
            let engine = BinomialVanillaEngine::new(process(100.0, 0.05, 0.0, 0.20), variant, 801);
            let results = engine
                .calculate(&option(OptionType::Call, 100.0, Exercise::european(1.0)))
                .unwrap();
            assert!(
                (results.value - expected).abs() < 0.02,
                "{variant:?}: {} vs {}",
                results.value,
                expected
            );
            assert!((results.delta.unwrap() - an_delta).abs() < 0.01, "{variant:?}");
            assert!((results.gamma.unwrap() - an_gamma).abs() < 0.005, "{variant:?}");
        }
    }

    #[test]
    fn leisen_reimer_converges_fast() {
        let (expected, ..) =
            black_scholes_merton(OptionType::Put, 100.0, 110.0, 0.05, 0.0, 0.20, 1.0);
        let engine = BinomialVanillaEngine::new(
            process(100.0, 0.05, 0.0, 0.20),
            BinomialVariant::LeisenReimer,
            51,
        );
        let results = engine
            .calculate(&option(OptionType::Put, 110.0, Exercise::european(1.0)))
            .unwrap();
        assert!(
            (results.value - expected).abs() < 5e-3,
            "{} vs {}",
            results.value,
            expected
        );
    }

    #[test]
    fn american_put_dominates_european_put() {
        let p = process(36.0, 0.06, 0.0, 0.20);
        let engine = BinomialVanillaEngine::new(p, BinomialVariant::CoxRossRubinstein, 400);
        let american = engine
            .calculate(&option(OptionType::Put, 40.0, Exercise::american(1.0)))
            .unwrap();
        let european = engine
            .calculate(&option(OptionType::Put, 40.0, Exercise::european(1.0)))
            .unwrap();
        assert!(american.value > european.value);
        // the Longstaff-Schwartz benchmark scenario, reference ≈ 4.478
        assert!(
            (american.value - 4.478).abs() < 0.02,
            "american = {}",
            american.value
        );
    }

    #[test]
    fn too_few_steps_is_an_error() {
        let engine = BinomialVanillaEngine::new(
            process(100.0, 0.05, 0.0, 0.20),
            BinomialVariant::CoxRossRubinstein,
            1,
        );
        assert!(engine
            .calculate(&option(OptionType::Call, 100.0, Exercise::european(1.0)))
            .is_err());
    }
}
