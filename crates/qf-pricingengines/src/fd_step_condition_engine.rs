//! Finite-difference engines with a per-step exercise condition.
//!
//! Both engines run two rollbacks on the same grid, one with the exercise
//! clamp and one unconstrained, and correct value, delta, and gamma with
//! the closed-form European solution as a control variate:
//!
//! ```text
//! greek = FD(condition) − FD(unconstrained) + analytic
//! ```

use std::sync::Arc;

use qf_core::{ensure, Result, Time};
use qf_instruments::{OneAssetResults, PricingEngine, VanillaOption};
use qf_methods::finite_differences::{CurveReference, StepCondition};
use qf_processes::{GeneralizedBlackScholesProcess, StochasticProcess1D};

use crate::analytic_european::black_scholes_merton;
use crate::fd_vanilla_engine::{FdProblem, FdVanillaEngine};

/// Finite-difference engine for American vanilla options.
#[derive(Debug)]
pub struct FdAmericanEngine {
    core: FdVanillaEngine,
}

impl FdAmericanEngine {
    /// Create an engine with the given time and space resolution.
    pub fn new(
        process: Arc<GeneralizedBlackScholesProcess>,
        time_steps: usize,
        grid_points: usize,
    ) -> Self {
        Self {
            core: FdVanillaEngine::new(process, time_steps, grid_points),
        }
    }
}

impl PricingEngine for FdAmericanEngine {
    fn calculate(&self, option: &VanillaOption) -> Result<OneAssetResults> {
        ensure!(
            option.exercise.is_early_exercise(),
            "this engine handles early-exercise contracts only"
        );
        let problem = self.core.build_problem(option)?;
        let condition = StepCondition::American {
            intrinsic: CurveReference::Values(problem.intrinsic.values().to_vec()),
        };
        step_condition_results(&self.core, option, &problem, &condition)
    }
}

/// Finite-difference engine for shout options.
///
/// The holder locks in the intrinsic value when shouting; the clamp
/// reference is the intrinsic curve discounted back from the step time to
/// the reset time at the risk-free rate.
#[derive(Debug)]
pub struct FdShoutEngine {
    core: FdVanillaEngine,
}

impl FdShoutEngine {
    /// Create an engine with the given time and space resolution.
    pub fn new(
        process: Arc<GeneralizedBlackScholesProcess>,
        time_steps: usize,
        grid_points: usize,
    ) -> Self {
        Self {
            core: FdVanillaEngine::new(process, time_steps, grid_points),
        }
    }

    fn shout_condition(&self, problem: &FdProblem, reset_time: Time) -> StepCondition {
        let rate = self
            .core
            .process()
            .risk_free_rate()
            .zero_rate(problem.residual_time);
        StepCondition::Shout {
            reset_time,
            rate,
            intrinsic: CurveReference::Values(problem.intrinsic.values().to_vec()),
        }
    }
}

impl PricingEngine for FdShoutEngine {
    fn calculate(&self, option: &VanillaOption) -> Result<OneAssetResults> {
        ensure!(
            option.exercise.is_early_exercise(),
            "this engine handles early-exercise contracts only"
        );
        let problem = self.core.build_problem(option)?;
        let condition = self.shout_condition(&problem, 0.0);
        step_condition_results(&self.core, option, &problem, &condition)
    }
}

/// Two rollbacks plus the closed-form control variate.
fn step_condition_results(
    core: &FdVanillaEngine,
    option: &VanillaOption,
    problem: &FdProblem,
    condition: &StepCondition,
) -> Result<OneAssetResults> {
    let constrained = core.rollback_prices(problem, vec![], condition)?;
    let unconstrained = core.rollback_prices(problem, vec![], &StepCondition::Null)?;

    let t = problem.residual_time;
    let process = core.process();
    let spot = process.x0();
    let strike = option.payoff.strike();
    let r = process.risk_free_rate().zero_rate(t);
    let q = process.dividend_yield().zero_rate(t);
    let sigma = process.black_volatility().black_vol(t, strike);
    let (an_value, an_delta, an_gamma, ..) =
        black_scholes_merton(option.payoff.option_type(), spot, strike, r, q, sigma, t);

    let value = constrained.value_at_center() - unconstrained.value_at_center() + an_value;
    let delta = constrained.first_derivative_at_center()
        - unconstrained.first_derivative_at_center()
        + an_delta;
    let gamma = constrained.second_derivative_at_center()
        - unconstrained.second_derivative_at_center()
        + an_gamma;

    Ok(OneAssetResults {
        value,
        delta: Some(delta),
        gamma: Some(gamma),
        theta: Some(core.pde_theta(value, delta, gamma, t)),
        vega: None,
        rho: None,
        price_curve: Some(constrained),
    })
}
