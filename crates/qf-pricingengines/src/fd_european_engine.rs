//! Finite-difference engine for European vanilla options.

use std::sync::Arc;

use qf_core::{ensure, Result};
use qf_instruments::{OneAssetResults, PricingEngine, VanillaOption};
use qf_methods::finite_differences::StepCondition;
use qf_processes::GeneralizedBlackScholesProcess;

use crate::fd_vanilla_engine::FdVanillaEngine;

/// Prices European vanilla options by Crank-Nicolson rollback of the
/// payoff on a bounded log grid.
#[derive(Debug)]
pub struct FdEuropeanEngine {
    core: FdVanillaEngine,
}

impl FdEuropeanEngine {
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

    /// Regenerate the operator coefficients at every time step.
    pub fn with_time_dependence(mut self, time_dependent: bool) -> Self {
        self.core = self.core.with_time_dependence(time_dependent);
        self
    }
}

impl PricingEngine for FdEuropeanEngine {
    fn calculate(&self, option: &VanillaOption) -> Result<OneAssetResults> {
        ensure!(
            !option.exercise.is_early_exercise(),
            "this engine handles European exercise only"
        );
        let problem = self.core.build_problem(option)?;
        let prices = self
            .core
            .rollback_prices(&problem, vec![], &StepCondition::Null)?;
        Ok(self.core.results_from_curve(prices, problem.residual_time))
    }
}
