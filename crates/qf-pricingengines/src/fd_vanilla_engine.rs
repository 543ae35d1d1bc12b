//! Shared machinery of the finite-difference vanilla engines.
//!
//! [`FdVanillaEngine`] owns the grid heuristics, the operator and
//! boundary-condition setup, and the Greek extraction. The concrete
//! engines compose it: the European engine runs a plain rollback, the
//! step-condition engines add an exercise clamp and a closed-form
//! control variate.

use std::sync::Arc;

use qf_core::{ensure, Real, Result, Time};
use qf_instruments::{OneAssetResults, VanillaOption};
use qf_math::SampledCurve;
use qf_methods::finite_differences::{
    bsm_operator, BoundaryCondition, BoundarySide, FiniteDifferenceModel, MixedScheme,
    StepCondition, TridiagonalOperator,
};
use qf_processes::{GeneralizedBlackScholesProcess, StochasticProcess1D};

/// Multiplicative safety zone keeping the strike strictly inside the grid.
const SAFETY_ZONE_FACTOR: Real = 1.1;

/// A fully set-up finite-difference problem: the intrinsic curve on its
/// log grid, the spatial operator, and the grid boundary conditions.
#[derive(Debug)]
pub(crate) struct FdProblem {
    pub intrinsic: SampledCurve,
    pub operator: TridiagonalOperator,
    pub conditions: Vec<BoundaryCondition>,
    pub residual_time: Time,
}

/// Grid construction, rollback, and Greek extraction shared by the
/// finite-difference engines.
#[derive(Debug, Clone)]
pub struct FdVanillaEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    time_steps: usize,
    grid_points: usize,
    time_dependent: bool,
}

impl FdVanillaEngine {
    /// Create the engine core with the given time and space resolution.
    pub fn new(
        process: Arc<GeneralizedBlackScholesProcess>,
        time_steps: usize,
        grid_points: usize,
    ) -> Self {
        Self {
            process,
            time_steps,
            grid_points,
            time_dependent: false,
        }
    }

    /// Regenerate the operator coefficients at every time step instead of
    /// freezing them at the residual time.
    pub fn with_time_dependence(mut self, time_dependent: bool) -> Self {
        self.time_dependent = time_dependent;
        self
    }

    /// The process.
    pub fn process(&self) -> &Arc<GeneralizedBlackScholesProcess> {
        &self.process
    }

    /// Number of rollback time steps.
    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// Grid bounds around `center` wide enough for the diffusion over `t`,
    /// widened asymmetrically if the strike safety zone falls outside.
    fn grid_limits(&self, center: Real, strike: Real, t: Time) -> Result<(Real, Real)> {
        ensure!(center > 0.0, "negative or null underlying value ({center})");
        let vol_sqrt_time = self
            .process
            .black_volatility()
            .black_variance(t, center)
            .sqrt();
        // short-dated grids get widened so the strike zone survives
        let prefactor = 1.0 + 0.02 / vol_sqrt_time;
        let min_max_factor = (4.0 * prefactor * vol_sqrt_time).exp();
        let mut s_min = center / min_max_factor;
        let mut s_max = center * min_max_factor;
        if s_min > strike / SAFETY_ZONE_FACTOR {
            s_min = strike / SAFETY_ZONE_FACTOR;
            s_max = s_max.max(center / s_min * center);
        }
        if s_max < strike * SAFETY_ZONE_FACTOR {
            s_max = strike * SAFETY_ZONE_FACTOR;
            s_min = s_min.min(center / s_max * center);
        }
        Ok((s_min, s_max))
    }

    /// Sample the payoff on the bounded log grid, build the spatial operator
    /// and the Neumann conditions from the intrinsic end differences.
    pub(crate) fn build_problem(&self, option: &VanillaOption) -> Result<FdProblem> {
        let residual_time = option.exercise.last_time();
        ensure!(
            residual_time > 0.0,
            "non-positive residual time ({residual_time})"
        );
        let strike = option.payoff.strike();
        ensure!(strike > 0.0, "non-positive strike ({strike})");

        let center = self.process.x0();
        let (s_min, s_max) = self.grid_limits(center, strike, residual_time)?;

        let mut intrinsic = SampledCurve::new(safe_grid_points(self.grid_points, residual_time));
        intrinsic.set_log_grid(s_min, s_max);
        intrinsic.sample(|s| option.payoff.value(s));

        let operator = bsm_operator(
            intrinsic.grid(),
            Arc::clone(&self.process),
            residual_time,
            self.time_dependent,
        );
        let n = intrinsic.size();
        let conditions = vec![
            BoundaryCondition::Neumann {
                value: intrinsic.value(1) - intrinsic.value(0),
                side: BoundarySide::Lower,
            },
            BoundaryCondition::Neumann {
                value: intrinsic.value(n - 1) - intrinsic.value(n - 2),
                side: BoundarySide::Upper,
            },
        ];

        Ok(FdProblem {
            intrinsic,
            operator,
            conditions,
            residual_time,
        })
    }

    /// Roll the intrinsic values back to today under `condition` with a
    /// Crank-Nicolson evolver, returning the solved price curve.
    pub(crate) fn rollback_prices(
        &self,
        problem: &FdProblem,
        stopping_times: Vec<Time>,
        condition: &StepCondition,
    ) -> Result<SampledCurve> {
        let evolver =
            MixedScheme::crank_nicolson(problem.operator.clone(), problem.conditions.clone());
        let mut model = FiniteDifferenceModel::new(evolver, stopping_times);
        let mut values = problem.intrinsic.values().to_vec();
        model.rollback(
            &mut values,
            problem.residual_time,
            0.0,
            self.time_steps,
            condition,
        )?;
        let mut prices = SampledCurve::with_grid(problem.intrinsic.grid().to_vec());
        prices.set_values(values);
        Ok(prices)
    }

    /// Value, delta, and gamma from the curve midpoint; theta from the
    /// pricing PDE: `θ = r·V − (r−q)·S·Δ − σ²S²Γ/2`.
    pub(crate) fn results_from_curve(&self, prices: SampledCurve, t: Time) -> OneAssetResults {
        let value = prices.value_at_center();
        let delta = prices.first_derivative_at_center();
        let gamma = prices.second_derivative_at_center();
        OneAssetResults {
            value,
            delta: Some(delta),
            gamma: Some(gamma),
            theta: Some(self.pde_theta(value, delta, gamma, t)),
            vega: None,
            rho: None,
            price_curve: Some(prices),
        }
    }

    pub(crate) fn pde_theta(&self, value: Real, delta: Real, gamma: Real, t: Time) -> Real {
        let s = self.process.x0();
        let r = self.process.risk_free_rate().zero_rate(t);
        let q = self.process.dividend_yield().zero_rate(t);
        let sigma = self.process.black_volatility().black_vol(t, s);
        r * value - (r - q) * s * delta - 0.5 * sigma * sigma * s * s * gamma
    }
}

/// The requested grid size, floored at 10 points (plus 2 per year beyond
/// the first) and forced odd so the spot lands on a single midpoint.
pub(crate) fn safe_grid_points(requested: usize, residual_time: Time) -> usize {
    let minimum = if residual_time > 1.0 {
        (10.0 + 2.0 * (residual_time - 1.0)).floor() as usize
    } else {
        10
    };
    let n = requested.max(minimum);
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use qf_instruments::{Exercise, OptionType, PlainVanillaPayoff};
    use qf_termstructures::{BlackConstantVol, FlatForward};

    fn engine(spot: Real, r: Real, sigma: Real) -> FdVanillaEngine {
        FdVanillaEngine::new(
            Arc::new(GeneralizedBlackScholesProcess::new(
                spot,
                Arc::new(FlatForward::new(r)),
                Arc::new(FlatForward::new(0.0)),
                Arc::new(BlackConstantVol::new(sigma)),
            )),
            10,
            100,
        )
    }

    #[test]
    fn grid_limits_reject_non_positive_center() {
        let e = engine(100.0, 0.05, 0.20);
        assert!(e.grid_limits(0.0, 100.0, 1.0).is_err());
        assert!(e.grid_limits(-5.0, 100.0, 1.0).is_err());
    }

    #[test]
    fn grid_limits_bracket_the_center() {
        let e = engine(100.0, 0.05, 0.20);
        let (lo, hi) = e.grid_limits(100.0, 100.0, 1.0).unwrap();
        assert!(lo < 100.0 && hi > 100.0, "({lo}, {hi})");
    }

    #[test]
    fn far_strike_widens_the_grid_asymmetrically() {
        let e = engine(100.0, 0.05, 0.20);
        let (near_lo, near_hi) = e.grid_limits(100.0, 100.0, 1.0).unwrap();
        let (lo, hi) = e.grid_limits(100.0, 300.0, 1.0).unwrap();
        assert!(hi >= 300.0 * SAFETY_ZONE_FACTOR);
        assert!(lo <= near_lo && hi > near_hi, "({lo}, {hi})");
    }

    #[test]
    fn safe_grid_points_floors_and_stays_odd() {
        assert_eq!(safe_grid_points(4, 0.5), 11);
        assert_eq!(safe_grid_points(100, 1.0), 101);
        assert_eq!(safe_grid_points(101, 1.0), 101);
        // 10 + 2·(6−1) = 20 → odd
        assert_eq!(safe_grid_points(4, 6.0), 21);
    }

    #[test]
    fn problem_samples_the_payoff_on_the_grid() {
        let e = engine(36.0, 0.06, 0.20);
        let option = VanillaOption::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Put, 40.0)),
            Exercise::european(1.0),
        );
        let problem = e.build_problem(&option).unwrap();
        assert_eq!(problem.intrinsic.size(), 101);
        for i in 0..problem.intrinsic.size() {
            let s = problem.intrinsic.grid_value(i);
            assert_eq!(problem.intrinsic.value(i), (40.0 - s).max(0.0));
        }
    }

    proptest! {
        #[test]
        fn grid_always_captures_the_strike(
            spot in 10.0..500.0_f64,
            strike in 10.0..500.0_f64,
            sigma in 0.05..0.8_f64,
            t in 0.1..5.0_f64,
        ) {
            let e = engine(spot, 0.05, sigma);
            let (lo, hi) = e.grid_limits(spot, strike, t).unwrap();
            prop_assert!(lo < strike && strike < hi, "strike {} outside ({}, {})", strike, lo, hi);
            prop_assert!(lo < spot && spot < hi);
        }
    }
}
