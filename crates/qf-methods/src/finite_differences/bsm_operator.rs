//! Black-Scholes-Merton spatial operator.
//!
//! Bridges the continuous PDE coefficients (diffusion, drift, discount rate)
//! to the discrete tridiagonal operator on a log-transformed grid. The
//! interior rows are
//!
//! ```text
//! pd = -(σ²/dxm - ν)/dx,   pm = σ²/(dxm·dxp) + r,   pu = -(σ²/dxp + ν)/dx
//! ```
//!
//! with σ and ν = r − q − σ²/2 the log-space diffusion and drift.

use std::sync::Arc;

use qf_core::{Real, Time};
use qf_math::LogGrid;
use qf_processes::{GeneralizedBlackScholesProcess, StochasticProcess1D};

use super::tridiagonal_operator::{TimeSetter, TridiagonalOperator};

/// Log-space PDE coefficients derived from a price-level process.
#[derive(Debug, Clone)]
pub struct PdeBsm {
    process: Arc<GeneralizedBlackScholesProcess>,
}

impl PdeBsm {
    /// Wrap a process.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self { process }
    }

    /// The wrapped process.
    pub fn process(&self) -> &Arc<GeneralizedBlackScholesProcess> {
        &self.process
    }

    /// Log-space diffusion `σ(t, x)`.
    pub fn diffusion(&self, t: Time, x: Real) -> Real {
        self.process.diffusion(t, x) / x
    }

    /// Log-space drift `ν(t, x) = r − q − σ²/2`.
    pub fn drift(&self, t: Time, x: Real) -> Real {
        self.process.drift(t, x) / x
    }

    /// Discount rate `r(t)`.
    pub fn discount(&self, t: Time, _x: Real) -> Real {
        self.process.forward_rate(t)
    }

    /// Fill the interior rows of `op` for time `t` on `grid`.
    pub fn generate_operator(&self, t: Time, grid: &LogGrid, op: &mut TridiagonalOperator) {
        for i in 1..grid.size() - 1 {
            let x = grid.grid(i);
            let sigma = self.diffusion(t, x);
            let nu = self.drift(t, x);
            let r = self.discount(t, x);
            set_pde_row(op, grid, i, sigma, nu, r);
        }
    }
}

fn set_pde_row(
    op: &mut TridiagonalOperator,
    grid: &LogGrid,
    i: usize,
    sigma: Real,
    nu: Real,
    r: Real,
) {
    let sigma2 = sigma * sigma;
    let pd = -(sigma2 / grid.dxm(i) - nu) / grid.dx(i);
    let pu = -(sigma2 / grid.dxp(i) + nu) / grid.dx(i);
    let pm = sigma2 / (grid.dxm(i) * grid.dxp(i)) + r;
    op.set_mid_row(i, pd, pm, pu);
}

/// Time setter regenerating the rows from the PDE at each step.
#[derive(Debug)]
struct BsmTimeSetter {
    grid: LogGrid,
    pde: PdeBsm,
}

impl TimeSetter for BsmTimeSetter {
    fn set_time(&self, t: Time, op: &mut TridiagonalOperator) {
        self.pde.generate_operator(t, &self.grid, op);
    }
}

/// Build the BSM spatial operator on `grid`.
///
/// With `time_dependent` the operator carries a time setter and regenerates
/// its rows at every step; otherwise the coefficients are sampled once at
/// `(residual_time, x0)` and frozen.
pub fn bsm_operator(
    grid: &[Real],
    process: Arc<GeneralizedBlackScholesProcess>,
    residual_time: Time,
    time_dependent: bool,
) -> TridiagonalOperator {
    let log_grid = LogGrid::new(grid.to_vec());
    let pde = PdeBsm::new(process);
    let mut op = TridiagonalOperator::new(grid.len());
    if time_dependent {
        let setter = Arc::new(BsmTimeSetter {
            grid: log_grid,
            pde,
        });
        op.set_time_setter(setter);
        op.set_time(residual_time);
    } else {
        let x0 = pde.process().x0();
        let sigma = pde.diffusion(residual_time, x0);
        let nu = pde.drift(residual_time, x0);
        let r = pde.discount(residual_time, x0);
        for i in 1..log_grid.size() - 1 {
            set_pde_row(&mut op, &log_grid, i, sigma, nu, r);
        }
    }
    op
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qf_math::bounded_log_grid;
    use qf_termstructures::{BlackConstantVol, FlatForward};

    fn process(r: Real, q: Real, sigma: Real) -> Arc<GeneralizedBlackScholesProcess> {
        Arc::new(GeneralizedBlackScholesProcess::new(
            100.0,
            Arc::new(FlatForward::new(r)),
            Arc::new(FlatForward::new(q)),
            Arc::new(BlackConstantVol::new(sigma)),
        ))
    }

    #[test]
    fn log_space_coefficients_shed_the_level() {
        let pde = PdeBsm::new(process(0.05, 0.01, 0.20));
        assert_abs_diff_eq!(pde.diffusion(0.5, 80.0), 0.20, epsilon = 1e-14);
        assert_abs_diff_eq!(pde.diffusion(0.5, 120.0), 0.20, epsilon = 1e-14);
        assert_abs_diff_eq!(pde.drift(0.5, 80.0), 0.05 - 0.01 - 0.02, epsilon = 1e-14);
    }

    #[test]
    fn interior_row_sums_equal_the_discount_rate() {
        // on a uniform log grid the diffusion terms cancel in the row sum
        let grid = bounded_log_grid(50.0, 200.0, 20);
        let op = bsm_operator(&grid, process(0.06, 0.0, 0.20), 1.0, false);
        let ones = vec![1.0; grid.len()];
        let row_sums = op.apply_to(&ones).unwrap();
        for &s in &row_sums[1..row_sums.len() - 1] {
            assert_abs_diff_eq!(s, 0.06, epsilon = 1e-10);
        }
    }

    #[test]
    fn constant_and_term_operator_rows_agree_for_flat_inputs() {
        let grid = bounded_log_grid(50.0, 200.0, 10);
        let constant = bsm_operator(&grid, process(0.05, 0.0, 0.25), 1.0, false);
        let term = bsm_operator(&grid, process(0.05, 0.0, 0.25), 1.0, true);
        let v: Vec<Real> = grid.iter().map(|s| (s - 100.0).max(0.0)).collect();
        let a = constant.apply_to(&v).unwrap();
        let b = term.apply_to(&v).unwrap();
        for i in 1..grid.len() - 1 {
            assert_abs_diff_eq!(a[i], b[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn term_operator_is_time_dependent() {
        let grid = bounded_log_grid(50.0, 200.0, 10);
        let op = bsm_operator(&grid, process(0.05, 0.0, 0.25), 1.0, true);
        assert!(op.is_time_dependent());
        assert!(!bsm_operator(&grid, process(0.05, 0.0, 0.25), 1.0, false).is_time_dependent());
    }
}
