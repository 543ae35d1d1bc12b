//! Recombining trinomial tree.
//!
//! The state space is additive, `x = x0 + j·dx`, with per-layer spacing
//! `dx = σ√(3Δt)`; each node branches to the three nodes nearest its
//! conditional expectation. The diffusion term must be independent of the
//! process value (additive noise).
//!
//! The branch probabilities are validated into `[0, 1]`; a violation is
//! surfaced as `Error::InvalidProbability` rather than silently carried
//! through the backward induction.

use qf_core::{Error, Real, Result, Size, Time};
use qf_processes::StochasticProcess1D;

use super::time_grid::TimeGrid;
use super::tree::Tree;

/// Branching data for a single time step.
#[derive(Debug, Clone)]
struct Branching {
    /// Central descendant offset for each node.
    k: Vec<i32>,
    /// Probabilities (0=down, 1=mid, 2=up) for each node.
    probs: [Vec<Real>; 3],
    /// Descendant offset range, defining the width of the next layer.
    j_min: i32,
    j_max: i32,
}

impl Branching {
    fn new() -> Self {
        Self {
            k: Vec::new(),
            probs: [Vec::new(), Vec::new(), Vec::new()],
            j_min: i32::MAX,
            j_max: i32::MIN,
        }
    }

    fn add(&mut self, shift: i32, p_down: Real, p_mid: Real, p_up: Real) {
        self.k.push(shift);
        self.probs[0].push(p_down);
        self.probs[1].push(p_mid);
        self.probs[2].push(p_up);
        self.j_min = self.j_min.min(shift - 1);
        self.j_max = self.j_max.max(shift + 1);
    }

    fn size(&self) -> Size {
        (self.j_max - self.j_min + 1) as Size
    }

    fn descendant(&self, index: Size, branch: Size) -> Size {
        (self.k[index] - self.j_min - 1 + branch as i32) as Size
    }

    fn probability(&self, index: Size, branch: Size) -> Real {
        self.probs[branch][index]
    }
}

/// The three branch probabilities for a standardized residual `e` and
/// one-step variance `v2`.
fn branch_probabilities(e: Real, v2: Real) -> Result<(Real, Real, Real)> {
    let v = v2.sqrt();
    let e2 = e * e;
    let e3 = e * 3.0_f64.sqrt();
    let p_down = (1.0 + e2 / v2 - e3 / v) / 6.0;
    let p_mid = (2.0 - e2 / v2) / 3.0;
    let p_up = (1.0 + e2 / v2 + e3 / v) / 6.0;
    for (p, name) in [(p_down, "down"), (p_mid, "mid"), (p_up, "up")] {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::InvalidProbability {
                value: p,
                context: format!("trinomial {name} branch, residual {e:e}"),
            });
        }
    }
    Ok((p_down, p_mid, p_up))
}

/// A recombining trinomial tree approximating a 1-D stochastic process.
#[derive(Debug, Clone)]
pub struct TrinomialTree {
    x0: Real,
    /// `dx[0] = 0` for the root layer; `dx[i]` for layer `i ≥ 1`.
    dx: Vec<Real>,
    branchings: Vec<Branching>,
    time_grid: TimeGrid,
}

impl TrinomialTree {
    /// Build a trinomial tree over `grid`.
    ///
    /// The process variance must be independent of the state variable.
    pub fn new(process: &dyn StochasticProcess1D, grid: &TimeGrid) -> Result<Self> {
        let x0 = process.x0();
        let n = grid.steps();
        assert!(n > 0, "need at least one time step");

        let mut dx: Vec<Real> = vec![0.0];
        let mut branchings = Vec::with_capacity(n);
        let mut j_min = 0i32;
        let mut j_max = 0i32;

        for i in 0..n {
            let t = grid.time(i);
            let dt = grid.dt(i);

            // additive noise: the variance does not depend on the node value
            let v2 = process.variance(t, x0, dt);
            let dx_next = v2.sqrt() * 3.0_f64.sqrt();
            dx.push(dx_next);

            let mut branching = Branching::new();
            for j in j_min..=j_max {
                let x = x0 + j as Real * dx[i];
                let m = process.expectation(t, x, dt);
                let k = ((m - x0) / dx_next + 0.5).floor() as i32;
                let e = m - (x0 + k as Real * dx_next);
                let (p_down, p_mid, p_up) = branch_probabilities(e, v2)?;
                branching.add(k, p_down, p_mid, p_up);
            }
            j_min = branching.j_min;
            j_max = branching.j_max;
            branchings.push(branching);
        }

        Ok(Self {
            x0,
            dx,
            branchings,
            time_grid: grid.clone(),
        })
    }

    /// Build a trinomial tree with a uniform time grid.
    pub fn uniform(process: &dyn StochasticProcess1D, end: Time, steps: Size) -> Result<Self> {
        let grid = TimeGrid::uniform(end, steps);
        Self::new(process, &grid)
    }

    /// Number of time steps.
    pub fn steps(&self) -> Size {
        self.time_grid.steps()
    }

    /// The time grid the tree was built on.
    pub fn time_grid(&self) -> &TimeGrid {
        &self.time_grid
    }
}

impl Tree for TrinomialTree {
    fn branches(&self) -> Size {
        3
    }

    fn size(&self, i: Size) -> Size {
        if i == 0 {
            1
        } else {
            self.branchings[i - 1].size()
        }
    }

    fn underlying(&self, i: Size, index: Size) -> Real {
        if i == 0 {
            self.x0
        } else {
            let j_min = self.branchings[i - 1].j_min;
            self.x0 + (j_min as Real + index as Real) * self.dx[i]
        }
    }

    fn descendant(&self, i: Size, index: Size, branch: Size) -> Size {
        self.branchings[i].descendant(index, branch)
    }

    fn probability(&self, i: Size, index: Size, branch: Size) -> Real {
        self.branchings[i].probability(index, branch)
    }
}
