//! Grid construction helpers.
//!
//! * [`bounded_log_grid`] — a log-spaced grid over `[min, max]`, the spatial
//!   grid of the finite-difference engines.
//! * [`TransformedGrid`] / [`LogGrid`] — a grid together with the spacing of
//!   its transformed image, consumed by the PDE operator builders.

use qf_core::Real;

/// Build a log-spaced grid of `steps + 1` points over `[min, max]`.
///
/// Both bounds must be positive and strictly ordered.
pub fn bounded_log_grid(min: Real, max: Real, steps: usize) -> Vec<Real> {
    assert!(min > 0.0 && max > min, "invalid log grid bounds [{min}, {max}]");
    assert!(steps > 0, "log grid needs at least one step");
    let gridlogspacing = (max.ln() - min.ln()) / steps as Real;
    let edx = gridlogspacing.exp();
    let mut grid = Vec::with_capacity(steps + 1);
    let mut x = min;
    for _ in 0..=steps {
        grid.push(x);
        x *= edx;
    }
    grid
}

/// A grid paired with the spacing of its image under a coordinate transform.
///
/// `dxm[i]` / `dxp[i]` are the backward / forward spacings of the transformed
/// grid at interior point `i`; `dx[i] = dxm[i] + dxp[i]`. Boundary entries
/// are unused and left at zero.
#[derive(Debug, Clone)]
pub struct TransformedGrid {
    grid: Vec<Real>,
    transformed: Vec<Real>,
    dxm: Vec<Real>,
    dxp: Vec<Real>,
    dx: Vec<Real>,
}

impl TransformedGrid {
    /// Transform `grid` point-wise by `f` and precompute spacings.
    pub fn new(grid: Vec<Real>, f: impl Fn(Real) -> Real) -> Self {
        let transformed: Vec<Real> = grid.iter().map(|&x| f(x)).collect();
        let n = grid.len();
        let mut dxm = vec![0.0; n];
        let mut dxp = vec![0.0; n];
        let mut dx = vec![0.0; n];
        for i in 1..n.saturating_sub(1) {
            dxm[i] = transformed[i] - transformed[i - 1];
            dxp[i] = transformed[i + 1] - transformed[i];
            dx[i] = dxm[i] + dxp[i];
        }
        Self { grid, transformed, dxm, dxp, dx }
    }

    /// Number of grid points.
    pub fn size(&self) -> usize {
        self.grid.len()
    }

    /// Untransformed grid value at `i`.
    pub fn grid(&self, i: usize) -> Real {
        self.grid[i]
    }

    /// Transformed grid value at `i`.
    pub fn transformed_grid(&self, i: usize) -> Real {
        self.transformed[i]
    }

    /// Backward spacing of the transformed grid at interior point `i`.
    pub fn dxm(&self, i: usize) -> Real {
        self.dxm[i]
    }

    /// Forward spacing of the transformed grid at interior point `i`.
    pub fn dxp(&self, i: usize) -> Real {
        self.dxp[i]
    }

    /// Total spacing `dxm + dxp` at interior point `i`.
    pub fn dx(&self, i: usize) -> Real {
        self.dx[i]
    }
}

/// A [`TransformedGrid`] under the natural logarithm.
#[derive(Debug, Clone)]
pub struct LogGrid(TransformedGrid);

impl LogGrid {
    /// Log-transform `grid` (all entries must be positive).
    pub fn new(grid: Vec<Real>) -> Self {
        Self(TransformedGrid::new(grid, Real::ln))
    }
}

impl std::ops::Deref for LogGrid {
    type Target = TransformedGrid;

    fn deref(&self) -> &TransformedGrid {
        &self.0
    }
}
