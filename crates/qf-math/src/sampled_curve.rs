//! A curve sampled on a spatial grid.
//!
//! `SampledCurve` owns a grid and the values of a function sampled on it.
//! The finite-difference engines use it both for the intrinsic (payoff)
//! curve and for the rolled-back price curve; value, delta, and gamma are
//! read off the center of the grid.

use crate::grid::bounded_log_grid;
use qf_core::Real;

/// An ordered sequence of `(x, f(x))` pairs over a spatial grid.
///
/// The grid is strictly increasing; engines build odd-sized grids so that
/// the center accessors land on a single midpoint, but even sizes are
/// supported by averaging the two middle points.
#[derive(Debug, Clone)]
pub struct SampledCurve {
    grid: Vec<Real>,
    values: Vec<Real>,
}

impl SampledCurve {
    /// Create an empty curve of `grid_size` points (all zeros).
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid: vec![0.0; grid_size],
            values: vec![0.0; grid_size],
        }
    }

    /// Create a curve over an existing grid, values zeroed.
    pub fn with_grid(grid: Vec<Real>) -> Self {
        let n = grid.len();
        Self {
            grid,
            values: vec![0.0; n],
        }
    }

    /// Number of grid points.
    pub fn size(&self) -> usize {
        self.grid.len()
    }

    /// `true` if the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// The grid.
    pub fn grid(&self) -> &[Real] {
        &self.grid
    }

    /// The sampled values.
    pub fn values(&self) -> &[Real] {
        &self.values
    }

    /// Mutable access to the sampled values.
    pub fn values_mut(&mut self) -> &mut Vec<Real> {
        &mut self.values
    }

    /// Grid point at `i`.
    pub fn grid_value(&self, i: usize) -> Real {
        self.grid[i]
    }

    /// Sampled value at `i`.
    pub fn value(&self, i: usize) -> Real {
        self.values[i]
    }

    /// Replace the sampled values (length must match the grid).
    pub fn set_values(&mut self, values: Vec<Real>) {
        assert_eq!(
            values.len(),
            self.grid.len(),
            "value/grid size mismatch in sampled curve"
        );
        self.values = values;
    }

    /// Reset the grid to a log-spaced grid over `[min, max]`, keeping the
    /// current size. Values are left untouched and should be resampled.
    pub fn set_log_grid(&mut self, min: Real, max: Real) {
        self.grid = bounded_log_grid(min, max, self.size() - 1);
    }

    /// Sample `f` at every grid point.
    pub fn sample(&mut self, f: impl Fn(Real) -> Real) {
        for (v, &x) in self.values.iter_mut().zip(self.grid.iter()) {
            *v = f(x);
        }
    }

    /// Value at the grid midpoint.
    pub fn value_at_center(&self) -> Real {
        assert!(!self.is_empty(), "empty sampled curve");
        let jmid = self.size() / 2;
        if self.size() % 2 != 0 {
            self.values[jmid]
        } else {
            (self.values[jmid] + self.values[jmid - 1]) / 2.0
        }
    }

    /// First derivative at the grid midpoint (centered difference).
    pub fn first_derivative_at_center(&self) -> Real {
        assert!(self.size() >= 3, "curve must have at least 3 points");
        let jmid = self.size() / 2;
        if self.size() % 2 != 0 {
            (self.values[jmid + 1] - self.values[jmid - 1])
                / (self.grid[jmid + 1] - self.grid[jmid - 1])
        } else {
            (self.values[jmid] - self.values[jmid - 1])
                / (self.grid[jmid] - self.grid[jmid - 1])
        }
    }

    /// Second derivative at the grid midpoint (centered difference of
    /// one-sided slopes).
    pub fn second_derivative_at_center(&self) -> Real {
        assert!(self.size() >= 4, "curve must have at least 4 points");
        let jmid = self.size() / 2;
        if self.size() % 2 != 0 {
            let delta_plus = (self.values[jmid + 1] - self.values[jmid])
                / (self.grid[jmid + 1] - self.grid[jmid]);
            let delta_minus = (self.values[jmid] - self.values[jmid - 1])
                / (self.grid[jmid] - self.grid[jmid - 1]);
            let ds = (self.grid[jmid + 1] - self.grid[jmid - 1]) / 2.0;
            (delta_plus - delta_minus) / ds
        } else {
            let delta_plus = (self.values[jmid + 1] - self.values[jmid - 1])
                / (self.grid[jmid + 1] - self.grid[jmid - 1]);
            let delta_minus = (self.values[jmid] - self.values[jmid - 2])
                / (self.grid[jmid] - self.grid[jmid - 2]);
            (delta_plus - delta_minus) / (self.grid[jmid] - self.grid[jmid - 1])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn quadratic_curve(n: usize) -> SampledCurve {
        // f(x) = x² on a log grid around 100: exact value/derivatives known
        let mut c = SampledCurve::new(n);
        c.set_log_grid(50.0, 200.0);
        c.sample(|x| x * x);
        c
    }

    #[test]
    fn sample_and_center_value_odd() {
        let c = quadratic_curve(11);
        let jmid = 5;
        assert_abs_diff_eq!(c.value_at_center(), c.grid()[jmid] * c.grid()[jmid], epsilon = 1e-9);
    }

    #[test]
    fn center_value_even_averages_middle_points() {
        let mut c = SampledCurve::new(4);
        c.set_log_grid(1.0, 8.0);
        c.sample(|x| x);
        let expected = (c.grid()[2] + c.grid()[1]) / 2.0;
        assert_abs_diff_eq!(c.value_at_center(), expected, epsilon = 1e-12);
    }

    #[test]
    fn first_derivative_of_quadratic() {
        let c = quadratic_curve(101);
        let center = c.grid()[50];
        // d/dx x² = 2x; centered difference on a smooth grid is close
        assert_abs_diff_eq!(c.first_derivative_at_center(), 2.0 * center, epsilon = 0.05);
    }

    #[test]
    fn second_derivative_of_quadratic() {
        let c = quadratic_curve(101);
        // d²/dx² x² = 2
        assert_abs_diff_eq!(c.second_derivative_at_center(), 2.0, epsilon = 0.05);
    }

    #[test]
    fn log_grid_is_strictly_increasing() {
        let c = quadratic_curve(21);
        for w in c.grid().windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    #[should_panic(expected = "size mismatch")]
    fn set_values_length_checked() {
        let mut c = SampledCurve::new(5);
        c.set_values(vec![1.0; 4]);
    }
}
