//! Tridiagonal operator with a Thomas-algorithm solver.
//!
//! Represents a linear operator over a 1-D state vector as three bands
//! (sub/main/super diagonal). This is the discrete form of a second-order
//! spatial differential operator; boundary conditions rewrite the first and
//! last rows, and the theta schemes compose operators via `add`/`multiply`.

use std::sync::Arc;

use qf_core::{Error, Real, Result, Time};

/// Near-zero pivot threshold for the Thomas solve.
const PIVOT_TOLERANCE: Real = 1e-30;

/// Regenerates the operator bands from PDE coefficients at a given time.
///
/// Attached to a [`TridiagonalOperator`] when the coefficients (diffusion,
/// drift, discount rate) vary with time.
pub trait TimeSetter: std::fmt::Debug + Send + Sync {
    /// Rewrite the mid rows of `op` for time `t`.
    fn set_time(&self, t: Time, op: &mut TridiagonalOperator);
}

/// A tridiagonal matrix operator.
///
/// Band lengths satisfy `lower.len() == diag.len() - 1 == upper.len()`;
/// size 0 is the degenerate empty operator.
#[derive(Clone)]
pub struct TridiagonalOperator {
    lower: Vec<Real>,
    diag: Vec<Real>,
    upper: Vec<Real>,
    time_setter: Option<Arc<dyn TimeSetter>>,
}

impl std::fmt::Debug for TridiagonalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TridiagonalOperator")
            .field("lower", &self.lower)
            .field("diag", &self.diag)
            .field("upper", &self.upper)
            .field("time_dependent", &self.time_setter.is_some())
            .finish()
    }
}

impl TridiagonalOperator {
    /// Create a zero operator of size `n`.
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![0.0; n.saturating_sub(1)],
            diag: vec![0.0; n],
            upper: vec![0.0; n.saturating_sub(1)],
            time_setter: None,
        }
    }

    /// Create an operator from explicit bands.
    ///
    /// # Panics
    ///
    /// Panics if the band lengths are inconsistent.
    pub fn from_bands(lower: Vec<Real>, diag: Vec<Real>, upper: Vec<Real>) -> Self {
        assert_eq!(lower.len(), diag.len().saturating_sub(1), "lower band length");
        assert_eq!(upper.len(), diag.len().saturating_sub(1), "upper band length");
        Self {
            lower,
            diag,
            upper,
            time_setter: None,
        }
    }

    /// The identity operator of size `n`.
    pub fn identity(n: usize) -> Self {
        let mut op = Self::new(n);
        for d in &mut op.diag {
            *d = 1.0;
        }
        op
    }

    /// Size (number of rows/columns).
    pub fn size(&self) -> usize {
        self.diag.len()
    }

    /// Overwrite the first row: `diag[0] = b`, `upper[0] = c`.
    pub fn set_first_row(&mut self, b: Real, c: Real) {
        self.diag[0] = b;
        self.upper[0] = c;
    }

    /// Overwrite an interior row `i` (0 < i < n-1).
    ///
    /// # Panics
    ///
    /// Panics if `i` is a boundary row.
    pub fn set_mid_row(&mut self, i: usize, a: Real, b: Real, c: Real) {
        assert!(
            i >= 1 && i + 1 < self.size(),
            "mid row index {i} out of range for size {}",
            self.size()
        );
        self.lower[i - 1] = a;
        self.diag[i] = b;
        self.upper[i] = c;
    }

    /// Overwrite all interior rows with the same coefficients.
    pub fn set_mid_rows(&mut self, a: Real, b: Real, c: Real) {
        for i in 1..self.size().saturating_sub(1) {
            self.lower[i - 1] = a;
            self.diag[i] = b;
            self.upper[i] = c;
        }
    }

    /// Overwrite the last row: `lower[n-2] = a`, `diag[n-1] = b`.
    pub fn set_last_row(&mut self, a: Real, b: Real) {
        let n = self.size();
        self.lower[n - 2] = a;
        self.diag[n - 1] = b;
    }

    /// Apply the operator: `y[i] = lower[i-1]·x[i-1] + diag[i]·x[i] + upper[i]·x[i+1]`,
    /// boundary rows using only the terms that exist.
    pub fn apply_to(&self, x: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        if x.len() != n {
            return Err(Error::IncompatibleSize {
                left: n,
                right: x.len(),
            });
        }
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut y = vec![0.0; n];
        if n == 1 {
            y[0] = self.diag[0] * x[0];
            return Ok(y);
        }
        y[0] = self.diag[0] * x[0] + self.upper[0] * x[1];
        for i in 1..n - 1 {
            y[i] = self.lower[i - 1] * x[i - 1] + self.diag[i] * x[i] + self.upper[i] * x[i + 1];
        }
        y[n - 1] = self.lower[n - 2] * x[n - 2] + self.diag[n - 1] * x[n - 1];
        Ok(y)
    }

    /// Solve `L·x = rhs` with the Thomas algorithm (forward elimination,
    /// back substitution).
    pub fn solve_for(&self, rhs: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        if rhs.len() != n {
            return Err(Error::IncompatibleSize {
                left: n,
                right: rhs.len(),
            });
        }
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        let mut pivot = self.diag[0];
        if pivot.abs() < PIVOT_TOLERANCE {
            return Err(Error::SingularSystem { row: 0, pivot });
        }
        if n > 1 {
            c_prime[0] = self.upper[0] / pivot;
        }
        d_prime[0] = rhs[0] / pivot;

        for i in 1..n {
            pivot = self.diag[i] - self.lower[i - 1] * c_prime[i - 1];
            if pivot.abs() < PIVOT_TOLERANCE {
                return Err(Error::SingularSystem { row: i, pivot });
            }
            if i < n - 1 {
                c_prime[i] = self.upper[i] / pivot;
            }
            d_prime[i] = (rhs[i] - self.lower[i - 1] * d_prime[i - 1]) / pivot;
        }

        let mut x = vec![0.0; n];
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }
        Ok(x)
    }

    /// Element-wise sum `self + other`.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_size(other)?;
        Ok(Self {
            lower: zip_with(&self.lower, &other.lower, |a, b| a + b),
            diag: zip_with(&self.diag, &other.diag, |a, b| a + b),
            upper: zip_with(&self.upper, &other.upper, |a, b| a + b),
            time_setter: None,
        })
    }

    /// Element-wise difference `self - other`.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.check_size(other)?;
        Ok(Self {
            lower: zip_with(&self.lower, &other.lower, |a, b| a - b),
            diag: zip_with(&self.diag, &other.diag, |a, b| a - b),
            upper: zip_with(&self.upper, &other.upper, |a, b| a - b),
            time_setter: None,
        })
    }

    /// Scale all entries by `factor`.
    pub fn multiply(&self, factor: Real) -> Self {
        Self {
            lower: self.lower.iter().map(|v| v * factor).collect(),
            diag: self.diag.iter().map(|v| v * factor).collect(),
            upper: self.upper.iter().map(|v| v * factor).collect(),
            time_setter: None,
        }
    }

    /// Scale all entries by `1/divisor`.
    pub fn divide(&self, divisor: Real) -> Self {
        self.multiply(1.0 / divisor)
    }

    fn check_size(&self, other: &Self) -> Result<()> {
        if self.size() != other.size() {
            return Err(Error::IncompatibleSize {
                left: self.size(),
                right: other.size(),
            });
        }
        Ok(())
    }

    /// Attach a time setter, making the operator time-dependent.
    pub fn set_time_setter(&mut self, setter: Arc<dyn TimeSetter>) {
        self.time_setter = Some(setter);
    }

    /// Whether the bands vary with time.
    pub fn is_time_dependent(&self) -> bool {
        self.time_setter.is_some()
    }

    /// Regenerate the bands for time `t` (no-op without a time setter).
    pub fn set_time(&mut self, t: Time) {
        if let Some(setter) = self.time_setter.clone() {
            setter.set_time(t, self);
        }
    }
}

fn zip_with(a: &[Real], b: &[Real], f: impl Fn(Real, Real) -> Real) -> Vec<Real> {
    a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect()
}
