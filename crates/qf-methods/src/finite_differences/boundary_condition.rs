//! Boundary conditions for 1-D finite-difference problems.
//!
//! A condition is applied to the operator and/or the solution array around
//! each apply or solve step. The known kinds form a closed sum type and are
//! dispatched by pattern matching; applications are idempotent.

use qf_core::Real;

use super::tridiagonal_operator::TridiagonalOperator;

/// Which end of the grid a boundary condition acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySide {
    /// First grid point.
    Lower,
    /// Last grid point.
    Upper,
    /// No side assigned; applying such a condition is a programming error.
    None,
}

/// A boundary condition on one end of the grid.
///
/// `Neumann` fixes the first difference at the boundary to `value`
/// (the derivative times the grid spacing); `Dirichlet` pins the boundary
/// value itself.
#[derive(Debug, Clone)]
pub enum BoundaryCondition {
    /// First-difference condition `u[boundary±1] - u[boundary] = ∓value`.
    Neumann {
        /// Target first difference.
        value: Real,
        /// Grid side.
        side: BoundarySide,
    },
    /// Value-pinning condition `u[boundary] = value`.
    Dirichlet {
        /// Target boundary value.
        value: Real,
        /// Grid side.
        side: BoundarySide,
    },
}

impl BoundaryCondition {
    fn side(&self) -> BoundarySide {
        match *self {
            BoundaryCondition::Neumann { side, .. } | BoundaryCondition::Dirichlet { side, .. } => {
                side
            }
        }
    }

    /// Rewrite the boundary row of `op` before an explicit apply.
    pub fn apply_before_applying(&self, op: &mut TridiagonalOperator) {
        match self {
            BoundaryCondition::Neumann { side, .. } => match side {
                BoundarySide::Lower => op.set_first_row(-1.0, 1.0),
                BoundarySide::Upper => op.set_last_row(-1.0, 1.0),
                BoundarySide::None => panic!("boundary condition applied with no side"),
            },
            BoundaryCondition::Dirichlet { side, .. } => match side {
                BoundarySide::Lower => op.set_first_row(1.0, 0.0),
                BoundarySide::Upper => op.set_last_row(0.0, 1.0),
                BoundarySide::None => panic!("boundary condition applied with no side"),
            },
        }
    }

    /// Overwrite the boundary element of `a` after an explicit apply.
    pub fn apply_after_applying(&self, a: &mut [Real]) {
        let n = a.len();
        match *self {
            BoundaryCondition::Neumann { value, side } => match side {
                BoundarySide::Lower => a[0] = a[1] - value,
                BoundarySide::Upper => a[n - 1] = a[n - 2] + value,
                BoundarySide::None => panic!("boundary condition applied with no side"),
            },
            BoundaryCondition::Dirichlet { value, side } => match side {
                BoundarySide::Lower => a[0] = value,
                BoundarySide::Upper => a[n - 1] = value,
                BoundarySide::None => panic!("boundary condition applied with no side"),
            },
        }
    }

    /// Rewrite the boundary row of `op` and the rhs entry before a solve.
    pub fn apply_before_solving(&self, op: &mut TridiagonalOperator, rhs: &mut [Real]) {
        self.apply_before_applying(op);
        let n = rhs.len();
        let value = match *self {
            BoundaryCondition::Neumann { value, .. }
            | BoundaryCondition::Dirichlet { value, .. } => value,
        };
        match self.side() {
            BoundarySide::Lower => rhs[0] = value,
            BoundarySide::Upper => rhs[n - 1] = value,
            BoundarySide::None => panic!("boundary condition applied with no side"),
        }
    }

    /// Overwrite the boundary element of `a` after a solve.
    pub fn apply_after_solving(&self, a: &mut [Real]) {
        self.apply_after_applying(a);
    }
}
