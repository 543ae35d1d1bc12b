//! Theta-weighted explicit/implicit time stepping.
//!
//! One step of the scheme evolves the solution backward by `dt`:
//! an explicit half applying `I - (1-θ)·dt·L` (skipped for θ=1), then an
//! implicit half solving `(I + θ·dt·L)·x = rhs` (skipped for θ=0).
//! θ=0 is explicit Euler, θ=1 implicit Euler, θ=0.5 Crank-Nicolson.

use qf_core::{Real, Result, Time};

use super::boundary_condition::BoundaryCondition;
use super::tridiagonal_operator::TridiagonalOperator;

/// The theta scheme evolver.
///
/// The composed operators `I - (1-θ)·dt·L` and `I + θ·dt·L` are cached and
/// invalidated whenever the step size changes or, for time-dependent
/// operators, at every step.
#[derive(Debug, Clone)]
pub struct MixedScheme {
    operator: TridiagonalOperator,
    theta: Real,
    dt: Time,
    conditions: Vec<BoundaryCondition>,
    explicit_part: Option<TridiagonalOperator>,
    implicit_part: Option<TridiagonalOperator>,
}

impl MixedScheme {
    /// Create a scheme with an arbitrary theta weight in `[0, 1]`.
    pub fn new(operator: TridiagonalOperator, theta: Real, conditions: Vec<BoundaryCondition>) -> Self {
        Self {
            operator,
            theta,
            dt: 0.0,
            conditions,
            explicit_part: None,
            implicit_part: None,
        }
    }

    /// Explicit Euler (θ = 0).
    pub fn explicit_euler(operator: TridiagonalOperator, conditions: Vec<BoundaryCondition>) -> Self {
        Self::new(operator, 0.0, conditions)
    }

    /// Implicit Euler (θ = 1).
    pub fn implicit_euler(operator: TridiagonalOperator, conditions: Vec<BoundaryCondition>) -> Self {
        Self::new(operator, 1.0, conditions)
    }

    /// Crank-Nicolson (θ = 0.5).
    pub fn crank_nicolson(operator: TridiagonalOperator, conditions: Vec<BoundaryCondition>) -> Self {
        Self::new(operator, 0.5, conditions)
    }

    /// The theta weight.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Set the step size, invalidating the cached composed operators.
    pub fn set_step(&mut self, dt: Time) {
        self.dt = dt;
        self.explicit_part = None;
        self.implicit_part = None;
    }

    /// Evolve the solution one step backward from time `t`.
    pub fn step(&mut self, a: &mut Vec<Real>, t: Time) -> Result<()> {
        if self.operator.is_time_dependent() {
            self.operator.set_time(t);
            self.explicit_part = None;
            self.implicit_part = None;
        }
        self.ensure_parts()?;

        if self.theta != 1.0 {
            if let Some(part) = self.explicit_part.as_mut() {
                for bc in &self.conditions {
                    bc.apply_before_applying(part);
                }
                *a = part.apply_to(a)?;
                for bc in &self.conditions {
                    bc.apply_after_applying(a);
                }
            }
        }
        if self.theta != 0.0 {
            if let Some(part) = self.implicit_part.as_mut() {
                for bc in &self.conditions {
                    bc.apply_before_solving(part, a);
                }
                *a = part.solve_for(a)?;
                for bc in &self.conditions {
                    bc.apply_after_solving(a);
                }
            }
        }
        Ok(())
    }

    fn ensure_parts(&mut self) -> Result<()> {
        if self.explicit_part.is_none() {
            let identity = TridiagonalOperator::identity(self.operator.size());
            self.explicit_part =
                Some(identity.subtract(&self.operator.multiply((1.0 - self.theta) * self.dt))?);
            self.implicit_part =
                Some(identity.add(&self.operator.multiply(self.theta * self.dt))?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn scaled_identity(n: usize, lambda: Real) -> TridiagonalOperator {
        TridiagonalOperator::identity(n).multiply(lambda)
    }

    #[test]
    fn zero_operator_step_is_identity() {
        let mut scheme = MixedScheme::crank_nicolson(TridiagonalOperator::new(3), vec![]);
        scheme.set_step(0.1);
        let mut a = vec![1.0, 2.0, 3.0];
        scheme.step(&mut a, 1.0).unwrap();
        assert_eq!(a, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn explicit_euler_decay() {
        // L = λI, dV/dt = λV backward: one explicit step gives (1 - λ·dt)·a
        let lambda = 0.5;
        let mut scheme = MixedScheme::explicit_euler(scaled_identity(3, lambda), vec![]);
        scheme.set_step(0.1);
        let mut a = vec![1.0, 1.0, 1.0];
        scheme.step(&mut a, 1.0).unwrap();
        for v in &a {
            assert_abs_diff_eq!(*v, 1.0 - 0.05, epsilon = 1e-14);
        }
    }

    #[test]
    fn implicit_euler_decay() {
        let lambda = 0.5;
        let mut scheme = MixedScheme::implicit_euler(scaled_identity(3, lambda), vec![]);
        scheme.set_step(0.1);
        let mut a = vec![1.0, 1.0, 1.0];
        scheme.step(&mut a, 1.0).unwrap();
        for v in &a {
            assert_abs_diff_eq!(*v, 1.0 / 1.05, epsilon = 1e-14);
        }
    }

    #[test]
    fn crank_nicolson_is_the_average_scheme() {
        let lambda = 0.5;
        let mut scheme = MixedScheme::crank_nicolson(scaled_identity(3, lambda), vec![]);
        scheme.set_step(0.1);
        let mut a = vec![1.0, 1.0, 1.0];
        scheme.step(&mut a, 1.0).unwrap();
        let expected = (1.0 - 0.025) / (1.0 + 0.025);
        for v in &a {
            assert_abs_diff_eq!(*v, expected, epsilon = 1e-14);
        }
    }

    #[test]
    fn set_step_invalidates_cached_parts() {
        let lambda = 1.0;
        let mut scheme = MixedScheme::implicit_euler(scaled_identity(2, lambda), vec![]);
        scheme.set_step(0.1);
        let mut a = vec![1.0, 1.0];
        scheme.step(&mut a, 1.0).unwrap();
        assert_abs_diff_eq!(a[0], 1.0 / 1.1, epsilon = 1e-14);

        scheme.set_step(0.2);
        let mut b = vec![1.0, 1.0];
        scheme.step(&mut b, 0.9).unwrap();
        assert_abs_diff_eq!(b[0], 1.0 / 1.2, epsilon = 1e-14);
    }
}
