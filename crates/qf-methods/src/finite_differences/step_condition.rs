//! Step conditions applied to the solution array at each time step.
//!
//! The known kinds form a closed sum type: the early-exercise clamp used by
//! American-style contracts and the shout reset, both comparing the rolled
//! solution against an intrinsic-value reference.

use std::sync::Arc;

use qf_core::{ensure, Rate, Real, Result, Time};

/// A payoff consumed as a pure function of the underlying level.
pub type PayoffFn = Arc<dyn Fn(Real) -> Real + Send + Sync>;

/// The intrinsic-value reference a step condition compares against:
/// either a payoff sampled on a stored grid, or a precomputed array.
#[derive(Clone)]
pub enum CurveReference {
    /// Payoff evaluated lazily on the stored grid levels.
    PayoffOnGrid {
        /// Underlying levels, one per solution entry.
        grid: Vec<Real>,
        /// The payoff function.
        payoff: PayoffFn,
    },
    /// A precomputed intrinsic-value snapshot.
    Values(Vec<Real>),
}

impl std::fmt::Debug for CurveReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurveReference::PayoffOnGrid { grid, .. } => f
                .debug_struct("PayoffOnGrid")
                .field("grid_size", &grid.len())
                .finish(),
            CurveReference::Values(v) => f.debug_tuple("Values").field(&v.len()).finish(),
        }
    }
}

impl CurveReference {
    fn len(&self) -> usize {
        match self {
            CurveReference::PayoffOnGrid { grid, .. } => grid.len(),
            CurveReference::Values(v) => v.len(),
        }
    }

    fn value(&self, i: usize) -> Real {
        match self {
            CurveReference::PayoffOnGrid { grid, payoff } => payoff(grid[i]),
            CurveReference::Values(v) => v[i],
        }
    }
}

/// A condition applied to the solution array at each rollback step.
#[derive(Debug, Clone)]
pub enum StepCondition {
    /// No-op condition (plain European rollback).
    Null,
    /// Early-exercise clamp: `a[i] = max(a[i], intrinsic(i))`.
    American {
        /// Intrinsic-value reference.
        intrinsic: CurveReference,
    },
    /// Shout reset: `a[i] = max(a[i], disc · intrinsic(i))` with
    /// `disc = exp(-rate·(t - reset_time))` recomputed at every application.
    Shout {
        /// The shout reset time.
        reset_time: Time,
        /// Continuously-compounded discount rate.
        rate: Rate,
        /// Intrinsic-value reference.
        intrinsic: CurveReference,
    },
}

impl StepCondition {
    /// Apply the condition to `a` at time `t`.
    pub fn apply_to(&self, a: &mut [Real], t: Time) -> Result<()> {
        match self {
            StepCondition::Null => Ok(()),
            StepCondition::American { intrinsic } => {
                Self::clamp(a, intrinsic, 1.0)
            }
            StepCondition::Shout {
                reset_time,
                rate,
                intrinsic,
            } => {
                // never cached: the discount couples the clamp to the step time
                let disc = (-rate * (t - reset_time)).exp();
                Self::clamp(a, intrinsic, disc)
            }
        }
    }

    fn clamp(a: &mut [Real], intrinsic: &CurveReference, scale: Real) -> Result<()> {
        ensure!(
            intrinsic.len() == a.len(),
            "intrinsic curve size ({}) does not match solution size ({})",
            intrinsic.len(),
            a.len()
        );
        for (i, v) in a.iter_mut().enumerate() {
            *v = v.max(scale * intrinsic.value(i));
        }
        Ok(())
    }
}
