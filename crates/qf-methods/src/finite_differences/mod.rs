//! Finite difference methods for PDE-based option pricing.
//!
//! # Overview
//!
//! * [`TridiagonalOperator`] — tridiagonal matrix with a Thomas-algorithm
//!   solver, composable and optionally time-dependent
//! * [`BoundaryCondition`] — Neumann / Dirichlet conditions on either grid end
//! * [`StepCondition`] — early-exercise clamp and shout reset
//! * [`MixedScheme`] — theta-weighted explicit/implicit evolver
//! * [`FiniteDifferenceModel`] — rollback driver honoring stopping times
//! * [`PdeBsm`] / [`bsm_operator`] — the Black-Scholes operator factory

/// The Black-Scholes operator and its time setter.
pub mod bsm_operator;

/// Neumann and Dirichlet boundary conditions.
pub mod boundary_condition;

/// Rollback across stopping times.
pub mod fd_model;

/// The theta scheme.
pub mod mixed_scheme;

/// Early-exercise and shout step conditions.
pub mod step_condition;

/// The tridiagonal operator.
pub mod tridiagonal_operator;

pub use bsm_operator::{bsm_operator, PdeBsm};
pub use boundary_condition::{BoundaryCondition, BoundarySide};
pub use fd_model::FiniteDifferenceModel;
pub use mixed_scheme::MixedScheme;
pub use step_condition::{CurveReference, PayoffFn, StepCondition};
pub use tridiagonal_operator::{TimeSetter, TridiagonalOperator};
