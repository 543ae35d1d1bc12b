//! # qf-methods
//!
//! Numerical methods: finite-difference PDE machinery and lattice (tree)
//! methods for backward induction.
//!
//! # Modules
//!
//! * [`finite_differences`] — tridiagonal operator, boundary and step
//!   conditions, theta schemes, rollback model, BSM operator factory
//! * [`lattices`] — time grids, binomial/trinomial trees, tree lattices,
//!   discretized assets, Tsiveriotis-Fernandes convertible lattice

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Finite difference methods: operators, conditions, schemes, rollback.
pub mod finite_differences;

/// Lattice methods: trees, lattices, discretized assets.
pub mod lattices;

pub use finite_differences::{
    BoundaryCondition, BoundarySide, FiniteDifferenceModel, MixedScheme, PdeBsm, StepCondition,
    TridiagonalOperator,
};
pub use lattices::{
    BinomialTree, BinomialVariant, BlackScholesLattice, DiscretizedAsset, Lattice, TimeGrid, Tree,
    TreeLattice2D, TrinomialTree, TsiveriotisFernandesLattice,
};
