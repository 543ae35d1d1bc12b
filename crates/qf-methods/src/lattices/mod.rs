//! Lattice methods: trees and the backward-induction framework.
//!
//! # Overview
//!
//! * [`TimeGrid`] — grid of time points used by tree methods
//! * [`Tree`] — the per-node contract (size, underlying, descendant,
//!   probability)
//! * [`BinomialTree`] — recombining binomial tree with 7 classical variants
//! * [`TrinomialTree`] — recombining trinomial tree with validated branching
//! * [`BlackScholesLattice`] — backward-induction driver with memoized
//!   state prices
//! * [`TreeLattice2D`] — product lattice over two independent factors
//! * [`TsiveriotisFernandesLattice`] — coupled rollback for convertibles
//! * [`DiscretizedAsset`] — the asset contract the lattices drive

/// Binomial trees.
pub mod binomial_tree;

/// The discretized-asset contract.
pub mod discretized_asset;

/// The Tsiveriotis-Fernandes convertible lattice.
pub mod tf_lattice;

/// Time grids.
pub mod time_grid;

/// Tree lattices and the lattice contract.
pub mod tree_lattice;

/// Two-factor product lattices.
pub mod tree_lattice_2d;

/// The tree contract.
pub mod tree;

/// Trinomial trees.
pub mod trinomial_tree;

pub use binomial_tree::{BinomialTree, BinomialVariant};
pub use discretized_asset::DiscretizedAsset;
pub use tf_lattice::{ConvertibleAsset, TsiveriotisFernandesLattice};
pub use time_grid::TimeGrid;
pub use tree::Tree;
pub use tree_lattice::{BlackScholesLattice, Lattice};
pub use tree_lattice_2d::TreeLattice2D;
pub use trinomial_tree::TrinomialTree;
