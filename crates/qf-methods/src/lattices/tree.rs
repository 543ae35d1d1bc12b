//! The tree contract consumed by the lattices.

use qf_core::{Real, Size};

/// A discrete-time, discrete-state approximation of a 1-D process.
///
/// A tree is addressed by `(time-index, node-index, branch)`; at every node
/// the branch probabilities sum to one within floating tolerance.
pub trait Tree {
    /// Number of branches per node (2 for binomial, 3 for trinomial).
    fn branches(&self) -> Size;

    /// Number of nodes at time step `i`.
    fn size(&self, i: Size) -> Size;

    /// Underlying value at node `(i, index)`.
    fn underlying(&self, i: Size, index: Size) -> Real;

    /// Node index at step `i+1` reached from `(i, index)` along `branch`.
    fn descendant(&self, i: Size, index: Size, branch: Size) -> Size;

    /// Transition probability along `branch` from `(i, index)`.
    fn probability(&self, i: Size, index: Size, branch: Size) -> Real;
}
