//! Product lattice over two independent trees.

use qf_core::{Real, Size};

use super::tree::Tree;

/// A two-factor lattice built as the product of two trees.
///
/// Node `(i, index)` combines node `index % size1` of the first tree with
/// node `index / size1` of the second; branches are split the same way.
/// The factors are independent, so transition probabilities multiply.
#[derive(Debug, Clone)]
pub struct TreeLattice2D<T1: Tree, T2: Tree> {
    tree1: T1,
    tree2: T2,
}

impl<T1: Tree, T2: Tree> TreeLattice2D<T1, T2> {
    /// Combine two trees over the same time grid.
    pub fn new(tree1: T1, tree2: T2) -> Self {
        Self { tree1, tree2 }
    }

    /// First-factor tree.
    pub fn tree1(&self) -> &T1 {
        &self.tree1
    }

    /// Second-factor tree.
    pub fn tree2(&self) -> &T2 {
        &self.tree2
    }

    /// Number of combined branches per node.
    pub fn branches(&self) -> Size {
        self.tree1.branches() * self.tree2.branches()
    }

    /// Number of combined nodes at step `i`.
    pub fn size(&self, i: Size) -> Size {
        self.tree1.size(i) * self.tree2.size(i)
    }

    /// Underlying pair at node `(i, index)`.
    pub fn underlying(&self, i: Size, index: Size) -> (Real, Real) {
        let modulo = self.tree1.size(i);
        (
            self.tree1.underlying(i, index % modulo),
            self.tree2.underlying(i, index / modulo),
        )
    }

    /// Combined descendant index at step `i+1`.
    pub fn descendant(&self, i: Size, index: Size, branch: Size) -> Size {
        let modulo = self.tree1.size(i);
        let index1 = index % modulo;
        let index2 = index / modulo;
        let branches1 = self.tree1.branches();
        let branch1 = branch % branches1;
        let branch2 = branch / branches1;
        let next_modulo = self.tree1.size(i + 1);
        self.tree1.descendant(i, index1, branch1)
            + self.tree2.descendant(i, index2, branch2) * next_modulo
    }

    /// Combined transition probability (independent factors multiply).
    pub fn probability(&self, i: Size, index: Size, branch: Size) -> Real {
        let modulo = self.tree1.size(i);
        let index1 = index % modulo;
        let index2 = index / modulo;
        let branches1 = self.tree1.branches();
        let branch1 = branch % branches1;
        let branch2 = branch / branches1;
        self.tree1.probability(i, index1, branch1) * self.tree2.probability(i, index2, branch2)
    }
}
