//! Tree Traits
use std::ops::Range;

use crate::{
    traits::types::RealScalar,
    tree::types::{Body, Cell},
};

/// The contract an externally built cell arena must satisfy to be traversed by the FMM.
///
/// Cells are addressed by stable indices into a single arena, each cell's children form a contiguous
/// index range that lies strictly after the cell itself, and each leaf references a contiguous range
/// of a single body sequence.
pub trait Tree {
    /// Scalar type
    type Scalar: RealScalar;

    /// Index of the root cell.
    fn root(&self) -> usize;

    /// All cells in the arena.
    fn cells(&self) -> &[Cell<Self::Scalar>];

    /// All bodies, in tree order.
    fn bodies(&self) -> &[Body<Self::Scalar>];

    /// Number of cells in the arena.
    fn n_cells(&self) -> usize {
        self.cells().len()
    }

    /// Indices of the leaf cells, sorted by the start of their body range.
    fn leaves(&self) -> &[usize];

    /// Number of leaf cells.
    fn n_leaves(&self) -> usize {
        self.leaves().len()
    }

    /// Depth of the tree, the root is at depth zero.
    fn depth(&self) -> u64;

    /// Index range of the children of a cell, empty for leaves.
    ///
    /// # Arguments
    /// * `idx` - Index of the cell being queried.
    fn children(&self, idx: usize) -> Range<usize> {
        self.cells()[idx].children()
    }

    /// Whether a cell has no children.
    ///
    /// # Arguments
    /// * `idx` - Index of the cell being queried.
    fn is_leaf(&self, idx: usize) -> bool {
        self.cells()[idx].is_leaf()
    }
}
