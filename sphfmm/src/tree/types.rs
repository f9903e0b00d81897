//! Data structures for cell trees.
use std::ops::Range;

use crate::traits::types::RealScalar;

/// A point source, with the potential and force accumulated at it.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Body<T>
where
    T: RealScalar,
{
    /// Position in Cartesian space.
    pub position: [T; 3],

    /// Source strength.
    pub charge: T,

    /// Accumulated potential.
    pub potential: T,

    /// Accumulated force.
    pub force: [T; 3],
}

/// A node of a hierarchical spatial tree, stored in an arena and addressed by index.
///
/// The children of a cell occupy the contiguous index range `child_start..child_start + n_children`
/// of the arena, and the bodies it references occupy `body_start..body_start + n_bodies` of the body
/// sequence. The radius is compared against the acceptance criterion, it need not circumscribe the
/// bodies.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cell<T>
where
    T: RealScalar,
{
    /// Index of the first child in the arena.
    pub child_start: usize,

    /// Number of children, zero for leaves.
    pub n_children: usize,

    /// Index of the first body in the body sequence.
    pub body_start: usize,

    /// Number of bodies referenced by this cell.
    pub n_bodies: usize,

    /// Expansion centre.
    pub center: [T; 3],

    /// Radius used by the acceptance criterion.
    pub radius: T,
}

/// Represents a three-dimensional cube characterized by its centre and half side-length.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Domain<T>
where
    T: RealScalar,
{
    /// The centre of the cube.
    pub center: [T; 3],

    /// Half of the side length of the cube.
    pub radius: T,
}

/// A cell arena together with the body sequence its leaves reference.
///
/// # Fields
/// - `cells` - Arena of cells, the root is at index zero.
///
/// - `bodies` - All bodies, ordered so that every leaf references a contiguous range.
///
/// - `leaves` - Indices of leaf cells, sorted by the start of their body range.
///
/// - `global_indices` - For each body in tree order, its index in the sequence originally supplied.
///
/// - `depth` - The depth of the tree.
///
/// - `domain` - The bounding cube of the root cell.
#[derive(Debug, Clone, Default)]
pub struct CellTree<T>
where
    T: RealScalar,
{
    /// Arena of cells
    pub cells: Vec<Cell<T>>,

    /// Bodies in tree order
    pub bodies: Vec<Body<T>>,

    /// Leaf indices, sorted by body range.
    pub leaves: Vec<usize>,

    /// Map from tree order to input order.
    pub global_indices: Vec<usize>,

    /// Depth of the tree.
    pub depth: u64,

    /// Domain spanned by the root cell.
    pub domain: Domain<T>,
}

impl<T: RealScalar> Body<T> {
    /// A body at rest with zeroed accumulators.
    ///
    /// # Arguments
    /// * `position` - Position in Cartesian space.
    /// * `charge` - Source strength.
    pub fn new(position: [T; 3], charge: T) -> Self {
        Body {
            position,
            charge,
            potential: T::zero(),
            force: [T::zero(); 3],
        }
    }

    /// Reset the accumulated potential and force.
    pub fn reset(&mut self) {
        self.potential = T::zero();
        self.force = [T::zero(); 3];
    }
}

impl<T: RealScalar> Cell<T> {
    /// Index range of the children of this cell in the arena.
    pub fn children(&self) -> Range<usize> {
        self.child_start..self.child_start + self.n_children
    }

    /// Range of the bodies referenced by this cell.
    pub fn body_range(&self) -> Range<usize> {
        self.body_start..self.body_start + self.n_bodies
    }

    /// Whether this cell has no children.
    pub fn is_leaf(&self) -> bool {
        self.n_children == 0
    }
}
