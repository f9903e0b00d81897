//! FMM traits
use num_complex::Complex;

use crate::traits::{
    tree::Tree,
    types::{FmmError, RealScalar},
};

/// Interface for source field translations.
pub trait SourceTranslation {
    /// Particle to multipole translations, applied over all leaf cells.
    fn p2m(&mut self) -> Result<(), FmmError>;

    /// Multipole to multipole translations, applied during the upward pass in post-order so that
    /// every child is complete before its parent is formed.
    fn m2m(&mut self) -> Result<(), FmmError>;
}

/// Interface for target field translations.
pub trait TargetTranslation {
    /// Local to local translations, applied during the downward pass in pre-order so that
    /// every parent is complete before it is shifted to its children.
    fn l2l(&mut self) -> Result<(), FmmError>;

    /// Local to particle translations, applies the local expansion accumulated at each leaf cell to the
    /// bodies it contains. Defined over all leaf cells.
    fn l2p(&mut self) -> Result<(), FmmError>;

    /// Near field particle to particle (direct) contributions between pairs of adjacent leaf cells
    /// that fail the acceptance criterion.
    fn p2p(&mut self) -> Result<(), FmmError>;
}

/// Interface for the source to target (multipole to local / M2L) field translations.
pub trait SourceToTargetTranslation {
    /// Multipole to local translation over every well separated pair of cells found by the dual tree traversal.
    fn m2l(&mut self) -> Result<(), FmmError>;
}

/// Interface for a spherical harmonic Fast Multipole Method.
pub trait Fmm
where
    Self::Scalar: RealScalar,
{
    /// Real scalar type of the bodies, expansions are stored as complex numbers over this type.
    type Scalar;

    /// Type of tree the FMM is evaluated over.
    type Tree: Tree<Scalar = Self::Scalar>;

    /// Get the multipole expansion data associated with a cell as a slice
    /// # Arguments
    /// * `idx` - Index of the source cell.
    fn multipole(&self, idx: usize) -> Option<&[Complex<Self::Scalar>]>;

    /// Get the local expansion data associated with a cell as a slice
    /// # Arguments
    /// * `idx` - Index of the target cell.
    fn local(&self, idx: usize) -> Option<&[Complex<Self::Scalar>]>;

    /// Potentials evaluated at each body, in tree order.
    fn potentials(&self) -> &[Self::Scalar];

    /// Forces evaluated at each body, in tree order.
    fn forces(&self) -> &[[Self::Scalar; 3]];

    /// Get the expansion order associated with this FMM
    fn expansion_order(&self) -> usize;

    /// Get the number of stored multipole/local coefficients associated with this FMM
    fn n_coeffs(&self) -> usize;

    /// Get the tree associated with this FMM
    fn tree(&self) -> &Self::Tree;

    /// Evaluate the potentials and forces for this FMM
    fn evaluate(&mut self) -> Result<(), FmmError>;

    /// Clear the data buffers and add new charge data for re-evaluation.
    ///
    /// # Arguments
    /// * `charges` - new charge data, in the order the bodies were originally supplied.
    fn clear(&mut self, charges: &[Self::Scalar]) -> Result<(), FmmError>;
}
