//! Builder objects to construct FMMs
use num::{Float, Zero};
use num_complex::Complex;
use tracing::info_span;

use crate::{
    fmm::{
        constants::DEFAULT_THETA,
        traversal::dual_tree_traversal,
        types::{KernelContext, SingleNodeBuilder, SphericalFmm},
    },
    traits::types::{FmmError, RealScalar},
    tree::{
        constants::DEFAULT_NCRIT,
        types::{Body, CellTree},
    },
};

impl<T> SingleNodeBuilder<T>
where
    T: RealScalar,
{
    /// Initialise an empty FMM builder
    pub fn new() -> Self {
        Self {
            tree: None,
            expansion_order: None,
            theta: None,
            periodic_offset: None,
            images: 0,
        }
    }

    /// Associate FMM builder with a tree built from a flat set of bodies.
    ///
    /// # Arguments
    /// * `bodies` - Bodies, in input order. Results are reported in tree order, see
    ///   [`CellTree::global_indices`].
    /// * `n_crit` - Maximum number of bodies per leaf cell, if none specified a default of 64 is used.
    pub fn tree(mut self, bodies: &[Body<T>], n_crit: Option<usize>) -> Result<Self, FmmError> {
        let n_crit = n_crit.unwrap_or(DEFAULT_NCRIT);
        self.tree = Some(CellTree::from_bodies(bodies, n_crit)?);
        Ok(self)
    }

    /// Associate FMM builder with an externally constructed tree, checked with [`CellTree::validate`].
    ///
    /// # Arguments
    /// * `tree` - Cell tree.
    pub fn tree_from(mut self, tree: CellTree<T>) -> Result<Self, FmmError> {
        tree.validate()?;
        self.tree = Some(tree);
        Ok(self)
    }

    /// Set the parameters of the FMM.
    ///
    /// # Arguments
    /// * `expansion_order` - Number of retained degrees of each expansion, must be positive.
    /// * `theta` - Multipole acceptance criterion, non-negative and finite, defaults to 0.4.
    pub fn parameters(mut self, expansion_order: usize, theta: Option<T>) -> Result<Self, FmmError> {
        if self.tree.is_none() {
            return Err(FmmError::Failed(
                "Must build tree before specifying FMM parameters".to_string(),
            ));
        }

        if expansion_order == 0 {
            return Err(FmmError::InvalidOrder(expansion_order));
        }

        let theta = theta.unwrap_or(T::from(DEFAULT_THETA).unwrap());
        if !Float::is_finite(theta) || theta < T::zero() {
            return Err(FmmError::InvalidParameter(format!(
                "Acceptance criterion must be non-negative and finite, found {theta:?}"
            )));
        }

        self.expansion_order = Some(expansion_order);
        self.theta = Some(theta);
        Ok(self)
    }

    /// Evaluate the interaction with a single periodic image, every source is displaced by `-offset`.
    ///
    /// # Arguments
    /// * `offset` - Coordinate offset.
    /// * `images` - Number of periodic image levels, only zero is supported.
    pub fn periodic(mut self, offset: [T; 3], images: usize) -> Result<Self, FmmError> {
        if images > 0 {
            return Err(FmmError::Unimplemented(
                "Periodic image summation is not supported, only a coordinate offset".to_string(),
            ));
        }

        if offset.iter().any(|&x| !Float::is_finite(x)) {
            return Err(FmmError::InvalidParameter(format!(
                "Periodic offset must be finite, found {offset:?}"
            )));
        }

        self.periodic_offset = Some(offset);
        self.images = images;
        Ok(self)
    }

    /// Finalize and build the FMM, precomputing the kernel tables and interaction lists.
    pub fn build(self) -> Result<SphericalFmm<T>, FmmError> {
        let Some(tree) = self.tree else {
            return Err(FmmError::Failed(
                "Must build tree before building FMM".to_string(),
            ));
        };

        let (Some(expansion_order), Some(theta)) = (self.expansion_order, self.theta) else {
            return Err(FmmError::Failed(
                "Must specify FMM parameters before building FMM".to_string(),
            ));
        };

        let _span = info_span!("SingleNodeBuilder::build", expansion_order).entered();

        let periodic_offset = self.periodic_offset.unwrap_or([T::zero(); 3]);
        let kernel = KernelContext::new(expansion_order)?;
        let n_coeffs = kernel.n_coeffs;
        let interactions = dual_tree_traversal(&tree, theta, &periodic_offset);
        let pre_order = tree.pre_order();

        let n_cells = tree.cells.len();
        let n_bodies = tree.bodies.len();

        Ok(SphericalFmm {
            kernel,
            theta,
            periodic_offset,
            expansion_order,
            n_coeffs,
            interactions,
            pre_order,
            multipoles: vec![Complex::zero(); n_cells * n_coeffs],
            locals: vec![Complex::zero(); n_cells * n_coeffs],
            potentials: vec![T::zero(); n_bodies],
            forces: vec![[T::zero(); 3]; n_bodies],
            tree,
        })
    }
}

impl<T> Default for SingleNodeBuilder<T>
where
    T: RealScalar,
{
    fn default() -> Self {
        Self::new()
    }
}
