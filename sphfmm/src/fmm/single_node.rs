//! Single Node FMM
use num::Zero;
use num_complex::Complex;
use tracing::{debug, info_span};

use crate::{
    fmm::{
        helpers::map_charges,
        types::{InteractionLists, SphericalFmm},
    },
    traits::{
        fmm::{Fmm, SourceToTargetTranslation, SourceTranslation, TargetTranslation},
        types::{FmmError, RealScalar},
    },
    tree::types::CellTree,
};

impl<T> SphericalFmm<T>
where
    T: RealScalar,
{
    /// Zero every coefficient and result buffer, and the accumulators of every body.
    pub fn reset(&mut self) {
        self.multipoles.fill(Complex::zero());
        self.locals.fill(Complex::zero());
        self.potentials.fill(T::zero());
        self.forces.fill([T::zero(); 3]);
        self.tree.bodies.iter_mut().for_each(|body| body.reset());
    }

    /// Interaction lists found by the dual tree traversal.
    pub fn interactions(&self) -> &InteractionLists {
        &self.interactions
    }

    /// Upward pass, P2M over the leaves then M2M from the leaves to the root.
    fn evaluate_upward_pass(&mut self) -> Result<(), FmmError> {
        let _span = info_span!("upward_pass").entered();
        self.p2m()?;
        self.m2m()
    }

    /// Apply the interaction lists, M2L between well separated cells and P2P between adjacent leaves.
    fn evaluate_interactions(&mut self) -> Result<(), FmmError> {
        let _span = info_span!(
            "interactions",
            n_m2l = self.interactions.n_m2l(),
            n_p2p = self.interactions.n_p2p()
        )
        .entered();
        self.m2l()?;
        self.p2p()
    }

    /// Downward pass, L2L from the root to the leaves then L2P over the leaves.
    fn evaluate_downward_pass(&mut self) -> Result<(), FmmError> {
        let _span = info_span!("downward_pass").entered();
        self.l2l()?;
        self.l2p()
    }
}

impl<T> Fmm for SphericalFmm<T>
where
    T: RealScalar,
{
    type Scalar = T;
    type Tree = CellTree<T>;

    fn multipole(&self, idx: usize) -> Option<&[Complex<T>]> {
        self.multipoles
            .get(idx * self.n_coeffs..(idx + 1) * self.n_coeffs)
    }

    fn local(&self, idx: usize) -> Option<&[Complex<T>]> {
        self.locals.get(idx * self.n_coeffs..(idx + 1) * self.n_coeffs)
    }

    fn potentials(&self) -> &[T] {
        &self.potentials
    }

    fn forces(&self) -> &[[T; 3]] {
        &self.forces
    }

    fn expansion_order(&self) -> usize {
        self.expansion_order
    }

    fn n_coeffs(&self) -> usize {
        self.n_coeffs
    }

    fn tree(&self) -> &Self::Tree {
        &self.tree
    }

    fn evaluate(&mut self) -> Result<(), FmmError> {
        let _span = info_span!(
            "SphericalFmm::evaluate",
            n_bodies = self.tree.bodies.len(),
            expansion_order = self.expansion_order
        )
        .entered();

        // Accumulation starts from zero on every evaluation
        self.reset();

        self.evaluate_upward_pass()?;
        self.evaluate_interactions()?;
        self.evaluate_downward_pass()?;

        for ((body, &potential), force) in self
            .tree
            .bodies
            .iter_mut()
            .zip(self.potentials.iter())
            .zip(self.forces.iter())
        {
            body.potential = potential;
            body.force = *force;
        }

        debug!("evaluated FMM");
        Ok(())
    }

    fn clear(&mut self, charges: &[T]) -> Result<(), FmmError> {
        let n_bodies = self.tree.bodies.len();
        if charges.len() != n_bodies {
            return Err(FmmError::InvalidParameter(format!(
                "Expected {n_bodies} charges, found {}",
                charges.len()
            )));
        }

        let charges = map_charges(&self.tree.global_indices, charges);
        for (body, charge) in self.tree.bodies.iter_mut().zip(charges) {
            body.charge = charge;
        }

        self.reset();
        Ok(())
    }
}
