//! Multipole expansion translations
use num::Zero;
use num_complex::Complex;
use rayon::prelude::*;

use crate::{
    fmm::{
        harmonics::{cart_to_sph, regular_harmonics},
        helpers::{full_index, i_pow, odd_or_even, triangular_index},
        types::{KernelContext, SphericalFmm},
    },
    traits::{
        fmm::SourceTranslation,
        types::{FmmError, RealScalar},
    },
    tree::types::Body,
};

/// Particle to multipole, accumulate the multipole expansion about `center` of a set of bodies.
///
/// # Arguments
/// * `kernel` - Precomputed tables.
/// * `center` - Expansion centre.
/// * `bodies` - Sources.
/// * `multipole` - Multipole coefficients, accumulated into.
pub fn p2m<T: RealScalar>(
    kernel: &KernelContext<T>,
    center: &[T; 3],
    bodies: &[Body<T>],
    multipole: &mut [Complex<T>],
) {
    let p = kernel.expansion_order as isize;
    let mut ynm = vec![Complex::<T>::zero(); kernel.expansion_order * kernel.expansion_order];

    for body in bodies.iter() {
        let dx = [
            body.position[0] - center[0],
            body.position[1] - center[1],
            body.position[2] - center[2],
        ];
        let (rho, alpha, beta) = cart_to_sph(&dx);
        regular_harmonics(kernel, rho, alpha, -beta, &mut ynm);

        for n in 0..p {
            for m in 0..=n {
                multipole[triangular_index(n, m)] += ynm[full_index(n, m)] * body.charge;
            }
        }
    }
}

/// Multipole to multipole, shift the multipole expansion of a child cell to the centre of its parent.
///
/// # Arguments
/// * `kernel` - Precomputed tables.
/// * `parent_center` - Centre of the target expansion.
/// * `child_center` - Centre of the source expansion.
/// * `child_multipole` - Source multipole coefficients.
/// * `parent_multipole` - Target multipole coefficients, accumulated into.
pub fn m2m<T: RealScalar>(
    kernel: &KernelContext<T>,
    parent_center: &[T; 3],
    child_center: &[T; 3],
    child_multipole: &[Complex<T>],
    parent_multipole: &mut [Complex<T>],
) {
    let p = kernel.expansion_order as isize;
    let anm = &kernel.anm;
    let mut ynm = vec![Complex::<T>::zero(); kernel.expansion_order * kernel.expansion_order];

    let dx = [
        parent_center[0] - child_center[0],
        parent_center[1] - child_center[1],
        parent_center[2] - child_center[2],
    ];
    let (rho, alpha, beta) = cart_to_sph(&dx);
    regular_harmonics(kernel, rho, alpha, -beta, &mut ynm);

    for j in 0..p {
        for k in 0..=j {
            let jk = full_index(j, k);
            let mut m_sum = Complex::<T>::zero();

            for n in 0..=j {
                for m in -n..=(k - 1).min(n) {
                    if j - n >= k - m {
                        let jnkm = full_index(j - n, k - m);
                        let nm = full_index(n, m);
                        m_sum += child_multipole[triangular_index(j - n, k - m)]
                            * i_pow::<T>(m - m.abs())
                            * ynm[nm]
                            * (odd_or_even::<T>(n) * anm[nm] * anm[jnkm] / anm[jk]);
                    }
                }

                for m in k..=n {
                    if j - n >= m - k {
                        let jnkm = full_index(j - n, k - m);
                        let nm = full_index(n, m);
                        m_sum += child_multipole[triangular_index(j - n, m - k)].conj()
                            * ynm[nm]
                            * (odd_or_even::<T>(k + n + m) * anm[nm] * anm[jnkm] / anm[jk]);
                    }
                }
            }

            parent_multipole[triangular_index(j, k)] += m_sum;
        }
    }
}

impl<T> SourceTranslation for SphericalFmm<T>
where
    T: RealScalar,
{
    fn p2m(&mut self) -> Result<(), FmmError> {
        if self.tree.leaves.is_empty() {
            return Err(FmmError::Failed(
                "P2M failed, no leaves found in tree".to_string(),
            ));
        }

        let kernel = &self.kernel;
        let bodies = &self.tree.bodies;

        self.multipoles
            .par_chunks_exact_mut(self.n_coeffs)
            .zip(self.tree.cells.par_iter())
            .filter(|(_, cell)| cell.is_leaf())
            .for_each(|(multipole, cell)| {
                p2m(kernel, &cell.center, &bodies[cell.body_range()], multipole)
            });

        Ok(())
    }

    fn m2m(&mut self) -> Result<(), FmmError> {
        let n_coeffs = self.n_coeffs;
        let cells = &self.tree.cells;

        // Reverse pre-order visits every child before its parent
        for &idx in self.pre_order.iter().rev() {
            let cell = &cells[idx];
            if cell.is_leaf() {
                continue;
            }

            let (head, tail) = self.multipoles.split_at_mut(cell.child_start * n_coeffs);
            let parent_multipole = &mut head[idx * n_coeffs..(idx + 1) * n_coeffs];

            for (i, child) in cell.children().enumerate() {
                let child_multipole = &tail[i * n_coeffs..(i + 1) * n_coeffs];
                m2m(
                    &self.kernel,
                    &cell.center,
                    &cells[child].center,
                    child_multipole,
                    parent_multipole,
                );
            }
        }

        Ok(())
    }
}
