//! Multipole to local field translations
use num::Zero;
use num_complex::Complex;
use rayon::prelude::*;

use crate::{
    fmm::{
        harmonics::{cart_to_sph, singular_harmonics},
        helpers::{full_index, triangular_index},
        types::{KernelContext, SphericalFmm},
    },
    traits::{
        fmm::SourceToTargetTranslation,
        types::{FmmError, RealScalar},
    },
};

/// Multipole to local, translate the multipole expansion of a source cell into a contribution to the
/// local expansion of a well separated target cell.
///
/// # Arguments
/// * `kernel` - Precomputed tables.
/// * `displacement` - Target centre minus source centre, less any periodic offset. Must be nonzero.
/// * `source_multipole` - Source multipole coefficients.
/// * `target_local` - Target local coefficients, accumulated into.
pub fn m2l<T: RealScalar>(
    kernel: &KernelContext<T>,
    displacement: &[T; 3],
    source_multipole: &[Complex<T>],
    target_local: &mut [Complex<T>],
) {
    let p = kernel.expansion_order as isize;
    let mut ynm = vec![Complex::<T>::zero(); 4 * kernel.expansion_order * kernel.expansion_order];

    let (rho, alpha, beta) = cart_to_sph(displacement);
    debug_assert!(rho > T::zero(), "M2L between coincident centres");
    singular_harmonics(kernel, rho, alpha, beta, &mut ynm);

    for j in 0..p {
        for k in 0..=j {
            let cnm = kernel.cnm_row(full_index(j, k));
            let mut l_sum = Complex::<T>::zero();

            for n in 0..p {
                for m in -n..0 {
                    l_sum += source_multipole[triangular_index(n, -m)].conj()
                        * cnm[full_index(n, m)]
                        * ynm[full_index(j + n, m - k)];
                }
                for m in 0..=n {
                    l_sum += source_multipole[triangular_index(n, m)]
                        * cnm[full_index(n, m)]
                        * ynm[full_index(j + n, m - k)];
                }
            }

            target_local[triangular_index(j, k)] += l_sum;
        }
    }
}

impl<T> SourceToTargetTranslation for SphericalFmm<T>
where
    T: RealScalar,
{
    fn m2l(&mut self) -> Result<(), FmmError> {
        let n_coeffs = self.n_coeffs;
        let kernel = &self.kernel;
        let cells = &self.tree.cells;
        let multipoles = &self.multipoles;
        let offset = self.periodic_offset;

        // Each target cell's local expansion is written by a single task
        self.locals
            .par_chunks_exact_mut(n_coeffs)
            .zip(self.interactions.m2l.par_iter())
            .enumerate()
            .filter(|(_, (_, sources))| !sources.is_empty())
            .for_each(|(target, (local, sources))| {
                let target_center = &cells[target].center;
                for &source in sources.iter() {
                    let source_center = &cells[source].center;
                    let displacement = [
                        target_center[0] - source_center[0] - offset[0],
                        target_center[1] - source_center[1] - offset[1],
                        target_center[2] - source_center[2] - offset[2],
                    ];
                    m2l(
                        kernel,
                        &displacement,
                        &multipoles[source * n_coeffs..(source + 1) * n_coeffs],
                        local,
                    );
                }
            });

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        fmm::{
            field_translation::{source::p2m, target::l2p},
            helpers::n_coeffs,
        },
        tree::{helpers::bodies_fixture, types::Body},
    };
    use num::Float;

    #[test]
    fn test_m2l() {
        let expansion_order = 12;
        let kernel = KernelContext::<f64>::new(expansion_order).unwrap();
        let source_center = [0.5, 0.5, 0.5];
        let target_center = [5.5, 3.5, -2.5];

        let sources = bodies_fixture::<f64>(30, None, None, Some(5), false);
        let targets = bodies_fixture::<f64>(5, None, None, Some(6), false)
            .into_iter()
            .map(|mut b| {
                for d in 0..3 {
                    b.position[d] += target_center[d] - 0.5;
                }
                b
            })
            .collect::<Vec<Body<f64>>>();

        let mut multipole = vec![Complex::zero(); n_coeffs(expansion_order)];
        p2m(&kernel, &source_center, &sources, &mut multipole);

        let displacement = [
            target_center[0] - source_center[0],
            target_center[1] - source_center[1],
            target_center[2] - source_center[2],
        ];
        let mut local = vec![Complex::zero(); n_coeffs(expansion_order)];
        m2l(&kernel, &displacement, &multipole, &mut local);

        let mut potentials = vec![0.0; targets.len()];
        let mut forces = vec![[0.0; 3]; targets.len()];
        l2p(
            &kernel,
            &target_center,
            &local,
            &targets,
            &mut potentials,
            &mut forces,
        );

        let scale = sources.iter().map(|s| s.charge.abs()).sum::<f64>();
        for (target, potential) in targets.iter().zip(potentials.iter()) {
            let expected: f64 = sources
                .iter()
                .map(|s| {
                    let r2: f64 = (0..3)
                        .map(|d| (target.position[d] - s.position[d]).powi(2))
                        .sum();
                    s.charge / Float::sqrt(r2)
                })
                .sum();
            assert!((potential - expected).abs() < 1e-8 * scale);
        }
    }
}
