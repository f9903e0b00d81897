//! Local expansion translations and near field evaluation
use itertools::Itertools;
use num::{Float, Zero};
use num_complex::Complex;
use rayon::prelude::*;

use crate::{
    fmm::{
        harmonics::{
            cart_to_sph, regular_harmonics, regular_harmonics_with_derivative, sph_to_cart,
        },
        helpers::{full_index, i_pow, odd_or_even, split_ranges_mut, triangular_index},
        types::{KernelContext, SphericalFmm},
    },
    traits::{
        fmm::TargetTranslation,
        types::{FmmError, RealScalar},
    },
    tree::types::Body,
};

/// Local to local, shift the local expansion of a parent cell to the centre of a child.
///
/// # Arguments
/// * `kernel` - Precomputed tables.
/// * `parent_center` - Centre of the source expansion.
/// * `child_center` - Centre of the target expansion.
/// * `parent_local` - Source local coefficients.
/// * `child_local` - Target local coefficients, accumulated into.
pub fn l2l<T: RealScalar>(
    kernel: &KernelContext<T>,
    parent_center: &[T; 3],
    child_center: &[T; 3],
    parent_local: &[Complex<T>],
    child_local: &mut [Complex<T>],
) {
    let p = kernel.expansion_order as isize;
    let anm = &kernel.anm;
    let mut ynm = vec![Complex::<T>::zero(); kernel.expansion_order * kernel.expansion_order];

    let dx = [
        child_center[0] - parent_center[0],
        child_center[1] - parent_center[1],
        child_center[2] - parent_center[2],
    ];
    let (rho, alpha, beta) = cart_to_sph(&dx);
    regular_harmonics(kernel, rho, alpha, beta, &mut ynm);

    for j in 0..p {
        for k in 0..=j {
            let jk = full_index(j, k);
            let mut l_sum = Complex::<T>::zero();

            for n in j..p {
                for m in (j + k - n)..0 {
                    let jnkm = full_index(n - j, m - k);
                    let nm = full_index(n, -m);
                    l_sum += parent_local[triangular_index(n, -m)].conj()
                        * ynm[jnkm]
                        * (odd_or_even::<T>(k) * anm[jnkm] * anm[jk] / anm[nm]);
                }

                for m in 0..=n {
                    if n - j >= (m - k).abs() {
                        let jnkm = full_index(n - j, m - k);
                        let nm = full_index(n, m);
                        l_sum += parent_local[triangular_index(n, m)]
                            * i_pow::<T>(m - k - (m - k).abs())
                            * ynm[jnkm]
                            * (anm[jnkm] * anm[jk] / anm[nm]);
                    }
                }
            }

            child_local[triangular_index(j, k)] += l_sum;
        }
    }
}

/// Local to particle, evaluate a local expansion at a set of bodies, accumulating the potential and the
/// force at each.
///
/// Bodies must not lie at the expansion centre or on the polar axis through it.
///
/// # Arguments
/// * `kernel` - Precomputed tables.
/// * `center` - Expansion centre.
/// * `local` - Local coefficients.
/// * `bodies` - Targets.
/// * `potentials` - Potential at each target, accumulated into.
/// * `forces` - Force at each target, accumulated into.
pub fn l2p<T: RealScalar>(
    kernel: &KernelContext<T>,
    center: &[T; 3],
    local: &[Complex<T>],
    bodies: &[Body<T>],
    potentials: &mut [T],
    forces: &mut [[T; 3]],
) {
    let p = kernel.expansion_order as isize;
    let n_full = kernel.expansion_order * kernel.expansion_order;
    let mut ynm = vec![Complex::<T>::zero(); n_full];
    let mut ynm_theta = vec![Complex::<T>::zero(); n_full];
    let two = T::from(2.0).unwrap();

    for ((body, potential), force) in bodies
        .iter()
        .zip(potentials.iter_mut())
        .zip(forces.iter_mut())
    {
        let dx = [
            body.position[0] - center[0],
            body.position[1] - center[1],
            body.position[2] - center[2],
        ];
        let (r, theta, phi) = cart_to_sph(&dx);
        regular_harmonics_with_derivative(kernel, r, theta, phi, &mut ynm, &mut ynm_theta);

        // Gradient in spherical components (d/dr, d/dtheta, d/dphi)
        let mut spherical = [T::zero(); 3];
        for n in 0..p {
            let n_t = T::from(n).unwrap();
            let nm = full_index(n, 0);
            let coefficient = local[triangular_index(n, 0)];
            let value = (coefficient * ynm[nm]).re;

            *potential += value;
            spherical[0] += value / r * n_t;
            spherical[1] += (coefficient * ynm_theta[nm]).re;

            for m in 1..=n {
                let m_t = T::from(m).unwrap();
                let nm = full_index(n, m);
                let coefficient = local[triangular_index(n, m)];
                let value = (coefficient * ynm[nm]).re;

                *potential += two * value;
                spherical[0] += two * value / r * n_t;
                spherical[1] += two * (coefficient * ynm_theta[nm]).re;
                spherical[2] += two * (coefficient * ynm[nm] * Complex::i()).re * m_t;
            }
        }

        let cartesian = sph_to_cart(r, theta, phi, &spherical);
        for d in 0..3 {
            force[d] += cartesian[d];
        }
    }
}

/// Particle to particle, direct evaluation of the potential and force of a set of sources at a set of
/// targets. Pairs at zero separation contribute nothing.
///
/// # Arguments
/// * `targets` - Targets.
/// * `sources` - Sources.
/// * `offset` - Periodic offset subtracted from every displacement.
/// * `potentials` - Potential at each target, accumulated into.
/// * `forces` - Force at each target, accumulated into.
pub fn p2p<T: RealScalar>(
    targets: &[Body<T>],
    sources: &[Body<T>],
    offset: &[T; 3],
    potentials: &mut [T],
    forces: &mut [[T; 3]],
) {
    for ((target, potential), force) in targets
        .iter()
        .zip(potentials.iter_mut())
        .zip(forces.iter_mut())
    {
        let mut p = T::zero();
        let mut f = [T::zero(); 3];

        for source in sources.iter() {
            let dx = [
                target.position[0] - source.position[0] - offset[0],
                target.position[1] - source.position[1] - offset[1],
                target.position[2] - source.position[2] - offset[2],
            ];
            let r2 = dx[0] * dx[0] + dx[1] * dx[1] + dx[2] * dx[2];

            if r2 != T::zero() {
                let inv_r2 = T::one() / r2;
                let inv_r = source.charge * Float::sqrt(inv_r2);
                p += inv_r;
                for d in 0..3 {
                    f[d] += dx[d] * inv_r2 * inv_r;
                }
            }
        }

        *potential += p;
        for d in 0..3 {
            force[d] -= f[d];
        }
    }
}

impl<T> TargetTranslation for SphericalFmm<T>
where
    T: RealScalar,
{
    fn l2l(&mut self) -> Result<(), FmmError> {
        let n_coeffs = self.n_coeffs;
        let cells = &self.tree.cells;

        // Pre-order visits every parent before its children
        for &idx in self.pre_order.iter() {
            let cell = &cells[idx];
            if cell.is_leaf() {
                continue;
            }

            let (head, tail) = self.locals.split_at_mut(cell.child_start * n_coeffs);
            let parent_local = &head[idx * n_coeffs..(idx + 1) * n_coeffs];

            for (i, child) in cell.children().enumerate() {
                let child_local = &mut tail[i * n_coeffs..(i + 1) * n_coeffs];
                l2l(
                    &self.kernel,
                    &cell.center,
                    &cells[child].center,
                    parent_local,
                    child_local,
                );
            }
        }

        Ok(())
    }

    fn l2p(&mut self) -> Result<(), FmmError> {
        let n_coeffs = self.n_coeffs;
        let kernel = &self.kernel;
        let cells = &self.tree.cells;
        let bodies = &self.tree.bodies;
        let locals = &self.locals;
        let leaves = &self.tree.leaves;

        let ranges = leaves.iter().map(|&leaf| cells[leaf].body_range()).collect_vec();
        let potentials = split_ranges_mut(&mut self.potentials, &ranges);
        let forces = split_ranges_mut(&mut self.forces, &ranges);

        potentials
            .into_par_iter()
            .zip(forces)
            .zip(leaves.par_iter())
            .for_each(|((potentials, forces), &leaf)| {
                let cell = &cells[leaf];
                l2p(
                    kernel,
                    &cell.center,
                    &locals[leaf * n_coeffs..(leaf + 1) * n_coeffs],
                    &bodies[cell.body_range()],
                    potentials,
                    forces,
                )
            });

        Ok(())
    }

    fn p2p(&mut self) -> Result<(), FmmError> {
        let cells = &self.tree.cells;
        let bodies = &self.tree.bodies;
        let leaves = &self.tree.leaves;
        let near_field = &self.interactions.p2p;
        let offset = self.periodic_offset;

        let ranges = leaves.iter().map(|&leaf| cells[leaf].body_range()).collect_vec();
        let potentials = split_ranges_mut(&mut self.potentials, &ranges);
        let forces = split_ranges_mut(&mut self.forces, &ranges);

        potentials
            .into_par_iter()
            .zip(forces)
            .zip(leaves.par_iter())
            .for_each(|((potentials, forces), &leaf)| {
                let targets = &bodies[cells[leaf].body_range()];
                for &source in near_field[leaf].iter() {
                    p2p(
                        targets,
                        &bodies[cells[source].body_range()],
                        &offset,
                        potentials,
                        forces,
                    );
                }
            });

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{fmm::helpers::n_coeffs, tree::helpers::bodies_fixture};

    #[test]
    fn test_l2l() {
        let expansion_order = 10;
        let kernel = KernelContext::<f64>::new(expansion_order).unwrap();
        let parent_center = [0.5, 0.5, 0.5];
        let child_center = [0.75, 0.25, 0.75];

        // Any set of coefficients with real zonal terms defines a harmonic polynomial, which is shifted
        // exactly
        let p = expansion_order as isize;
        let mut parent_local = vec![Complex::zero(); n_coeffs(expansion_order)];
        for n in 0..p {
            for m in 0..=n {
                let i = triangular_index(n, m);
                let im = if m == 0 { 0.0 } else { 0.5 / (2.0 + i as f64) };
                parent_local[i] = Complex::new(1.0 / (1.0 + i as f64), im);
            }
        }
        let mut child_local = vec![Complex::zero(); n_coeffs(expansion_order)];
        l2l(
            &kernel,
            &parent_center,
            &child_center,
            &parent_local,
            &mut child_local,
        );

        let targets = bodies_fixture::<f64>(10, Some(0.5), Some(1.0), Some(7), false)
            .into_iter()
            .map(|mut b| {
                b.position[1] -= 0.5;
                b
            })
            .collect_vec();

        let mut parent_potentials = vec![0.0; targets.len()];
        let mut parent_forces = vec![[0.0; 3]; targets.len()];
        l2p(
            &kernel,
            &parent_center,
            &parent_local,
            &targets,
            &mut parent_potentials,
            &mut parent_forces,
        );

        let mut child_potentials = vec![0.0; targets.len()];
        let mut child_forces = vec![[0.0; 3]; targets.len()];
        l2p(
            &kernel,
            &child_center,
            &child_local,
            &targets,
            &mut child_potentials,
            &mut child_forces,
        );

        for i in 0..targets.len() {
            assert!((parent_potentials[i] - child_potentials[i]).abs() < 1e-12);
            for d in 0..3 {
                assert!((parent_forces[i][d] - child_forces[i][d]).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_p2p() {
        let targets = vec![
            Body::new([0.0, 0.0, 0.0], 1.0),
            Body::new([2.0, 0.0, 0.0], 1.0),
        ];
        let sources = vec![
            Body::new([0.0, 0.0, 0.0], 1.0),
            Body::new([0.0, 0.0, 2.0], -2.0),
        ];

        let mut potentials = vec![0.0; 2];
        let mut forces = vec![[0.0; 3]; 2];
        p2p(&targets, &sources, &[0.0; 3], &mut potentials, &mut forces);

        // The coincident pair is skipped
        assert!((potentials[0] + 1.0).abs() < 1e-15);
        assert!((forces[0][2] + 0.5).abs() < 1e-15);
        assert_eq!(forces[0][0], 0.0);

        let r = 8f64.sqrt();
        assert!((potentials[1] - (0.5 - 2.0 / r)).abs() < 1e-15);
        let expected_x = -(2.0 / 8.0 - 2.0 * 2.0 / r.powi(3));
        assert!((forces[1][0] - expected_x).abs() < 1e-15);

        // The offset shifts every source
        let mut shifted = vec![0.0; 1];
        let mut shifted_forces = vec![[0.0; 3]; 1];
        p2p(
            &targets[..1],
            &sources[..1],
            &[-1.0, 0.0, 0.0],
            &mut shifted,
            &mut shifted_forces,
        );
        assert!((shifted[0] - 1.0).abs() < 1e-15);
        assert!((shifted_forces[0][0] + 1.0).abs() < 1e-15);
    }
}
