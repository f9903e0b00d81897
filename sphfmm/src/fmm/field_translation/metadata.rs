//! Precomputation of the order dependent kernel tables.
use num::{Float, Zero};
use num_complex::Complex;
use rayon::prelude::*;
use tracing::{debug, info_span, warn};

use crate::{
    fmm::{
        constants::MAX_STABLE_EXPANSION_ORDER,
        helpers::{degree_order, full_index, i_pow, n_coeffs, odd_or_even},
        types::KernelContext,
    },
    traits::types::{FmmError, RealScalar},
};

impl<T> KernelContext<T>
where
    T: RealScalar,
{
    /// Precompute every table required by the translation operators at a given expansion order.
    ///
    /// Factorials are accumulated iteratively in `T`, which loses precision for expansion orders beyond
    /// roughly 20 in double precision. Such orders are accepted, but a warning is emitted.
    ///
    /// # Arguments
    /// * `expansion_order` - Number of retained degrees `P`, must be positive.
    pub fn new(expansion_order: usize) -> Result<Self, FmmError> {
        if expansion_order == 0 {
            return Err(FmmError::InvalidOrder(expansion_order));
        }

        let _span = info_span!("KernelContext::new", expansion_order).entered();

        if expansion_order > MAX_STABLE_EXPANSION_ORDER {
            warn!(
                expansion_order,
                "normalisation factors lose precision beyond order {MAX_STABLE_EXPANSION_ORDER}"
            );
        }

        let p = expansion_order as isize;
        let n_full = 4 * expansion_order * expansion_order;

        // Largest factorial required is (n + |m|)! for n = 2P - 1
        let mut factorials = vec![T::one(); 4 * expansion_order];
        for i in 1..factorials.len() {
            factorials[i] = factorials[i - 1] * T::from(i).unwrap();
        }

        let mut prefactor = vec![T::zero(); n_full];
        let mut anm = vec![T::zero(); n_full];
        for n in 0..2 * p {
            for m in -n..=n {
                let nm = full_index(n, m);
                let abs_m = m.abs();
                prefactor[nm] = Float::sqrt(
                    factorials[(n - abs_m) as usize] / factorials[(n + abs_m) as usize],
                );
                anm[nm] = odd_or_even::<T>(n)
                    / Float::sqrt(factorials[(n + m) as usize] * factorials[(n - m) as usize]);
            }
        }

        let n_row = expansion_order * expansion_order;
        let mut cnm = vec![Complex::<T>::zero(); n_row * n_row];
        cnm.par_chunks_exact_mut(n_row)
            .enumerate()
            .for_each(|(jk, row)| {
                let (j, k) = degree_order(jk);
                for n in 0..p {
                    for m in -n..=n {
                        let nm = full_index(n, m);
                        let jnkm = full_index(j + n, m - k);
                        row[nm] = i_pow::<T>((k - m).abs() - k.abs() - m.abs())
                            * (odd_or_even::<T>(j) * anm[nm] * anm[jk] / anm[jnkm]);
                    }
                }
            });

        debug!(n_cnm = cnm.len(), "precomputed kernel tables");

        Ok(Self {
            expansion_order,
            n_coeffs: n_coeffs(expansion_order),
            prefactor,
            anm,
            cnm,
        })
    }

    /// Row of the M2L table holding the weights that contribute to the target coefficient `jk`.
    ///
    /// # Arguments
    /// * `jk` - Full index of the target coefficient.
    pub fn cnm_row(&self, jk: usize) -> &[Complex<T>] {
        let n_row = self.expansion_order * self.expansion_order;
        &self.cnm[jk * n_row..(jk + 1) * n_row]
    }
}
