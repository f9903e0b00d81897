//! Brute force evaluation, the reference against which FMM results are checked.
use rayon::prelude::*;
use tracing::info_span;

use crate::{fmm::field_translation::target::p2p, traits::types::RealScalar, tree::types::Body};

/// Accumulate the potential and force of every source at every target by direct summation.
///
/// # Arguments
/// * `targets` - Targets, their potential and force are accumulated into.
/// * `sources` - Sources.
/// * `offset` - Periodic offset subtracted from every displacement.
pub fn direct<T: RealScalar>(targets: &mut [Body<T>], sources: &[Body<T>], offset: &[T; 3]) {
    let _span = info_span!(
        "direct",
        n_targets = targets.len(),
        n_sources = sources.len()
    )
    .entered();

    targets.par_iter_mut().for_each(|target| {
        let mut potential = [T::zero()];
        let mut force = [[T::zero(); 3]];
        p2p(
            std::slice::from_ref(target),
            sources,
            offset,
            &mut potential,
            &mut force,
        );

        target.potential += potential[0];
        for d in 0..3 {
            target.force[d] += force[0][d];
        }
    });
}
