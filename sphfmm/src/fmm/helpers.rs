//! Helper functions for coefficient indexing, buffer partitioning and error norms.
use std::ops::Range;

use num::Float;
use num_complex::Complex;

use crate::{traits::types::RealScalar, tree::types::Body};

/// Number of stored coefficients of an expansion of a given order, `P(P+1)/2`.
///
/// # Arguments
/// * `expansion_order` - Number of retained degrees.
pub fn n_coeffs(expansion_order: usize) -> usize {
    expansion_order * (expansion_order + 1) / 2
}

/// Position of the coefficient of degree `n` and order `m >= 0` in triangular storage.
///
/// # Arguments
/// * `n` - Degree.
/// * `m` - Order, must lie in `[0, n]`.
#[inline(always)]
pub fn triangular_index(n: isize, m: isize) -> usize {
    debug_assert!(0 <= m && m <= n);
    (n * (n + 1) / 2 + m) as usize
}

/// Position of degree `n` and order `m` in tables storing every order `m` in `[-n, n]`.
///
/// # Arguments
/// * `n` - Degree.
/// * `m` - Order, must lie in `[-n, n]`.
#[inline(always)]
pub fn full_index(n: isize, m: isize) -> usize {
    debug_assert!(m.abs() <= n);
    (n * n + n + m) as usize
}

/// Inverse of [`full_index`], the degree and order stored at a full index.
///
/// # Arguments
/// * `idx` - Full index.
pub fn degree_order(idx: usize) -> (isize, isize) {
    let mut n = 0;
    while (n + 1) * (n + 1) <= idx {
        n += 1;
    }
    let n = n as isize;
    (n, idx as isize - n * n - n)
}

/// `(-1)^n`
#[inline(always)]
pub fn odd_or_even<T: RealScalar>(n: isize) -> T {
    if n & 1 == 1 {
        -T::one()
    } else {
        T::one()
    }
}

/// `i^p` for any integer power, computed exactly.
#[inline(always)]
pub fn i_pow<T: RealScalar>(p: isize) -> Complex<T> {
    match p.rem_euclid(4) {
        0 => Complex::new(T::one(), T::zero()),
        1 => Complex::new(T::zero(), T::one()),
        2 => Complex::new(-T::one(), T::zero()),
        _ => Complex::new(T::zero(), -T::one()),
    }
}

/// Split a buffer into disjoint mutable slices, one for each range.
///
/// # Arguments
/// * `buffer` - Buffer to partition.
/// * `ranges` - Ranges to extract, sorted by their start and non-overlapping. Gaps between ranges are
///   skipped.
///
/// # Panics
/// If the ranges overlap, are unsorted, or extend beyond the buffer.
pub fn split_ranges_mut<'a, U>(mut buffer: &'a mut [U], ranges: &[Range<usize>]) -> Vec<&'a mut [U]> {
    let mut offset = 0;
    let mut slices = Vec::with_capacity(ranges.len());
    for range in ranges.iter() {
        let (_, rest) = std::mem::take(&mut buffer).split_at_mut(range.start - offset);
        let (slice, rest) = rest.split_at_mut(range.len());
        slices.push(slice);
        buffer = rest;
        offset = range.end;
    }
    slices
}

/// Map charges supplied in input order onto tree order.
///
/// # Arguments
/// * `global_indices` - For each body in tree order, its position in input order.
/// * `charges` - Charges in input order.
pub fn map_charges<T: RealScalar>(global_indices: &[usize], charges: &[T]) -> Vec<T> {
    global_indices.iter().map(|&i| charges[i]).collect()
}

/// Sample targets with a fixed stride, the sampled bodies have their potential and force cleared so that
/// they can be passed to the direct evaluator.
///
/// # Arguments
/// * `bodies` - Bodies to sample from.
/// * `n_samples` - Number of targets, clamped to the number of bodies.
pub fn sample_targets<T: RealScalar>(bodies: &[Body<T>], n_samples: usize) -> Vec<Body<T>> {
    let n_samples = n_samples.min(bodies.len());
    if n_samples == 0 {
        return Vec::new();
    }

    let stride = bodies.len() / n_samples;
    (0..n_samples)
        .map(|i| {
            let mut body = bodies[i * stride];
            body.reset();
            body
        })
        .collect()
}

/// Relative error of the charge weighted sum of potentials, `|sum(q p) - sum(q p*)| / |sum(q p*)|`.
///
/// # Arguments
/// * `approx` - Bodies holding the approximate potentials.
/// * `exact` - The same bodies holding the reference potentials.
pub fn relative_error_potential<T: RealScalar>(approx: &[Body<T>], exact: &[Body<T>]) -> T {
    let approx_sum: T = approx.iter().map(|b| b.potential * b.charge).sum();
    let exact_sum: T = exact.iter().map(|b| b.potential * b.charge).sum();
    Float::abs(approx_sum - exact_sum) / Float::abs(exact_sum)
}

/// Relative L2 error of a set of potentials.
///
/// # Arguments
/// * `approx` - Approximate potentials.
/// * `exact` - Reference potentials.
pub fn relative_l2_error_potential<T: RealScalar>(approx: &[T], exact: &[T]) -> T {
    let (diff, norm) = approx
        .iter()
        .zip(exact.iter())
        .fold((T::zero(), T::zero()), |(diff, norm), (&a, &e)| {
            (diff + (a - e) * (a - e), norm + e * e)
        });

    if norm == T::zero() {
        return Float::sqrt(diff);
    }
    Float::sqrt(diff / norm)
}

/// Relative L2 error of a set of force vectors.
///
/// # Arguments
/// * `approx` - Approximate forces.
/// * `exact` - Reference forces.
pub fn relative_l2_error_force<T: RealScalar>(approx: &[[T; 3]], exact: &[[T; 3]]) -> T {
    let (diff, norm) = approx.iter().zip(exact.iter()).fold(
        (T::zero(), T::zero()),
        |(mut diff, mut norm), (a, e)| {
            for d in 0..3 {
                diff += (a[d] - e[d]) * (a[d] - e[d]);
                norm += e[d] * e[d];
            }
            (diff, norm)
        },
    );

    if norm == T::zero() {
        return Float::sqrt(diff);
    }
    Float::sqrt(diff / norm)
}
