//! Evaluation of regular and singular solid harmonics.
//!
//! Associated Legendre functions are generated with the stable three term recurrence in the degree,
//! starting from the diagonal `P_m^m`, so no large factorials are formed. Both entry points fill tables
//! addressed by [`full_index`](crate::fmm::helpers::full_index), populating negative orders by
//! conjugation.
use num::Float;
use num_complex::Complex;

use crate::{fmm::types::KernelContext, traits::types::RealScalar};

/// Convert a Cartesian displacement to spherical coordinates `(r, theta, phi)`, with the polar angle
/// `theta` measured from the z axis, and defined as zero when `r = 0`.
///
/// # Arguments
/// * `dx` - Cartesian displacement.
pub fn cart_to_sph<T: RealScalar>(dx: &[T; 3]) -> (T, T, T) {
    let r = Float::sqrt(dx[0] * dx[0] + dx[1] * dx[1] + dx[2] * dx[2]);
    let theta = if r == T::zero() {
        T::zero()
    } else {
        Float::acos(Float::max(-T::one(), Float::min(T::one(), dx[2] / r)))
    };
    let phi = Float::atan2(dx[1], dx[0]);
    (r, theta, phi)
}

/// Convert a gradient expressed in spherical components `(d/dr, d/dtheta, d/dphi)` at the point
/// `(r, theta, phi)` to Cartesian components.
///
/// Undefined on the polar axis, where `sin(theta) = 0`.
///
/// # Arguments
/// * `r` - Radius.
/// * `theta` - Polar angle.
/// * `phi` - Azimuth.
/// * `spherical` - Gradient in spherical components.
pub fn sph_to_cart<T: RealScalar>(r: T, theta: T, phi: T, spherical: &[T; 3]) -> [T; 3] {
    let (sin_theta, cos_theta) = Float::sin_cos(theta);
    let (sin_phi, cos_phi) = Float::sin_cos(phi);
    let inv_r = T::one() / r;
    let inv_r_sin = inv_r / sin_theta;

    [
        sin_theta * cos_phi * spherical[0] + cos_theta * cos_phi * inv_r * spherical[1]
            - sin_phi * inv_r_sin * spherical[2],
        sin_theta * sin_phi * spherical[0]
            + cos_theta * sin_phi * inv_r * spherical[1]
            + cos_phi * inv_r_sin * spherical[2],
        cos_theta * spherical[0] - sin_theta * inv_r * spherical[1],
    ]
}

/// Regular solid harmonics `r^n Y_n^m(theta, phi)` for degrees `n < P`.
///
/// # Arguments
/// * `kernel` - Precomputed tables.
/// * `rho` - Radius.
/// * `alpha` - Polar angle.
/// * `beta` - Azimuth.
/// * `ynm` - Output of `P^2` entries, addressed by full index.
pub fn regular_harmonics<T: RealScalar>(
    kernel: &KernelContext<T>,
    rho: T,
    alpha: T,
    beta: T,
    ynm: &mut [Complex<T>],
) {
    regular_harmonics_impl(kernel, rho, alpha, beta, ynm, None)
}

/// Regular solid harmonics together with their derivative with respect to the polar angle.
///
/// The derivative divides by `sin(alpha)`, so the displacement must not lie on the polar axis.
///
/// # Arguments
/// * `kernel` - Precomputed tables.
/// * `rho` - Radius.
/// * `alpha` - Polar angle.
/// * `beta` - Azimuth.
/// * `ynm` - Output of `P^2` entries, addressed by full index.
/// * `ynm_theta` - Output derivatives of `P^2` entries, addressed by full index.
pub fn regular_harmonics_with_derivative<T: RealScalar>(
    kernel: &KernelContext<T>,
    rho: T,
    alpha: T,
    beta: T,
    ynm: &mut [Complex<T>],
    ynm_theta: &mut [Complex<T>],
) {
    regular_harmonics_impl(kernel, rho, alpha, beta, ynm, Some(ynm_theta))
}

fn regular_harmonics_impl<T: RealScalar>(
    kernel: &KernelContext<T>,
    rho: T,
    alpha: T,
    beta: T,
    ynm: &mut [Complex<T>],
    mut ynm_theta: Option<&mut [Complex<T>]>,
) {
    let expansion_order = kernel.expansion_order;
    let prefactor = &kernel.prefactor;
    let (y, x) = Float::sin_cos(alpha);
    let two = T::from(2.0).unwrap();

    let mut fact = T::one();
    let mut pn = T::one();
    let mut rhom = T::one();

    for m in 0..expansion_order {
        let m_t = T::from(m).unwrap();
        let eim = Complex::from_polar(T::one(), m_t * beta);
        let mut p = pn;
        let npn = m * m + 2 * m;
        let nmn = m * m;

        ynm[npn] = eim * (rhom * p * prefactor[npn]);
        ynm[nmn] = ynm[npn].conj();

        let mut p1 = p;
        p = x * (two * m_t + T::one()) * p1;

        if let Some(ynm_theta) = ynm_theta.as_deref_mut() {
            ynm_theta[npn] = eim * (rhom * (p - (m_t + T::one()) * x * p1) / y * prefactor[npn]);
            ynm_theta[nmn] = ynm_theta[npn].conj();
        }

        rhom *= rho;
        let mut rhon = rhom;

        for n in (m + 1)..expansion_order {
            let n_t = T::from(n).unwrap();
            let npm = n * n + n + m;
            let nmm = n * n + n - m;

            ynm[npm] = eim * (rhon * p * prefactor[npm]);
            ynm[nmm] = ynm[npm].conj();

            let p2 = p1;
            p1 = p;
            p = (x * (two * n_t + T::one()) * p1 - (n_t + m_t) * p2) / (n_t - m_t + T::one());

            if let Some(ynm_theta) = ynm_theta.as_deref_mut() {
                ynm_theta[npm] = eim
                    * (rhon * ((n_t - m_t + T::one()) * p - (n_t + T::one()) * x * p1) / y
                        * prefactor[npm]);
                ynm_theta[nmm] = ynm_theta[npm].conj();
            }

            rhon *= rho;
        }

        pn = -pn * fact * y;
        fact += two;
    }
}

/// Singular solid harmonics `r^(-n-1) Y_n^m(theta, phi)` for degrees `n < 2P`, as required by M2L.
///
/// Undefined at `rho = 0`.
///
/// # Arguments
/// * `kernel` - Precomputed tables.
/// * `rho` - Radius.
/// * `alpha` - Polar angle.
/// * `beta` - Azimuth.
/// * `ynm` - Output of `4P^2` entries, addressed by full index.
pub fn singular_harmonics<T: RealScalar>(
    kernel: &KernelContext<T>,
    rho: T,
    alpha: T,
    beta: T,
    ynm: &mut [Complex<T>],
) {
    let n_degrees = 2 * kernel.expansion_order;
    let prefactor = &kernel.prefactor;
    let (y, x) = Float::sin_cos(alpha);
    let two = T::from(2.0).unwrap();
    let inv_rho = T::one() / rho;

    let mut fact = T::one();
    let mut pn = T::one();
    let mut rhom = inv_rho;

    for m in 0..n_degrees {
        let m_t = T::from(m).unwrap();
        let eim = Complex::from_polar(T::one(), m_t * beta);
        let mut p = pn;
        let npn = m * m + 2 * m;
        let nmn = m * m;

        ynm[npn] = eim * (rhom * p * prefactor[npn]);
        ynm[nmn] = ynm[npn].conj();

        let mut p1 = p;
        p = x * (two * m_t + T::one()) * p1;
        rhom *= inv_rho;
        let mut rhon = rhom;

        for n in (m + 1)..n_degrees {
            let n_t = T::from(n).unwrap();
            let npm = n * n + n + m;
            let nmm = n * n + n - m;

            ynm[npm] = eim * (rhon * p * prefactor[npm]);
            ynm[nmm] = ynm[npm].conj();

            let p2 = p1;
            p1 = p;
            p = (x * (two * n_t + T::one()) * p1 - (n_t + m_t) * p2) / (n_t - m_t + T::one());
            rhon *= inv_rho;
        }

        pn = -pn * fact * y;
        fact += two;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fmm::helpers::full_index;
    use num::Zero;

    #[test]
    fn test_coordinate_conversion() {
        let dx = [1.0, -2.0, 0.5];
        let (r, theta, phi) = cart_to_sph(&dx);
        assert!((r - 5.25f64.sqrt()).abs() < 1e-14);
        let back = [
            r * theta.sin() * phi.cos(),
            r * theta.sin() * phi.sin(),
            r * theta.cos(),
        ];
        for d in 0..3 {
            assert!((back[d] - dx[d]).abs() < 1e-14);
        }

        assert_eq!(cart_to_sph(&[0.0; 3]), (0.0, 0.0, 0.0));

        // A purely radial gradient points along the displacement
        let cartesian = sph_to_cart(r, theta, phi, &[1.0, 0.0, 0.0]);
        for d in 0..3 {
            assert!((cartesian[d] - dx[d] / r).abs() < 1e-14);
        }
    }

    #[test]
    fn test_conjugate_symmetry() {
        let expansion_order = 8;
        let kernel = KernelContext::<f64>::new(expansion_order).unwrap();
        let p = expansion_order as isize;

        let (rho, alpha, beta) = cart_to_sph(&[0.3, -0.7, 0.4]);
        let mut ynm = vec![Complex::zero(); (p * p) as usize];
        let mut ynm_theta = vec![Complex::zero(); (p * p) as usize];
        regular_harmonics_with_derivative(&kernel, rho, alpha, beta, &mut ynm, &mut ynm_theta);

        for n in 0..p {
            for m in 0..=n {
                let pos = ynm[full_index(n, m)];
                let neg = ynm[full_index(n, -m)];
                assert!((pos.conj() - neg).norm() < 1e-15);
                let pos = ynm_theta[full_index(n, m)];
                let neg = ynm_theta[full_index(n, -m)];
                assert!((pos.conj() - neg).norm() < 1e-15);
            }
        }

        let mut ynm = vec![Complex::zero(); (4 * p * p) as usize];
        singular_harmonics(&kernel, rho, alpha, beta, &mut ynm);
        for n in 0..2 * p {
            for m in 0..=n {
                let pos = ynm[full_index(n, m)];
                let neg = ynm[full_index(n, -m)];
                assert!((pos.conj() - neg).norm() <= 1e-14 * pos.norm().max(1.0));
            }
        }
    }

    #[test]
    fn test_closed_forms() {
        let kernel = KernelContext::<f64>::new(4).unwrap();
        let dx = [0.4, 0.3, -0.6];
        let (r, theta, phi) = cart_to_sph(&dx);

        let mut ynm = vec![Complex::zero(); 16];
        regular_harmonics(&kernel, r, theta, phi, &mut ynm);

        let expected_10 = r * theta.cos();
        let expected_11 = Complex::from_polar(-r * theta.sin() / 2f64.sqrt(), phi);
        assert!((ynm[full_index(0, 0)] - Complex::new(1.0, 0.0)).norm() < 1e-15);
        assert!((ynm[full_index(1, 0)] - Complex::new(expected_10, 0.0)).norm() < 1e-15);
        assert!((ynm[full_index(1, 1)] - expected_11).norm() < 1e-15);

        // Zonal terms reduce to Legendre polynomials
        let x = theta.cos();
        let expected_20 = r * r * 0.5 * (3.0 * x * x - 1.0);
        assert!((ynm[full_index(2, 0)].re - expected_20).abs() < 1e-14);

        let mut ynm = vec![Complex::zero(); 64];
        singular_harmonics(&kernel, r, theta, phi, &mut ynm);
        assert!((ynm[full_index(0, 0)].re - 1.0 / r).abs() < 1e-14);
        assert!((ynm[full_index(1, 0)].re - theta.cos() / (r * r)).abs() < 1e-14);
    }

    #[test]
    fn test_polar_derivative() {
        let expansion_order = 6;
        let kernel = KernelContext::<f64>::new(expansion_order).unwrap();
        let n_full = expansion_order * expansion_order;
        let (r, theta, phi) = (0.8, 1.1, -0.4);
        let h = 1e-6;

        let mut ynm = vec![Complex::zero(); n_full];
        let mut ynm_theta = vec![Complex::zero(); n_full];
        regular_harmonics_with_derivative(&kernel, r, theta, phi, &mut ynm, &mut ynm_theta);

        let mut plus = vec![Complex::zero(); n_full];
        let mut minus = vec![Complex::zero(); n_full];
        regular_harmonics(&kernel, r, theta + h, phi, &mut plus);
        regular_harmonics(&kernel, r, theta - h, phi, &mut minus);

        for idx in 0..n_full {
            let finite_difference = (plus[idx] - minus[idx]) / (2.0 * h);
            assert!((finite_difference - ynm_theta[idx]).norm() < 1e-7);
        }
    }
}
