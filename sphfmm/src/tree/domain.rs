//! Constructor for a bounding Domain.
use num::Float;

use crate::{
    traits::types::RealScalar,
    tree::{
        constants::DOMAIN_PADDING,
        types::{Body, Domain},
    },
};

impl<T> Domain<T>
where
    T: RealScalar,
{
    /// Compute the cube enclosing a set of bodies. The cube is centred at the midpoint of the extents of
    /// the bodies along each axis, and its half side length is padded by a small fraction so that no body
    /// lies on its boundary.
    ///
    /// # Arguments
    /// * `bodies` - The bodies to enclose, an empty slice gives a unit cube at the origin.
    pub fn from_bodies(bodies: &[Body<T>]) -> Domain<T> {
        let Some(first) = bodies.first() else {
            return Domain {
                center: [T::zero(); 3],
                radius: T::one(),
            };
        };

        let mut min = first.position;
        let mut max = first.position;
        for body in bodies.iter() {
            for d in 0..3 {
                min[d] = min[d].min(body.position[d]);
                max[d] = max[d].max(body.position[d]);
            }
        }

        let two = T::from(2.0).unwrap();
        let center = [
            (min[0] + max[0]) / two,
            (min[1] + max[1]) / two,
            (min[2] + max[2]) / two,
        ];

        // Want a cubic box to place everything in
        let radius = (0..3)
            .map(|d| Float::max(max[d] - center[d], center[d] - min[d]))
            .fold(T::zero(), |a, b| a.max(b));

        let padding = T::from(DOMAIN_PADDING).unwrap();
        let radius = if radius > T::zero() {
            radius * (T::one() + padding)
        } else {
            padding
        };

        Domain { center, radius }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tree::helpers::bodies_fixture;

    fn test_compute_bounds(bodies: &[Body<f64>]) {
        let domain = Domain::from_bodies(bodies);

        // Test that the domain encloses all the bodies, and that no body sits on the boundary
        for body in bodies.iter() {
            for d in 0..3 {
                assert!((body.position[d] - domain.center[d]).abs() < domain.radius);
            }
        }
    }

    #[test]
    fn test_bounds() {
        let n_bodies = 10000;

        // Test bodies in positive octant only
        let bodies = bodies_fixture::<f64>(n_bodies, None, None, None, false);
        test_compute_bounds(&bodies);

        // Test bodies in positive and negative octants
        let bodies = bodies_fixture::<f64>(n_bodies, Some(-1.), Some(1.), None, true);
        test_compute_bounds(&bodies);
    }

    #[test]
    fn test_degenerate_bounds() {
        let bodies = vec![Body::new([0.5, 0.5, 0.5], 1.0); 4];
        let domain = Domain::from_bodies(&bodies);
        assert!(domain.radius > 0.0);
        assert_eq!(domain.center, [0.5, 0.5, 0.5]);

        let domain = Domain::<f64>::from_bodies(&[]);
        assert_eq!(domain.radius, 1.0);
    }
}
