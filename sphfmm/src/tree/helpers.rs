//! Helper functions used in testing tree and FMM implementations, specifically body generators.
use rand::prelude::*;

use crate::{traits::types::RealScalar, tree::types::Body};

/// Bodies fixture for testing, uniformly samples positions in each axis from min to max, and charges
/// uniformly from [-0.5, 0.5).
///
/// # Arguments
/// * `n_bodies` - The number of bodies to sample.
/// * `min` - The minimum coordinate value along each axis, defaults to 0.
/// * `max` - The maximum coordinate value along each axis, defaults to 1.
/// * `seed` - Random seed, defaults to 0.
/// * `neutral` - Shift the charges by their mean so that they sum to zero.
pub fn bodies_fixture<T>(
    n_bodies: usize,
    min: Option<T>,
    max: Option<T>,
    seed: Option<u64>,
    neutral: bool,
) -> Vec<Body<T>>
where
    T: RealScalar + rand::distributions::uniform::SampleUniform,
{
    // Generate a set of randomly distributed bodies
    let seed = seed.unwrap_or(0);
    let mut range = StdRng::seed_from_u64(seed);

    let between = if let (Some(min), Some(max)) = (min, max) {
        rand::distributions::Uniform::from(min..max)
    } else {
        rand::distributions::Uniform::from(T::zero()..T::one())
    };

    let half = T::from(0.5).unwrap();
    let charge_between = rand::distributions::Uniform::from(-half..half);

    let mut bodies = (0..n_bodies)
        .map(|_| {
            let position = [
                between.sample(&mut range),
                between.sample(&mut range),
                between.sample(&mut range),
            ];
            Body::new(position, charge_between.sample(&mut range))
        })
        .collect::<Vec<_>>();

    if neutral && n_bodies > 0 {
        let average = bodies.iter().map(|b| b.charge).sum::<T>() / T::from(n_bodies).unwrap();
        bodies.iter_mut().for_each(|b| b.charge -= average);
    }

    bodies
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bodies_fixture() {
        let bodies = bodies_fixture::<f64>(1000, Some(-1.0), Some(1.0), Some(3), true);
        assert_eq!(bodies.len(), 1000);
        assert!(bodies
            .iter()
            .all(|b| b.position.iter().all(|&x| (-1.0..1.0).contains(&x))));

        let total: f64 = bodies.iter().map(|b| b.charge).sum();
        assert_relative_eq!(total, 0.0, epsilon = 1e-12);

        // Same seed, same bodies
        let again = bodies_fixture::<f64>(1000, Some(-1.0), Some(1.0), Some(3), true);
        assert_eq!(bodies, again);
    }
}
