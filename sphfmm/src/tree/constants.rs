//! Crate wide constants

/// Deepest level to which the octree builder will subdivide cells, bodies sharing a leaf at this
/// level are left in the same leaf regardless of the occupancy threshold.
pub const DEEPEST_LEVEL: u64 = 16;

/// Default value chosen for maximum number of bodies per leaf.
pub const DEFAULT_NCRIT: usize = 64;

/// Number of children of a fully subdivided cell.
pub const NSIBLINGS: usize = 8;

/// Fraction by which the bounding cube of a body distribution is padded, so that no body lies on the
/// boundary of the root cell.
pub const DOMAIN_PADDING: f64 = 1e-5;
