//! Crate wide constants

/// Default value of the multipole acceptance criterion.
pub const DEFAULT_THETA: f64 = 0.4;

/// Expansion order beyond which the iteratively accumulated factorials lose precision in double
/// precision.
pub const MAX_STABLE_EXPANSION_ORDER: usize = 20;
