//! Utility types for trait definitions.
use std::{
    fmt::Debug,
    iter::Sum,
};

use num::traits::{Float, FloatConst, NumAssign};

/// Type to handle FMM related errors
#[derive(thiserror::Error, Debug)]
pub enum FmmError {
    /// Failure to run some business logic
    #[error("Failed: {0}")]
    Failed(String),

    /// Unimplemented section
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// Expansion order must be a positive integer
    #[error("Invalid expansion order: {0}, must be at least 1")]
    InvalidOrder(usize),

    /// A user supplied parameter lies outside of its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// An externally constructed cell arena breaks the tree contract
    #[error("Invalid tree: {0}")]
    InvalidTree(String),
}

/// Real floating point type over which expansions and bodies are defined.
///
/// Implemented for `f32` and `f64`, coefficients are stored as `Complex<Self>`.
pub trait RealScalar:
    Float + FloatConst + NumAssign + Default + Debug + Sum + Send + Sync + 'static
{
}

impl<T> RealScalar for T where
    T: Float + FloatConst + NumAssign + Default + Debug + Sum + Send + Sync + 'static
{
}
