//! # Spherical Harmonic Fast Multipole Method
//!
//! Expansions are truncated series of solid harmonics stored in triangular form, only orders `m >= 0`
//! are kept for each degree `n < P` and negative orders are recovered by conjugation. An immutable
//! [`KernelContext`](types::KernelContext) holds every table that depends on the expansion order, and is
//! passed explicitly to each of the six translation operators.
//!
//! The runtime object [`SphericalFmm`](types::SphericalFmm) is constructed with a
//! [`SingleNodeBuilder`](types::SingleNodeBuilder), which builds or adopts a cell tree, precomputes the
//! kernel tables and runs the dual tree traversal once, so that repeated evaluations only apply the
//! operators.
mod builder;
pub mod constants;
pub mod direct;
pub mod field_translation;
pub mod harmonics;
pub mod helpers;
mod single_node;
pub mod traversal;
pub mod types;

pub use types::{KernelContext, SphericalFmm};
