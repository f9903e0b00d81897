//! Field translations, the six operators of the FMM as free functions over explicit centres and
//! coefficient slices, and their application over a [`SphericalFmm`](crate::fmm::types::SphericalFmm).
pub mod metadata;
pub mod source;
pub mod source_to_target;
pub mod target;
