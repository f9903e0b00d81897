//! # Spherical Harmonic Fast Multipole Method
//!
//! A Fast Multipole Method for the Laplace kernel `1/r` in three dimensions, computing the potential and
//! force at each of N bodies due to all others in close to linear time, based on \[1\].
//!
//! Notable features of this library are:
//! * Expansions in solid harmonics, stored in triangular form and exploiting the conjugate symmetry of
//!   real source distributions.
//! * A dual tree traversal with a tunable multipole acceptance criterion, applied once at construction
//!   and reused across evaluations.
//! * Shared memory parallelism over leaves and target cells with Rayon.
//! * Trait based seams for the cell tree and the field translations, so that externally constructed
//!   trees can be evaluated.
//!
//! ## Example
//! ```
//! use sphfmm::{Fmm, SingleNodeBuilder, tree::helpers::bodies_fixture};
//!
//! let bodies = bodies_fixture::<f64>(1000, None, None, Some(0), true);
//! let mut fmm = SingleNodeBuilder::new()
//!     .tree(&bodies, Some(64))
//!     .unwrap()
//!     .parameters(10, Some(0.4))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! fmm.evaluate().unwrap();
//! let potentials = fmm.potentials();
//! ```
//!
//! ## References
//! \[1\] Yokota, R. (2013). An FMM based on dual tree traversal for many-core architectures. Journal of
//! Algorithms & Computational Technology, 7(3), 301-324.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod fmm;
pub mod traits;
pub mod tree;

// Public API
#[doc(inline)]
pub use fmm::types::SingleNodeBuilder;
#[doc(inline)]
pub use fmm::types::SphericalFmm;
#[doc(inline)]
pub use fmm::types::KernelContext;
#[doc(inline)]
pub use tree::types::{Body, Cell, CellTree};

#[doc(inline)]
pub use traits::fmm::Fmm;
#[doc(inline)]
pub use traits::tree::Tree;
#[doc(inline)]
pub use traits::types::FmmError;
