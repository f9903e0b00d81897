//! # Cell Trees
//!
//! A tree is a single arena of [`Cell`](types::Cell)s addressed by index, together with a single body
//! sequence that leaf cells reference by range. Trees may be built externally and validated with
//! [`CellTree::new`](types::CellTree::new), or constructed from a flat set of bodies by octant
//! subdivision with [`CellTree::from_bodies`](types::CellTree::from_bodies).
pub mod constants;
pub mod types;

mod domain;
pub mod helpers;
mod single_node;
