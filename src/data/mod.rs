//! Data module: per-process connectivity storage and derived geometry.

pub mod bounding_box;
pub mod connectivity;

pub use bounding_box::{BoundingBox, compute_bounding_box, full_lattice_pos};
pub use connectivity::{ConnectivityChunk, NodeRecord};
