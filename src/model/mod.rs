//! Model registry: the stencil and the named groups/zones a lattice must match.

pub mod group_zone;
pub mod registry;

pub use group_zone::GroupZoneMap;
pub use registry::ModelRegistry;
