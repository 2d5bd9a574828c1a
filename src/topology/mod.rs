//! Node identities and the distribution of nodes over processes.
//!
//! This module provides:
//! - [`node`]: global node ids, the "no neighbor" encoding and stencil offset directions
//! - [`distribution`]: contiguous node-to-process splits

pub mod distribution;
pub mod node;

pub use distribution::{NodeDistribution, compute_initial_node_dist};
pub use node::{GlobalNodeId, NO_NEIGHBOR, OffsetDir};
