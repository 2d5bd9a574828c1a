//! Re-export public algorithms.

pub mod communicator;
pub mod ghost;
pub mod local_order;

pub use communicator::{ProcessGroup, SerialGroup, ThreadGroup};
pub use ghost::{GhostSet, compute_ghost_nodes};
pub use local_order::{LocalPermutation, compute_local_permutation};
