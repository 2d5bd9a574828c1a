//! Global node ids and stencil offset directions.
//!
//! A node of the arbitrary lattice is identified by its position in the
//! connectivity file, a `GlobalNodeId` in `[0, num_nodes_global)`. Each node
//! stores one neighbor per offset direction of the model stencil; a node at
//! the boundary of the domain has no neighbor in some directions.
//!
//! # Neighbor encoding
//! Neighbor slots are stored compactly as raw `GlobalNodeId`s with
//! [`NO_NEIGHBOR`] (`usize::MAX`) standing for "no neighbor in this
//! direction". The connectivity file writes the same thing as `-1`. Outside
//! of the storage layer a neighbor is always handed out as
//! `Option<GlobalNodeId>`; use [`decode_neighbor`] / [`encode_neighbor`] to
//! cross between the two.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in the global (file) numbering.
pub type GlobalNodeId = usize;

/// Raw storage value of an absent neighbor.
pub const NO_NEIGHBOR: GlobalNodeId = GlobalNodeId::MAX;

/// Turn a raw neighbor slot into an optional node id.
#[inline]
pub const fn decode_neighbor(raw: GlobalNodeId) -> Option<GlobalNodeId> {
    if raw == NO_NEIGHBOR { None } else { Some(raw) }
}

/// Turn an optional node id into its raw storage value.
#[inline]
pub const fn encode_neighbor(nbr: Option<GlobalNodeId>) -> GlobalNodeId {
    match nbr {
        Some(id) => id,
        None => NO_NEIGHBOR,
    }
}

// -----------------------------------------------------------------------------
// Offset directions
// -----------------------------------------------------------------------------

/// A fixed relative neighbor direction of the stencil, e.g. `[1, 0, -1]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct OffsetDir(pub [i32; 3]);

impl OffsetDir {
    /// Zero offset: the node itself.
    pub const ZERO: OffsetDir = OffsetDir([0, 0, 0]);

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        OffsetDir([x, y, z])
    }

    #[inline]
    pub const fn components(self) -> [i32; 3] {
        self.0
    }

    /// `true` for the self direction `[0, 0, 0]`.
    #[inline]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl From<[i32; 3]> for OffsetDir {
    fn from(v: [i32; 3]) -> Self {
        OffsetDir(v)
    }
}

/// Prints as `[x, y, z]`, the form used in error messages.
impl fmt::Display for OffsetDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.0;
        write!(f, "[{x}, {y}, {z}]")
    }
}
