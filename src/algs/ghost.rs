//! Ghost nodes: neighbors owned by another process.
//!
//! The ghost set is sorted by global id; a ghost's position in it is its
//! canonical index for the communication setup downstream.

use crate::data::connectivity::ConnectivityChunk;
use crate::topology::node::GlobalNodeId;
use hashbrown::HashSet;

/// Sorted, deduplicated global ids referenced by the chunk but owned elsewhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GhostSet {
    ids: Vec<GlobalNodeId>,
}

impl GhostSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[GlobalNodeId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = GlobalNodeId> + '_ {
        self.ids.iter().copied()
    }

    /// Canonical index of ghost `id`.
    #[inline]
    pub fn local_index(&self, id: GlobalNodeId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    #[inline]
    pub fn contains(&self, id: GlobalNodeId) -> bool {
        self.local_index(id).is_some()
    }
}

/// Collect every neighbor slot of the chunk that points outside its window.
pub fn compute_ghost_nodes(chunk: &ConnectivityChunk) -> GhostSet {
    let ghosts: HashSet<GlobalNodeId> = chunk
        .raw_neighbors()
        .iter()
        .copied()
        .filter(|&nbr| chunk.is_ghost(nbr))
        .collect();
    let mut ids: Vec<GlobalNodeId> = ghosts.into_iter().collect();
    ids.sort_unstable();
    GhostSet { ids }
}
