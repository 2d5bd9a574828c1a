//! Per-process connectivity of the arbitrary lattice.
//!
//! A [`ConnectivityChunk`] holds the nodes whose global ids fall into the
//! process's window `[chunk_begin, chunk_end)`, indexed by local id
//! `lid = gid - chunk_begin`. Storage is struct-of-arrays and sized once
//! when the chunk is created:
//!
//! - coordinates: `coords[axis * n + lid]`
//! - neighbors: `neighbors[q * n + lid]`, in model direction order, with
//!   [`NO_NEIGHBOR`] for absent neighbors
//! - zones: CSR, `zones[zone_offsets[lid]..zone_offsets[lid + 1]]`

use crate::lattice_error::ArbLatticeError;
use crate::topology::node::{GlobalNodeId, NO_NEIGHBOR, decode_neighbor, encode_neighbor};
use std::ops::Range;

/// One node as handed to [`ConnectivityChunk::from_records`].
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord {
    pub position: [f64; 3],
    /// One entry per model direction.
    pub neighbors: Vec<Option<GlobalNodeId>>,
    /// Group/zone ids.
    pub zones: Vec<u32>,
}

/// Connectivity of the nodes owned by one process.
#[derive(Clone, Debug)]
pub struct ConnectivityChunk {
    chunk_begin: GlobalNodeId,
    chunk_end: GlobalNodeId,
    num_nodes_global: usize,
    q: usize,
    grid_size: f64,
    coords: Vec<f64>,
    neighbors: Vec<GlobalNodeId>,
    zone_offsets: Vec<usize>,
    zones: Vec<u32>,
    filled: usize,
    dropped_zone_refs: usize,
    unknown_groups: Vec<String>,
}

impl ConnectivityChunk {
    /// Allocate an unfilled chunk for `window`; nodes are appended with `push_node`.
    ///
    /// `None` if the storage size overflows `usize`.
    pub(crate) fn with_window(
        window: Range<GlobalNodeId>,
        num_nodes_global: usize,
        q: usize,
        grid_size: f64,
    ) -> Option<Self> {
        let n = window.len();
        let coords_len = n.checked_mul(3)?;
        let neighbors_len = n.checked_mul(q)?;
        let mut zone_offsets = Vec::with_capacity(n.checked_add(1)?);
        zone_offsets.push(0);
        Some(Self {
            chunk_begin: window.start,
            chunk_end: window.end,
            num_nodes_global,
            q,
            grid_size,
            coords: vec![0.0; coords_len],
            neighbors: vec![NO_NEIGHBOR; neighbors_len],
            zone_offsets,
            zones: Vec::new(),
            filled: 0,
            dropped_zone_refs: 0,
            unknown_groups: Vec::new(),
        })
    }

    /// Append the next node. `neighbors` yields raw (sentinel-encoded) ids in
    /// model direction order.
    pub(crate) fn push_node(
        &mut self,
        position: [f64; 3],
        neighbors: impl IntoIterator<Item = GlobalNodeId>,
        zones: impl IntoIterator<Item = u32>,
    ) {
        let n = self.local_size();
        let lid = self.filled;
        debug_assert!(lid < n, "chunk window is already full");
        for (axis, &c) in position.iter().enumerate() {
            self.coords[axis * n + lid] = c;
        }
        for (q, nbr) in neighbors.into_iter().enumerate().take(self.q) {
            self.neighbors[q * n + lid] = nbr;
        }
        self.zones.extend(zones);
        self.zone_offsets.push(self.zones.len());
        self.filled += 1;
    }

    pub(crate) fn record_dropped_zone_refs(&mut self, count: usize) {
        self.dropped_zone_refs += count;
    }

    pub(crate) fn set_unknown_groups(&mut self, names: Vec<String>) {
        self.unknown_groups = names;
    }

    #[inline]
    pub(crate) fn is_filled(&self) -> bool {
        self.filled == self.local_size()
    }

    /// Build a chunk from explicit records, one per id of `window`.
    pub fn from_records(
        window: Range<GlobalNodeId>,
        num_nodes_global: usize,
        q: usize,
        grid_size: f64,
        records: &[NodeRecord],
    ) -> Result<Self, ArbLatticeError> {
        if window.start > window.end || window.end > num_nodes_global {
            return Err(ArbLatticeError::InvalidDistribution(format!(
                "window [{}, {}) does not fit {num_nodes_global} nodes",
                window.start, window.end
            )));
        }
        if records.len() != window.len() {
            return Err(ArbLatticeError::InvalidDistribution(format!(
                "window [{}, {}) holds {} nodes, got {} records",
                window.start,
                window.end,
                window.len(),
                records.len()
            )));
        }
        if let Some(lid) = records.iter().position(|rec| rec.neighbors.len() != q) {
            return Err(ArbLatticeError::InvalidRegistry(format!(
                "record {lid} has {} neighbors, the stencil has {q} directions",
                records[lid].neighbors.len()
            )));
        }
        let mut chunk = Self::with_window(window, num_nodes_global, q, grid_size).ok_or_else(
            || ArbLatticeError::InvalidDistribution(format!("{q} directions overflow the chunk size")),
        )?;
        for rec in records {
            chunk.push_node(
                rec.position,
                rec.neighbors.iter().map(|&n| encode_neighbor(n)),
                rec.zones.iter().copied(),
            );
        }
        Ok(chunk)
    }

    // -------------------------------------------------------------------------
    // Shape
    // -------------------------------------------------------------------------

    /// Number of locally owned nodes.
    #[inline]
    pub fn local_size(&self) -> usize {
        self.chunk_end - self.chunk_begin
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.local_size() == 0
    }

    #[inline]
    pub fn chunk_begin(&self) -> GlobalNodeId {
        self.chunk_begin
    }

    #[inline]
    pub fn chunk_end(&self) -> GlobalNodeId {
        self.chunk_end
    }

    /// Global ids owned by this chunk.
    #[inline]
    pub fn window(&self) -> Range<GlobalNodeId> {
        self.chunk_begin..self.chunk_end
    }

    #[inline]
    pub fn num_nodes_global(&self) -> usize {
        self.num_nodes_global
    }

    /// Stencil size Q.
    #[inline]
    pub fn q(&self) -> usize {
        self.q
    }

    #[inline]
    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    // -------------------------------------------------------------------------
    // Ids
    // -------------------------------------------------------------------------

    #[inline]
    pub fn is_local(&self, id: GlobalNodeId) -> bool {
        id >= self.chunk_begin && id < self.chunk_end
    }

    /// `true` if the raw neighbor slot `raw` refers to a node of another process.
    #[inline]
    pub fn is_ghost(&self, raw: GlobalNodeId) -> bool {
        raw != NO_NEIGHBOR && !self.is_local(raw)
    }

    #[inline]
    pub fn global_id(&self, lid: usize) -> GlobalNodeId {
        self.chunk_begin + lid
    }

    pub fn local_id(&self, id: GlobalNodeId) -> Option<usize> {
        self.is_local(id).then(|| id - self.chunk_begin)
    }

    // -------------------------------------------------------------------------
    // Node data
    // -------------------------------------------------------------------------

    /// Coordinate `axis` (0 = x, 1 = y, 2 = z) of local node `lid`.
    #[inline]
    pub fn coord(&self, axis: usize, lid: usize) -> f64 {
        self.coords[axis * self.local_size() + lid]
    }

    #[inline]
    pub fn position(&self, lid: usize) -> [f64; 3] {
        [self.coord(0, lid), self.coord(1, lid), self.coord(2, lid)]
    }

    /// All local values of one axis.
    #[inline]
    pub fn axis(&self, axis: usize) -> &[f64] {
        let n = self.local_size();
        &self.coords[axis * n..(axis + 1) * n]
    }

    /// Neighbor of `lid` in model direction `q`.
    #[inline]
    pub fn neighbor(&self, q: usize, lid: usize) -> Option<GlobalNodeId> {
        decode_neighbor(self.raw_neighbor(q, lid))
    }

    #[inline]
    pub(crate) fn raw_neighbor(&self, q: usize, lid: usize) -> GlobalNodeId {
        self.neighbors[q * self.local_size() + lid]
    }

    /// Neighbors of `lid` in model direction order.
    pub fn neighbors_of(&self, lid: usize) -> impl Iterator<Item = Option<GlobalNodeId>> + '_ {
        (0..self.q).map(move |q| self.neighbor(q, lid))
    }

    /// Every raw neighbor slot of every local node.
    #[inline]
    pub(crate) fn raw_neighbors(&self) -> &[GlobalNodeId] {
        &self.neighbors
    }

    /// Group/zone ids of `lid`.
    #[inline]
    pub fn zones_of(&self, lid: usize) -> &[u32] {
        &self.zones[self.zone_offsets[lid]..self.zone_offsets[lid + 1]]
    }

    #[inline]
    pub fn zone_count(&self, lid: usize) -> usize {
        self.zone_offsets[lid + 1] - self.zone_offsets[lid]
    }

    // -------------------------------------------------------------------------
    // Read bookkeeping
    // -------------------------------------------------------------------------

    /// Zone references dropped because they named a group unknown to the model.
    #[inline]
    pub fn dropped_zone_refs(&self) -> usize {
        self.dropped_zone_refs
    }

    /// NODE_GROUPS entries of the file the model does not know.
    #[inline]
    pub fn unknown_groups(&self) -> &[String] {
        &self.unknown_groups
    }
}
