//! Local node ordering: border nodes first, then interior, each by (z, y, x).
//!
//! Border nodes (at least one ghost neighbor) come first so a solver can
//! start exchanging their data before it updates the interior. Within each
//! segment nodes are sorted by `(z, y, x)` so that the dominant iteration
//! order walks memory sequentially.

use crate::data::connectivity::ConnectivityChunk;
use std::cmp::Ordering;

/// Permutation of local ids: `order()[i]` is the local id visited `i`-th.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalPermutation {
    order: Vec<usize>,
    num_border_nodes: usize,
}

impl LocalPermutation {
    #[inline]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Length of the border prefix of [`order`](Self::order).
    #[inline]
    pub fn num_border_nodes(&self) -> usize {
        self.num_border_nodes
    }

    #[inline]
    pub fn border(&self) -> &[usize] {
        &self.order[..self.num_border_nodes]
    }

    #[inline]
    pub fn interior(&self) -> &[usize] {
        &self.order[self.num_border_nodes..]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `inverse()[lid]` is the position of `lid` in the ordering.
    pub fn inverse(&self) -> Vec<usize> {
        let mut inv = vec![0; self.order.len()];
        for (pos, &lid) in self.order.iter().enumerate() {
            inv[lid] = pos;
        }
        inv
    }
}

fn has_ghost_neighbor(chunk: &ConnectivityChunk, lid: usize) -> bool {
    (0..chunk.q()).any(|q| chunk.is_ghost(chunk.raw_neighbor(q, lid)))
}

fn cmp_zyx(chunk: &ConnectivityChunk, a: usize, b: usize) -> Ordering {
    chunk
        .coord(2, a)
        .total_cmp(&chunk.coord(2, b))
        .then_with(|| chunk.coord(1, a).total_cmp(&chunk.coord(1, b)))
        .then_with(|| chunk.coord(0, a).total_cmp(&chunk.coord(0, b)))
}

#[cfg(feature = "rayon")]
fn sort_segment(chunk: &ConnectivityChunk, segment: &mut [usize]) {
    use rayon::slice::ParallelSliceMut;
    segment.par_sort_by(|&a, &b| cmp_zyx(chunk, a, b));
}

#[cfg(not(feature = "rayon"))]
fn sort_segment(chunk: &ConnectivityChunk, segment: &mut [usize]) {
    segment.sort_by(|&a, &b| cmp_zyx(chunk, a, b));
}

/// Split local ids into border and interior nodes and sort each segment by (z, y, x).
pub fn compute_local_permutation(chunk: &ConnectivityChunk) -> LocalPermutation {
    let n = chunk.local_size();
    let (mut order, interior): (Vec<usize>, Vec<usize>) =
        (0..n).partition(|&lid| has_ghost_neighbor(chunk, lid));
    let num_border_nodes = order.len();
    order.extend(interior);

    let (border, interior) = order.split_at_mut(num_border_nodes);
    sort_segment(chunk, border);
    sort_segment(chunk, interior);

    LocalPermutation {
        order,
        num_border_nodes,
    }
}
