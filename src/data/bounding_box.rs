//! Axis-aligned bounding box of a chunk and the physical-to-lattice mapping.

use crate::data::connectivity::ConnectivityChunk;
use crate::lattice_error::ArbLatticeError;
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

/// Box `[min, min + extent]` per axis.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub extent: [f64; 3],
}

impl BoundingBox {
    #[inline]
    pub fn max(&self) -> [f64; 3] {
        [
            self.min[0] + self.extent[0],
            self.min[1] + self.extent[1],
            self.min[2] + self.extent[2],
        ]
    }

    pub fn contains(&self, p: [f64; 3]) -> bool {
        let max = self.max();
        (0..3).all(|a| p[a] >= self.min[a] && p[a] <= max[a])
    }
}

/// Per-axis min/max over all local coordinates; `None` for an empty chunk.
pub fn compute_bounding_box(chunk: &ConnectivityChunk) -> Option<BoundingBox> {
    let mut min = [0.0; 3];
    let mut extent = [0.0; 3];
    for axis in 0..3 {
        let (lo, hi) = match chunk.axis(axis).iter().copied().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        min[axis] = lo;
        extent[axis] = hi - lo;
    }
    Some(BoundingBox { min, extent })
}

/// Index of the lattice cell `[i * grid_size, (i + 1) * grid_size)` holding `pos`,
/// i.e. `round(pos / grid_size - 0.5)`.
pub fn full_lattice_pos(pos: f64, grid_size: f64) -> Result<i32, ArbLatticeError> {
    let idx = (pos / grid_size - 0.5).round();
    if idx.is_finite() && idx >= f64::from(i32::MIN) && idx <= f64::from(i32::MAX) {
        Ok(idx as i32)
    } else {
        Err(ArbLatticeError::LatticePosition { pos, grid_size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::connectivity::NodeRecord;

    fn chunk(points: &[[f64; 3]]) -> ConnectivityChunk {
        let recs: Vec<_> = points
            .iter()
            .map(|&position| NodeRecord {
                position,
                neighbors: vec![None],
                zones: vec![],
            })
            .collect();
        ConnectivityChunk::from_records(0..recs.len(), recs.len(), 1, 1.0, &recs).unwrap()
    }

    #[test]
    fn single_node_has_zero_extent() {
        let bb = compute_bounding_box(&chunk(&[[1.5, -2.0, 3.0]])).unwrap();
        assert_eq!(bb.min, [1.5, -2.0, 3.0]);
        assert_eq!(bb.extent, [0.0; 3]);
        assert_eq!(bb.max(), bb.min);
    }

    #[test]
    fn extents_span_all_nodes() {
        let bb = compute_bounding_box(&chunk(&[
            [0.0, 1.0, 5.0],
            [4.0, -1.0, 5.0],
            [2.0, 3.0, 5.0],
        ]))
        .unwrap();
        assert_eq!(bb.min, [0.0, -1.0, 5.0]);
        assert_eq!(bb.extent, [4.0, 4.0, 0.0]);
        assert!(bb.contains([2.0, 0.0, 5.0]));
        assert!(!bb.contains([2.0, 0.0, 5.1]));
    }

    #[test]
    fn empty_chunk_has_no_box() {
        assert!(compute_bounding_box(&chunk(&[])).is_none());
    }

    #[test]
    fn lattice_pos_maps_cells() {
        assert_eq!(full_lattice_pos(0.05, 0.1).unwrap(), 0);
        assert_eq!(full_lattice_pos(0.25, 0.1).unwrap(), 2);
        assert_eq!(full_lattice_pos(-0.05, 0.1).unwrap(), -1);
        assert_eq!(full_lattice_pos(3.5, 1.0).unwrap(), 3);
        assert!(full_lattice_pos(f64::NAN, 1.0).is_err());
        assert!(full_lattice_pos(1e300, 1.0).is_err());
    }
}
