//! Weighted node-adjacency graph of a chunk, in distributed CSR form.
//
// The stencil is modelled as a graph: every local node is a vertex and each
// offset direction q contributes an edge of weight `weights[q]` to the
// neighbor in that direction. Returned in ParMETIS-ready CSR triples:
//
// * `xadj[i] .. xadj[i+1]`   = edge range of local node i
// * `adjncy`                 = neighbor *global* ids
// * `adjwgt`                 = edge weights
//
// Absent neighbors, the self direction, self loops and zero-weight
// directions produce no edge. Several directions reaching the same neighbor
// collapse into one edge carrying the summed weight.

use crate::data::connectivity::ConnectivityChunk;
use crate::lattice_error::ArbLatticeError;
use crate::topology::node::GlobalNodeId;

/// CSR triple over the local nodes of one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalGraph {
    pub xadj: Vec<usize>,
    pub adjncy: Vec<GlobalNodeId>,
    pub adjwgt: Vec<u32>,
}

impl LocalGraph {
    /// Build the graph of `chunk` with one weight per model direction.
    pub fn from_chunk(
        chunk: &ConnectivityChunk,
        weights: &[u32],
        self_direction: Option<usize>,
    ) -> Result<Self, ArbLatticeError> {
        if weights.len() != chunk.q() {
            return Err(ArbLatticeError::InvalidRegistry(format!(
                "{} direction weights for a stencil of {} directions",
                weights.len(),
                chunk.q()
            )));
        }
        let n = chunk.local_size();
        let mut xadj = Vec::with_capacity(n + 1);
        let mut adjncy = Vec::with_capacity(n * chunk.q());
        let mut adjwgt = Vec::with_capacity(n * chunk.q());
        let mut row: Vec<(GlobalNodeId, u32)> = Vec::with_capacity(chunk.q());
        xadj.push(0);

        for lid in 0..n {
            let me = chunk.global_id(lid);
            row.clear();
            for (q, nbr) in chunk.neighbors_of(lid).enumerate() {
                let Some(nbr) = nbr else { continue };
                if Some(q) == self_direction || nbr == me || weights[q] == 0 {
                    continue;
                }
                row.push((nbr, weights[q]));
            }
            row.sort_unstable_by_key(|&(nbr, _)| nbr);
            for &(nbr, w) in &row {
                match adjncy.last() {
                    Some(&last) if adjncy.len() > xadj[lid] && last == nbr => {
                        if let Some(acc) = adjwgt.last_mut() {
                            *acc += w;
                        }
                    }
                    _ => {
                        adjncy.push(nbr);
                        adjwgt.push(w);
                    }
                }
            }
            xadj.push(adjncy.len());
        }
        Ok(Self {
            xadj,
            adjncy,
            adjwgt,
        })
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.xadj.len() - 1
    }

    /// `(neighbor, weight)` pairs of local vertex `lid`.
    pub fn edges_of(&self, lid: usize) -> impl Iterator<Item = (GlobalNodeId, u32)> + '_ {
        let range = self.xadj[lid]..self.xadj[lid + 1];
        self.adjncy[range.clone()]
            .iter()
            .copied()
            .zip(self.adjwgt[range].iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::connectivity::NodeRecord;

    #[test]
    fn skips_self_and_boundaries_and_merges_duplicates() {
        // directions: 0 = self, 1 = +x, 2 = -x, 3 = +x (again, periodic wrap)
        let rec = |nbrs: [Option<usize>; 4]| NodeRecord {
            position: [0.0; 3],
            neighbors: nbrs.to_vec(),
            zones: vec![],
        };
        let chunk = ConnectivityChunk::from_records(
            1..3,
            4,
            4,
            1.0,
            &[
                rec([Some(1), Some(2), Some(0), Some(2)]),
                rec([Some(2), None, Some(1), Some(3)]),
            ],
        )
        .unwrap();
        let g = LocalGraph::from_chunk(&chunk, &[9, 2, 1, 3], Some(0)).unwrap();
        assert_eq!(g.num_vertices(), 2);
        assert_eq!(g.edges_of(0).collect::<Vec<_>>(), vec![(0, 1), (2, 5)]);
        assert_eq!(g.edges_of(1).collect::<Vec<_>>(), vec![(1, 1), (3, 3)]);
        assert_eq!(g.xadj, vec![0, 2, 4]);
    }

    #[test]
    fn weight_count_must_match_stencil() {
        let chunk = ConnectivityChunk::from_records(0..0, 0, 2, 1.0, &[]).unwrap();
        assert!(LocalGraph::from_chunk(&chunk, &[1], None).is_err());
    }
}
