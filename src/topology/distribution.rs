//! Contiguous distribution of global node ids over processes.
//!
//! Process `p` owns the global ids `[dist[p], dist[p + 1])`. The naive split
//! from [`compute_initial_node_dist`] decides which records each process
//! reads from the connectivity file; the partitioner later replaces it
//! wholesale with a load-balanced one.

use crate::lattice_error::ArbLatticeError;
use crate::topology::node::GlobalNodeId;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Ordered offsets `dist[0..=num_processes]` with `dist[0] = 0`,
/// `dist[last] = num_nodes_global`, non-decreasing in between.
///
/// Serialized as the bare offset list; deserializing goes through [`NodeDistribution::new`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GlobalNodeId>", into = "Vec<GlobalNodeId>")]
pub struct NodeDistribution {
    offsets: Vec<GlobalNodeId>,
}

impl NodeDistribution {
    /// Validate `offsets` and wrap them.
    pub fn new(offsets: Vec<GlobalNodeId>) -> Result<Self, ArbLatticeError> {
        if offsets.len() < 2 {
            return Err(ArbLatticeError::InvalidDistribution(format!(
                "expected at least 2 offsets, got {}",
                offsets.len()
            )));
        }
        if offsets[0] != 0 {
            return Err(ArbLatticeError::InvalidDistribution(format!(
                "first offset must be 0, got {}",
                offsets[0]
            )));
        }
        if let Some(p) = offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(ArbLatticeError::InvalidDistribution(format!(
                "offsets decrease between process {p} ({}) and process {} ({})",
                offsets[p],
                p + 1,
                offsets[p + 1]
            )));
        }
        Ok(Self { offsets })
    }

    /// Number of processes the nodes are split over.
    #[inline]
    pub fn num_processes(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn num_nodes_global(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// Raw offsets, `num_processes() + 1` entries.
    #[inline]
    pub fn offsets(&self) -> &[GlobalNodeId] {
        &self.offsets
    }

    /// Global ids owned by `process`.
    ///
    /// # Panics
    /// Panics if `process >= num_processes()`.
    #[inline]
    pub fn range(&self, process: usize) -> Range<GlobalNodeId> {
        self.offsets[process]..self.offsets[process + 1]
    }

    #[inline]
    pub fn local_size(&self, process: usize) -> usize {
        self.offsets[process + 1] - self.offsets[process]
    }

    /// Process owning `id`, or `None` if `id >= num_nodes_global()`.
    ///
    /// With empty ranges several offsets coincide; the owner is the process
    /// whose range actually contains `id`.
    pub fn owner_of(&self, id: GlobalNodeId) -> Option<usize> {
        if id >= self.num_nodes_global() {
            return None;
        }
        // First offset strictly greater than `id`, minus one.
        let upper = self.offsets.partition_point(|&o| o <= id);
        Some(upper - 1)
    }

    /// Lowest process owning no nodes, if any.
    pub fn first_empty_process(&self) -> Option<usize> {
        self.offsets.windows(2).position(|w| w[0] == w[1])
    }

    /// Check the distribution covers `num_nodes_global` nodes over `num_processes`.
    pub fn check_shape(
        &self,
        num_processes: usize,
        num_nodes_global: usize,
    ) -> Result<(), ArbLatticeError> {
        if self.num_processes() != num_processes {
            return Err(ArbLatticeError::InvalidDistribution(format!(
                "distribution covers {} processes, the group has {num_processes}",
                self.num_processes()
            )));
        }
        if self.num_nodes_global() != num_nodes_global {
            return Err(ArbLatticeError::InvalidDistribution(format!(
                "distribution covers {} nodes, the lattice has {num_nodes_global}",
                self.num_nodes_global()
            )));
        }
        Ok(())
    }
}

impl TryFrom<Vec<GlobalNodeId>> for NodeDistribution {
    type Error = ArbLatticeError;

    fn try_from(offsets: Vec<GlobalNodeId>) -> Result<Self, Self::Error> {
        Self::new(offsets)
    }
}

impl From<NodeDistribution> for Vec<GlobalNodeId> {
    fn from(dist: NodeDistribution) -> Self {
        dist.offsets
    }
}

/// Split `total` nodes as evenly as possible over `num_processes`.
///
/// Every process gets `total / num_processes` nodes and the first
/// `total % num_processes` processes one more. Ranges may be empty.
pub fn compute_initial_node_dist(
    total: usize,
    num_processes: usize,
) -> Result<NodeDistribution, ArbLatticeError> {
    if num_processes == 0 {
        return Err(ArbLatticeError::InvalidDistribution(
            "cannot distribute nodes over 0 processes".into(),
        ));
    }
    Ok(even_split(total, num_processes))
}

/// [`compute_initial_node_dist`] for a group size known to be non-zero;
/// a zero size is treated as one process.
pub(crate) fn even_split(total: usize, num_processes: usize) -> NodeDistribution {
    let num_processes = num_processes.max(1);
    let base = total / num_processes;
    let rem = total % num_processes;
    let mut offsets = Vec::with_capacity(num_processes + 1);
    offsets.push(0);
    let mut acc = 0;
    for p in 0..num_processes {
        acc += base + usize::from(p < rem);
        offsets.push(acc);
    }
    NodeDistribution { offsets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn even_split_with_remainder_front_loaded() {
        let d = compute_initial_node_dist(10, 4).unwrap();
        assert_eq!(d.offsets(), &[0, 3, 6, 8, 10]);
        assert_eq!(d.range(1), 3..6);
        assert_eq!(d.local_size(3), 2);
        assert_eq!(d.first_empty_process(), None);
    }

    #[test]
    fn more_processes_than_nodes_yields_empty_ranges() {
        let d = compute_initial_node_dist(2, 4).unwrap();
        assert_eq!(d.offsets(), &[0, 1, 2, 2, 2]);
        assert_eq!(d.first_empty_process(), Some(2));
        assert_eq!(d.owner_of(1), Some(1));
        assert_eq!(d.owner_of(2), None);
    }

    #[test]
    fn zero_processes_is_rejected() {
        assert!(matches!(
            compute_initial_node_dist(5, 0),
            Err(ArbLatticeError::InvalidDistribution(_))
        ));
    }

    #[test]
    fn new_rejects_broken_offsets() {
        assert!(NodeDistribution::new(vec![0]).is_err());
        assert!(NodeDistribution::new(vec![1, 4]).is_err());
        assert!(NodeDistribution::new(vec![0, 5, 3]).is_err());
        let d = NodeDistribution::new(vec![0, 0, 7]).unwrap();
        assert_eq!(d.owner_of(0), Some(1));
        assert!(d.check_shape(2, 7).is_ok());
        assert!(d.check_shape(3, 7).is_err());
        assert!(d.check_shape(2, 8).is_err());
    }

    #[test]
    fn deserializing_validates_offsets() {
        let d: NodeDistribution = serde_json::from_str("[0, 2, 2, 5]").unwrap();
        assert_eq!(d.first_empty_process(), Some(1));
        assert_eq!(serde_json::to_string(&d).unwrap(), "[0,2,2,5]");
        for bad in ["[]", "[0]", "[5, 2]", "[0, 4, 3]"] {
            assert!(serde_json::from_str::<NodeDistribution>(bad).is_err(), "{bad}");
        }
    }

    proptest! {
        #[test]
        fn initial_dist_is_balanced(total in 0usize..10_000, procs in 1usize..300) {
            let d = compute_initial_node_dist(total, procs).unwrap();
            prop_assert_eq!(d.num_processes(), procs);
            prop_assert_eq!(d.offsets()[0], 0);
            prop_assert_eq!(d.num_nodes_global(), total);
            let counts: Vec<usize> = (0..procs).map(|p| d.local_size(p)).collect();
            prop_assert_eq!(counts.iter().sum::<usize>(), total);
            let lo = total / procs;
            for &c in &counts {
                prop_assert!(c == lo || c == lo + 1);
            }
            let max = *counts.iter().max().unwrap();
            let min = *counts.iter().min().unwrap();
            prop_assert!(max - min <= 1);
        }

        #[test]
        fn owner_of_agrees_with_ranges(total in 1usize..2_000, procs in 1usize..50, probe in 0usize..2_000) {
            let d = compute_initial_node_dist(total, procs).unwrap();
            let id = probe % total;
            let owner = d.owner_of(id).unwrap();
            prop_assert!(d.range(owner).contains(&id));
        }
    }
}
