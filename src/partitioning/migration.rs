//! Bringing a process's connectivity in line with a new distribution.
//!
//! After partitioning, process `p` must hold exactly the nodes of
//! `dist.range(p)`. How they get there is up to the [`NodeMigration`]
//! implementation; [`RereadMigration`] relies on every process seeing the
//! same connectivity source and simply reads the new window from it.

use crate::algs::communicator::ProcessGroup;
use crate::data::connectivity::ConnectivityChunk;
use crate::io::{ConnectivityReader, ConnectivitySource};
use crate::lattice_error::ArbLatticeError;
use crate::topology::distribution::NodeDistribution;

/// Contract: the returned chunk reflects exactly `distribution.range(group.rank())`.
pub trait NodeMigration {
    fn migrate(
        &self,
        chunk: ConnectivityChunk,
        distribution: &NodeDistribution,
        group: &dyn ProcessGroup,
    ) -> Result<ConnectivityChunk, ArbLatticeError>;
}

/// Re-reads the process's new window from the connectivity source.
#[derive(Clone, Copy, Debug)]
pub struct RereadMigration<'a> {
    reader: ConnectivityReader<'a>,
    source: &'a ConnectivitySource,
}

impl<'a> RereadMigration<'a> {
    pub fn new(reader: ConnectivityReader<'a>, source: &'a ConnectivitySource) -> Self {
        Self { reader, source }
    }
}

impl NodeMigration for RereadMigration<'_> {
    fn migrate(
        &self,
        chunk: ConnectivityChunk,
        distribution: &NodeDistribution,
        group: &dyn ProcessGroup,
    ) -> Result<ConnectivityChunk, ArbLatticeError> {
        let rank = group.rank();
        distribution
            .check_shape(group.size(), chunk.num_nodes_global())
            .map_err(|e| ArbLatticeError::InvalidPartition {
                rank,
                reason: e.to_string(),
            })?;
        let window = distribution.range(rank);
        if window == chunk.window() {
            return Ok(chunk);
        }
        log::debug!(
            "process {rank}: re-reading nodes [{}, {}) (was [{}, {}))",
            window.start,
            window.end,
            chunk.chunk_begin(),
            chunk.chunk_end()
        );
        self.reader.read_window(self.source, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::ThreadGroup;
    use crate::model::ModelRegistry;
    use crate::topology::node::OffsetDir;

    #[test]
    fn reread_picks_up_new_window() {
        let reg = ModelRegistry::new(vec![OffsetDir::new(1, 0, 0)], vec![1], vec![], vec![])
            .unwrap();
        let src = ConnectivitySource::in_memory(
            "line.cxn",
            "OFFSET_DIRECTIONS 1\n1 0 0\nGRID_SIZE 1\nNODE_GROUPS 0\nNODES 4\n0 0 0 1 0\n1 0 0 2 0\n2 0 0 3 0\n3 0 0 -1 0\n",
        );
        let groups = ThreadGroup::create(2);
        let reader = ConnectivityReader::new(&reg, 1, 2).unwrap();
        let chunk = reader.read(&src).unwrap();
        assert_eq!(chunk.window(), 2..4);

        let dist = NodeDistribution::new(vec![0, 1, 4]).unwrap();
        let moved = RereadMigration::new(reader, &src)
            .migrate(chunk, &dist, &groups[1])
            .unwrap();
        assert_eq!(moved.window(), 1..4);
        assert_eq!(moved.position(0), [1.0, 0.0, 0.0]);
        assert_eq!(moved.neighbor(0, 2), None);
    }

    #[test]
    fn distribution_of_another_shape_is_rejected() {
        let reg = ModelRegistry::new(vec![OffsetDir::new(1, 0, 0)], vec![1], vec![], vec![])
            .unwrap();
        let src = ConnectivitySource::in_memory(
            "pair.cxn",
            "OFFSET_DIRECTIONS 1\n1 0 0\nGRID_SIZE 1\nNODE_GROUPS 0\nNODES 2\n0 0 0 1 0\n1 0 0 -1 0\n",
        );
        let groups = ThreadGroup::create(2);
        let reader = ConnectivityReader::new(&reg, 1, 2).unwrap();
        let migration = RereadMigration::new(reader, &src);

        // One process too few, then the wrong node count.
        for offsets in [vec![0, 2], vec![0, 1, 3]] {
            let chunk = reader.read(&src).unwrap();
            let dist = NodeDistribution::new(offsets).unwrap();
            let err = migration.migrate(chunk, &dist, &groups[1]).unwrap_err();
            assert!(
                matches!(err, ArbLatticeError::InvalidPartition { rank: 1, .. }),
                "{err:?}"
            );
        }
    }
}
