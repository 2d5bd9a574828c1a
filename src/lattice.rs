//! `ArbLattice`: construction of the distributed arbitrary lattice.
//!
//! Construction is a single pass, every stage feeding the next:
//!
//! 1. read this process's slice of the connectivity file
//! 2. compute the even initial distribution
//! 3. partition (collective, only with more than one process)
//! 4. migrate the chunk to the new range
//! 5. reject empty partitions
//! 6. ghost nodes, local permutation, bounding box
//!
//! Any failure aborts construction; no partially built lattice is returned.
//! With [`BuildOptions::collective_abort`] set, the processes agree after
//! reading, partitioning and migration on whether everybody succeeded, so a
//! failure on one process fails the whole group instead of leaving the
//! others waiting in the next collective.

use crate::algs::communicator::ProcessGroup;
use crate::algs::ghost::{GhostSet, compute_ghost_nodes};
use crate::algs::local_order::{LocalPermutation, compute_local_permutation};
use crate::data::bounding_box::{BoundingBox, compute_bounding_box, full_lattice_pos};
use crate::data::connectivity::ConnectivityChunk;
use crate::io::{ConnectivityReader, ConnectivitySource};
use crate::lattice_error::ArbLatticeError;
use crate::model::ModelRegistry;
use crate::partitioning::{
    MsgType, NaivePartitioner, NodeMigration, PartitionMessage, Partitioner, RereadMigration,
};
use crate::topology::distribution::{NodeDistribution, compute_initial_node_dist};
use crate::topology::node::GlobalNodeId;

/// Knobs for [`ArbLatticeBuilder::build`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Agree on success across the group after every fallible stage.
    pub collective_abort: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            collective_abort: true,
        }
    }
}

/// The local part of a distributed arbitrary lattice.
#[derive(Debug, Clone)]
pub struct ArbLattice {
    rank: usize,
    connect: ConnectivityChunk,
    global_node_dist: NodeDistribution,
    ghost_nodes: GhostSet,
    local_permutation: LocalPermutation,
    local_bounding_box: BoundingBox,
    partition_log: Vec<PartitionMessage>,
}

impl ArbLattice {
    /// Start configuring the construction of a lattice.
    pub fn builder<'a>(
        registry: &'a ModelRegistry,
        source: &'a ConnectivitySource,
    ) -> ArbLatticeBuilder<'a> {
        ArbLatticeBuilder {
            registry,
            source,
            partitioner: &NaivePartitioner,
            migration: None,
            options: BuildOptions::default(),
        }
    }

    /// Build with `partitioner` and default options.
    pub fn new(
        registry: &ModelRegistry,
        source: &ConnectivitySource,
        group: &dyn ProcessGroup,
        partitioner: &dyn Partitioner,
    ) -> Result<Self, ArbLatticeError> {
        Self::builder(registry, source)
            .partitioner(partitioner)
            .build(group)
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Connectivity of the locally owned nodes.
    #[inline]
    pub fn connectivity(&self) -> &ConnectivityChunk {
        &self.connect
    }

    #[inline]
    pub fn local_size(&self) -> usize {
        self.connect.local_size()
    }

    #[inline]
    pub fn global_node_dist(&self) -> &NodeDistribution {
        &self.global_node_dist
    }

    #[inline]
    pub fn ghost_nodes(&self) -> &GhostSet {
        &self.ghost_nodes
    }

    /// Canonical index of a ghost node, `None` if `id` is not a ghost.
    #[inline]
    pub fn ghost_index(&self, id: GlobalNodeId) -> Option<usize> {
        self.ghost_nodes.local_index(id)
    }

    #[inline]
    pub fn local_permutation(&self) -> &LocalPermutation {
        &self.local_permutation
    }

    #[inline]
    pub fn num_border_nodes(&self) -> usize {
        self.local_permutation.num_border_nodes()
    }

    #[inline]
    pub fn local_bounding_box(&self) -> &BoundingBox {
        &self.local_bounding_box
    }

    /// Entries the partitioner logged (empty for a single process).
    #[inline]
    pub fn partition_log(&self) -> &[PartitionMessage] {
        &self.partition_log
    }

    #[inline]
    pub fn grid_size(&self) -> f64 {
        self.connect.grid_size()
    }

    /// Lattice index of physical coordinate `pos`.
    pub fn full_lattice_pos(&self, pos: f64) -> Result<i32, ArbLatticeError> {
        full_lattice_pos(pos, self.connect.grid_size())
    }
}

/// Configures and runs lattice construction.
pub struct ArbLatticeBuilder<'a> {
    registry: &'a ModelRegistry,
    source: &'a ConnectivitySource,
    partitioner: &'a dyn Partitioner,
    migration: Option<&'a dyn NodeMigration>,
    options: BuildOptions,
}

impl<'a> ArbLatticeBuilder<'a> {
    /// Graph partitioner; defaults to [`NaivePartitioner`].
    pub fn partitioner(mut self, partitioner: &'a dyn Partitioner) -> Self {
        self.partitioner = partitioner;
        self
    }

    /// Data migration; defaults to [`RereadMigration`] over the same source.
    pub fn migration(mut self, migration: &'a dyn NodeMigration) -> Self {
        self.migration = Some(migration);
        self
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the construction pipeline on `group`. Collective.
    pub fn build(self, group: &dyn ProcessGroup) -> Result<ArbLattice, ArbLatticeError> {
        let rank = group.rank();
        let size = group.size();
        let reader = ConnectivityReader::new(self.registry, rank, size)?;

        let connect = self.sync(group, "reading the connectivity file", reader.read(self.source))?;
        let num_nodes_global = connect.num_nodes_global();
        let mut global_node_dist = compute_initial_node_dist(num_nodes_global, size)?;
        let mut partition_log = Vec::new();

        let connect = if size > 1 {
            let outcome = self.partitioner.partition(
                &connect,
                self.registry.offset_direction_weights(),
                self.registry.self_direction(),
                group,
            );
            let checked = surface_partition_log(rank, &outcome.log).and_then(|()| {
                outcome
                    .distribution
                    .check_shape(size, num_nodes_global)
                    .map_err(|e| ArbLatticeError::InvalidPartition {
                        rank,
                        reason: e.to_string(),
                    })
            });
            self.sync(group, "partitioning", checked)?;
            global_node_dist = outcome.distribution;
            partition_log = outcome.log;

            let reread = RereadMigration::new(reader, self.source);
            let migration: &dyn NodeMigration = match self.migration {
                Some(m) => m,
                None => &reread,
            };
            let migrated = migration
                .migrate(connect, &global_node_dist, group)
                .and_then(|chunk| {
                    let expected = global_node_dist.range(rank);
                    if chunk.window() == expected {
                        Ok(chunk)
                    } else {
                        Err(ArbLatticeError::InvalidPartition {
                            rank,
                            reason: format!(
                                "migration produced nodes [{}, {}), expected [{}, {})",
                                chunk.chunk_begin(),
                                chunk.chunk_end(),
                                expected.start,
                                expected.end
                            ),
                        })
                    }
                });
            self.sync(group, "migrating nodes", migrated)?
        } else {
            connect
        };

        // Every process sees the same distribution, so all of them fail here together.
        if let Some(empty) = global_node_dist.first_empty_process() {
            return Err(ArbLatticeError::EmptyPartition {
                rank,
                empty_process: empty,
                num_processes: size,
                num_nodes_global,
            });
        }

        let ghost_nodes = compute_ghost_nodes(&connect);
        let local_permutation = compute_local_permutation(&connect);
        let local_bounding_box =
            compute_bounding_box(&connect).ok_or(ArbLatticeError::EmptyPartition {
                rank,
                empty_process: rank,
                num_processes: size,
                num_nodes_global,
            })?;

        log::info!(
            "process {rank}: {} local nodes, {} border, {} ghosts",
            connect.local_size(),
            local_permutation.num_border_nodes(),
            ghost_nodes.len()
        );

        Ok(ArbLattice {
            rank,
            connect,
            global_node_dist,
            ghost_nodes,
            local_permutation,
            local_bounding_box,
            partition_log,
        })
    }

    /// Agree on the outcome of a stage across the group.
    fn sync<T>(
        &self,
        group: &dyn ProcessGroup,
        stage: &'static str,
        result: Result<T, ArbLatticeError>,
    ) -> Result<T, ArbLatticeError> {
        if !self.options.collective_abort {
            return result;
        }
        let everyone_ok = group.all_ok(result.is_ok());
        match result {
            Ok(_) if !everyone_ok => Err(ArbLatticeError::PeerFailure {
                rank: group.rank(),
                stage,
            }),
            other => other,
        }
    }
}

/// Forward notices and warnings to the log; the first error is fatal.
fn surface_partition_log(rank: usize, entries: &[PartitionMessage]) -> Result<(), ArbLatticeError> {
    for entry in entries {
        match entry.kind {
            MsgType::Notice => log::info!("partitioner: {}", entry.message),
            MsgType::Warning => log::warn!("partitioner: {}", entry.message),
            MsgType::Error => {
                return Err(ArbLatticeError::Partitioner {
                    rank,
                    message: entry.message.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_log_error_is_fatal_after_earlier_entries() {
        let entries = vec![
            PartitionMessage::notice("n"),
            PartitionMessage::warning("w"),
            PartitionMessage::error("boom"),
            PartitionMessage::error("second"),
        ];
        match surface_partition_log(2, &entries) {
            Err(ArbLatticeError::Partitioner { rank, message }) => {
                assert_eq!(rank, 2);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(surface_partition_log(0, &entries[..2]).is_ok());
    }

    #[test]
    fn default_options_abort_collectively() {
        assert!(BuildOptions::default().collective_abort);
    }
}
