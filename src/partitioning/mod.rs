//! Entry-point for repartitioning the lattice.
//!
//! The graph partitioner is an external collaborator: this crate only
//! defines the contract ([`Partitioner`]), hands it the weighted stencil
//! graph, and consumes the distribution and log it returns. Likewise
//! [`migration::NodeMigration`] is the contract for bringing a process's
//! connectivity in line with its new range.

pub mod graph;
pub mod migration;

pub use graph::LocalGraph;
pub use migration::{NodeMigration, RereadMigration};

use crate::algs::communicator::ProcessGroup;
use crate::data::connectivity::ConnectivityChunk;
use crate::topology::distribution::{NodeDistribution, even_split};
use serde::{Deserialize, Serialize};

/// Severity of a partitioner log entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsgType {
    /// Informational; surfaced via `log::info!`.
    Notice,
    /// Surfaced via `log::warn!`, construction continues.
    Warning,
    /// Fatal for the whole construction.
    Error,
}

/// One entry of the partitioner log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionMessage {
    pub kind: MsgType,
    pub message: String,
}

impl PartitionMessage {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            kind: MsgType::Notice,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: MsgType::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: MsgType::Error,
            message: message.into(),
        }
    }
}

/// What a partitioner hands back.
#[derive(Clone, Debug)]
pub struct PartitionOutcome {
    /// Replaces the previous distribution wholesale.
    pub distribution: NodeDistribution,
    /// Ordered log entries.
    pub log: Vec<PartitionMessage>,
}

/// Contract to an external graph partitioner.
///
/// `partition` is collective: every process of `group` calls it with its own
/// chunk and none returns before the whole group is done. It is only invoked
/// when the group has more than one process.
pub trait Partitioner {
    /// * `weights` — one weight per model direction (edge weights of the stencil graph)
    /// * `self_direction` — index of the zero offset, which carries no edge
    fn partition(
        &self,
        chunk: &ConnectivityChunk,
        weights: &[u32],
        self_direction: Option<usize>,
        group: &dyn ProcessGroup,
    ) -> PartitionOutcome;
}

/// Keeps the even split the file was read with.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaivePartitioner;

impl Partitioner for NaivePartitioner {
    fn partition(
        &self,
        chunk: &ConnectivityChunk,
        _weights: &[u32],
        _self_direction: Option<usize>,
        group: &dyn ProcessGroup,
    ) -> PartitionOutcome {
        PartitionOutcome {
            distribution: even_split(chunk.num_nodes_global(), group.size()),
            log: vec![PartitionMessage::notice(
                "keeping the even node split, no graph partitioner configured",
            )],
        }
    }
}
