//! ArbLatticeError: Unified error type for arb-lattice public APIs
//!
//! Every fatal condition met while constructing an [`ArbLattice`](crate::lattice::ArbLattice)
//! surfaces as one of these variants. Connectivity-file failures carry the
//! source name and the reporting process so that a failure on one process of
//! a large run can be traced back.

use crate::topology::node::OffsetDir;
use itertools::Itertools;
use thiserror::Error;

/// Unified error type for arb-lattice operations.
#[derive(Debug, Error)]
pub enum ArbLatticeError {
    /// Reading the connectivity file failed.
    #[error("Error while reading {file} on process {rank}: {kind}")]
    Connectivity {
        file: String,
        rank: usize,
        kind: CxnErrorKind,
    },
    /// The partitioner emitted an `Error` log entry.
    #[error("Partitioner failed on process {rank}: {message}")]
    Partitioner { rank: usize, message: String },
    /// The partitioner returned a distribution that breaks the distribution invariants.
    #[error("Partitioner returned an invalid distribution on process {rank}: {reason}")]
    InvalidPartition { rank: usize, reason: String },
    /// At least one process owns no nodes after distribution.
    #[error(
        "Error on process {rank}: process {empty_process} has an empty partition ({num_processes} processes for {num_nodes_global} nodes), please use fewer processes"
    )]
    EmptyPartition {
        rank: usize,
        empty_process: usize,
        num_processes: usize,
        num_nodes_global: usize,
    },
    /// Another process of the group failed; this one aborts with it.
    #[error("Process {rank} aborted: another process failed while {stage}")]
    PeerFailure { rank: usize, stage: &'static str },
    /// Distribution offsets are not a valid split of the node set.
    #[error("Invalid node distribution: {0}")]
    InvalidDistribution(String),
    /// The model registry is inconsistent.
    #[error("Invalid model registry: {0}")]
    InvalidRegistry(String),
    /// A physical position does not map to a representable lattice index.
    #[error("Position {pos} does not map to a lattice index for grid size {grid_size}")]
    LatticePosition { pos: f64, grid_size: f64 },
}

/// Reasons a connectivity file could not be read.
#[derive(Debug, Error)]
pub enum CxnErrorKind {
    /// The stream could not be opened.
    #[error("Could not open file: {0}")]
    Open(#[source] std::io::Error),
    /// The stream failed mid-read.
    #[error("Failed to read {context}: {error}")]
    Io {
        context: String,
        #[source]
        error: std::io::Error,
    },
    /// A section header did not match.
    #[error("Unexpected section header: {actual}; Expected: {expected}")]
    UnexpectedHeader {
        expected: &'static str,
        actual: String,
    },
    /// The stream ended before `context` was complete.
    #[error("Failed to read {context}: unexpected end of file")]
    UnexpectedEof { context: String },
    /// A token could not be parsed.
    #[error("Failed to read {context}: malformed token `{token}`")]
    MalformedToken { context: String, token: String },
    /// The file does not list a direction of the model stencil.
    #[error("The arbitrary lattice file does not provide the required direction: {0}")]
    MissingDirection(OffsetDir),
    /// Registry groups/zones absent from the NODE_GROUPS section.
    #[error("{}", missing_groups_message(.0))]
    MissingGroups(Vec<String>),
    /// A neighbor id is neither `-1` nor a valid global node id.
    #[error("Neighbor {value} of node {node} is not a valid node id (num_nodes_global = {num_nodes_global})")]
    NeighborOutOfRange {
        node: usize,
        value: i64,
        num_nodes_global: usize,
    },
    /// A zone reference does not index the NODE_GROUPS list.
    #[error("Zone reference {value} of node {node} does not index the {num_groups} listed groups")]
    ZoneOutOfRange {
        node: usize,
        value: i64,
        num_groups: usize,
    },
    /// The requested node window lies outside the file's node set.
    #[error("Node window [{begin}, {end}) exceeds the {num_nodes_global} nodes in the file")]
    WindowOutOfRange {
        begin: usize,
        end: usize,
        num_nodes_global: usize,
    },
}

fn missing_groups_message(missing: &[String]) -> String {
    let what = if missing.len() > 1 {
        "groups and/or zones were"
    } else {
        "group/zone was"
    };
    format!(
        "The following {what} not present in the file: {}",
        missing.iter().join(", ")
    )
}
