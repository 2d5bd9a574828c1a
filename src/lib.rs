#![cfg_attr(docsrs, feature(doc_cfg))]
//! # arb-lattice
//!
//! arb-lattice distributes an *arbitrary lattice*, the unstructured node
//! connectivity of a lattice-based solver, across the processes of a run.
//! Each process owns a contiguous slice of the global node ids.
//!
//! ## Pipeline
//! Construction of an [`ArbLattice`](lattice::ArbLattice) runs once per process:
//!
//! - read the process's own records of the `.cxn` connectivity file and
//!   validate them against the [`ModelRegistry`](model::ModelRegistry)
//!   (stencil directions, node groups and zones)
//! - split the nodes evenly, then let an external [`Partitioner`](partitioning::Partitioner)
//!   balance them (collective)
//! - reject empty partitions
//! - find the ghost nodes (neighbors owned elsewhere)
//! - order local nodes border-first, each segment by `(z, y, x)`
//! - compute the local bounding box
//!
//! ## Features
//! - `rayon`: sort the local ordering segments in parallel
//! - `mpi-support`: `MpiGroup`, a process group over an MPI communicator
//!
//! ## Usage
//!
//! ```no_run
//! use arb_lattice::prelude::*;
//!
//! let registry = ModelRegistry::new(
//!     vec![OffsetDir::new(0, 0, 0), OffsetDir::new(1, 0, 0), OffsetDir::new(-1, 0, 0)],
//!     vec![0, 1, 1],
//!     vec!["Wall".into()],
//!     vec![],
//! )?;
//! let source = ConnectivitySource::file("channel.cxn");
//! let lattice = ArbLattice::new(&registry, &source, &SerialGroup, &NaivePartitioner)?;
//! println!("{} local nodes", lattice.local_size());
//! # Ok::<(), arb_lattice::lattice_error::ArbLatticeError>(())
//! ```

pub mod algs;
pub mod data;
pub mod io;
pub mod lattice;
pub mod lattice_error;
pub mod model;
pub mod partitioning;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiGroup;
    pub use crate::algs::communicator::{ProcessGroup, SerialGroup, ThreadGroup};
    pub use crate::algs::ghost::GhostSet;
    pub use crate::algs::local_order::LocalPermutation;
    pub use crate::data::bounding_box::BoundingBox;
    pub use crate::data::connectivity::{ConnectivityChunk, NodeRecord};
    pub use crate::io::{ConnectivityReader, ConnectivitySource};
    pub use crate::lattice::{ArbLattice, ArbLatticeBuilder, BuildOptions};
    pub use crate::lattice_error::{ArbLatticeError, CxnErrorKind};
    pub use crate::model::{GroupZoneMap, ModelRegistry};
    pub use crate::partitioning::{
        MsgType, NaivePartitioner, NodeMigration, PartitionMessage, PartitionOutcome, Partitioner,
        RereadMigration,
    };
    pub use crate::topology::distribution::{NodeDistribution, compute_initial_node_dist};
    pub use crate::topology::node::{GlobalNodeId, OffsetDir};
}
