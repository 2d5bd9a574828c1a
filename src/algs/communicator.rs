//! Thin façade over the process group a lattice is distributed across.
//!
//! Lattice construction needs very little from the message-passing layer:
//! the process's rank, the group size, and one collective (a logical AND)
//! used to make every process fail together when one of them fails.
//! Anything heavier (graph partitioning, data migration) lives behind the
//! collaborator traits in [`crate::partitioning`].

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// A group of cooperating processes.
pub trait ProcessGroup: Send + Sync {
    /// Rank of this process in `0..size()`.
    fn rank(&self) -> usize;
    /// Number of processes in the group.
    fn size(&self) -> usize;
    /// Collective logical AND of `ok` over the group.
    ///
    /// Every process must call it the same number of times, in the same order.
    fn all_ok(&self, ok: bool) -> bool;
}

/// Single-process group, for serial runs and unit tests.
#[derive(Clone, Debug, Default)]
pub struct SerialGroup;

impl ProcessGroup for SerialGroup {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn all_ok(&self, ok: bool) -> bool {
        ok
    }
}

// --- ThreadGroup: in-process ranks on separate threads ---

#[derive(Debug)]
struct Round {
    generation: u64,
    arrived: usize,
    acc: bool,
    result: bool,
}

#[derive(Debug)]
struct Rendezvous {
    size: usize,
    round: Mutex<Round>,
    cv: Condvar,
}

/// One rank of a group whose processes are threads of the same program.
#[derive(Clone, Debug)]
pub struct ThreadGroup {
    rank: usize,
    shared: Arc<Rendezvous>,
}

impl ThreadGroup {
    /// Handles for ranks `0..size`, to be moved onto one thread each.
    /// Empty for `size == 0`.
    pub fn create(size: usize) -> Vec<ThreadGroup> {
        let shared = Arc::new(Rendezvous {
            size,
            round: Mutex::new(Round {
                generation: 0,
                arrived: 0,
                acc: true,
                result: true,
            }),
            cv: Condvar::new(),
        });
        (0..size)
            .map(|rank| ThreadGroup {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

impl ProcessGroup for ThreadGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn all_ok(&self, ok: bool) -> bool {
        let mut round = self.shared.round.lock();
        let generation = round.generation;
        round.acc &= ok;
        round.arrived += 1;
        if round.arrived == self.shared.size {
            // Last to arrive publishes the result and opens the next round.
            round.result = round.acc;
            round.acc = true;
            round.arrived = 0;
            round.generation += 1;
            self.shared.cv.notify_all();
            return round.result;
        }
        while round.generation == generation {
            self.shared.cv.wait(&mut round);
        }
        round.result
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::ProcessGroup;
    use mpi::collective::SystemOperation;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::*;

    /// Process group backed by an MPI communicator.
    pub struct MpiGroup {
        comm: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiGroup {
        /// Wrap a communicator (e.g. `universe.world()` or a split of it).
        pub fn new(comm: SimpleCommunicator) -> Self {
            let rank = comm.rank() as usize;
            let size = comm.size() as usize;
            Self { comm, rank, size }
        }

        pub fn communicator(&self) -> &SimpleCommunicator {
            &self.comm
        }
    }

    // SAFETY: MPI is initialised with at least `Threading::Serialized` by the
    // caller when the group is shared across threads; the communicator
    // handle itself is immutable.
    unsafe impl Send for MpiGroup {}
    unsafe impl Sync for MpiGroup {}

    impl ProcessGroup for MpiGroup {
        fn rank(&self) -> usize {
            self.rank
        }
        fn size(&self) -> usize {
            self.size
        }
        fn all_ok(&self, ok: bool) -> bool {
            let local = i32::from(ok);
            let mut global = 0i32;
            self.comm
                .all_reduce_into(&local, &mut global, SystemOperation::min());
            global == 1
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiGroup;
