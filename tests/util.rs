#![allow(dead_code)]
use arb_lattice::algs::communicator::{ProcessGroup, ThreadGroup};
use arb_lattice::data::connectivity::ConnectivityChunk;
use arb_lattice::model::ModelRegistry;
use arb_lattice::partitioning::{PartitionMessage, PartitionOutcome, Partitioner};
use arb_lattice::topology::distribution::NodeDistribution;
use arb_lattice::topology::node::OffsetDir;

/// D3Q7: self plus the six axis neighbors, in model order.
pub fn d3q7() -> Vec<OffsetDir> {
    vec![
        OffsetDir::new(0, 0, 0),
        OffsetDir::new(1, 0, 0),
        OffsetDir::new(-1, 0, 0),
        OffsetDir::new(0, 1, 0),
        OffsetDir::new(0, -1, 0),
        OffsetDir::new(0, 0, 1),
        OffsetDir::new(0, 0, -1),
    ]
}

/// D3Q7 registry with one node-type group (`Wall`) and one zone (`inlet`).
pub fn registry() -> ModelRegistry {
    ModelRegistry::new(
        d3q7(),
        vec![0, 1, 1, 1, 1, 1, 1],
        vec!["Wall".into()],
        vec!["inlet".into()],
    )
    .unwrap()
}

/// Box-shaped lattice of `n[0] × n[1] × n[2]` nodes, x fastest.
///
/// Node memberships: `Wall` on the box boundary, `_Z_inlet` on `x = 0`,
/// `Extra` (unknown to [`registry`]) on `z = 0`. Only names listed in
/// `groups` are written to the file.
#[derive(Clone, Debug)]
pub struct GridCxn {
    pub n: [usize; 3],
    pub spacing: f64,
    pub dirs: Vec<OffsetDir>,
    pub groups: Vec<String>,
}

impl GridCxn {
    pub fn new(n: [usize; 3]) -> Self {
        Self {
            n,
            spacing: 0.5,
            dirs: d3q7(),
            groups: vec!["Wall".into(), "_Z_inlet".into()],
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.n.iter().product()
    }

    pub fn cell(&self, id: usize) -> [usize; 3] {
        [
            id % self.n[0],
            (id / self.n[0]) % self.n[1],
            id / (self.n[0] * self.n[1]),
        ]
    }

    pub fn id(&self, c: [usize; 3]) -> usize {
        c[0] + self.n[0] * (c[1] + self.n[1] * c[2])
    }

    pub fn position(&self, id: usize) -> [f64; 3] {
        let c = self.cell(id);
        [0, 1, 2].map(|a| (c[a] as f64 + 0.5) * self.spacing)
    }

    pub fn neighbor(&self, id: usize, dir: OffsetDir) -> Option<usize> {
        let c = self.cell(id);
        let mut out = [0usize; 3];
        for a in 0..3 {
            let v = c[a] as i64 + i64::from(dir.0[a]);
            if v < 0 || v >= self.n[a] as i64 {
                return None;
            }
            out[a] = v as usize;
        }
        Some(self.id(out))
    }

    pub fn zone_names(&self, id: usize) -> Vec<&'static str> {
        let c = self.cell(id);
        let mut names = Vec::new();
        if (0..3).any(|a| c[a] == 0 || c[a] + 1 == self.n[a]) {
            names.push("Wall");
        }
        if c[0] == 0 {
            names.push("_Z_inlet");
        }
        if c[2] == 0 {
            names.push("Extra");
        }
        names
    }

    /// Zone indices (into `groups`) written for node `id`.
    pub fn file_zones(&self, id: usize) -> Vec<usize> {
        self.zone_names(id)
            .into_iter()
            .filter_map(|name| self.groups.iter().position(|g| g == name))
            .collect()
    }

    /// Neighbor values as written in the file, in file direction order.
    pub fn file_neighbors(&self, id: usize) -> Vec<Option<usize>> {
        self.dirs.iter().map(|&d| self.neighbor(id, d)).collect()
    }

    pub fn render(&self) -> String {
        let mut s = format!("OFFSET_DIRECTIONS {}\n", self.dirs.len());
        for d in &self.dirs {
            let [x, y, z] = d.0;
            s.push_str(&format!("{x} {y} {z}\n"));
        }
        s.push_str(&format!("GRID_SIZE {}\n", self.spacing));
        s.push_str(&format!("NODE_GROUPS {}\n", self.groups.len()));
        for g in &self.groups {
            s.push_str(g);
            s.push('\n');
        }
        s.push_str(&format!("NODES {}\n", self.num_nodes()));
        for id in 0..self.num_nodes() {
            let [x, y, z] = self.position(id);
            let mut line = format!("{x} {y} {z}");
            for nbr in self.file_neighbors(id) {
                match nbr {
                    Some(n) => line.push_str(&format!(" {n}")),
                    None => line.push_str(" -1"),
                }
            }
            let zones = self.file_zones(id);
            line.push_str(&format!(" {}", zones.len()));
            for z in zones {
                line.push_str(&format!(" {z}"));
            }
            s.push_str(&line);
            s.push('\n');
        }
        s
    }
}

/// Deterministic stand-in for a graph partitioner.
#[derive(Clone, Debug, Default)]
pub struct FixedPartitioner {
    pub offsets: Vec<usize>,
    pub log: Vec<PartitionMessage>,
    /// Rank that additionally logs an error.
    pub fail_on: Option<usize>,
}

impl FixedPartitioner {
    pub fn new(offsets: Vec<usize>) -> Self {
        Self {
            offsets,
            ..Default::default()
        }
    }
}

impl Partitioner for FixedPartitioner {
    fn partition(
        &self,
        _chunk: &ConnectivityChunk,
        _weights: &[u32],
        _self_direction: Option<usize>,
        group: &dyn ProcessGroup,
    ) -> PartitionOutcome {
        let mut log = self.log.clone();
        if self.fail_on == Some(group.rank()) {
            log.push(PartitionMessage::error("partitioning failed"));
        }
        PartitionOutcome {
            distribution: NodeDistribution::new(self.offsets.clone()).unwrap(),
            log,
        }
    }
}

/// Run `f` once per rank of an in-process group of `n`, one thread each.
pub fn run_ranks<T: Send>(n: usize, f: impl Fn(&ThreadGroup) -> T + Sync) -> Vec<T> {
    let groups = ThreadGroup::create(n);
    let f = &f;
    std::thread::scope(|s| {
        let handles: Vec<_> = groups.iter().map(|g| s.spawn(move || f(g))).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

/// Assert `(z, y, x)` never decreases along `ids`.
pub fn assert_zyx_sorted(chunk: &ConnectivityChunk, ids: &[usize]) {
    for w in ids.windows(2) {
        let key = |lid: usize| {
            let [x, y, z] = chunk.position(lid);
            [z, y, x]
        };
        assert!(
            key(w[0]) <= key(w[1]),
            "segment not (z, y, x) sorted at local ids {} -> {}",
            w[0],
            w[1]
        );
    }
}
