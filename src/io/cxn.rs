//! Reader for the `.cxn` arbitrary-lattice connectivity format.
//!
//! # Format
//! Whitespace-delimited text with a fixed section order:
//!
//! ```text
//! OFFSET_DIRECTIONS <n_q>
//! <dx dy dz>                      × n_q
//! GRID_SIZE <double>
//! NODE_GROUPS <n_groups>
//! <name>                          × n_groups
//! NODES <num_nodes_global>
//! <x> <y> <z> <nbr> × n_q <n_zones> <zone> × n_zones     (one line per node)
//! ```
//!
//! Neighbors are global node ids in the file's direction order, `-1` for
//! "no neighbor". Zones index the NODE_GROUPS list, `-1` for "no zone".
//!
//! # Parallel reading
//! Every process reads the header sections, then skips straight to its own
//! records by counting newlines. No process talks to another while reading.

use crate::data::connectivity::ConnectivityChunk;
use crate::io::ConnectivitySource;
use crate::io::tokens::Tokens;
use crate::lattice_error::{ArbLatticeError, CxnErrorKind};
use crate::model::ModelRegistry;
use crate::topology::distribution::compute_initial_node_dist;
use crate::topology::node::{GlobalNodeId, NO_NEIGHBOR, OffsetDir};
use hashbrown::{HashMap, HashSet};
use std::io::BufRead;
use std::ops::Range;

const OFFSET_DIRECTIONS: &str = "OFFSET_DIRECTIONS";
const GRID_SIZE: &str = "GRID_SIZE";
const NODE_GROUPS: &str = "NODE_GROUPS";
const NODES: &str = "NODES";

/// Reads one process's slice of a connectivity file.
#[derive(Clone, Copy, Debug)]
pub struct ConnectivityReader<'a> {
    registry: &'a ModelRegistry,
    rank: usize,
    num_processes: usize,
}

impl<'a> ConnectivityReader<'a> {
    pub fn new(
        registry: &'a ModelRegistry,
        rank: usize,
        num_processes: usize,
    ) -> Result<Self, ArbLatticeError> {
        if rank >= num_processes {
            return Err(ArbLatticeError::InvalidDistribution(format!(
                "rank {rank} is not part of a group of {num_processes} processes"
            )));
        }
        Ok(Self {
            registry,
            rank,
            num_processes,
        })
    }

    /// Read the records of this process's share of the even initial split.
    pub fn read(&self, source: &ConnectivitySource) -> Result<ConnectivityChunk, ArbLatticeError> {
        let (rank, size) = (self.rank, self.num_processes);
        self.read_with(source, |num_nodes_global| {
            let dist = compute_initial_node_dist(num_nodes_global, size)
                .map_err(|_| CxnErrorKind::WindowOutOfRange {
                    begin: 0,
                    end: 0,
                    num_nodes_global,
                })?;
            Ok(dist.range(rank))
        })
    }

    /// Read the records of an explicit global id window.
    pub fn read_window(
        &self,
        source: &ConnectivitySource,
        window: Range<GlobalNodeId>,
    ) -> Result<ConnectivityChunk, ArbLatticeError> {
        self.read_with(source, |num_nodes_global| {
            if window.start > window.end || window.end > num_nodes_global {
                return Err(CxnErrorKind::WindowOutOfRange {
                    begin: window.start,
                    end: window.end,
                    num_nodes_global,
                });
            }
            Ok(window)
        })
    }

    fn read_with(
        &self,
        source: &ConnectivitySource,
        select: impl FnOnce(usize) -> Result<Range<GlobalNodeId>, CxnErrorKind>,
    ) -> Result<ConnectivityChunk, ArbLatticeError> {
        let wrap = |kind| ArbLatticeError::Connectivity {
            file: source.name(),
            rank: self.rank,
            kind,
        };
        let reader = source.open().map_err(|e| wrap(CxnErrorKind::Open(e)))?;
        self.parse(Tokens::new(reader), select).map_err(wrap)
    }

    fn parse<R: BufRead>(
        &self,
        mut tokens: Tokens<R>,
        select: impl FnOnce(usize) -> Result<Range<GlobalNodeId>, CxnErrorKind>,
    ) -> Result<ConnectivityChunk, CxnErrorKind> {
        // Offset directions
        let n_q_provided = section_header(&mut tokens, OFFSET_DIRECTIONS)?;
        // Counts from the file are not trusted for sizing; buffers grow as records arrive.
        let mut provided = Vec::new();
        for i in 0..n_q_provided {
            let mut d = [0i32; 3];
            for c in &mut d {
                *c = tokens.parse(|| format!("offset direction {i} of section {OFFSET_DIRECTIONS}"))?;
            }
            provided.push(OffsetDir(d));
        }
        let req_prov_perm = required_direction_lookup(self.registry.offset_directions(), &provided)?;

        // Grid size
        expect_header(&mut tokens, GRID_SIZE)?;
        let grid_size: f64 = tokens.parse(|| format!("section: {GRID_SIZE}"))?;

        // Groups (and zones) present in the file
        let n_groups = section_header(&mut tokens, NODE_GROUPS)?;
        let mut groups = Vec::new();
        for i in 0..n_groups {
            groups.push(tokens.word(|| format!("group {i} of section {NODE_GROUPS}"))?);
        }
        let group_lookup = self.group_lookup(&groups)?;

        // Nodes
        let num_nodes_global = section_header(&mut tokens, NODES)?;
        let window = select(num_nodes_global)?;
        log::debug!(
            "process {} reads nodes [{}, {}) of {num_nodes_global}",
            self.rank,
            window.start,
            window.end
        );

        // The extra newline is the rest of the NODES header line.
        let reached = tokens
            .skip_lines(window.start + 1)
            .map_err(|error| CxnErrorKind::Io {
                context: "this process's chunk".into(),
                error,
            })?;
        if !reached && !window.is_empty() {
            return Err(CxnErrorKind::UnexpectedEof {
                context: "the skip ahead to this process's chunk".into(),
            });
        }

        let q = req_prov_perm.len();
        let mut nbrs_in_file = vec![NO_NEIGHBOR; provided.len()];
        let mut positions: Vec<[f64; 3]> = Vec::new();
        let mut nbrs: Vec<GlobalNodeId> = Vec::new();
        let mut zone_offsets = vec![0usize];
        let mut zones: Vec<u32> = Vec::new();
        let mut dropped = 0usize;

        for gid in window.clone() {
            let ctx = || format!("node {gid}");
            let mut position = [0.0f64; 3];
            for c in &mut position {
                *c = tokens.parse(ctx)?;
            }

            for slot in &mut nbrs_in_file {
                let value: i64 = tokens.parse(ctx)?;
                *slot = match value {
                    -1 => NO_NEIGHBOR,
                    v if v >= 0 && (v as u64) < num_nodes_global as u64 => v as GlobalNodeId,
                    v => {
                        return Err(CxnErrorKind::NeighborOutOfRange {
                            node: gid,
                            value: v,
                            num_nodes_global,
                        });
                    }
                };
            }

            let n_zones: usize = tokens.parse(ctx)?;
            for _ in 0..n_zones {
                let value: i64 = tokens.parse(ctx)?;
                if value == -1 {
                    // no zone
                    dropped += 1;
                    continue;
                }
                let entry = usize::try_from(value)
                    .ok()
                    .and_then(|i| group_lookup.get(i))
                    .ok_or_else(|| CxnErrorKind::ZoneOutOfRange {
                        node: gid,
                        value,
                        num_groups: group_lookup.len(),
                    })?;
                match entry {
                    Some(id) => zones.push(*id),
                    None => dropped += 1,
                }
            }

            positions.push(position);
            nbrs.extend(req_prov_perm.iter().map(|&p| nbrs_in_file[p]));
            zone_offsets.push(zones.len());
        }

        // Every record of the window has been read, so its length is proven.
        let mut chunk = ConnectivityChunk::with_window(window, num_nodes_global, q, grid_size)
            .ok_or_else(|| CxnErrorKind::Io {
                context: format!("section: {NODES}"),
                error: std::io::Error::new(
                    std::io::ErrorKind::OutOfMemory,
                    "node window too large",
                ),
            })?;
        for (lid, position) in positions.iter().enumerate() {
            chunk.push_node(
                *position,
                nbrs[lid * q..(lid + 1) * q].iter().copied(),
                zones[zone_offsets[lid]..zone_offsets[lid + 1]].iter().copied(),
            );
        }
        debug_assert!(chunk.is_filled());

        if dropped > 0 {
            log::warn!(
                "process {}: dropped {dropped} zone reference(s) to unknown groups",
                self.rank
            );
        }
        chunk.record_dropped_zone_refs(dropped);
        chunk.set_unknown_groups(
            groups
                .iter()
                .zip(&group_lookup)
                .filter(|(_, id)| id.is_none())
                .map(|(g, _)| g.clone())
                .collect(),
        );
        Ok(chunk)
    }

    /// Map file group positions to registry ids; fails if a registry name is absent.
    fn group_lookup(&self, groups: &[String]) -> Result<Vec<Option<u32>>, CxnErrorKind> {
        let gz_map = self.registry.group_zone_map();
        let lookup: Vec<Option<u32>> = groups
            .iter()
            .map(|g| {
                let id = gz_map.id_of(g);
                if id.is_none() {
                    log::warn!("Ignoring unknown group/zone \"{g}\"");
                }
                id
            })
            .collect();

        let present: HashSet<&str> = groups.iter().map(String::as_str).collect();
        let missing: Vec<String> = gz_map
            .iter()
            .filter(|(name, _)| !present.contains(name))
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CxnErrorKind::MissingGroups(missing));
        }
        Ok(lookup)
    }
}

/// Position in `provided` of each required direction, in required order.
fn required_direction_lookup(
    required: &[OffsetDir],
    provided: &[OffsetDir],
) -> Result<Vec<usize>, CxnErrorKind> {
    let mut position: HashMap<OffsetDir, usize> = HashMap::with_capacity(provided.len());
    for (i, d) in provided.iter().enumerate() {
        position.entry(*d).or_insert(i);
    }
    required
        .iter()
        .map(|req| {
            position
                .get(req)
                .copied()
                .ok_or(CxnErrorKind::MissingDirection(*req))
        })
        .collect()
}

fn expect_header<R: BufRead>(tokens: &mut Tokens<R>, header: &'static str) -> Result<(), CxnErrorKind> {
    let word = tokens.word(|| format!("section header: {header}"))?;
    if word != header {
        return Err(CxnErrorKind::UnexpectedHeader {
            expected: header,
            actual: word,
        });
    }
    Ok(())
}

/// Header followed by its size.
fn section_header<R: BufRead>(
    tokens: &mut Tokens<R>,
    header: &'static str,
) -> Result<usize, CxnErrorKind> {
    expect_header(tokens, header)?;
    tokens.parse(|| format!("section size: {header}"))
}
