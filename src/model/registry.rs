//! Immutable description of the simulation model a lattice is built for.

use crate::lattice_error::ArbLatticeError;
use crate::model::group_zone::GroupZoneMap;
use crate::topology::node::OffsetDir;
use hashbrown::HashSet;

/// Stencil and node-group information the lattice is validated against.
///
/// The registry is constructed by the caller and handed to the lattice
/// builder; nothing in this crate mutates it.
#[derive(Clone, Debug)]
pub struct ModelRegistry {
    offset_directions: Vec<OffsetDir>,
    offset_direction_weights: Vec<u32>,
    node_type_groups: Vec<String>,
    zones: Vec<String>,
    group_zone_map: GroupZoneMap,
}

impl ModelRegistry {
    /// Build a registry.
    ///
    /// * `offset_directions` — the Q required stencil directions, in model order
    /// * `offset_direction_weights` — one edge weight per direction (graph partitioning)
    /// * `node_type_groups` — node-type flag names, in model order
    /// * `zones` — zone names known to the run
    pub fn new(
        offset_directions: Vec<OffsetDir>,
        offset_direction_weights: Vec<u32>,
        node_type_groups: Vec<String>,
        zones: Vec<String>,
    ) -> Result<Self, ArbLatticeError> {
        if offset_directions.is_empty() {
            return Err(ArbLatticeError::InvalidRegistry(
                "the stencil has no offset directions".into(),
            ));
        }
        if offset_direction_weights.len() != offset_directions.len() {
            return Err(ArbLatticeError::InvalidRegistry(format!(
                "{} offset directions but {} weights",
                offset_directions.len(),
                offset_direction_weights.len()
            )));
        }
        let mut seen = HashSet::with_capacity(offset_directions.len());
        for dir in &offset_directions {
            if !seen.insert(*dir) {
                return Err(ArbLatticeError::InvalidRegistry(format!(
                    "offset direction {dir} is listed twice"
                )));
            }
        }
        let group_zone_map = GroupZoneMap::from_model(&node_type_groups, &zones)?;
        Ok(Self {
            offset_directions,
            offset_direction_weights,
            node_type_groups,
            zones,
            group_zone_map,
        })
    }

    /// Stencil size Q.
    #[inline]
    pub fn q(&self) -> usize {
        self.offset_directions.len()
    }

    #[inline]
    pub fn offset_directions(&self) -> &[OffsetDir] {
        &self.offset_directions
    }

    #[inline]
    pub fn offset_direction_weights(&self) -> &[u32] {
        &self.offset_direction_weights
    }

    #[inline]
    pub fn node_type_groups(&self) -> &[String] {
        &self.node_type_groups
    }

    #[inline]
    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    /// Names the connectivity file must provide, with their ids.
    #[inline]
    pub fn group_zone_map(&self) -> &GroupZoneMap {
        &self.group_zone_map
    }

    /// Index of the `[0, 0, 0]` direction, if the stencil has one.
    pub fn self_direction(&self) -> Option<usize> {
        self.offset_directions.iter().position(|d| d.is_zero())
    }
}
