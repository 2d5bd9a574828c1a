//! Bijection between group/zone names and the small integer ids the
//! solver uses for them.
//!
//! Node-type groups keep their model order and take ids `0..n_groups`.
//! Zones follow, ordered by name, and appear under the name `_Z_<zone>`
//! so they cannot collide with a node-type group.

use crate::lattice_error::ArbLatticeError;
use hashbrown::HashMap;

/// Prefix distinguishing zone names from node-type group names.
pub const ZONE_PREFIX: &str = "_Z_";

/// Name ↔ id map of every group and zone the model recognises.
#[derive(Clone, Debug, Default)]
pub struct GroupZoneMap {
    names: Vec<String>,
    ids: HashMap<String, u32>,
}

impl GroupZoneMap {
    /// Node-type groups first, then zones sorted by name.
    pub fn from_model(
        node_type_groups: &[String],
        zones: &[String],
    ) -> Result<Self, ArbLatticeError> {
        let mut sorted_zones: Vec<&String> = zones.iter().collect();
        sorted_zones.sort();
        sorted_zones.dedup();

        let mut map = Self::default();
        for name in node_type_groups {
            map.push(name.clone())?;
        }
        for zone in sorted_zones {
            map.push(format!("{ZONE_PREFIX}{zone}"))?;
        }
        Ok(map)
    }

    fn push(&mut self, name: String) -> Result<(), ArbLatticeError> {
        let id = u32::try_from(self.names.len()).map_err(|_| {
            ArbLatticeError::InvalidRegistry("too many groups and zones".into())
        })?;
        if self.ids.insert(name.clone(), id).is_some() {
            return Err(ArbLatticeError::InvalidRegistry(format!(
                "group/zone name `{name}` is defined twice"
            )));
        }
        self.names.push(name);
        Ok(())
    }

    #[inline]
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    #[inline]
    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(name, id)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_then_sorted_prefixed_zones() {
        let map = GroupZoneMap::from_model(
            &["Wall".into(), "MRT".into()],
            &["outlet".into(), "inlet".into()],
        )
        .unwrap();
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(
            pairs,
            vec![("Wall", 0), ("MRT", 1), ("_Z_inlet", 2), ("_Z_outlet", 3)]
        );
        assert_eq!(map.id_of("_Z_outlet"), Some(3));
        assert_eq!(map.id_of("outlet"), None);
        assert_eq!(map.name_of(1), Some("MRT"));
        assert_eq!(map.name_of(4), None);
    }

    #[test]
    fn duplicate_group_names_are_rejected() {
        let err = GroupZoneMap::from_model(&["Wall".into(), "Wall".into()], &[]);
        assert!(matches!(err, Err(ArbLatticeError::InvalidRegistry(_))));
    }
}
