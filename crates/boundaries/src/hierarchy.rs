//! Sub-facility to parent-folder remapping.

use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::FacilityBoundarySet;

/// Maps facilities without their own boundary folder onto a parent.
///
/// Entries may chain (a sector of a sector); resolution follows the chain
/// until it reaches a facility present in the boundary set.
#[derive(Debug, Clone)]
pub struct FacilityHierarchy {
    parents: BTreeMap<String, String>,
}

impl Default for FacilityHierarchy {
    /// Bay TRACON and the NorCal sectors all live under `NCT`.
    fn default() -> Self {
        let parents = [("O90", "NCT"), ("MC1", "NCT"), ("SC1", "NCT"), ("MR1", "NCT")]
            .into_iter()
            .map(|(child, parent)| (child.to_string(), parent.to_string()))
            .collect();
        Self { parents }
    }
}

impl FacilityHierarchy {
    /// A hierarchy with no remaps.
    pub fn empty() -> Self {
        Self {
            parents: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, child: impl Into<String>, parent: impl Into<String>) -> Self {
        self.parents.insert(child.into(), parent.into());
        self
    }

    pub fn parent(&self, facility: &str) -> Option<&str> {
        self.parents.get(facility).map(String::as_str)
    }

    /// The boundary folder for `facility_id`: itself if present, else the
    /// first ancestor present. Cycles in the table resolve to `None`.
    pub fn resolve_facility_folder(&self, facility_id: &str, set: &FacilityBoundarySet) -> Option<String> {
        let mut current = facility_id;
        let mut visited: HashSet<&str> = HashSet::new();
        loop {
            if set.contains_facility(current) {
                return Some(current.to_string());
            }
            if !visited.insert(current) {
                warn!(facility = facility_id, at = current, "cycle in facility remap table");
                return None;
            }
            current = self.parent(current)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Boundary;
    use wx_common::Polygon;

    fn set_with(facilities: &[&str]) -> FacilityBoundarySet {
        let mut set = FacilityBoundarySet::new();
        for f in facilities {
            let ring = Polygon::from_lat_lon_pairs(&[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
            set.insert(*f, *f, Boundary { name: f.to_string(), ring });
        }
        set
    }

    #[test]
    fn test_direct_and_remapped() {
        let set = set_with(&["NCT", "SCT"]);
        let h = FacilityHierarchy::default();
        assert_eq!(h.resolve_facility_folder("SCT", &set).as_deref(), Some("SCT"));
        assert_eq!(h.resolve_facility_folder("O90", &set).as_deref(), Some("NCT"));
        assert_eq!(h.resolve_facility_folder("MR1", &set).as_deref(), Some("NCT"));
        assert_eq!(h.resolve_facility_folder("ZZZ", &set), None);
    }

    #[test]
    fn test_chain() {
        let set = set_with(&["NCT"]);
        let h = FacilityHierarchy::empty()
            .with_parent("A1", "B1")
            .with_parent("B1", "NCT");
        assert_eq!(h.resolve_facility_folder("A1", &set).as_deref(), Some("NCT"));
    }

    #[test]
    fn test_cycle_terminates() {
        let set = set_with(&["NCT"]);
        let h = FacilityHierarchy::empty()
            .with_parent("A1", "B1")
            .with_parent("B1", "A1");
        assert_eq!(h.resolve_facility_folder("A1", &set), None);
    }

    #[test]
    fn test_parent_missing_from_set() {
        let set = set_with(&["SCT"]);
        assert_eq!(FacilityHierarchy::default().resolve_facility_folder("O90", &set), None);
    }
}
