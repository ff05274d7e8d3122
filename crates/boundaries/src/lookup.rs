//! Resolving a grouping to facility boundary rings.

use std::collections::HashSet;

use geometry::circle_polygon;
use tracing::debug;
use wx_common::{GeoPoint, Polygon};

use crate::{Boundary, FacilityBoundarySet, FacilityHierarchy, GroupingCatalog, GroupingMetadata, MergeConfig};

/// The only position suffix with its own boundary variant.
pub const DEPARTURE_SUFFIX: &str = "DEP";

/// One way of turning a position prefix into a boundary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryProbe {
    /// `{prefix}_DEP`, tried only for departure groupings.
    Departure,
    /// `{prefix}`.
    Prefix,
    /// The facility folder's own top-level boundary.
    Facility,
}

impl BoundaryProbe {
    pub fn key(&self, prefix: &str, folder: &str) -> String {
        match self {
            BoundaryProbe::Departure => format!("{}_{}", prefix, DEPARTURE_SUFFIX),
            BoundaryProbe::Prefix => prefix.to_string(),
            BoundaryProbe::Facility => folder.to_string(),
        }
    }
}

/// Probes in precedence order.
pub fn probe_order(departure: bool) -> &'static [BoundaryProbe] {
    if departure {
        &[BoundaryProbe::Departure, BoundaryProbe::Prefix, BoundaryProbe::Facility]
    } else {
        &[BoundaryProbe::Prefix, BoundaryProbe::Facility]
    }
}

/// Keys tried for `prefix` in `folder`, highest precedence first.
pub fn boundary_candidates(prefix: &str, departure: bool, folder: &str) -> Vec<String> {
    probe_order(departure)
        .iter()
        .map(|probe| probe.key(prefix, folder))
        .collect()
}

/// First boundary found among [`boundary_candidates`].
pub fn find_boundary_for_prefix<'a>(
    prefix: &str,
    departure: bool,
    folder: &str,
    set: &'a FacilityBoundarySet,
) -> Option<&'a Boundary> {
    let boundaries = set.facility(folder)?;
    boundary_candidates(prefix, departure, folder)
        .iter()
        .find_map(|key| boundaries.get(key))
}

/// Whether a grouping's suffixes select the departure probe.
pub fn is_departure(suffixes: &[String]) -> bool {
    suffixes.iter().any(|s| s == DEPARTURE_SUFFIX)
}

/// Split a `+` combined grouping name into its parts.
///
/// - `"NCT E+R"` becomes `["NCT E", "NCT R"]`
/// - `"N90+B90"` becomes one entry per part, each replaced by the first
///   existing grouping among `part`, `"{part} Combined"`, `"{part} {part}"`
///   (or kept as-is if none exists)
/// - anything else is returned unchanged
pub fn expand_plus_pattern(name: &str, catalog: &GroupingCatalog) -> Vec<String> {
    if !name.contains('+') {
        return vec![name.to_string()];
    }

    let words: Vec<&str> = name.split_whitespace().collect();
    if let [facility, sectors] = words.as_slice() {
        if sectors.contains('+') {
            let expanded: Vec<String> = sectors
                .split('+')
                .filter(|s| !s.is_empty())
                .map(|sector| format!("{} {}", facility, sector))
                .collect();
            if !expanded.is_empty() {
                return expanded;
            }
        }
    }

    if !name.contains(char::is_whitespace) {
        return name
            .split('+')
            .filter(|p| !p.is_empty())
            .map(|part| {
                [
                    part.to_string(),
                    format!("{} Combined", part),
                    format!("{} {}", part, part),
                ]
                .into_iter()
                .find(|candidate| catalog.contains(candidate))
                .unwrap_or_else(|| part.to_string())
            })
            .collect();
    }

    vec![name.to_string()]
}

/// Key used to drop duplicate rings: the first three vertices.
fn ring_key(ring: &Polygon) -> Option<[(u64, u64); 3]> {
    match ring.points.as_slice() {
        [a, b, c, ..] => Some([a.key(), b.key(), c.key()]),
        _ => None,
    }
}

/// Boundary rings for one (non-combined) grouping, unmerged.
///
/// With position prefixes, every prefix is probed in the grouping's
/// facility folder and unresolved prefixes are skipped. Without prefixes,
/// the facility's own boundary is used. Rings sharing their first three
/// vertices are kept once.
pub fn map_grouping_to_boundaries(
    metadata: &GroupingMetadata,
    set: &FacilityBoundarySet,
    hierarchy: &FacilityHierarchy,
) -> Vec<Polygon> {
    let Some(facility_id) = metadata.facility_id.as_deref() else {
        return Vec::new();
    };
    let Some(folder) = hierarchy.resolve_facility_folder(facility_id, set) else {
        debug!(grouping = %metadata.name, facility = facility_id, "no boundary folder for facility");
        return Vec::new();
    };

    let prefixes = metadata.prefixes();
    if prefixes.is_empty() {
        return [facility_id, folder.as_str()]
            .iter()
            .find_map(|key| set.get(&folder, key))
            .map(|b| vec![b.ring.clone()])
            .unwrap_or_default();
    }

    let departure = is_departure(metadata.suffixes());
    let mut seen = HashSet::new();
    let mut rings = Vec::new();
    for prefix in prefixes {
        match find_boundary_for_prefix(prefix, departure, &folder, set) {
            Some(boundary) => {
                if let Some(key) = ring_key(&boundary.ring) {
                    if seen.insert(key) {
                        rings.push(boundary.ring.clone());
                    }
                }
            }
            None => debug!(grouping = %metadata.name, prefix = %prefix, "prefix has no boundary"),
        }
    }
    rings
}

/// Synthetic ring around a lone tower airport.
pub fn tower_circle(center: &GeoPoint, config: &MergeConfig) -> Polygon {
    circle_polygon(center, config.tower_radius_nm, config.tower_points)
}
