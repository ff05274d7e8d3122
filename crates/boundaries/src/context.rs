//! The read-only context every grouping resolution runs against.

use std::collections::{BTreeMap, HashMap};

use geometry::{buffer_outward, convex_hull, hull_polygon};
use tracing::{debug, info};
use wx_common::{GeoPoint, OverlayError, OverlayResult, Polygon};

use crate::lookup::{expand_plus_pattern, map_grouping_to_boundaries, tower_circle};
use crate::merge::combine_polygons;
use crate::metadata::TOWER_SUFFIX;
use crate::{FacilityBoundarySet, FacilityHierarchy, GroupingCatalog, MergeConfig};

/// Boundaries, grouping presets, the facility remap table and airport
/// positions, loaded once before any resolution starts.
#[derive(Debug, Clone, Default)]
pub struct BoundaryContext {
    boundaries: FacilityBoundarySet,
    groupings: GroupingCatalog,
    hierarchy: FacilityHierarchy,
    airports: HashMap<String, GeoPoint>,
    config: MergeConfig,
}

impl BoundaryContext {
    pub fn new(boundaries: FacilityBoundarySet, groupings: GroupingCatalog) -> Self {
        Self {
            boundaries,
            groupings,
            ..Default::default()
        }
    }

    pub fn with_hierarchy(mut self, hierarchy: FacilityHierarchy) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    pub fn with_airports(mut self, airports: HashMap<String, GeoPoint>) -> Self {
        self.airports = airports;
        self
    }

    pub fn with_config(mut self, config: MergeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn boundaries(&self) -> &FacilityBoundarySet {
        &self.boundaries
    }

    pub fn groupings(&self) -> &GroupingCatalog {
        &self.groupings
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn airport(&self, icao: &str) -> Option<GeoPoint> {
        self.airports.get(icao).copied()
    }

    /// The lone airport of a `"... Tower"` grouping.
    ///
    /// With metadata the grouping must have exactly one member; without
    /// metadata the name itself (`"KKIX Tower"`) names the airport.
    fn tower_airport(&self, name: &str) -> Option<GeoPoint> {
        let stem = name.strip_suffix(TOWER_SUFFIX)?.trim();
        match self.groupings.get(name) {
            Some(meta) => match meta.member_icaos.as_slice() {
                [only] => self.airport(only),
                _ => None,
            },
            None => self.airport(stem),
        }
    }

    /// Resolve a grouping name to merged boundary polygons.
    ///
    /// Returns an empty list when nothing resolves; see
    /// [`BoundaryContext::polygons_or_fallback`].
    pub fn resolve_grouping(&self, name: &str) -> Vec<Polygon> {
        if let Some(center) = self.tower_airport(name) {
            debug!(grouping = %name, "using tower circle");
            return vec![tower_circle(&center, &self.config)];
        }

        let rings: Vec<Polygon> = expand_plus_pattern(name, &self.groupings)
            .iter()
            .filter_map(|part| self.groupings.get(part))
            .flat_map(|meta| map_grouping_to_boundaries(meta, &self.boundaries, &self.hierarchy))
            .collect();

        let merged = combine_polygons(rings, self.config.adjacency_threshold_deg);
        debug!(grouping = %name, polygons = merged.len(), "resolved grouping");
        merged
    }

    /// Resolve many groupings; names with no boundary are omitted.
    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> BTreeMap<String, Vec<Polygon>> {
        let resolved: BTreeMap<String, Vec<Polygon>> = names
            .iter()
            .map(|n| (n.as_ref().to_string(), self.resolve_grouping(n.as_ref())))
            .filter(|(_, polygons)| !polygons.is_empty())
            .collect();
        info!(matched = resolved.len(), requested = names.len(), "resolved grouping boundaries");
        resolved
    }

    /// Hull of the grouping's member airports, buffered outward.
    ///
    /// Members of every part of a combined name are included.
    pub fn member_hull(&self, name: &str) -> OverlayResult<Polygon> {
        let mut coords: Vec<GeoPoint> = Vec::new();
        for part in expand_plus_pattern(name, &self.groupings) {
            if let Some(meta) = self.groupings.get(&part) {
                coords.extend(meta.member_icaos.iter().filter_map(|icao| self.airport(icao)));
            }
        }
        if coords.is_empty() {
            if let Some(center) = self.tower_airport(name) {
                coords.push(center);
            }
        }
        if coords.is_empty() {
            return Err(OverlayError::missing_data(name, "no member airport has coordinates"));
        }

        let hull = match hull_polygon(&coords) {
            Ok(hull) => hull,
            Err(e) => {
                // One or two members, or all on a line: buffer the points.
                debug!(grouping = name, error = %e, "member hull is degenerate");
                Polygon::new(convex_hull(&coords))
            }
        };
        Ok(buffer_outward(&hull, self.config.fallback_buffer_nm))
    }

    /// Merged boundaries, or the buffered member hull when none resolve.
    ///
    /// Empty only when the grouping has neither boundaries nor located
    /// members.
    pub fn polygons_or_fallback(&self, name: &str) -> Vec<Polygon> {
        let polygons = self.resolve_grouping(name);
        if !polygons.is_empty() {
            return polygons;
        }
        match self.member_hull(name) {
            Ok(hull) => {
                debug!(grouping = %name, "using member hull fallback");
                vec![hull]
            }
            Err(e) => {
                debug!(grouping = %name, error = %e, "no boundary or fallback");
                Vec::new()
            }
        }
    }
}
