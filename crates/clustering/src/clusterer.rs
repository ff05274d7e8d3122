//! Building named area groups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wx_common::GeoPoint;

use crate::kmeans::{assign_non_towered, kmeans, mean_point, seed_centroids, Located};
use crate::naming::area_name;
use crate::sizing::{grouping_extent_nm, optimal_k};
use crate::{AirportInfo, ClusterConfig, SizePriority};

/// A named set of airports reported together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaGroup {
    pub name: String,
    /// Ordered for display.
    pub members: Vec<AirportInfo>,
    /// The member the group is anchored on (its first member).
    pub representative_icao: String,
}

impl AreaGroup {
    fn from_members(name: String, members: Vec<&AirportInfo>) -> Self {
        let representative_icao = members.first().map(|m| m.icao.clone()).unwrap_or_default();
        Self {
            name,
            members: members.into_iter().cloned().collect(),
            representative_icao,
        }
    }

    fn representative_priority(&self) -> SizePriority {
        self.members
            .first()
            .map(|m| m.size_priority)
            .unwrap_or(SizePriority::UNKNOWN)
    }
}

/// Split known-category airports into (towered, non-towered).
///
/// Airports whose category is unknown are left out of both.
pub fn partition(airports: &[AirportInfo]) -> (Vec<&AirportInfo>, Vec<&AirportInfo>) {
    airports
        .iter()
        .filter(|a| a.category.is_known())
        .partition(|a| a.is_towered())
}

/// Group by city, then state, then a catch-all bucket.
///
/// Emits `"{City} Area"` groups alphabetically, then `"{State} Region"`
/// groups alphabetically, then `"Other Airports"`. Members are ordered by
/// (size priority, ICAO).
pub fn fallback_groups(airports: &[&AirportInfo]) -> Vec<AreaGroup> {
    let mut by_city: BTreeMap<&str, Vec<&AirportInfo>> = BTreeMap::new();
    let mut by_state: BTreeMap<&str, Vec<&AirportInfo>> = BTreeMap::new();
    let mut other: Vec<&AirportInfo> = Vec::new();

    for &airport in airports {
        if !airport.category.is_known() {
            continue;
        }
        let city = airport.city.trim();
        let state = airport.state.trim();
        if !city.is_empty() {
            by_city.entry(city).or_default().push(airport);
        } else if !state.is_empty() {
            by_state.entry(state).or_default().push(airport);
        } else {
            other.push(airport);
        }
    }

    fn sorted(mut members: Vec<&AirportInfo>) -> Vec<&AirportInfo> {
        members.sort_by(|a, b| (a.size_priority, &a.icao).cmp(&(b.size_priority, &b.icao)));
        members
    }

    let mut groups = Vec::with_capacity(by_city.len() + by_state.len() + 1);
    for (city, members) in by_city {
        groups.push(AreaGroup::from_members(format!("{} Area", city), sorted(members)));
    }
    for (state, members) in by_state {
        groups.push(AreaGroup::from_members(format!("{} Region", state), sorted(members)));
    }
    if !other.is_empty() {
        groups.push(AreaGroup::from_members("Other Airports".to_string(), sorted(other)));
    }
    groups
}

/// Groups airports into named geographic areas.
#[derive(Debug, Clone, Default)]
pub struct AreaClusterer {
    config: ClusterConfig,
}

impl AreaClusterer {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Build the area groups for one report.
    ///
    /// Towered airports are clustered; non-towered airports join the
    /// nearest cluster. Towered airports without coordinates are grouped by
    /// name beside the clusters. Non-towered airports without coordinates
    /// cannot be placed and are left out. If no towered airport has
    /// coordinates, everything is grouped by name instead.
    pub fn create_area_groups(&self, airports: &[AirportInfo]) -> Vec<AreaGroup> {
        let (towered, non_towered) = partition(airports);
        let known: Vec<&AirportInfo> = towered.iter().chain(&non_towered).copied().collect();

        if towered.is_empty() {
            debug!(airports = known.len(), "no towered airports, grouping by location name");
            return fallback_groups(&known);
        }

        let located: Vec<Located<'_>> = towered.iter().filter_map(|a| Located::from_airport(a)).collect();
        if located.is_empty() {
            debug!(towered = towered.len(), "towered airports lack coordinates, grouping by name");
            return fallback_groups(&known);
        }

        let all_coords: Vec<GeoPoint> = known.iter().filter_map(|a| a.coord).collect();
        let extent_nm = grouping_extent_nm(&all_coords);
        let k = optimal_k(located.len(), extent_nm);

        let seeds = seed_centroids(&located, k);
        let points: Vec<GeoPoint> = located.iter().map(|l| l.coord).collect();
        let index_clusters = kmeans(&points, seeds, self.config.max_iterations);

        let unlocated: Vec<&AirportInfo> = towered.iter().filter(|a| a.coord.is_none()).copied().collect();

        debug!(
            towered = towered.len(),
            located = located.len(),
            unlocated = unlocated.len(),
            extent_nm,
            k,
            clusters = index_clusters.len(),
            "clustered towered airports"
        );

        let mut clusters: Vec<Vec<&AirportInfo>> = index_clusters
            .iter()
            .map(|idx| idx.iter().map(|&i| located[i].airport).collect())
            .collect();

        let centroids: Vec<GeoPoint> = index_clusters
            .iter()
            .filter_map(|idx| mean_point(idx.iter().map(|&i| &points[i])))
            .collect();

        let attachable: Vec<Located<'_>> = non_towered
            .iter()
            .filter_map(|a| Located::from_airport(a))
            .collect();
        let unplaced = non_towered.len() - attachable.len();
        if unplaced > 0 {
            debug!(unplaced, "skipping non-towered airports without coordinates");
        }

        let attach_points: Vec<GeoPoint> = attachable.iter().map(|l| l.coord).collect();
        for (airport, ci) in attachable
            .iter()
            .zip(assign_non_towered(&centroids, &attach_points))
        {
            clusters[ci].push(airport.airport);
        }

        let mut groups: Vec<AreaGroup> = clusters
            .into_iter()
            .map(|mut members| {
                members.sort_by(|a, b| a.report_key().cmp(&b.report_key()));
                let lead = members.len().min(self.config.name_members);
                let name = area_name(&members[..lead]);
                AreaGroup::from_members(name, members)
            })
            .collect();
        groups.extend(fallback_groups(&unlocated));

        groups.sort_by(|a, b| {
            (a.representative_priority(), &a.name, &a.representative_icao).cmp(&(
                b.representative_priority(),
                &b.name,
                &b.representative_icao,
            ))
        });

        info!(groups = groups.len(), airports = known.len(), "built area groups");
        groups
    }
}
