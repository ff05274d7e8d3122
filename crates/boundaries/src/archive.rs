//! Facility boundary archives.
//!
//! Two on-disk layouts are understood:
//!
//! - flattened archives, one `{FACILITY}.json` per facility mapping a
//!   boundary key to `{"coordinates": [[lat, lon], ...], "name": "..."}`
//! - SimAware-style trees, `{FACILITY}/.../{KEY}.json`, each file a GeoJSON
//!   Feature whose first outer ring is the boundary

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wx_common::{GeoPoint, OverlayError, OverlayResult, Polygon};

/// One named boundary ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Display name; falls back to the key.
    pub name: String,
    pub ring: Polygon,
}

/// facility id -> (boundary key -> boundary).
///
/// Read-only once loaded; shared by every grouping resolution in a run.
#[derive(Debug, Clone, Default)]
pub struct FacilityBoundarySet {
    facilities: BTreeMap<String, BTreeMap<String, Boundary>>,
}

impl FacilityBoundarySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, facility: impl Into<String>, key: impl Into<String>, boundary: Boundary) {
        self.facilities
            .entry(facility.into())
            .or_default()
            .insert(key.into(), boundary);
    }

    /// Add every boundary of `other`, replacing same-keyed entries.
    pub fn extend(&mut self, other: FacilityBoundarySet) {
        for (facility, boundaries) in other.facilities {
            self.facilities.entry(facility).or_default().extend(boundaries);
        }
    }

    pub fn contains_facility(&self, facility: &str) -> bool {
        self.facilities.contains_key(facility)
    }

    pub fn facility(&self, facility: &str) -> Option<&BTreeMap<String, Boundary>> {
        self.facilities.get(facility)
    }

    pub fn get(&self, facility: &str, key: &str) -> Option<&Boundary> {
        self.facilities.get(facility)?.get(key)
    }

    pub fn facility_ids(&self) -> impl Iterator<Item = &str> {
        self.facilities.keys().map(String::as_str)
    }

    /// Number of facilities.
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Number of boundaries across all facilities.
    pub fn boundary_count(&self) -> usize {
        self.facilities.values().map(BTreeMap::len).sum()
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveEntry {
    coordinates: Vec<[f64; 2]>,
    #[serde(default)]
    name: Option<String>,
}

/// Parse one flattened facility archive.
///
/// Rings with fewer than 3 points are dropped.
pub fn parse_archive(text: &str) -> OverlayResult<BTreeMap<String, Boundary>> {
    let raw: BTreeMap<String, ArchiveEntry> = serde_json::from_str(text)?;
    let mut boundaries = BTreeMap::new();
    for (key, entry) in raw {
        if entry.coordinates.len() < 3 {
            debug!(key = %key, points = entry.coordinates.len(), "dropping short boundary ring");
            continue;
        }
        let name = entry.name.unwrap_or_else(|| key.clone());
        boundaries.insert(
            key,
            Boundary {
                name,
                ring: Polygon::from_lat_lon_pairs(&entry.coordinates),
            },
        );
    }
    Ok(boundaries)
}

/// Load a single `{FACILITY}.json` archive.
pub fn load_archive_file(path: &Path) -> OverlayResult<BTreeMap<String, Boundary>> {
    let text = fs::read_to_string(path)
        .map_err(|e| OverlayError::Io(format!("{}: {}", path.display(), e)))?;
    parse_archive(&text)
}

fn sorted_entries(dir: &Path) -> OverlayResult<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| OverlayError::Io(format!("{}: {}", dir.display(), e)))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();
    Ok(paths)
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Load every `*.json` archive in `dir`; the file stem is the facility id.
///
/// A missing directory yields an empty set. Files that fail to parse are
/// skipped with a warning.
pub fn load_archive_dir(dir: &Path) -> OverlayResult<FacilityBoundarySet> {
    let mut set = FacilityBoundarySet::new();
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "boundary archive directory not found");
        return Ok(set);
    }

    for path in sorted_entries(dir)? {
        if !path.is_file() || !is_json(&path) {
            continue;
        }
        let Some(facility) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match load_archive_file(&path) {
            Ok(boundaries) => {
                for (key, boundary) in boundaries {
                    set.insert(facility, key, boundary);
                }
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable boundary archive"),
        }
    }

    debug!(
        facilities = set.len(),
        boundaries = set.boundary_count(),
        "loaded boundary archives"
    );
    Ok(set)
}

// ============================================================================
// SimAware GeoJSON trees
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct FeatureProperties {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum FeatureGeometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<FeatureProperties>,
    #[serde(default)]
    geometry: Option<FeatureGeometry>,
}

/// First outer ring of a GeoJSON Feature, converted from [lon, lat].
///
/// Returns `None` for non-polygonal geometry or rings under 3 points.
pub fn parse_feature_ring(text: &str) -> OverlayResult<Option<(Option<String>, Polygon)>> {
    let feature: Feature = serde_json::from_str(text)?;
    let outer = match feature.geometry {
        Some(FeatureGeometry::Polygon { coordinates }) => coordinates.into_iter().next(),
        Some(FeatureGeometry::MultiPolygon { coordinates }) => {
            coordinates.into_iter().next().and_then(|p| p.into_iter().next())
        }
        _ => None,
    };
    let Some(outer) = outer else {
        return Ok(None);
    };

    let points: Vec<GeoPoint> = outer
        .iter()
        .filter(|pos| pos.len() >= 2)
        .map(|pos| GeoPoint::new(pos[1], pos[0]))
        .collect();
    if points.len() < 3 {
        return Ok(None);
    }

    let name = feature.properties.and_then(|p| p.name);
    Ok(Some((name, Polygon::new(points))))
}

/// Every `*.json` file under `root`, sorted.
///
/// Walks with an explicit stack; directories are visited once by canonical
/// path, so symlink loops terminate.
fn collect_json_files(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();

    while let Some(dir) = stack.pop() {
        let canonical = match fs::canonicalize(&dir) {
            Ok(c) => c,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot resolve boundary directory");
                continue;
            }
        };
        if !visited.insert(canonical) {
            continue;
        }

        let entries = match sorted_entries(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot read boundary directory");
                continue;
            }
        };
        for path in entries.into_iter().rev() {
            if path.is_dir() {
                stack.push(path);
            } else if is_json(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

/// Load a SimAware-style tree: each top-level directory is a facility and
/// every JSON Feature below it is one boundary keyed by its file stem.
pub fn load_simaware_tree(root: &Path) -> OverlayResult<FacilityBoundarySet> {
    let mut set = FacilityBoundarySet::new();
    if !root.is_dir() {
        warn!(dir = %root.display(), "boundary tree not found");
        return Ok(set);
    }

    for facility_dir in sorted_entries(root)? {
        if !facility_dir.is_dir() {
            continue;
        }
        let Some(facility) = facility_dir.file_name().and_then(|s| s.to_str()) else {
            continue;
        };

        for path in collect_json_files(&facility_dir) {
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let parsed = fs::read_to_string(&path)
                .map_err(OverlayError::from)
                .and_then(|text| parse_feature_ring(&text));
            match parsed {
                Ok(Some((name, ring))) => {
                    let name = name.unwrap_or_else(|| key.to_string());
                    set.insert(facility, key, Boundary { name, ring });
                }
                Ok(None) => debug!(path = %path.display(), "feature has no usable ring"),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable feature"),
            }
        }
    }

    debug!(
        facilities = set.len(),
        boundaries = set.boundary_count(),
        "loaded boundary tree"
    );
    Ok(set)
}
