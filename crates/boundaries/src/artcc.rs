//! En-route center (ARTCC) boundaries and their cycle-versioned cache.
//!
//! The cache is one JSON file per AIRAC cycle,
//! `artcc_boundaries_{effective-date}.json`, mapping each ARTCC code to a
//! list of `[lat, lon]` rings. Fetching fresh data is done elsewhere; this
//! module only reads, writes and prunes cache files.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use wx_common::{AiracCycle, GeoPoint, OverlayError, OverlayResult, Polygon};

/// The contiguous-US centers used for confinement when no filter is given.
pub const CONUS_ARTCCS: [&str; 20] = [
    "ZAB", "ZAU", "ZBW", "ZDC", "ZDV", "ZFW", "ZHU", "ZID", "ZJX", "ZKC", "ZLA", "ZLC", "ZMA",
    "ZME", "ZMP", "ZNY", "ZOA", "ZOB", "ZSE", "ZTL",
];

/// On-disk shape: ARTCC → rings of `[lat, lon]`.
pub type RawArtccMap = BTreeMap<String, Vec<Vec<[f64; 2]>>>;

/// Coarse outlines used when no cache file is available.
const APPROXIMATE_OUTLINES: &[(&str, &[[f64; 2]])] = &[
    ("ZAB", &[[36.5, -109.0], [36.5, -103.5], [32.0, -103.5], [31.0, -106.0], [31.0, -111.5], [33.0, -114.5], [36.5, -114.5]]),
    ("ZAN", &[[71.0, -180.0], [71.0, -130.0], [60.0, -130.0], [54.0, -135.0], [51.0, -170.0], [52.0, -180.0]]),
    ("ZAU", &[[44.0, -90.5], [44.0, -85.0], [39.5, -85.0], [39.5, -90.5]]),
    ("ZBW", &[[47.5, -74.0], [47.5, -67.0], [41.0, -67.0], [41.0, -74.0]]),
    ("ZDC", &[[41.0, -79.5], [41.0, -74.0], [36.5, -74.0], [36.5, -79.5]]),
    ("ZDV", &[[44.0, -111.0], [44.0, -102.0], [37.0, -102.0], [37.0, -111.0]]),
    ("ZFW", &[[36.5, -102.0], [36.5, -94.0], [29.5, -94.0], [29.5, -102.0]]),
    ("ZHU", &[[32.0, -97.0], [32.0, -89.0], [27.0, -89.0], [27.0, -97.0]]),
    ("ZID", &[[42.0, -87.0], [42.0, -81.0], [37.0, -81.0], [37.0, -87.0]]),
    ("ZJX", &[[32.0, -84.0], [32.0, -79.0], [27.0, -79.0], [27.0, -84.0]]),
    ("ZKC", &[[42.0, -97.0], [42.0, -90.5], [36.5, -90.5], [36.5, -97.0]]),
    ("ZLA", &[[36.5, -121.0], [36.5, -114.5], [32.0, -114.5], [32.0, -121.0]]),
    ("ZLC", &[[49.0, -117.0], [49.0, -111.0], [40.0, -111.0], [40.0, -117.0]]),
    ("ZMA", &[[27.0, -84.0], [27.0, -77.0], [23.0, -77.0], [23.0, -84.0]]),
    ("ZME", &[[37.0, -92.0], [37.0, -86.0], [32.5, -86.0], [32.5, -92.0]]),
    ("ZMP", &[[49.0, -97.0], [49.0, -89.0], [43.0, -89.0], [43.0, -97.0]]),
    ("ZNY", &[[43.5, -76.5], [43.5, -71.0], [40.0, -71.0], [40.0, -76.5]]),
    ("ZOA", &[[41.0, -125.0], [41.0, -118.0], [35.5, -118.0], [35.5, -125.0]]),
    ("ZOB", &[[43.5, -84.0], [43.5, -78.0], [39.5, -78.0], [39.5, -84.0]]),
    ("ZSE", &[[49.0, -125.0], [49.0, -117.0], [42.0, -117.0], [42.0, -125.0]]),
    ("ZSU", &[[19.5, -65.0], [19.5, -64.0], [17.5, -64.0], [17.5, -65.0]]),
    ("ZTL", &[[36.5, -87.0], [36.5, -81.0], [32.0, -81.0], [32.0, -87.0]]),
];

/// Rings per ARTCC code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtccBoundaries {
    by_artcc: BTreeMap<String, Vec<Polygon>>,
}

impl ArtccBoundaries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in rectangle-ish outlines; coarse but always available.
    pub fn embedded() -> Self {
        let by_artcc = APPROXIMATE_OUTLINES
            .iter()
            .map(|(code, ring)| (code.to_string(), vec![Polygon::from_lat_lon_pairs(ring)]))
            .collect();
        Self { by_artcc }
    }

    pub fn from_raw(raw: RawArtccMap) -> Self {
        let by_artcc = raw
            .into_iter()
            .map(|(code, rings)| {
                let rings = rings.iter().map(|r| Polygon::from_lat_lon_pairs(r)).collect();
                (code.to_uppercase(), rings)
            })
            .collect();
        Self { by_artcc }
    }

    pub fn to_raw(&self) -> RawArtccMap {
        self.by_artcc
            .iter()
            .map(|(code, rings)| {
                let rings = rings
                    .iter()
                    .map(|ring| ring.iter().map(|p| [p.lat, p.lon]).collect())
                    .collect();
                (code.clone(), rings)
            })
            .collect()
    }

    pub fn insert(&mut self, code: impl Into<String>, rings: Vec<Polygon>) {
        self.by_artcc.insert(code.into(), rings);
    }

    pub fn get(&self, code: &str) -> Option<&[Polygon]> {
        self.by_artcc.get(code).map(Vec::as_slice)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.by_artcc.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_artcc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_artcc.is_empty()
    }

    /// `(code, ring)` pairs of the selected centers (CONUS when `filter` is
    /// `None`), in filter order.
    ///
    /// Codes are matched case-insensitively; unknown codes are skipped and
    /// degenerate rings are dropped.
    pub fn select(&self, filter: Option<&[String]>) -> Vec<(String, Polygon)> {
        let selected: Vec<String> = match filter {
            Some(codes) => codes.iter().map(|c| c.trim().to_uppercase()).collect(),
            None => CONUS_ARTCCS.iter().map(|c| c.to_string()).collect(),
        };

        let mut rings = Vec::new();
        for code in selected {
            match self.by_artcc.get(&code) {
                Some(polys) => rings.extend(
                    polys
                        .iter()
                        .filter(|p| !p.is_degenerate())
                        .map(|p| (code.clone(), p.clone())),
                ),
                None => debug!(artcc = %code, "no boundary for confinement code"),
            }
        }
        rings
    }

    /// Rings of the selected centers, see [`ArtccBoundaries::select`].
    pub fn confinement(&self, filter: Option<&[String]>) -> Vec<Polygon> {
        self.select(filter).into_iter().map(|(_, ring)| ring).collect()
    }
}

/// Directory of per-cycle ARTCC cache files.
#[derive(Debug, Clone)]
pub struct ArtccCache {
    dir: PathBuf,
}

impl ArtccCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, cycle: &AiracCycle) -> PathBuf {
        self.dir.join(cycle.boundary_cache_file_name())
    }

    /// Cached boundaries for `cycle`, `None` if that file does not exist.
    pub fn load(&self, cycle: &AiracCycle) -> OverlayResult<Option<ArtccBoundaries>> {
        let path = self.path_for(cycle);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        let raw: RawArtccMap = serde_json::from_str(&text)?;
        debug!(path = %path.display(), artccs = raw.len(), "loaded ARTCC cache");
        Ok(Some(ArtccBoundaries::from_raw(raw)))
    }

    /// Cycles with a cache file present, oldest first.
    pub fn cached_cycles(&self) -> OverlayResult<Vec<AiracCycle>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut cycles: Vec<AiracCycle> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| AiracCycle::from_cache_file_name(&entry.file_name().to_string_lossy()))
            .collect();
        cycles.sort();
        cycles.dedup();
        Ok(cycles)
    }

    /// The newest cache file, whatever its cycle.
    pub fn load_latest(&self) -> OverlayResult<Option<(AiracCycle, ArtccBoundaries)>> {
        let Some(cycle) = self.cached_cycles()?.pop() else {
            return Ok(None);
        };
        Ok(self.load(&cycle)?.map(|b| (cycle, b)))
    }

    /// Whether boundaries cached for `cached` are out of date on `current`.
    pub fn is_stale(cached: &AiracCycle, current: &AiracCycle) -> bool {
        cached != current
    }

    /// Write the cache for `cycle` through a temp file and rename.
    pub fn store(&self, cycle: &AiracCycle, boundaries: &ArtccBoundaries) -> OverlayResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(cycle);
        let json = serde_json::to_vec(&boundaries.to_raw())?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&json)?;
        tmp.persist(&path).map_err(|e| OverlayError::Io(e.to_string()))?;

        info!(path = %path.display(), artccs = boundaries.len(), "stored ARTCC cache");
        Ok(path)
    }

    /// Delete cache files of every cycle other than `keep`.
    pub fn prune(&self, keep: &AiracCycle) -> OverlayResult<usize> {
        let mut removed = 0;
        for cycle in self.cached_cycles()? {
            if &cycle == keep {
                continue;
            }
            let path = self.path_for(&cycle);
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "failed to prune ARTCC cache"),
            }
        }
        Ok(removed)
    }

    /// Current boundaries: this cycle's cache, else the newest stale cache,
    /// else the embedded outlines.
    pub fn resolve(&self, current: &AiracCycle) -> ArtccBoundaries {
        match self.load(current) {
            Ok(Some(b)) => return b,
            Ok(None) => {}
            Err(e) => warn!(cycle = %current, error = %e, "unreadable ARTCC cache"),
        }
        match self.load_latest() {
            Ok(Some((cycle, b))) => {
                warn!(cached = %cycle, current = %current, "using stale ARTCC cache");
                b
            }
            Ok(None) => {
                info!("no ARTCC cache, using embedded outlines");
                ArtccBoundaries::embedded()
            }
            Err(e) => {
                warn!(error = %e, "unreadable ARTCC cache, using embedded outlines");
                ArtccBoundaries::embedded()
            }
        }
    }
}

/// Centre of an ARTCC's vertices, for labelling.
pub fn artcc_center(rings: &[Polygon]) -> Option<GeoPoint> {
    let all: Vec<GeoPoint> = rings.iter().flat_map(|r| r.iter().copied()).collect();
    geometry::centroid(&Polygon::new(all))
}
