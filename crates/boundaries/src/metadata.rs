//! Grouping presets: which airports a grouping covers and how its
//! boundaries are looked up.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wx_common::{OverlayError, OverlayResult};

/// Suffix of single-airport tower groupings.
pub const TOWER_SUFFIX: &str = " Tower";

/// How one grouping maps onto facility boundaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupingMetadata {
    /// Filled from the preset key when loaded.
    #[serde(default, skip_serializing)]
    pub name: String,

    #[serde(default, rename = "airports")]
    pub member_icaos: Vec<String>,

    /// Controller position prefixes, e.g. `["SFO", "OAK"]`.
    #[serde(default)]
    pub position_prefixes: Option<Vec<String>>,

    /// Position suffixes, e.g. `["APP", "DEP"]`.
    #[serde(default)]
    pub position_suffixes: Option<Vec<String>>,

    /// Facility the prefixes belong to, e.g. `NCT`.
    #[serde(default)]
    pub facility_id: Option<String>,
}

impl GroupingMetadata {
    pub fn new(name: impl Into<String>, member_icaos: Vec<String>) -> Self {
        Self {
            name: name.into(),
            member_icaos,
            ..Default::default()
        }
    }

    pub fn with_facility(mut self, facility_id: impl Into<String>) -> Self {
        self.facility_id = Some(facility_id.into());
        self
    }

    pub fn with_prefixes(mut self, prefixes: &[&str]) -> Self {
        self.position_prefixes = Some(prefixes.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_suffixes(mut self, suffixes: &[&str]) -> Self {
        self.position_suffixes = Some(suffixes.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn prefixes(&self) -> &[String] {
        self.position_prefixes.as_deref().unwrap_or(&[])
    }

    pub fn suffixes(&self) -> &[String] {
        self.position_suffixes.as_deref().unwrap_or(&[])
    }
}

/// A preset value is either full metadata or a bare airport list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PresetEntry {
    Legacy(Vec<String>),
    Full(GroupingMetadata),
}

/// All known groupings by name.
#[derive(Debug, Clone, Default)]
pub struct GroupingCatalog {
    groupings: BTreeMap<String, GroupingMetadata>,
}

impl GroupingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut metadata: GroupingMetadata) {
        if metadata.name.is_empty() {
            return;
        }
        metadata.name = metadata.name.trim().to_string();
        self.groupings.insert(metadata.name.clone(), metadata);
    }

    pub fn get(&self, name: &str) -> Option<&GroupingMetadata> {
        self.groupings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groupings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groupings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groupings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groupings.is_empty()
    }

    /// Parse one preset file and add its groupings.
    ///
    /// Single-airport presets are dropped unless they are tower groupings,
    /// which stay resolvable by name. Returns how many were added.
    pub fn add_presets(&mut self, text: &str) -> OverlayResult<usize> {
        let raw: BTreeMap<String, PresetEntry> = serde_json::from_str(text)?;
        let mut added = 0;
        for (name, entry) in raw {
            let mut metadata = match entry {
                PresetEntry::Full(metadata) => metadata,
                PresetEntry::Legacy(airports) => GroupingMetadata::new("", airports),
            };
            let keep = metadata.member_icaos.len() > 1
                || (metadata.member_icaos.len() == 1 && name.ends_with(TOWER_SUFFIX));
            if !keep {
                debug!(grouping = %name, "dropping single-airport preset");
                continue;
            }
            metadata.name = name;
            self.insert(metadata);
            added += 1;
        }
        Ok(added)
    }
}

/// Load every `*.json` preset file in `dir`.
///
/// A missing directory yields an empty catalog; unreadable files are
/// skipped with a warning. Files are read in name order and later files
/// win on duplicate grouping names.
pub fn load_grouping_dir(dir: &Path) -> OverlayResult<GroupingCatalog> {
    let mut catalog = GroupingCatalog::new();
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "grouping preset directory not found");
        return Ok(catalog);
    }

    let mut paths: Vec<_> = fs::read_dir(dir)
        .map_err(|e| OverlayError::Io(format!("{}: {}", dir.display(), e)))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    for path in paths {
        let result = fs::read_to_string(&path)
            .map_err(OverlayError::from)
            .and_then(|text| catalog.add_presets(&text));
        match result {
            Ok(added) => debug!(path = %path.display(), added, "loaded grouping presets"),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable preset file"),
        }
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_and_legacy_entries() {
        let text = r#"{
            "NCT D": {"airports": ["KSFO", "KSQL"], "position_prefixes": ["SFO"], "position_suffixes": ["DEP"], "facility_id": "NCT"},
            "Bay Legacy": ["KSFO", "KOAK"]
        }"#;
        let mut catalog = GroupingCatalog::new();
        assert_eq!(catalog.add_presets(text).unwrap(), 2);

        let d = catalog.get("NCT D").unwrap();
        assert_eq!(d.name, "NCT D");
        assert_eq!(d.prefixes().to_vec(), vec!["SFO"]);
        assert_eq!(d.facility_id.as_deref(), Some("NCT"));

        let legacy = catalog.get("Bay Legacy").unwrap();
        assert_eq!(legacy.member_icaos, vec!["KSFO", "KOAK"]);
        assert!(legacy.position_prefixes.is_none());
        assert!(legacy.suffixes().is_empty());
    }

    #[test]
    fn test_single_airport_presets() {
        let text = r#"{
            "Lone Field": ["KXYZ"],
            "KSFO Tower": ["KSFO"],
            "Empty": []
        }"#;
        let mut catalog = GroupingCatalog::new();
        assert_eq!(catalog.add_presets(text).unwrap(), 1);
        assert!(catalog.contains("KSFO Tower"));
        assert!(!catalog.contains("Lone Field"));
        assert!(!catalog.contains("Empty"));
    }

    #[test]
    fn test_bad_json_is_error() {
        let mut catalog = GroupingCatalog::new();
        assert!(catalog.add_presets("not json").is_err());
        assert!(catalog.is_empty());
    }
}
