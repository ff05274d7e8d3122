//! Configuration for boundary resolution and merging.

use serde::{Deserialize, Serialize};

/// Tunables for [`crate::BoundaryContext`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Two rings are adjacent when some pair of their vertices is at most
    /// this far apart, in plain degrees (about 3 nm at mid latitudes).
    pub adjacency_threshold_deg: f64,

    /// Radius of the synthetic ring drawn for single-airport tower groupings.
    pub tower_radius_nm: f64,

    /// Vertex count of that ring.
    pub tower_points: usize,

    /// Outward buffer applied to member hulls when no boundary resolves.
    pub fallback_buffer_nm: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            adjacency_threshold_deg: 0.05,
            tower_radius_nm: 5.0,
            tower_points: 32,
            fallback_buffer_nm: 15.0,
        }
    }
}

impl MergeConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.adjacency_threshold_deg >= 0.0) {
            return Err("adjacency_threshold_deg must be >= 0".to_string());
        }
        if !(self.tower_radius_nm > 0.0) {
            return Err("tower_radius_nm must be > 0".to_string());
        }
        if self.tower_points < 3 {
            return Err("tower_points must be >= 3".to_string());
        }
        if !(self.fallback_buffer_nm >= 0.0) {
            return Err("fallback_buffer_nm must be >= 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MergeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.adjacency_threshold_deg, 0.05);
        assert_eq!(config.tower_points, 32);
    }

    #[test]
    fn test_rejects_small_circle() {
        let config = MergeConfig {
            tower_points: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
