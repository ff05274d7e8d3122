//! Configuration for the area clusterer.

use serde::{Deserialize, Serialize};

/// Tunables for [`crate::AreaClusterer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Upper bound on Lloyd iterations.
    pub max_iterations: usize,

    /// Number of leading members whose cities make up a group name.
    pub name_members: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            name_members: 3,
        }
    }
}

impl ClusterConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("max_iterations must be > 0".to_string());
        }
        if self.name_members == 0 {
            return Err("name_members must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ClusterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_iterations, 50);
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let config = ClusterConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
