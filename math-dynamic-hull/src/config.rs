//! Runtime configuration for the hull structure

use crate::Result;
use crate::merge::DEFAULT_ITERATION_FACTOR;
use serde::{Deserialize, Serialize};

/// Tuning knobs shared by every tree of a hull
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HullConfig {
    /// Run a full invariant check after every successful insert or delete
    #[serde(default)]
    pub validate_after_update: bool,
    /// Bridge search guard, as a multiple of the combined chain length
    #[serde(default = "default_bridge_iteration_factor")]
    pub bridge_iteration_factor: usize,
}

fn default_bridge_iteration_factor() -> usize {
    DEFAULT_ITERATION_FACTOR
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            validate_after_update: false,
            bridge_iteration_factor: default_bridge_iteration_factor(),
        }
    }
}

impl HullConfig {
    /// Configuration that validates the tree after every update
    pub fn validating() -> Self {
        Self {
            validate_after_update: true,
            ..Self::default()
        }
    }

    /// Parse a configuration from a JSON snippet; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DynamicHullError;

    #[test]
    fn test_defaults() {
        let config = HullConfig::default();
        assert!(!config.validate_after_update);
        assert_eq!(config.bridge_iteration_factor, 4);
        assert!(HullConfig::validating().validate_after_update);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = HullConfig::from_json(r#"{"validate_after_update": true}"#).unwrap();
        assert!(config.validate_after_update);
        assert_eq!(config.bridge_iteration_factor, 4);

        let config = HullConfig::from_json("{}").unwrap();
        assert_eq!(config, HullConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = HullConfig {
            validate_after_update: true,
            bridge_iteration_factor: 9,
        };
        let json = config.to_json().unwrap();
        assert_eq!(HullConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        let err = HullConfig::from_json(r#"{"bridge_iteration_factor": "many"}"#).unwrap_err();
        assert!(matches!(err, DynamicHullError::InvalidConfig(_)));
    }
}
