// Validation Configuration Module
// Controls which lifecycle checks run on top of field-level validation.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Validation configuration
///
/// Field-level constraints (closed enums, numeric bounds, metadata size) are
/// always enforced. The switches below cover the lifecycle rules layered on top;
/// [`ValidationConfig::lenient`] turns all of them off, which accepts any
/// combination the field types alone permit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Require `status` to agree with `usage`, `error` and `incomplete_details`
    #[serde(default = "default_true")]
    pub response_status: bool,
    /// Enforce streaming event order
    #[serde(default = "default_true")]
    pub event_order: bool,
    /// Require `*.done` values to equal the concatenated deltas
    #[serde(default = "default_true")]
    pub done_matches_deltas: bool,
    /// Require `sequence_number` to strictly increase
    #[serde(default = "default_true")]
    pub sequence_numbers: bool,
    /// Require content events to name the item added at their `output_index`
    #[serde(default = "default_true")]
    pub item_ids: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl ValidationConfig {
    /// Every check enabled
    pub fn strict() -> Self {
        Self {
            response_status: true,
            event_order: true,
            done_matches_deltas: true,
            sequence_numbers: true,
            item_ids: true,
        }
    }

    /// Field-level validation only
    pub fn lenient() -> Self {
        Self {
            response_status: false,
            event_order: false,
            done_matches_deltas: false,
            sequence_numbers: false,
            item_ids: false,
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Switches only read while tracking event order must not be set without it
    fn check(&self) -> Result<(), ConfigError> {
        if self.event_order {
            return Ok(());
        }
        for (name, enabled) in [
            ("done_matches_deltas", self.done_matches_deltas),
            ("item_ids", self.item_ids),
        ] {
            if enabled {
                return Err(ConfigError::Validation(format!(
                    "{} requires event_order",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(String),
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert!(config.response_status);
        assert!(config.event_order);
        assert!(config.done_matches_deltas);
        assert!(config.sequence_numbers);
        assert!(config.item_ids);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
response_status: false
sequence_numbers: false
"#;
        let config = ValidationConfig::from_yaml(yaml).unwrap();
        assert!(!config.response_status);
        assert!(!config.sequence_numbers);
        assert!(config.event_order);
        assert!(config.item_ids);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ValidationConfig::from_yaml("  \n").unwrap();
        assert_eq!(config, ValidationConfig::strict());
    }

    #[test]
    fn test_unknown_value_rejected() {
        let result = ValidationConfig::from_yaml("event_order: sometimes");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_inconsistent_config_rejected() {
        let yaml = r#"
event_order: false
done_matches_deltas: true
"#;
        let result = ValidationConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_item_ids_require_event_order() {
        let yaml = r#"
event_order: false
done_matches_deltas: false
item_ids: true
"#;
        match ValidationConfig::from_yaml(yaml) {
            Err(ConfigError::Validation(message)) => assert!(message.contains("item_ids")),
            other => panic!("Expected validation error, got {:?}", other),
        }

        let yaml = r#"
event_order: false
done_matches_deltas: false
item_ids: false
"#;
        assert!(ValidationConfig::from_yaml(yaml).is_ok());
    }

    #[test]
    fn test_lenient_config() {
        let config = ValidationConfig::lenient();
        assert!(!config.event_order);
        assert!(!config.done_matches_deltas);
    }

    #[test]
    fn test_missing_file() {
        let result = ValidationConfig::from_file("/nonexistent/openresponses.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
