// Shared building blocks used by requests, responses and items.

use crate::config::ValidationConfig;
use crate::errors::ValidationError;
use crate::validate::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of metadata entries
pub const METADATA_MAX_ENTRIES: usize = 16;
/// Maximum metadata key length in characters
pub const METADATA_MAX_KEY_LEN: usize = 64;
/// Maximum metadata value length in characters
pub const METADATA_MAX_VALUE_LEN: usize = 512;

/// Role of a message author
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Developer,
}

/// Lifecycle status of an item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    InProgress,
    Completed,
    Failed,
    Incomplete,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::InProgress => "in_progress",
            ItemStatus::Completed => "completed",
            ItemStatus::Failed => "failed",
            ItemStatus::Incomplete => "incomplete",
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ItemStatus::InProgress)
    }
}

/// Bounded string-to-string map attached to requests and responses
///
/// At most 16 entries, keys up to 64 characters and values up to 512.
/// [`Metadata::insert`] and `try_from` enforce the bounds; a decoded map is
/// checked by [`Validate`] so the failure surfaces as a field error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, enforcing the same bounds as validation
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, ValidationError> {
        let key = key.into();
        let value = value.into();
        check_entry(&key, &value)?;
        if !self.0.contains_key(&key) && self.0.len() >= METADATA_MAX_ENTRIES {
            return Err(too_many(self.0.len() + 1));
        }
        Ok(self.0.insert(key, value))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn too_many(count: usize) -> ValidationError {
    ValidationError::field(
        "metadata",
        format!(
            "{} entries exceed the maximum of {}",
            count, METADATA_MAX_ENTRIES
        ),
    )
}

fn check_entry(key: &str, value: &str) -> Result<(), ValidationError> {
    if key.chars().count() > METADATA_MAX_KEY_LEN {
        return Err(ValidationError::field(
            "metadata",
            format!("key `{}` is longer than {} characters", key, METADATA_MAX_KEY_LEN),
        ));
    }
    if value.chars().count() > METADATA_MAX_VALUE_LEN {
        return Err(ValidationError::field(
            format!("metadata.{}", key),
            format!("value is longer than {} characters", METADATA_MAX_VALUE_LEN),
        ));
    }
    Ok(())
}

impl TryFrom<BTreeMap<String, String>> for Metadata {
    type Error = ValidationError;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        if map.len() > METADATA_MAX_ENTRIES {
            return Err(too_many(map.len()));
        }
        for (key, value) in &map {
            check_entry(key, value)?;
        }
        Ok(Self(map))
    }
}

impl Validate for Metadata {
    fn validate(&self, _config: &ValidationConfig) -> Result<(), ValidationError> {
        if self.0.len() > METADATA_MAX_ENTRIES {
            return Err(too_many(self.0.len()));
        }
        self.0.iter().try_for_each(|(key, value)| check_entry(key, value))
    }
}

impl From<Metadata> for BTreeMap<String, String> {
    fn from(metadata: Metadata) -> Self {
        metadata.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> BTreeMap<String, String> {
        (0..n)
            .map(|i| (format!("key{}", i), format!("value{}", i)))
            .collect()
    }

    #[test]
    fn test_metadata_sixteen_entries_accepted() {
        let json = serde_json::to_string(&entries(16)).unwrap();
        let metadata: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(metadata.len(), 16);
    }

    #[test]
    fn test_metadata_seventeen_entries_rejected() {
        let json = serde_json::to_string(&entries(17)).unwrap();
        let metadata: Metadata = serde_json::from_str(&json).unwrap();
        match metadata.validate(&ValidationConfig::default()).unwrap_err() {
            ValidationError::Field { field, reason } => {
                assert_eq!(field, "metadata");
                assert!(reason.contains("17 entries"));
            }
            other => panic!("Expected field error, got {:?}", other),
        }
        assert!(Metadata::try_from(entries(17)).is_err());
    }

    #[test]
    fn test_metadata_insert_bounds() {
        let mut metadata = Metadata::try_from(entries(16)).unwrap();
        // Overwriting an existing key does not grow the map
        assert_eq!(
            metadata.insert("key0", "changed").unwrap(),
            Some("value0".to_string())
        );
        assert!(metadata.insert("key16", "x").is_err());
        assert_eq!(metadata.get("key0"), Some("changed"));
    }

    #[test]
    fn test_metadata_long_key_rejected() {
        let mut map = BTreeMap::new();
        map.insert("k".repeat(65), "v".to_string());
        assert!(Metadata::try_from(map).is_err());
    }

    #[test]
    fn test_metadata_long_value_rejected() {
        let mut metadata = Metadata::new();
        assert!(metadata.insert("key", "v".repeat(513)).is_err());
        assert!(metadata.insert("key", "v".repeat(512)).is_ok());
    }

    #[test]
    fn test_item_status_roundtrip() {
        let status: ItemStatus = serde_json::from_str(r#""incomplete""#).unwrap();
        assert_eq!(status, ItemStatus::Incomplete);
        assert!(status.is_terminal());
        assert!(!ItemStatus::InProgress.is_terminal());
        assert!(serde_json::from_str::<ItemStatus>(r#""cancelled""#).is_err());
    }

    #[test]
    fn test_role_parsing() {
        let role: Role = serde_json::from_str(r#""developer""#).unwrap();
        assert_eq!(role, Role::Developer);
        assert!(serde_json::from_str::<Role>(r#""tool""#).is_err());
    }
}
