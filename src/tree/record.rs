//! Secret payloads and their version metadata

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Data found at one leaf path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretRecord {
    /// Field name -> value. Values are opaque, usually strings.
    pub data: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SecretMetadata>,
}

impl SecretRecord {
    pub fn new(data: BTreeMap<String, Value>) -> Self {
        Self {
            data,
            metadata: None,
        }
    }

    /// Build a record from string pairs (mostly handy for fixtures).
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let data = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self::new(data)
    }

    pub fn with_metadata(mut self, metadata: SecretMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// True when the current version has been deleted or destroyed.
    pub fn is_deleted(&self) -> bool {
        self.metadata.as_ref().is_some_and(SecretMetadata::is_deleted)
    }
}

/// Version information attached to a secret by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretMetadata {
    #[serde(default)]
    pub version: u64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub deletion_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(
        default,
        deserialize_with = "null_as_empty_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub custom_metadata: BTreeMap<String, String>,
}

impl SecretMetadata {
    pub fn is_deleted(&self) -> bool {
        self.deletion_time.is_some() || self.destroyed
    }
}

// Vault reports "not deleted" as an empty deletion_time string.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}

fn null_as_empty_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, String>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}
