use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Metadata the registry keeps for every stored object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub namespace: String,
    pub checksum: String,
    pub size: u64,
    pub content_type: String,
    pub created_by: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// One entry of a namespace listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub metadata: ObjectMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListObjectsResponse {
    pub objects: Vec<ObjectSummary>,
}

/// Object as returned by a download.
///
/// `payload` is structured JSON, a literal string, or base64 text when
/// `is_base64_encoded` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEnvelope {
    pub key: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
    pub payload: Value,
    pub metadata: ObjectMetadata,
}
