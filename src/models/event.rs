use serde::{Deserialize, Serialize};

/// How a subscription is notified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub method: String,
    pub urls: Vec<String>,
}

/// Notification subscription on a set of object keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub namespace: String,
    pub id: String,
    pub keys: Vec<String>,
    pub notify: NotifyConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    pub created_at: String,
}

/// Body of event create and update calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    pub keys: Vec<String>,
    pub notify: NotifyConfig,
    pub audience: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}
