use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Page size used by the audit view
pub const DEFAULT_AUDIT_LIMIT: u32 = 100;

/// Administrative action recorded by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    pub timestamp: i64,
    pub ttl: i64,
    pub action: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,
    #[serde(default)]
    pub details: HashMap<String, String>,
}

/// Filters for the audit listing. Each filter value becomes one repeated
/// query parameter (`action`, `subject`, `namespace`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    pub limit: u32,
    pub actions: Vec<String>,
    pub subjects: Vec<String>,
    pub namespaces: Vec<String>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_AUDIT_LIMIT,
            actions: Vec::new(),
            subjects: Vec::new(),
            namespaces: Vec::new(),
        }
    }
}

impl AuditQuery {
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    /// Query pairs in wire order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_string())];
        pairs.extend(self.actions.iter().map(|a| ("action", a.clone())));
        pairs.extend(self.subjects.iter().map(|s| ("subject", s.clone())));
        pairs.extend(self.namespaces.iter().map(|n| ("namespace", n.clone())));
        pairs
    }
}
