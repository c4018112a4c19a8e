//! Initial page data for the browser UI.
//!
//! Each loader goes through the in-process registry proxy, the same path the
//! browser uses, and falls back to a safe default when anything fails.

use axum::{extract::State, Json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::audit::DEFAULT_AUDIT_LIMIT;
use crate::models::AuditRecord;
use crate::proxy::forwarder::{ForwardRequest, RegistryProxy};
use crate::proxy::server::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomePageData {
    pub namespaces: Vec<String>,
}

impl Default for HomePageData {
    fn default() -> Self {
        Self {
            namespaces: vec!["default".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditPageData {
    pub audit_logs: Vec<AuditRecord>,
}

async fn fetch_json<T: DeserializeOwned>(
    proxy: &RegistryProxy,
    request: ForwardRequest,
) -> Result<T, String> {
    let response = proxy.forward(request).await.map_err(|e| e.to_string())?;
    let status = response.status();
    if !status.is_success() {
        return Err(status
            .canonical_reason()
            .unwrap_or(status.as_str())
            .to_string());
    }

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| format!("failed to read body: {}", e))?;
    serde_json::from_slice(&body).map_err(|e| format!("failed to parse body: {}", e))
}

/// Namespace list for the home page; `["default"]` on failure
pub async fn load_home(proxy: &RegistryProxy) -> HomePageData {
    match fetch_json::<Vec<String>>(proxy, ForwardRequest::get("namespaces", None)).await {
        Ok(namespaces) => HomePageData { namespaces },
        Err(err) => {
            tracing::error!("Failed to fetch namespaces: {}", err);
            HomePageData::default()
        }
    }
}

/// Latest audit records; empty on failure
pub async fn load_audit(proxy: &RegistryProxy) -> AuditPageData {
    let request = ForwardRequest::get("audit", Some(format!("limit={}", DEFAULT_AUDIT_LIMIT)));
    match fetch_json::<Vec<AuditRecord>>(proxy, request).await {
        Ok(audit_logs) => AuditPageData { audit_logs },
        Err(err) => {
            tracing::error!("Failed to fetch audit logs: {}", err);
            AuditPageData::default()
        }
    }
}

pub async fn home_page_data(State(state): State<AppState>) -> Json<HomePageData> {
    Json(load_home(&state.proxy).await)
}

pub async fn audit_page_data(State(state): State<AppState>) -> Json<AuditPageData> {
    Json(load_audit(&state.proxy).await)
}
