// Registry proxy endpoint: /api/object-registry/{*path}

use axum::{
    extract::{Request, State},
    response::Response,
};
use tracing::Instrument;

use crate::proxy::forwarder::{ForwardRequest, ProxyError};
use crate::proxy::server::AppState;

pub const PROXY_PREFIX: &str = "/api/object-registry";

/// Path suffix after the proxy prefix, as received (still percent-encoded).
/// Only the single separator after the prefix is removed.
fn registry_path(uri_path: &str) -> &str {
    let suffix = uri_path.strip_prefix(PROXY_PREFIX).unwrap_or(uri_path);
    suffix.strip_prefix('/').unwrap_or(suffix)
}

/// Relay any method to the registry backend
pub async fn proxy_request(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path = registry_path(parts.uri.path()).to_string();

    let span = tracing::info_span!(
        "registry_proxy",
        request_id = %uuid::Uuid::new_v4(),
        method = %parts.method,
        path = %path,
    );

    async move {
        let body = axum::body::to_bytes(body, state.max_body_bytes)
            .await
            .map_err(|e| ProxyError::ReadBody(e.to_string()))?;

        let forward = ForwardRequest {
            method: parts.method,
            path,
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
        };

        state.proxy.forward(forward).await
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_path() {
        assert_eq!(registry_path("/api/object-registry/namespaces"), "namespaces");
        assert_eq!(
            registry_path("/api/object-registry/default/dir/a%20b.json"),
            "default/dir/a%20b.json"
        );
        assert_eq!(registry_path("/api/object-registry/"), "");
    }

    #[test]
    fn test_registry_path_keeps_extra_slashes() {
        assert_eq!(registry_path("/api/object-registry//a"), "/a");
        assert_eq!(registry_path("/api/object-registry/ns//key"), "ns//key");
    }
}
