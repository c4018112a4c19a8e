//! Registry request relay.
//!
//! Every call mints a fresh token, forwards the request to the registry and
//! turns the registry response into an axum response. The only branch is the
//! PUT redirect: a 3xx answer to a PUT goes back to the browser untouched so
//! it can upload to the pre-signed storage URL itself.

use std::time::Instant;

use axum::body::Body;
use axum::http::header::{HeaderValue, InvalidHeaderValue, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;
use serde_json::json;

use crate::proxy::body::ForwardBody;
use crate::proxy::config::RegistryConfig;
use crate::proxy::headers::{outbound_request_headers, relayed_response_headers};
use crate::proxy::token_issuer::{IssueError, TokenIssuer};
use crate::proxy::upstream::UpstreamClient;

/// Inbound request, already detached from the HTTP server
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Path suffix after the proxy prefix, without a leading slash
    pub path: String,
    /// Raw query string, without `?`
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ForwardRequest {
    /// Bodiless GET, used by the page loaders
    pub fn get(path: impl Into<String>, query: Option<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

/// Faults raised before or while talking to the registry.
///
/// All of them surface as `500 {"error": <message>}`. Registry error statuses
/// are not faults; they are relayed as-is.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    Signing(#[from] IssueError),
    #[error("Invalid outbound header: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("Failed to read request body: {0}")]
    ReadBody(String),
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("Failed to build response: {0}")]
    Response(#[from] axum::http::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Proxy error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

pub struct RegistryProxy {
    api_url: String,
    issuer: TokenIssuer,
    upstream: UpstreamClient,
}

impl RegistryProxy {
    pub fn new(config: &RegistryConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_parts(
            config.api_url.clone(),
            TokenIssuer::new(config.signing.as_ref()),
            UpstreamClient::new()?,
        ))
    }

    pub fn with_parts(api_url: String, issuer: TokenIssuer, upstream: UpstreamClient) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            issuer,
            upstream,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Backend URL for a path suffix and query; the path is not re-encoded
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        match query.filter(|q| !q.is_empty()) {
            Some(q) => format!("{}/{}?{}", self.api_url, path, q),
            None => format!("{}/{}", self.api_url, path),
        }
    }

    /// Relay one request to the registry
    pub async fn forward(&self, req: ForwardRequest) -> Result<Response, ProxyError> {
        let url = self.target_url(&req.path, req.query.as_deref());

        // Nothing leaves the process without a valid token
        let token = self.issuer.issue()?;

        tracing::info!(method = %req.method, url = %url, "[Proxy Request]");

        let mut headers = outbound_request_headers(&req.headers, &token)?;
        let body = match ForwardBody::classify(&req.method, req.body) {
            Some(body) => {
                if body.is_structured() {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                Some(body.into_bytes()?)
            }
            None => None,
        };

        let started = Instant::now();
        let upstream = self
            .upstream
            .send(req.method.clone(), &url, headers, body)
            .await?;
        let status = upstream.status();

        tracing::info!(
            method = %req.method,
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "[Proxy Response]"
        );

        if req.method == Method::PUT && status.is_redirection() {
            tracing::debug!(
                location = ?upstream.headers().get("location"),
                "passing PUT redirect back to the caller"
            );
            return passthrough(upstream);
        }

        relay(upstream)
    }
}

/// Response exactly as the registry sent it
fn passthrough(upstream: reqwest::Response) -> Result<Response, ProxyError> {
    let mut builder = Response::builder().status(upstream.status());
    if let Some(headers) = builder.headers_mut() {
        *headers = upstream.headers().clone();
    }
    Ok(builder.body(Body::from_stream(upstream.bytes_stream()))?)
}

/// Registry response with encoding headers stripped and the body streamed
fn relay(upstream: reqwest::Response) -> Result<Response, ProxyError> {
    let mut builder = Response::builder().status(upstream.status());
    if let Some(headers) = builder.headers_mut() {
        *headers = relayed_response_headers(upstream.headers());
    }
    Ok(builder.body(Body::from_stream(upstream.bytes_stream()))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::config::SigningKeyConfig;

    const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/registry_test_key.pem");

    fn proxy(api_url: &str, signing: Option<SigningKeyConfig>) -> RegistryProxy {
        RegistryProxy::new(&RegistryConfig::new(api_url, signing)).unwrap()
    }

    fn signing() -> SigningKeyConfig {
        SigningKeyConfig {
            key_id: "ui-key".to_string(),
            private_key_pem: PRIVATE_KEY.to_string(),
        }
    }

    #[test]
    fn test_target_url() {
        let p = proxy("http://localhost:8000/", None);
        assert_eq!(
            p.target_url("default/foo.json", None),
            "http://localhost:8000/default/foo.json"
        );
        assert_eq!(
            p.target_url("audit", Some("limit=100&action=PUT")),
            "http://localhost:8000/audit?limit=100&action=PUT"
        );
        assert_eq!(p.target_url("namespaces", Some("")), "http://localhost:8000/namespaces");
    }

    #[test]
    fn test_target_url_keeps_path_verbatim() {
        let p = proxy("http://localhost:8000", None);
        assert_eq!(
            p.target_url("default/dir%2Fname/a b.txt", None),
            "http://localhost:8000/default/dir%2Fname/a b.txt"
        );
    }

    #[tokio::test]
    async fn test_missing_signing_makes_no_upstream_call() {
        let server = httpmock::MockServer::start_async().await;
        let any = server
            .mock_async(|_when, then| {
                then.status(200);
            })
            .await;

        let p = proxy(&server.base_url(), None);
        let err = p
            .forward(ForwardRequest::get("namespaces", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Signing(_)));

        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        any.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_upstream_error() {
        // Port 9 (discard) is closed on test machines
        let p = proxy("http://127.0.0.1:9", Some(signing()));
        let err = p
            .forward(ForwardRequest::get("namespaces", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_backend_error_status_is_relayed() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/default/missing.json");
                then.status(404)
                    .header("content-type", "application/json")
                    .body(r#"{"error":"not found"}"#);
            })
            .await;

        let p = proxy(&server.base_url(), Some(signing()));
        let resp = p
            .forward(ForwardRequest::get("default/missing.json", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"not found"}"#);
    }
}
