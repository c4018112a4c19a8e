//! Typed client for the UI's registry proxy.
//!
//! One method per registry operation, each a single HTTP call under
//! `/api/object-registry`. Non-2xx responses become [`ClientError::Api`] with a
//! message taken from the response body where possible.

mod audit;
mod events;
mod objects;

pub use objects::{decode_envelope, DownloadedObject};

use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder, Response, Url};
use serde_json::Value;
use thiserror::Error;

use crate::proxy::handlers::registry::PROXY_PREFIX;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unexpected payload: {0}")]
    Payload(String),
}

#[derive(Clone)]
pub struct RegistryClient {
    base_url: String,
    client: Client,
}

impl RegistryClient {
    /// Client for the UI server at `ui_base_url` (e.g. `http://localhost:3000`)
    pub fn new(ui_base_url: &str) -> Result<Self, ClientError> {
        Ok(Self::with_client(ui_base_url, Client::builder().build()?))
    }

    pub fn with_client(ui_base_url: &str, client: Client) -> Self {
        Self {
            base_url: format!("{}{}", ui_base_url.trim_end_matches('/'), PROXY_PREFIX),
            client,
        }
    }

    /// Proxy URL for a registry-relative path
    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.base_url,
            path.trim_start_matches('/')
        ))?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send and turn a non-2xx response into a normalized error
    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response, ClientError> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, action).await);
        }
        Ok(response)
    }
}

/// Build the error for a failed call.
///
/// Preference: JSON `error`, JSON `message`, the whole JSON body, a non-empty
/// text body, and finally `Failed to <action>: <status text>`.
pub(crate) async fn api_error(response: Response, action: &str) -> ClientError {
    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or(status.as_str());
    let fallback = format!("Failed to {}: {}", action, status_text);

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);

    let message = match response.bytes().await {
        Ok(bytes) if is_json => serde_json::from_slice::<Value>(&bytes)
            .ok()
            .map(|body| json_error_message(&body))
            .unwrap_or(fallback),
        Ok(bytes) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
        _ => fallback,
    };

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

fn json_error_message(body: &Value) -> String {
    ["error", "message"]
        .iter()
        .find_map(|field| match body.get(field) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | Some(Value::Bool(false)) | None => None,
            Some(Value::String(_)) => None,
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_else(|| body.to_string())
}
