use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Method};
use serde_json::Value;

use super::{ClientError, RegistryClient};
use crate::models::{ListObjectsResponse, ObjectEnvelope, ObjectSummary};

/// A downloaded object, ready to be saved
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedObject {
    pub bytes: Bytes,
    pub content_type: String,
    pub filename: String,
}

/// Turn a download envelope into file contents.
///
/// - base64 payloads are decoded and typed with the metadata content type
/// - structured payloads are pretty-printed as `application/json`
/// - anything else is written out as literal text
pub fn decode_envelope(envelope: ObjectEnvelope, key: &str) -> Result<DownloadedObject, ClientError> {
    let filename = key
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("download")
        .to_string();

    let (bytes, content_type) = if envelope.is_base64_encoded {
        let encoded = envelope.payload.as_str().ok_or_else(|| {
            ClientError::Payload("base64 payload is not a string".to_string())
        })?;
        (
            Bytes::from(STANDARD.decode(encoded)?),
            envelope.metadata.content_type,
        )
    } else {
        match envelope.payload {
            payload @ (Value::Object(_) | Value::Array(_) | Value::Null) => (
                Bytes::from(serde_json::to_vec_pretty(&payload)?),
                "application/json".to_string(),
            ),
            Value::String(text) => (Bytes::from(text), envelope.metadata.content_type),
            other => (Bytes::from(other.to_string()), envelope.metadata.content_type),
        }
    };

    Ok(DownloadedObject {
        bytes,
        content_type,
        filename,
    })
}

fn object_path(namespace: &str, key: &str) -> String {
    format!("{}/{}", namespace, key)
}

impl RegistryClient {
    /// Namespaces visible to the UI
    pub async fn list_namespaces(&self) -> Result<Vec<String>, ClientError> {
        let url = self.url("namespaces")?;
        let response = self
            .send(self.request(Method::GET, url), "list namespaces")
            .await?;
        Ok(response.json().await?)
    }

    /// Objects stored in a namespace
    pub async fn list_objects(&self, namespace: &str) -> Result<Vec<ObjectSummary>, ClientError> {
        let url = self.url(namespace)?;
        let response = self
            .send(self.request(Method::GET, url), "list objects")
            .await?;
        let listing: ListObjectsResponse = response.json().await?;
        Ok(listing.objects)
    }

    pub async fn get_object(
        &self,
        namespace: &str,
        key: &str,
        version: Option<&str>,
    ) -> Result<ObjectEnvelope, ClientError> {
        let mut url = self.url(&object_path(namespace, key))?;
        if let Some(v) = version {
            url.query_pairs_mut().append_pair("version", v);
        }
        let response = self
            .send(self.request(Method::GET, url), "download object")
            .await?;
        Ok(response.json().await?)
    }

    /// Fetch an object and decode its payload into file contents
    pub async fn download_object(
        &self,
        namespace: &str,
        key: &str,
        version: Option<&str>,
    ) -> Result<DownloadedObject, ClientError> {
        let envelope = self.get_object(namespace, key, version).await?;
        decode_envelope(envelope, key)
    }

    /// Store an object. A pre-signed redirect from the registry is followed
    /// by the HTTP client with the same body.
    pub async fn upload_object(
        &self,
        namespace: &str,
        key: &str,
        version: Option<&str>,
        body: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> Result<(), ClientError> {
        let mut url = self.url(&object_path(namespace, key))?;
        if let Some(v) = version {
            url.query_pairs_mut().append_pair("version", v);
        }
        let request = self
            .request(Method::PUT, url)
            .header(
                CONTENT_TYPE,
                content_type
                    .filter(|ct| !ct.is_empty())
                    .unwrap_or("application/octet-stream"),
            )
            .body(body.into());
        self.send(request, "upload object").await?;
        Ok(())
    }

    pub async fn delete_object(&self, namespace: &str, key: &str) -> Result<(), ClientError> {
        let url = self.url(&object_path(namespace, key))?;
        self.send(self.request(Method::DELETE, url), "delete object")
            .await?;
        Ok(())
    }
}
