//! Outbound body classification.

use axum::http::Method;
use bytes::Bytes;
use serde_json::Value;

/// Body forwarded to the registry
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardBody {
    /// The inbound body parsed as JSON; sent re-serialized as `application/json`
    Structured(Value),
    /// Anything else; sent byte-for-byte with the caller's content type
    Raw(Bytes),
}

impl ForwardBody {
    /// Decide how an inbound body is forwarded.
    ///
    /// GET and HEAD never carry a body, whatever the client sent. Note that a
    /// binary payload whose bytes happen to be valid JSON is classified as
    /// structured; callers rely on `Content-Type` to tell the two apart.
    pub fn classify(method: &Method, body: Bytes) -> Option<Self> {
        if *method == Method::GET || *method == Method::HEAD {
            return None;
        }

        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Some(Self::Structured(value)),
            Err(_) => Some(Self::Raw(body)),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// Wire bytes for the outbound request
    pub fn into_bytes(self) -> Result<Bytes, serde_json::Error> {
        match self {
            Self::Structured(value) => serde_json::to_vec(&value).map(Bytes::from),
            Self::Raw(bytes) => Ok(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_head_have_no_body() {
        let body = Bytes::from_static(br#"{"a":1}"#);
        assert_eq!(ForwardBody::classify(&Method::GET, body.clone()), None);
        assert_eq!(ForwardBody::classify(&Method::HEAD, body), None);
    }

    #[test]
    fn test_json_is_reserialized_compactly() {
        let body = Bytes::from_static(b"{ \"keys\" : [ \"a\", \"b\" ],\n \"n\": 1 }");
        let classified = ForwardBody::classify(&Method::POST, body).unwrap();
        assert!(classified.is_structured());
        assert_eq!(
            classified.into_bytes().unwrap(),
            Bytes::from_static(br#"{"keys":["a","b"],"n":1}"#)
        );
    }

    #[test]
    fn test_json_scalars_are_structured() {
        let classified = ForwardBody::classify(&Method::PUT, Bytes::from_static(b" 42 ")).unwrap();
        assert_eq!(classified, ForwardBody::Structured(Value::from(42)));
    }

    #[test]
    fn test_text_is_forwarded_verbatim() {
        let text = Bytes::from_static(b"key: value\nlist:\n  - 1\n");
        let classified = ForwardBody::classify(&Method::PUT, text.clone()).unwrap();
        assert!(!classified.is_structured());
        assert_eq!(classified.into_bytes().unwrap(), text);
    }

    #[test]
    fn test_binary_is_forwarded_verbatim() {
        let bytes = Bytes::from_static(&[0x89, b'P', b'N', b'G', 0x00, 0xff, 0xfe]);
        let classified = ForwardBody::classify(&Method::PUT, bytes.clone()).unwrap();
        assert_eq!(classified, ForwardBody::Raw(bytes));
    }

    #[test]
    fn test_empty_body_is_raw() {
        let classified = ForwardBody::classify(&Method::DELETE, Bytes::new()).unwrap();
        assert_eq!(classified, ForwardBody::Raw(Bytes::new()));
    }
}
