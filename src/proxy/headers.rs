//! Header rewriting across the proxy hop.
//!
//! Both directions are pure functions from one header map to a new one.

use axum::http::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION};

/// Request headers never copied to the backend.
///
/// `host` would name this server instead of the registry. The framing headers
/// describe the inbound body, which is buffered and re-framed before sending.
/// `accept-encoding` is left to the upstream client so the registry only
/// compresses with codecs the relay can decode.
pub const REQUEST_DENYLIST: [&str; 4] = [
    "host",
    "content-length",
    "transfer-encoding",
    "accept-encoding",
];

/// Response headers never copied back to the browser.
///
/// The upstream client decodes compressed bodies and the outer server re-frames them.
pub const RESPONSE_DENYLIST: [&str; 2] = ["content-encoding", "transfer-encoding"];

/// Build the outbound header map: inbound headers minus the denylist, with
/// the registry bearer token replacing any caller-supplied authorization.
pub fn outbound_request_headers(
    inbound: &HeaderMap,
    token: &str,
) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 1);
    for (name, value) in inbound {
        if REQUEST_DENYLIST.contains(&name.as_str()) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}

/// Build the relayed response header map
pub fn relayed_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if RESPONSE_DENYLIST.contains(&name.as_str()) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}
