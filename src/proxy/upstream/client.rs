// Upstream client for the registry backend
//
// Two pooled reqwest clients: one follows redirects, one hands them back.

use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use reqwest::{redirect, Client, ClientBuilder, Response};
use tokio::time::Duration;

const USER_AGENT: &str = concat!("object-registry-ui/", env!("CARGO_PKG_VERSION"));

pub struct UpstreamClient {
    // Used for every method except PUT
    following: Client,
    // PUT only: a 3xx is usually a pre-signed storage URL the browser must follow itself
    manual: Client,
}

impl UpstreamClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let following = Self::builder()
            .redirect(redirect::Policy::default())
            .build()?;
        let manual = Self::builder().redirect(redirect::Policy::none()).build()?;

        Ok(Self { following, manual })
    }

    fn builder() -> ClientBuilder {
        // No overall timeout: uploads and downloads may be large
        Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(USER_AGENT)
            .no_proxy()
    }

    /// Client whose redirect policy matches the method
    pub fn client_for(&self, method: &Method) -> &Client {
        if *method == Method::PUT {
            &self.manual
        } else {
            &self.following
        }
    }

    /// Send one request to the backend
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self
            .client_for(&method)
            .request(method, url)
            .headers(headers);

        if let Some(body) = body {
            request = request.body(body);
        }

        request.send().await
    }
}
