use crate::proxy::config::ServerConfig;
use crate::proxy::forwarder::RegistryProxy;
use axum::{
    extract::{DefaultBodyLimit, State},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Axum application state
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<RegistryProxy>,
    /// Largest inbound body the proxy buffers
    pub max_body_bytes: usize,
}

/// Build the full router: registry proxy, page data, health check and the
/// static browser UI as fallback.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    use crate::proxy::handlers;

    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route(
            "/api/object-registry/*path",
            any(handlers::registry::proxy_request),
        )
        .route("/api/pages/home", get(handlers::pages::home_page_data))
        .route("/api/pages/audit", get(handlers::pages::audit_page_data))
        .route("/healthz", get(health_check_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
}

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: std::net::SocketAddr,
}

impl AxumServer {
    /// Start Axum server
    pub async fn start(
        config: &ServerConfig,
        proxy: Arc<RegistryProxy>,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), String> {
        let state = AppState {
            proxy,
            max_body_bytes: config.max_body_bytes,
        };
        let app = build_router(state, &config.static_dir);

        // Bind address
        let addr = format!("{}:{}", config.get_bind_address(), config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind address {}: {}", addr, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| format!("Failed to read local address: {}", e))?;

        tracing::info!("Object registry UI started at http://{}", local_addr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(accept_loop(listener, app, shutdown_rx));

        Ok((
            Self {
                shutdown_tx: Some(shutdown_tx),
                local_addr,
            },
            handle,
        ))
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    /// Stop the server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Serve HTTP/1 connections until the shutdown signal fires.
///
/// In-flight connections keep running on their own tasks after the listener
/// closes.
async fn accept_loop(listener: TcpListener, app: Router, mut shutdown_rx: oneshot::Receiver<()>) {
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection: {:?}", e);
                    continue;
                }
            },
            _ = &mut shutdown_rx => {
                tracing::info!("Object registry UI stopped listening");
                return;
            }
        };

        let service = TowerToHyperService::new(app.clone());
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!(%peer, "Connection closed with error: {:?}", err);
            }
        });
    }
}

/// Health check handler
async fn health_check_handler(State(state): State<AppState>) -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "signing_configured": state.proxy.issuer().is_configured(),
    }))
    .into_response()
}
