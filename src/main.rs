use std::sync::Arc;

use object_registry_ui::modules;
use object_registry_ui::proxy;

#[tokio::main]
async fn main() -> Result<(), String> {
    modules::logger::init_logger();

    let config = modules::config::load_ui_config();

    let registry_proxy = proxy::RegistryProxy::new(&config.registry)
        .map_err(|e| format!("failed to build upstream client: {}", e))?;

    if let Some(err) = registry_proxy.issuer().config_error() {
        tracing::warn!("registry calls will fail until signing is configured: {}", err);
    } else if let Some(kid) = registry_proxy.issuer().key_id() {
        tracing::info!("signing registry tokens with key id {}", kid);
    }

    tracing::info!("registry API at {}", registry_proxy.api_url());

    let (server, handle) = proxy::AxumServer::start(&config.server, Arc::new(registry_proxy))
        .await
        .map_err(|e| format!("failed to start UI server: {}", e))?;

    tracing::info!("object registry UI listening on http://{}", server.local_addr());

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown signal: {}", e))?;

    tracing::info!("shutdown requested, stopping server...");
    server.stop();
    let _ = handle.await;

    Ok(())
}
