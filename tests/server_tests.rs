use std::sync::Arc;

use serde_json::json;

use object_registry_ui::client::{ClientError, RegistryClient};
use object_registry_ui::models::AuditQuery;
use object_registry_ui::proxy::config::SigningKeyConfig;
use object_registry_ui::proxy::{AxumServer, RegistryConfig, RegistryProxy, ServerConfig};

const PRIVATE_KEY: &str = include_str!("fixtures/registry_test_key.pem");

async fn start_ui(api_url: &str, signed: bool) -> (AxumServer, tokio::task::JoinHandle<()>) {
    let signing = signed.then(|| SigningKeyConfig {
        key_id: "ui-key-1".to_string(),
        private_key_pem: PRIVATE_KEY.to_string(),
    });
    let proxy = RegistryProxy::new(&RegistryConfig::new(api_url, signing)).unwrap();
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };
    AxumServer::start(&config, Arc::new(proxy)).await.unwrap()
}

#[tokio::test]
async fn client_round_trips_through_running_server() {
    let registry = httpmock::MockServer::start_async().await;
    let namespaces = registry
        .mock_async(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/namespaces")
                .header_exists("authorization");
            then.status(200).json_body(json!(["default", "billing"]));
        })
        .await;
    registry
        .mock_async(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/audit")
                .query_param("limit", "100")
                .query_param("subject", "ci");
            then.status(200).json_body(json!([]));
        })
        .await;

    let (server, handle) = start_ui(&registry.base_url(), true).await;
    let client = RegistryClient::new(&format!("http://{}", server.local_addr())).unwrap();

    assert_eq!(
        client.list_namespaces().await.unwrap(),
        vec!["default".to_string(), "billing".to_string()]
    );
    namespaces.assert_async().await;

    let logs = client
        .list_audit_logs(&AuditQuery::default().subject("ci"))
        .await
        .unwrap();
    assert!(logs.is_empty());

    server.stop();
    handle.await.unwrap();
}

#[tokio::test]
async fn client_surfaces_proxy_fault_message() {
    let (server, handle) = start_ui("http://127.0.0.1:9", false).await;
    let client = RegistryClient::new(&format!("http://{}", server.local_addr())).unwrap();

    let err = client.list_namespaces().await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 500, .. }));
    assert_eq!(
        err.to_string(),
        "Missing OBJECT_REGISTRY_KEY_ID or OBJECT_REGISTRY_PRIVATE_KEY environment variables."
    );

    server.stop();
    handle.await.unwrap();
}
