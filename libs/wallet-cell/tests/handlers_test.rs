use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use axum::response::IntoResponse;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_models::error::AppError;
use shared_utils::test_utils::{MockRpcResponses, TestConfig, GANACHE_CHAIN, TEST_ACCOUNT};
use wallet_cell::models::{TargetNetworks, WalletError};
use wallet_cell::router::wallet_routes;
use wallet_cell::services::{JsonRpcProvider, MemoryAddressStore, Notifier, WalletConnection, WalletProvider};

async fn create_test_app(rpc_url: Option<String>) -> Router {
    let config = match rpc_url {
        Some(url) => TestConfig::with_wallet_rpc(&url).to_app_config(),
        None => TestConfig::default().to_app_config(),
    };
    let provider = JsonRpcProvider::from_config(&config)
        .map(|provider| Arc::new(provider) as Arc<dyn WalletProvider>);
    let connection = WalletConnection::mount(
        provider,
        Arc::new(MemoryAddressStore::new()),
        TargetNetworks::default(),
        Notifier::new(),
    )
    .await;
    wallet_routes(Arc::new(connection))
}

async fn send(app: &Router, http_method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(http_method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn setup_rpc_mocks(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_chainId" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockRpcResponses::chain_id(GANACHE_CHAIN)))
        .mount(mock_server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_requestAccounts" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockRpcResponses::accounts(&[TEST_ACCOUNT])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_connect_and_disconnect_flow() {
    let mock_server = MockServer::start().await;
    setup_rpc_mocks(&mock_server).await;
    let app = create_test_app(Some(mock_server.uri())).await;

    let (status, body) = send(&app, "GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wallet"]["status"], "disconnected");

    let (status, body) = send(&app, "POST", "/connect").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wallet"]["status"], "connected_on_target_network");
    assert_eq!(body["wallet"]["account"], TEST_ACCOUNT);
    assert_eq!(body["wallet"]["address_preview"], "0xabc0000000000...");
    assert_eq!(body["wallet"]["connecting"], false);
    assert_eq!(body["wallet"]["balance_label"], "Balance not available");

    let (_, body) = send(&app, "GET", "/notifications").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["notifications"][0]["action"], "logout");

    let (status, body) = send(&app, "POST", "/disconnect").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wallet"]["status"], "disconnected");
    assert_eq!(body["wallet"]["connected"], false);
}

#[tokio::test]
async fn test_connect_without_provider_is_unavailable() {
    let app = create_test_app(None).await;

    let (status, body) = send(&app, "POST", "/connect").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Wallet not installed!");

    let (_, body) = send(&app, "GET", "/notifications").await;
    assert_eq!(body["notifications"][0]["kind"], "alert");

    let (status, body) = send(&app, "GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wallet"]["status"], "disconnected");
}

#[tokio::test]
async fn test_rejected_connect_maps_to_bad_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_chainId" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockRpcResponses::chain_id(GANACHE_CHAIN)))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_requestAccounts" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockRpcResponses::user_rejected()))
        .mount(&mock_server)
        .await;
    let app = create_test_app(Some(mock_server.uri())).await;

    let (status, _) = send(&app, "POST", "/connect").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", "/").await;
    assert_eq!(body["wallet"]["status"], "disconnected");
}

#[tokio::test]
async fn test_connect_in_progress_maps_to_conflict() {
    let response = AppError::from(WalletError::ConnectInProgress).into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
