use axum::http::StatusCode;
use lnledger::api;
use lnledger::domain::{ApiCredentials, Network};
use lnledger::lnmarkets::records::{RawDeposit, RawId, RawTimestamp, RawTrade, RawWithdrawal};
use lnledger::lnmarkets::{ApiError, MockLnMarketsApi};
use lnledger::vault::store::MemoryStore;
use lnledger::vault::{CredentialSetPatch, CredentialVault};
use std::sync::Arc;
use tower::util::ServiceExt;

const APP_SECRET: &str = "integration-test-app-secret";
const USER: &str = "satoshi@example.com";

struct TestApp {
    app: axum::Router,
    vault: CredentialVault,
}

async fn setup_test_app(api: MockLnMarketsApi) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let vault = CredentialVault::new(store, APP_SECRET);
    let state = api::AppState {
        vault: vault.clone(),
        api: Arc::new(api),
    };
    TestApp {
        app: api::create_router(state),
        vault,
    }
}

async fn seed_config(vault: &CredentialVault) -> String {
    vault
        .add(
            USER,
            "Main account",
            None,
            ApiCredentials::new("api-key", "api-secret", "api-pass", Network::Mainnet),
        )
        .await
        .unwrap()
        .id
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn trade(id: u64, pl: i64) -> RawTrade {
    RawTrade {
        id: Some(RawId::Int(id)),
        pl: Some(pl),
        closed: Some(true),
        closed_at: Some(RawTimestamp::Int(1_700_000_000)),
        ..Default::default()
    }
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let test_app = setup_test_app(MockLnMarketsApi::new()).await;
    let req = axum::http::Request::builder()
        .method("GET")
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = test_app.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn trades_requires_user_email() {
    let test_app = setup_test_app(MockLnMarketsApi::new()).await;
    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/trades",
        serde_json::json!({"configId": "abc"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("userEmail"));
}

#[tokio::test]
async fn trades_requires_config_id() {
    let test_app = setup_test_app(MockLnMarketsApi::new()).await;
    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/trades",
        serde_json::json!({"userEmail": USER}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("configId"));
}

#[tokio::test]
async fn trades_unknown_config_is_404() {
    let test_app = setup_test_app(MockLnMarketsApi::new()).await;
    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/trades",
        serde_json::json!({"userEmail": USER, "configId": "no-such-id"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn inactive_config_is_rejected_without_calling_upstream() {
    // The mock fails every call: if the handler reached the client the
    // error below would mention credentials, not inactivity.
    let test_app = setup_test_app(MockLnMarketsApi::failing(ApiError::InvalidCredentials)).await;
    let config_id = seed_config(&test_app.vault).await;
    test_app
        .vault
        .update(
            USER,
            &config_id,
            CredentialSetPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/trades",
        serde_json::json!({"userEmail": USER, "configId": config_id}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("inactive"));
}

#[tokio::test]
async fn trades_happy_path() {
    let api = MockLnMarketsApi::new()
        .with_trade(trade(1, 100))
        .with_trade(trade(2, -40));
    let test_app = setup_test_app(api).await;
    let config_id = seed_config(&test_app.vault).await;

    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/trades",
        serde_json::json!({"userEmail": USER, "configId": config_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["hasData"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["pl"], 100);
}

#[tokio::test]
async fn trades_accepts_raw_credentials_in_legacy_mode() {
    let api = MockLnMarketsApi::new().with_trade(trade(1, 100));
    let test_app = setup_test_app(api).await;

    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/trades",
        serde_json::json!({"credentials": {
            "key": "k", "secret": "s", "passphrase": "p", "network": "mainnet"
        }}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["hasData"], true);
}

#[tokio::test]
async fn trades_empty_history_sets_has_data_false() {
    let test_app = setup_test_app(MockLnMarketsApi::new()).await;
    let config_id = seed_config(&test_app.vault).await;

    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/trades",
        serde_json::json!({"userEmail": USER, "configId": config_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasData"], false);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn upstream_rate_limit_surfaces_as_400_with_message() {
    let test_app = setup_test_app(MockLnMarketsApi::failing(ApiError::RateLimited)).await;
    let config_id = seed_config(&test_app.vault).await;

    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/trades",
        serde_json::json!({"userEmail": USER, "configId": config_id}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("rate limited"));
}

#[tokio::test]
async fn deposits_happy_path() {
    let api = MockLnMarketsApi::new().with_deposit(RawDeposit {
        id: Some(RawId::Int(7)),
        amount: Some(50_000),
        created_at: Some(RawTimestamp::Text("2024-01-05T10:00:00Z".to_string())),
        ..Default::default()
    });
    let test_app = setup_test_app(api).await;
    let config_id = seed_config(&test_app.vault).await;

    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/deposits",
        serde_json::json!({"userEmail": USER, "configId": config_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["amount"], 50_000);
}

#[tokio::test]
async fn withdrawals_happy_path() {
    let api = MockLnMarketsApi::new().with_withdrawal(RawWithdrawal {
        id: Some(RawId::Int(9)),
        amount: Some(1000),
        kind: Some("lightning".to_string()),
        ts: Some(RawTimestamp::Int(1_700_000_000)),
        ..Default::default()
    });
    let test_app = setup_test_app(api).await;
    let config_id = seed_config(&test_app.vault).await;

    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/withdrawals",
        serde_json::json!({"userEmail": USER, "configId": config_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["type"], "lightning");
}

#[tokio::test]
async fn test_endpoint_requires_credentials() {
    let test_app = setup_test_app(MockLnMarketsApi::new()).await;
    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/test",
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("credentials"));
}

#[tokio::test]
async fn test_endpoint_rejects_blank_fields() {
    let test_app = setup_test_app(MockLnMarketsApi::new()).await;
    let (status, _body) = post_json(
        test_app.app,
        "/api/ln-markets/test",
        serde_json::json!({"credentials": {
            "key": "k", "secret": "", "passphrase": "p", "network": "mainnet"
        }}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_endpoint_happy_path() {
    let test_app = setup_test_app(MockLnMarketsApi::new()).await;
    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/test",
        serde_json::json!({"credentials": {
            "key": "k", "secret": "s", "passphrase": "p", "network": "testnet"
        }}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_endpoint_reports_bad_credentials() {
    let test_app = setup_test_app(MockLnMarketsApi::failing(ApiError::InvalidCredentials)).await;
    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/test",
        serde_json::json!({"credentials": {
            "key": "k", "secret": "s", "passphrase": "p", "network": "mainnet"
        }}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("credentials"));
}

#[tokio::test]
async fn sync_returns_normalized_report() {
    let api = MockLnMarketsApi::new()
        .with_trade(trade(42, 1500))
        .with_trade(RawTrade {
            pl: Some(5),
            ..Default::default()
        })
        .with_deposit(RawDeposit {
            id: Some(RawId::Int(7)),
            amount: Some(50_000),
            created_at: Some(RawTimestamp::Text("2024-01-05T10:00:00Z".to_string())),
            ..Default::default()
        });
    let test_app = setup_test_app(api).await;
    let config_id = seed_config(&test_app.vault).await;

    let (status, body) = post_json(
        test_app.app,
        "/api/ln-markets/sync",
        serde_json::json!({"userEmail": USER, "configId": config_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["imported"], 2);
    assert_eq!(body["data"]["failed"], 1);
    assert_eq!(body["data"]["profits"][0]["id"], "lnm_trade_42");
    assert_eq!(body["data"]["profits"][0]["date"], "2023-11-14");
    assert_eq!(body["data"]["investments"][0]["date"], "2024-01-05");
}

#[tokio::test]
async fn responses_never_leak_secret_material() {
    let test_app = setup_test_app(MockLnMarketsApi::new()).await;
    let config_id = seed_config(&test_app.vault).await;

    for uri in [
        "/api/ln-markets/trades",
        "/api/ln-markets/deposits",
        "/api/ln-markets/withdrawals",
        "/api/ln-markets/sync",
    ] {
        let (_status, body) = post_json(
            test_app.app.clone(),
            uri,
            serde_json::json!({"userEmail": USER, "configId": config_id}),
        )
        .await;
        let text = body.to_string();
        assert!(!text.contains("api-secret"), "{uri} leaked the secret");
        assert!(!text.contains("api-pass"), "{uri} leaked the passphrase");
    }
}
