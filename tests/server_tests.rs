//! Router tests via `tower::ServiceExt::oneshot`, no sockets.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use ecochain::context::{AppConfig, AppContext};
use ecochain::{create_router, AppState, Manifest};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
    let response = create_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn state() -> AppState {
    AppState::new(&Manifest::default(), json!({"projectId": "p"}), "ecochain")
}

#[tokio::test]
async fn manifest_route_serves_filtered_document() {
    let (status, body) = get_json(state(), "/.well-known/farcaster.json").await;
    assert_eq!(status, StatusCode::OK);

    assert!(body.get("accountAssociation").is_none());
    assert_eq!(body["baseBuilder"]["ownerAddress"], "0x1eEEEE08C989155cA0AA46A3b37d611622e94c1d");
    assert_eq!(body["miniapp"]["name"], "EcoChain");
    assert_eq!(body["miniapp"]["noindex"], true);
    assert_eq!(body["miniapp"]["screenshotUrls"].as_array().unwrap().len(), 3);

    for section in body.as_object().unwrap().values() {
        for (key, value) in section.as_object().unwrap() {
            assert_ne!(value, &json!(""), "{key} should have been dropped");
            assert_ne!(value, &json!([]), "{key} should have been dropped");
        }
    }
}

#[tokio::test]
async fn site_url_replaces_home_url() {
    let state = AppState::new(&Manifest::for_site(Some("https://eco.example/")), Value::Null, "ecochain");
    let (_, body) = get_json(state, "/.well-known/farcaster.json").await;
    assert_eq!(body["miniapp"]["homeUrl"], "https://eco.example/");
}

#[tokio::test]
async fn health_and_wallet_kit() {
    let (status, health) = get_json(state(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health, json!({"status": "ok", "service": "ecochain"}));

    let (_, kit) = get_json(state(), "/api/walletkit").await;
    assert_eq!(kit["projectId"], "p");
}

#[tokio::test]
async fn state_from_context_uses_config() {
    let config = AppConfig::default().with_site_url("https://eco.example");
    let ctx = AppContext::new(config).expect("context");
    assert!(ctx.supabase().is_err());

    let (_, kit) = get_json(AppState::from_context(&ctx), "/api/walletkit").await;
    assert_eq!(kit["metadata"]["name"], "EcoChain");
    assert_eq!(kit["metadata"]["url"], "https://eco.example");
    assert_eq!(kit["networks"], json!(["base"]));

    let (_, manifest) = get_json(AppState::from_context(&ctx), "/.well-known/farcaster.json").await;
    assert_eq!(manifest["miniapp"]["homeUrl"], "https://eco.example");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, _) = get_json(state(), "/scrolls").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
