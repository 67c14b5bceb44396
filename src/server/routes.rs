//! HTTP routes: mini-app manifest, health, wallet-kit settings.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::{AppContext, APP_NAME};
use crate::core::paths::routes;
use crate::manifest::Manifest;

#[derive(Clone)]
pub struct AppState {
    pub manifest: Arc<Value>,
    pub wallet_kit: Arc<Value>,
    pub app_name: String,
}

impl AppState {
    /// Render the manifest and wallet-kit documents once; they do not
    /// change for the life of the process.
    pub fn new(manifest: &Manifest, wallet_kit: Value, app_name: impl Into<String>) -> Self {
        Self { manifest: Arc::new(manifest.to_json()), wallet_kit: Arc::new(wallet_kit), app_name: app_name.into() }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        let wallet_kit = serde_json::to_value(ctx.wallet_kit()).unwrap_or(Value::Null);
        Self::new(&ctx.manifest(), wallet_kit, APP_NAME)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(routes::MANIFEST, get(manifest))
        .route(routes::HEALTH, get(health))
        .route(routes::WALLET_KIT, get(wallet_kit))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn manifest(State(s): State<AppState>) -> Json<Value> {
    Json(s.manifest.as_ref().clone())
}

async fn health(State(s): State<AppState>) -> impl IntoResponse {
    Json(json!({"status": "ok", "service": s.app_name}))
}

async fn wallet_kit(State(s): State<AppState>) -> Json<Value> {
    Json(s.wallet_kit.as_ref().clone())
}
