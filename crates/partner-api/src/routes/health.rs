//! Health check endpoints

use axum::{Json, Router, extract::State, routing::get};
use partner_core::{SystemHealth, VERSION};
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::AppState;

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness handler
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
    })
}

/// GET /api/health - check both stores
async fn system_health(State(state): State<AppState>) -> Json<SystemHealth> {
    Json(state.api.health_check().await)
}

/// GET /api/routing - the table classification
async fn routing(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "routing": state.api.routing_info() }))
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/health", get(system_health))
        .route("/api/routing", get(routing))
}
