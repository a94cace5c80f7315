//! Partner connection routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use partner_core::PartnerStatus;
use partner_store::Row;
use serde_json::Value;

use super::types::{StatusRequest, created, first_or_not_found, owned_row, rows};
use crate::error::ApiError;
use crate::extract::RequireUser;
use crate::state::AppState;

/// POST /api/partner-connections
async fn create_connection(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Option<Row>>), ApiError> {
    let connection = owned_row(body, "supporter_id", &user.id)?;
    created(state.api.create_partner_connection(connection).await)
}

/// GET /api/partner-connections
async fn list_connections(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Row>>, ApiError> {
    rows(state.api.get_user_partner_connections(&user.id).await)
}

/// PUT /api/partner-connections/{id}/status
async fn update_status(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(connection_id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Row>, ApiError> {
    let status: PartnerStatus = request
        .status
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ApiError::BadRequest("Invalid status".to_string()))?;

    first_or_not_found(
        state
            .api
            .update_partner_connection_status(&user.id, &connection_id, status)
            .await,
        "Partner connection",
    )
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/partner-connections",
            get(list_connections).post(create_connection),
        )
        .route("/api/partner-connections/{id}/status", put(update_status))
}
