//! Profile and subscription routes

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use partner_store::Row;
use serde_json::Value;
use tracing::debug;

use super::types::{SuccessResponse, UsageRequest, first_or_null, into_row};
use crate::error::ApiError;
use crate::extract::RequireUser;
use crate::state::AppState;

/// Columns a client may never rewrite
const PROTECTED_PROFILE_COLUMNS: [&str; 2] = ["id", "created_at"];

/// GET /api/profile
async fn get_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Row>, ApiError> {
    state
        .api
        .get_user_profile(&user.id)
        .await
        .into_first()?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))
}

/// PUT /api/profile
async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<Value>,
) -> Result<Json<Option<Row>>, ApiError> {
    let mut updates = into_row(body)?;
    for column in PROTECTED_PROFILE_COLUMNS {
        updates.remove(column);
    }

    first_or_null(state.api.update_user_profile(&user.id, updates).await)
}

/// POST /api/profile/activity
async fn record_activity(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.api.update_last_active(&user.id).await.into_result()?;
    Ok(SuccessResponse::ok())
}

/// GET /api/subscription
async fn get_subscription(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Option<Row>>, ApiError> {
    first_or_null(state.api.get_user_subscription(&user.id).await)
}

/// POST /api/subscription/usage
async fn track_usage(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<UsageRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let feature = request
        .feature
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Feature name required".to_string()))?;
    let count = request.count.unwrap_or(1);

    debug!("Tracking {} x{} for user {}", feature, count, user.id);
    state
        .api
        .track_usage(&user.id, &feature, count)
        .await
        .into_result()?;
    Ok(SuccessResponse::ok())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/profile/activity", post(record_activity))
        .route("/api/subscription", get(get_subscription))
        .route("/api/subscription/usage", post(track_usage))
}
