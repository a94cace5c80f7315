//! AI insight and crisis routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use partner_store::Row;
use serde_json::Value;
use tracing::info;

use super::types::{
    InsightQuery, ResolveRequest, SuccessResponse, created, first_or_not_found, owned_row, rows,
};
use crate::error::ApiError;
use crate::extract::RequireUser;
use crate::state::AppState;

/// GET /api/insights
async fn list_insights(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<InsightQuery>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let unread_only = query.unread.as_deref() == Some("true");
    rows(state.api.get_user_insights(&user.id, unread_only).await)
}

/// PUT /api/insights/{id}/read
async fn mark_read(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(insight_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let result = state.api.mark_insight_as_read(&user.id, &insight_id).await;
    let updated = result.count;
    result.into_result()?;

    if updated == Some(0) {
        return Err(ApiError::NotFound("Insight not found".to_string()));
    }
    Ok(SuccessResponse::ok())
}

/// POST /api/crisis
async fn create_crisis(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Option<Row>>), ApiError> {
    let crisis = owned_row(body, "user_id", &user.id)?;
    info!("Crisis situation reported by user {}", user.id);
    created(state.api.create_crisis_situation(crisis).await)
}

/// GET /api/crisis/active
async fn list_active_crises(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Row>>, ApiError> {
    rows(state.api.get_active_crisis_situations(&user.id).await)
}

/// PUT /api/crisis/{id}/resolve
async fn resolve_crisis(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(crisis_id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<Row>, ApiError> {
    let notes = request
        .resolution_notes
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Resolution notes required".to_string()))?;

    first_or_not_found(
        state
            .api
            .resolve_crisis_situation(&user.id, &crisis_id, &notes)
            .await,
        "Crisis situation",
    )
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/insights", get(list_insights))
        .route("/api/insights/{id}/read", put(mark_read))
        .route("/api/crisis", post(create_crisis))
        .route("/api/crisis/active", get(list_active_crises))
        .route("/api/crisis/{id}/resolve", put(resolve_crisis))
}
