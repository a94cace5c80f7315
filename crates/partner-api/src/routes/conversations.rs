//! Mama Grace conversation routes

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use partner_core::facade::DEFAULT_HISTORY_LIMIT;
use partner_store::Row;
use serde_json::Value;
use tracing::warn;

use super::types::{ConversationQuery, created, or_default, owned_row, rows};
use crate::error::ApiError;
use crate::extract::RequireUser;
use crate::state::AppState;

/// Usage feature counted once per saved conversation
pub const CONVERSATION_USAGE_FEATURE: &str = "mama_grace_daily";

/// POST /api/mama-grace/conversations
async fn save_conversation(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Option<Row>>), ApiError> {
    let conversation = owned_row(body, "user_id", &user.id)?;

    // Usage is counted before the save; a failed count does not block it
    let usage = state
        .api
        .track_usage(&user.id, CONVERSATION_USAGE_FEATURE, 1)
        .await;
    if let Some(e) = usage.error {
        warn!("Failed to track conversation usage for {}: {}", user.id, e);
    }

    created(state.api.save_mama_grace_conversation(conversation).await)
}

/// GET /api/mama-grace/conversations
async fn list_conversations(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let limit = or_default(query.limit, DEFAULT_HISTORY_LIMIT);
    rows(
        state
            .api
            .get_mama_grace_conversations(&user.id, query.session_id.as_deref(), limit)
            .await,
    )
}

/// GET /api/mama-grace/sessions
async fn list_sessions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Row>>, ApiError> {
    rows(state.api.get_conversation_sessions(&user.id).await)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/mama-grace/conversations",
            get(list_conversations).post(save_conversation),
        )
        .route("/api/mama-grace/sessions", get(list_sessions))
}
