//! Support action and daily check-in routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use partner_core::facade::{DEFAULT_CHECKIN_DAYS, DEFAULT_HISTORY_LIMIT, today};
use partner_store::Row;
use serde_json::Value;

use super::types::{DaysQuery, LimitQuery, created, first_or_null, or_default, owned_row, rows};
use crate::error::ApiError;
use crate::extract::RequireUser;
use crate::state::AppState;

/// POST /api/support-actions
async fn log_support_action(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Option<Row>>), ApiError> {
    let action = owned_row(body, "user_id", &user.id)?;
    created(state.api.log_support_action(action).await)
}

/// GET /api/support-actions
async fn list_support_actions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let limit = or_default(query.limit, DEFAULT_HISTORY_LIMIT);
    rows(state.api.get_user_support_actions(&user.id, limit).await)
}

/// GET /api/support-actions/partner/{partner_id}
async fn list_partner_support_actions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(partner_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let limit = or_default(query.limit, DEFAULT_HISTORY_LIMIT);
    rows(
        state
            .api
            .get_partner_support_actions(&user.id, &partner_id, limit)
            .await,
    )
}

/// POST /api/checkins
async fn create_checkin(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Option<Row>>), ApiError> {
    let mut checkin = owned_row(body, "user_id", &user.id)?;
    if checkin.get("checkin_date").is_none_or(Value::is_null) {
        checkin.insert("checkin_date".to_string(), Value::from(today()));
    }

    created(state.api.create_daily_checkin(checkin).await)
}

/// GET /api/checkins
async fn list_checkins(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<DaysQuery>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let days = or_default(query.days, DEFAULT_CHECKIN_DAYS);
    rows(state.api.get_user_daily_checkins(&user.id, days).await)
}

/// GET /api/checkins/today
async fn today_checkin(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Option<Row>>, ApiError> {
    first_or_null(state.api.get_today_checkin(&user.id).await)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/support-actions",
            get(list_support_actions).post(log_support_action),
        )
        .route(
            "/api/support-actions/partner/{partner_id}",
            get(list_partner_support_actions),
        )
        .route("/api/checkins", get(list_checkins).post(create_checkin))
        .route("/api/checkins/today", get(today_checkin))
}
