//! Request and response shapes shared by the route modules

use axum::{Json, http::StatusCode};
use partner_core::QueryResult;
use partner_store::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// `{ "success": true }`
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// `?limit=`
#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

/// `?days=`
#[derive(Deserialize)]
pub struct DaysQuery {
    pub days: Option<u64>,
}

/// `?session_id=&limit=`
#[derive(Deserialize)]
pub struct ConversationQuery {
    pub session_id: Option<String>,
    pub limit: Option<u64>,
}

/// `?unread=true`
#[derive(Deserialize)]
pub struct InsightQuery {
    pub unread: Option<String>,
}

/// POST /api/subscription/usage
#[derive(Deserialize)]
pub struct UsageRequest {
    pub feature: Option<String>,
    pub count: Option<i64>,
}

/// PUT /api/partner-connections/{id}/status
#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

/// PUT /api/crisis/{id}/resolve
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub resolution_notes: Option<String>,
}

/// Zero and absent both mean the default
pub fn or_default(value: Option<u64>, default: u64) -> u64 {
    value.filter(|v| *v > 0).unwrap_or(default)
}

/// A JSON body that must be an object
pub fn into_row(body: Value) -> Result<Row, ApiError> {
    match body {
        Value::Object(row) => Ok(row),
        _ => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

/// Merged body with the caller's id written into the owning column
pub fn owned_row(body: Value, column: &str, user_id: &str) -> Result<Row, ApiError> {
    let mut row = into_row(body)?;
    row.insert(column.to_string(), Value::from(user_id));
    Ok(row)
}

/// All returned rows
pub fn rows(result: QueryResult) -> Result<Json<Vec<Row>>, ApiError> {
    Ok(Json(result.into_result()?))
}

/// The first returned row, or `null`
pub fn first_or_null(result: QueryResult) -> Result<Json<Option<Row>>, ApiError> {
    Ok(Json(result.into_first()?))
}

/// The first returned row, or 404 when nothing matched
pub fn first_or_not_found(result: QueryResult, what: &str) -> Result<Json<Row>, ApiError> {
    result
        .into_first()?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", what)))
}

/// 201 with the created row
pub fn created(result: QueryResult) -> Result<(StatusCode, Json<Option<Row>>), ApiError> {
    Ok((StatusCode::CREATED, Json(result.into_first()?)))
}
