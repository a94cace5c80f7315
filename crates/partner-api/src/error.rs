//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use partner_auth::AuthError;
use partner_core::RouterError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Router(e) => match e {
                RouterError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                RouterError::UnknownTable(_) => StatusCode::NOT_FOUND,
                RouterError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                RouterError::Query { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Auth(e) = self {
            return e.into_response();
        }

        let status = self.status();
        if status.is_server_error() {
            error!("API error: {}", self);
        }

        let body = axum::Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partner_store::StoreKind;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(RouterError::InvalidQuery("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(RouterError::UnknownTable("nope".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(RouterError::BackendUnavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::from(RouterError::Query {
                    store: StoreKind::Hosted,
                    message: "boom".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(AuthError::TokenExpired),
                StatusCode::UNAUTHORIZED,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.status(), status);
            assert_eq!(error.into_response().status(), status);
        }
    }
}
