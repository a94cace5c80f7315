//! Request extractors

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use metrics::counter;
use partner_auth::AuthUser;

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor for the authenticated user (required)
pub struct RequireUser(pub AuthUser);

impl<S> FromRequestParts<S> for RequireUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match app_state.auth.authenticate(header) {
            Ok(user) => Ok(RequireUser(user)),
            Err(e) => {
                counter!("supportpartner_auth_failures_total").increment(1);
                Err(e.into())
            }
        }
    }
}
