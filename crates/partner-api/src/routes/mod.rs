//! API routes

mod connections;
mod conversations;
mod health;
mod insights;
pub mod metrics;
mod profile;
mod support;
mod types;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::state::{AppState, MetricsHandle};

pub use conversations::CONVERSATION_USAGE_FEATURE;

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        // Liveness, store health, routing table
        .merge(health::routes())
        // Domain API
        .merge(profile::routes())
        .merge(support::routes())
        .merge(conversations::routes())
        .merge(connections::routes())
        .merge(insights::routes())
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router.layer(CorsLayer::permissive())
}
