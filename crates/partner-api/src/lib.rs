//! SupportPartner REST API
//!
//! This crate provides the Axum-based HTTP API: liveness and metrics
//! endpoints plus the authenticated JSON routes over the domain facade.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extract::RequireUser;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
