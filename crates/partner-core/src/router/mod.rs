//! Dual-store router
//!
//! The router is responsible for:
//! - Choosing a store from the table's classification and the live
//!   connection state
//! - Capturing store failures into the result envelope
//! - Tracking connection state and re-probing both stores

mod decision;
mod health;
mod service;

pub use decision::{FallbackReason, RoutingDecision};
pub use health::{ConnectionState, ConnectionStatus, HealthReport};
pub use service::{DataRouter, spawn_health_task};
