//! SupportPartner Core
//!
//! This crate provides the dual-store routing layer: table
//! classification, the router with its connection state and routing
//! decisions, and the domain facade built on top of it.

pub mod classification;
pub mod config;
pub mod error;
pub mod facade;
pub mod result;
pub mod router;

pub use classification::{Sensitivity, classification_map, classify, is_classified};
pub use config::RouterConfig;
pub use error::RouterError;
pub use facade::{PartnerStatus, SupportPartnerApi, SystemHealth, VERSION};
pub use result::QueryResult;
pub use router::{
    ConnectionState, ConnectionStatus, DataRouter, FallbackReason, HealthReport, RoutingDecision,
    spawn_health_task,
};
