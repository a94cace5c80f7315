//! SupportPartner Relational Store
//!
//! This crate provides the Postgres-backed store used for sensitive
//! partner data: a parameterized SQL builder and a `Store`
//! implementation over an sqlx connection pool.

pub mod config;
pub mod convert;
pub mod error;
pub mod sql;
pub mod store;

pub use config::RelationalConfig;
pub use error::DbError;
pub use sql::SqlStatement;
pub use store::RelationalStore;

/// Re-export sqlx types for convenience
pub use sqlx::PgPool;
