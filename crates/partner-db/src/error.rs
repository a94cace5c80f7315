//! Database error types

use partner_store::StoreError;
use thiserror::Error;

/// Postgres error code for a missing relation
const UNDEFINED_TABLE: &str = "42P01";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Cannot bind parameter ${index} as {type_name}: {message}")]
    Bind {
        index: usize,
        type_name: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(sqlx::Error::Database(db)) => {
                if db.code().as_deref() == Some(UNDEFINED_TABLE) {
                    StoreError::UnknownTable(db.message().to_string())
                } else {
                    StoreError::Rejected(db.message().to_string())
                }
            }
            DbError::Sqlx(
                e @ (sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::Protocol(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed),
            ) => StoreError::Connection(e.to_string()),
            DbError::Sqlx(e) => StoreError::Rejected(e.to_string()),
            DbError::InvalidIdentifier(name) => StoreError::InvalidIdentifier(name),
            DbError::InvalidQuery(message) => StoreError::InvalidQuery(message),
            e @ DbError::Bind { .. } => StoreError::Rejected(e.to_string()),
            DbError::Configuration(message) => StoreError::Connection(message),
        }
    }
}
