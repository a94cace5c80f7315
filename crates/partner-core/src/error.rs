//! Router error types

use partner_store::{StoreError, StoreKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Relational store unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Query failed on {store} store: {message}")]
    Query { store: StoreKind, message: String },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl RouterError {
    /// Classify a store failure
    pub fn from_store(store: StoreKind, err: StoreError) -> Self {
        match err {
            StoreError::UnknownTable(message) => RouterError::UnknownTable(message),
            StoreError::InvalidIdentifier(name) => {
                RouterError::InvalidQuery(format!("invalid identifier: {}", name))
            }
            StoreError::InvalidQuery(message) => RouterError::InvalidQuery(message),
            other => RouterError::Query {
                store,
                message: other.to_string(),
            },
        }
    }
}
