//! Store error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Operation not supported by the {store} store: {operation}")]
    Unsupported {
        store: &'static str,
        operation: &'static str,
    },
}

impl StoreError {
    /// Whether the failure means the store itself is unreachable,
    /// as opposed to the store rejecting one statement.
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}
