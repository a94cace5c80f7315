//! Store backend trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::StoreError;
use crate::query::{Filter, Returning, Row, SelectOptions};

/// Which backing store a call lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Hosted backend-as-a-service, general-purpose data
    Hosted,
    /// Self-managed Postgres pool, sensitive partner data
    Relational,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Hosted => "hosted",
            StoreKind::Relational => "relational",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows produced by a store call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreOutput {
    pub rows: Vec<Row>,
    /// Rows returned by a read, or rows affected by a write
    pub count: Option<u64>,
}

impl StoreOutput {
    pub fn new(rows: Vec<Row>, count: Option<u64>) -> Self {
        Self { rows, count }
    }

    /// Output whose count is the number of rows returned
    pub fn rows(rows: Vec<Row>) -> Self {
        let count = Some(rows.len() as u64);
        Self { rows, count }
    }

    /// Output of a write that returned nothing
    pub fn affected(count: u64) -> Self {
        Self {
            rows: Vec::new(),
            count: Some(count),
        }
    }
}

/// Store backend trait
///
/// Implementations translate the generic envelope into their native query
/// form. Identifiers have already been validated by the caller, but
/// implementations that concatenate them must still refuse bad ones.
#[async_trait]
pub trait Store: Send + Sync {
    /// Which kind of store this is
    fn kind(&self) -> StoreKind;

    /// Insert one row
    async fn insert(
        &self,
        table: &str,
        row: &Row,
        returning: &Returning,
    ) -> Result<StoreOutput, StoreError>;

    /// Read rows
    async fn select(&self, table: &str, options: &SelectOptions)
    -> Result<StoreOutput, StoreError>;

    /// Update the rows matching `filter`
    async fn update(
        &self,
        table: &str,
        patch: &Row,
        filter: &Filter,
        returning: &Returning,
    ) -> Result<StoreOutput, StoreError>;

    /// Delete the rows matching `filter`
    async fn delete(&self, table: &str, filter: &Filter) -> Result<StoreOutput, StoreError>;

    /// Run a raw statement with positional parameters
    async fn execute(&self, _sql: &str, _params: &[Value]) -> Result<StoreOutput, StoreError> {
        Err(StoreError::Unsupported {
            store: self.kind().as_str(),
            operation: "raw SQL",
        })
    }

    /// Cheap liveness check
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release pooled resources
    async fn close(&self) {}
}
