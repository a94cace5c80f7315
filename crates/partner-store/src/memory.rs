//! In-memory store
//!
//! Keeps tables as vectors of rows. Used for local development without a
//! hosted project and as the store double in tests; it can be switched
//! offline to simulate an outage.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use tracing::debug;

use crate::backend::{Store, StoreKind, StoreOutput};
use crate::error::StoreError;
use crate::query::{Filter, Returning, Row, SelectOptions};

/// In-memory store
pub struct MemoryStore {
    kind: StoreKind,
    tables: RwLock<HashMap<String, Vec<Row>>>,
    available: AtomicBool,
    calls: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store reporting itself as `kind`
    pub fn new(kind: StoreKind) -> Self {
        debug!("Initialized in-memory {} store", kind);
        Self {
            kind,
            tables: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            calls: AtomicU64::new(0),
        }
    }

    /// Take the store offline or bring it back
    pub fn set_available(&self, available: bool) {
        self.available.store(available, AtomicOrdering::SeqCst);
    }

    /// Number of data operations served (pings excluded)
    pub fn call_count(&self) -> u64 {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    /// Snapshot of a table's rows
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Connection(format!("{} store is offline", self.kind)))
        }
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.check_available()?;
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }
}

/// Keep only the requested columns; `*` keeps everything
fn project(row: &Row, columns: Option<&[&str]>) -> Row {
    match columns {
        None => row.clone(),
        Some(columns) if columns.contains(&"*") => row.clone(),
        Some(columns) => columns
            .iter()
            .filter_map(|c| row.get(*c).map(|v| (c.to_string(), v.clone())))
            .collect(),
    }
}

/// Order JSON values: nulls first, then booleans, numbers, strings
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn kind(&self) -> StoreKind {
        self.kind
    }

    async fn insert(
        &self,
        table: &str,
        row: &Row,
        returning: &Returning,
    ) -> Result<StoreOutput, StoreError> {
        self.begin()?;
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());

        let rows = match returning.projection() {
            Some(columns) => vec![project(row, Some(columns.as_slice()))],
            None => Vec::new(),
        };
        Ok(StoreOutput::new(rows, Some(1)))
    }

    async fn select(
        &self,
        table: &str,
        options: &SelectOptions,
    ) -> Result<StoreOutput, StoreError> {
        self.begin()?;
        let tables = self.tables.read();
        let mut rows: Vec<&Row> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| options.filter.matches(r)).collect())
            .unwrap_or_default();

        if let Some(order) = &options.order_by {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        let offset = options.offset.unwrap_or(0) as usize;
        let limit = options.effective_limit().map_or(usize::MAX, |l| l as usize);
        let columns: Option<Vec<&str>> = options
            .columns
            .as_ref()
            .map(|c| c.iter().map(String::as_str).collect());

        let rows = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|r| project(r, columns.as_deref()))
            .collect();
        Ok(StoreOutput::rows(rows))
    }

    async fn update(
        &self,
        table: &str,
        patch: &Row,
        filter: &Filter,
        returning: &Returning,
    ) -> Result<StoreOutput, StoreError> {
        self.begin()?;
        let mut tables = self.tables.write();
        let mut updated = Vec::new();

        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| filter.matches(r)) {
                for (column, value) in patch {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }

        let count = updated.len() as u64;
        let rows = match returning.projection() {
            Some(columns) => updated.iter().map(|r| project(r, Some(columns.as_slice()))).collect(),
            None => Vec::new(),
        };
        Ok(StoreOutput::new(rows, Some(count)))
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<StoreOutput, StoreError> {
        self.begin()?;
        let mut tables = self.tables.write();
        let removed = match tables.get_mut(table) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|r| !filter.matches(r));
                before - rows.len()
            }
            None => 0,
        };
        Ok(StoreOutput::affected(removed as u64))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::OrderBy;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new(StoreKind::Hosted);
        for (id, rating) in [("a1", 3), ("a2", 5), ("a3", 1)] {
            store
                .insert(
                    "support_actions",
                    &row(json!({"id": id, "user_id": "u1", "effectiveness_rating": rating})),
                    &Returning::Nothing,
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_insert_then_select_round_trip() {
        let store = MemoryStore::new(StoreKind::Hosted);
        let inserted = store
            .insert(
                "user_profiles",
                &row(json!({"id": "u1", "email": "a@b.com"})),
                &Returning::All,
            )
            .await
            .unwrap();
        assert_eq!(inserted.rows.len(), 1);

        let selected = store
            .select(
                "user_profiles",
                &SelectOptions::new().filter(Filter::new().eq("id", "u1")),
            )
            .await
            .unwrap();
        assert_eq!(selected.rows.len(), 1);
        assert_eq!(selected.rows[0]["email"], json!("a@b.com"));
        assert_eq!(selected.count, Some(1));
    }

    #[tokio::test]
    async fn test_select_orders_and_pages() {
        let store = seeded().await;
        let options = SelectOptions::new()
            .columns(["id"])
            .order_by(OrderBy::desc("effectiveness_rating"))
            .limit(2)
            .offset(1);

        let output = store.select("support_actions", &options).await.unwrap();
        assert_eq!(
            output.rows,
            vec![row(json!({"id": "a1"})), row(json!({"id": "a3"}))]
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_counts() {
        let store = seeded().await;
        let patch = row(json!({"effectiveness_rating": 4}));

        let updated = store
            .update(
                "support_actions",
                &patch,
                &Filter::new().eq("id", "a2"),
                &Returning::Columns(vec!["effectiveness_rating".into()]),
            )
            .await
            .unwrap();
        assert_eq!(updated.count, Some(1));
        assert_eq!(updated.rows, vec![row(json!({"effectiveness_rating": 4}))]);

        let deleted = store
            .delete("support_actions", &Filter::new().eq("user_id", "u1"))
            .await
            .unwrap();
        assert_eq!(deleted.count, Some(3));
        assert!(store.rows("support_actions").is_empty());
    }

    #[tokio::test]
    async fn test_offline_store_fails_with_connection_error() {
        let store = MemoryStore::new(StoreKind::Relational);
        store.set_available(false);

        let err = store.ping().await.unwrap_err();
        assert!(err.is_connection());

        let err = store
            .select("daily_checkins", &SelectOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_connection());
        assert_eq!(store.call_count(), 0);

        store.set_available(true);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_raw_sql_is_unsupported() {
        let store = MemoryStore::new(StoreKind::Hosted);
        let err = store.execute("SELECT 1", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Unsupported { .. }));
    }
}
