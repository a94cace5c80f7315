//! Router service

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use parking_lot::RwLock;
use partner_store::{
    Condition, Filter, Returning, Row, SelectOptions, Store, StoreError, StoreKind, StoreOutput,
    is_identifier,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::decision::{FallbackReason, RoutingDecision};
use super::health::{ConnectionState, HealthReport};
use crate::classification::{Sensitivity, classification_map, classify, is_classified};
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::result::QueryResult;

/// Routes table operations to the hosted or relational store
pub struct DataRouter {
    hosted: Arc<dyn Store>,
    relational: Option<Arc<dyn Store>>,
    /// Connection state per store
    states: RwLock<HashMap<StoreKind, ConnectionState>>,
    config: RouterConfig,
}

impl DataRouter {
    /// Create a router; a missing relational store is `NotConfigured`
    pub fn new(
        hosted: Arc<dyn Store>,
        relational: Option<Arc<dyn Store>>,
        config: RouterConfig,
    ) -> Self {
        let mut states = HashMap::new();
        states.insert(StoreKind::Hosted, ConnectionState::configured(StoreKind::Hosted));
        states.insert(
            StoreKind::Relational,
            if relational.is_some() {
                ConnectionState::configured(StoreKind::Relational)
            } else {
                ConnectionState::not_configured(StoreKind::Relational)
            },
        );

        info!(
            "Router initialized (relational store {}, strict tables: {})",
            if relational.is_some() { "configured" } else { "not configured" },
            config.strict_tables
        );

        Self {
            hosted,
            relational,
            states: RwLock::new(states),
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    fn store(&self, kind: StoreKind) -> Option<&Arc<dyn Store>> {
        match kind {
            StoreKind::Hosted => Some(&self.hosted),
            StoreKind::Relational => self.relational.as_ref(),
        }
    }

    /// Whether `kind` is configured and currently connected
    pub fn is_connected(&self, kind: StoreKind) -> bool {
        self.states
            .read()
            .get(&kind)
            .is_some_and(ConnectionState::is_connected)
    }

    /// Snapshot of both stores' connection state
    pub fn connection_states(&self) -> Vec<ConnectionState> {
        let states = self.states.read();
        [StoreKind::Hosted, StoreKind::Relational]
            .iter()
            .filter_map(|kind| states.get(kind).cloned())
            .collect()
    }

    /// Decide where an operation on `table` goes right now
    pub fn decide(&self, table: &str) -> RoutingDecision {
        match classify(table) {
            Sensitivity::NonPhi => RoutingDecision::RoutedTo {
                store: StoreKind::Hosted,
            },
            Sensitivity::SensitivePartner => {
                let reason = if self.relational.is_none() {
                    FallbackReason::NotConfigured
                } else if self.is_connected(StoreKind::Relational) {
                    return RoutingDecision::RoutedTo {
                        store: StoreKind::Relational,
                    };
                } else {
                    FallbackReason::Disconnected
                };

                RoutingDecision::FallbackApplied {
                    intended: StoreKind::Relational,
                    actual: StoreKind::Hosted,
                    reason,
                }
            }
        }
    }

    /// Mark a store as disconnected after a connection-level failure
    pub fn mark_disconnected(&self, kind: StoreKind, reason: &str) {
        let mut states = self.states.write();
        if let Some(state) = states.get_mut(&kind)
            && state.record_failure(reason, Utc::now(), false)
        {
            warn!("{} store marked disconnected: {}", kind, reason);
        }
    }

    /// Mark a store as connected after a call that began at `started`
    /// succeeded
    pub fn mark_connected(&self, kind: StoreKind, started: DateTime<Utc>) {
        let mut states = self.states.write();
        if let Some(state) = states.get_mut(&kind)
            && state.record_call_success(started)
        {
            info!("{} store recovered", kind);
        }
    }

    fn validate<'a>(
        &self,
        table: &str,
        columns: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), RouterError> {
        if !is_identifier(table) {
            return Err(RouterError::InvalidQuery(format!(
                "invalid table name: {}",
                table
            )));
        }

        if let Some(column) = columns
            .into_iter()
            .find(|c| *c != "*" && !is_identifier(c))
        {
            return Err(RouterError::InvalidQuery(format!(
                "invalid column name: {}",
                column
            )));
        }

        if self.config.strict_tables && !is_classified(table) {
            return Err(RouterError::UnknownTable(table.to_string()));
        }
        Ok(())
    }

    /// Validate, route, call, and capture the outcome
    async fn dispatch<F, Fut>(
        &self,
        operation: &'static str,
        table: &str,
        validation: Result<(), RouterError>,
        call: F,
    ) -> QueryResult
    where
        F: FnOnce(Arc<dyn Store>) -> Fut,
        Fut: Future<Output = Result<StoreOutput, StoreError>>,
    {
        if let Err(e) = validation {
            warn!(table, operation, "Rejected query: {}", e);
            return QueryResult::failed(e, None);
        }

        let decision = self.decide(table);
        if let RoutingDecision::FallbackApplied { reason, .. } = decision {
            warn!(
                table,
                operation,
                reason = ?reason,
                "Sensitive table routed to hosted store"
            );
            counter!("supportpartner_router_fallbacks_total", "table" => table.to_string())
                .increment(1);
        }

        let kind = decision.store();
        let store = match self.store(kind) {
            Some(store) => store.clone(),
            None => {
                return QueryResult::failed(
                    RouterError::BackendUnavailable(format!("{} store is not configured", kind)),
                    Some(decision),
                );
            }
        };

        let started = Utc::now();
        let start = Instant::now();
        let result = call(store).await;
        let elapsed = start.elapsed();

        counter!(
            "supportpartner_router_queries_total",
            "store" => kind.as_str(),
            "operation" => operation
        )
        .increment(1);
        histogram!(
            "supportpartner_router_query_duration_seconds",
            "store" => kind.as_str()
        )
        .record(elapsed.as_secs_f64());

        match result {
            Ok(output) => {
                debug!(
                    table,
                    operation,
                    store = %kind,
                    rows = output.count.unwrap_or(0),
                    duration_ms = elapsed.as_millis() as u64,
                    "Routed query"
                );
                self.mark_connected(kind, started);
                QueryResult::ok(output, decision)
            }
            Err(e) => {
                error!(table, operation, store = %kind, "Query failed: {}", e);
                counter!("supportpartner_router_errors_total", "store" => kind.as_str())
                    .increment(1);
                if e.is_connection() {
                    self.mark_disconnected(kind, &e.to_string());
                }
                QueryResult::failed(RouterError::from_store(kind, e), Some(decision))
            }
        }
    }

    /// Insert one row
    pub async fn insert(&self, table: &str, row: &Row, returning: &Returning) -> QueryResult {
        let projection = returning.projection().unwrap_or_default();
        let validation = self.validate(table, row.keys().map(String::as_str).chain(projection));

        self.dispatch("insert", table, validation, |store| async move {
            store.insert(table, row, returning).await
        })
        .await
    }

    /// Read rows
    pub async fn select(&self, table: &str, options: &SelectOptions) -> QueryResult {
        let columns = options
            .columns
            .iter()
            .flatten()
            .map(String::as_str)
            .chain(options.filter.conditions().iter().map(Condition::column))
            .chain(options.order_by.iter().map(|o| o.column.as_str()));
        let validation = self.validate(table, columns);

        self.dispatch("select", table, validation, |store| async move {
            store.select(table, options).await
        })
        .await
    }

    /// Update the rows matching `filter`
    pub async fn update(
        &self,
        table: &str,
        patch: &Row,
        filter: &Filter,
        returning: &Returning,
    ) -> QueryResult {
        let projection = returning.projection().unwrap_or_default();
        let columns = patch
            .keys()
            .map(String::as_str)
            .chain(filter.conditions().iter().map(Condition::column))
            .chain(projection);
        let validation = self.validate(table, columns).and_then(|_| {
            if patch.is_empty() {
                Err(RouterError::InvalidQuery(
                    "update requires at least one column".to_string(),
                ))
            } else if filter.is_empty() {
                Err(RouterError::InvalidQuery(
                    "update requires at least one filter condition".to_string(),
                ))
            } else {
                Ok(())
            }
        });

        self.dispatch("update", table, validation, |store| async move {
            store.update(table, patch, filter, returning).await
        })
        .await
    }

    /// Delete the rows matching `filter`
    pub async fn delete(&self, table: &str, filter: &Filter) -> QueryResult {
        let validation = self
            .validate(table, filter.conditions().iter().map(Condition::column))
            .and_then(|_| {
                if filter.is_empty() {
                    Err(RouterError::InvalidQuery(
                        "delete requires at least one filter condition".to_string(),
                    ))
                } else {
                    Ok(())
                }
            });

        self.dispatch("delete", table, validation, |store| async move {
            store.delete(table, filter).await
        })
        .await
    }

    /// Run raw SQL on the relational store; never falls back
    pub async fn execute_sql(&self, sql: &str, params: &[Value]) -> QueryResult {
        let Some(store) = self.relational.clone() else {
            return QueryResult::failed(
                RouterError::BackendUnavailable("relational store is not configured".to_string()),
                None,
            );
        };
        if !self.is_connected(StoreKind::Relational) {
            return QueryResult::failed(
                RouterError::BackendUnavailable("relational store is disconnected".to_string()),
                None,
            );
        }

        let decision = RoutingDecision::RoutedTo {
            store: StoreKind::Relational,
        };
        let started = Utc::now();
        let start = Instant::now();
        let result = store.execute(sql, params).await;
        counter!(
            "supportpartner_router_queries_total",
            "store" => StoreKind::Relational.as_str(),
            "operation" => "execute_sql"
        )
        .increment(1);

        match result {
            Ok(output) => {
                debug!(
                    rows = output.count.unwrap_or(0),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Executed raw SQL"
                );
                self.mark_connected(StoreKind::Relational, started);
                QueryResult::ok(output, decision)
            }
            Err(e) => {
                error!("Raw SQL failed: {}", e);
                counter!(
                    "supportpartner_router_errors_total",
                    "store" => StoreKind::Relational.as_str()
                )
                .increment(1);
                if e.is_connection() {
                    self.mark_disconnected(StoreKind::Relational, &e.to_string());
                }
                QueryResult::failed(
                    RouterError::from_store(StoreKind::Relational, e),
                    Some(decision),
                )
            }
        }
    }

    /// Ping one store and record the outcome
    async fn check_store(&self, kind: StoreKind) -> bool {
        let Some(store) = self.store(kind).cloned() else {
            return false;
        };

        let outcome = store.ping().await;
        let now = Utc::now();
        let mut states = self.states.write();
        let Some(state) = states.get_mut(&kind) else {
            return false;
        };

        match outcome {
            Ok(()) => {
                if state.record_success(Some(now)) {
                    info!("{} store recovered", kind);
                }
                true
            }
            Err(e) => {
                if state.record_failure(&e.to_string(), now, true) {
                    warn!("{} store health check failed: {}", kind, e);
                } else {
                    debug!(
                        "{} store still unavailable: {} (failures: {})",
                        kind, e, state.consecutive_failures
                    );
                }
                false
            }
        }
    }

    /// Ping both stores and refresh their connection state
    pub async fn health_check(&self) -> HealthReport {
        let (hosted, relational) = tokio::join!(
            self.check_store(StoreKind::Hosted),
            self.check_store(StoreKind::Relational)
        );
        counter!("supportpartner_health_checks_total").increment(1);

        HealthReport {
            hosted,
            relational,
            routing: classification_map(),
            connections: self.connection_states(),
        }
    }

    /// The static classification map
    pub fn routing_table(&self) -> BTreeMap<&'static str, Sensitivity> {
        classification_map()
    }

    /// Release both stores' resources
    pub async fn close(&self) {
        if let Some(relational) = &self.relational {
            relational.close().await;
        }
        self.hosted.close().await;
        info!("Router closed");
    }
}

/// Spawn a background task that pings both stores on an interval
pub fn spawn_health_task(
    router: Arc<DataRouter>,
    interval_duration: Duration,
) -> tokio::task::JoinHandle<()> {
    use tokio::time::interval;

    info!(
        "Starting background store health task (interval: {}s)",
        interval_duration.as_secs()
    );

    tokio::spawn(async move {
        let mut ticker = interval(interval_duration);

        // Skip the first tick (which fires immediately)
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let report = router.health_check().await;
            debug!(
                hosted = report.hosted,
                relational = report.relational,
                "Scheduled store health check"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::ConnectionStatus;
    use partner_store::{MemoryStore, OrderBy};
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    struct Fixture {
        hosted: Arc<MemoryStore>,
        relational: Arc<MemoryStore>,
        router: DataRouter,
    }

    fn fixture(config: RouterConfig) -> Fixture {
        let hosted = Arc::new(MemoryStore::new(StoreKind::Hosted));
        let relational = Arc::new(MemoryStore::new(StoreKind::Relational));
        let router = DataRouter::new(
            hosted.clone(),
            Some(relational.clone() as Arc<dyn Store>),
            config,
        );
        Fixture {
            hosted,
            relational,
            router,
        }
    }

    fn hosted_only() -> (Arc<MemoryStore>, DataRouter) {
        let hosted = Arc::new(MemoryStore::new(StoreKind::Hosted));
        let router = DataRouter::new(hosted.clone(), None, RouterConfig::default());
        (hosted, router)
    }

    #[tokio::test]
    async fn test_sensitive_table_goes_to_relational() {
        let f = fixture(RouterConfig::default());

        let result = f
            .router
            .insert(
                "support_actions",
                &row(json!({"id": "a1", "user_id": "u1"})),
                &Returning::All,
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(
            result.decision,
            Some(RoutingDecision::RoutedTo {
                store: StoreKind::Relational
            })
        );
        assert_eq!(f.relational.rows("support_actions").len(), 1);
        assert_eq!(f.hosted.call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_phi_table_goes_to_hosted() {
        let f = fixture(RouterConfig::default());

        let result = f
            .router
            .insert(
                "user_profiles",
                &row(json!({"id": "u1", "email": "a@b.com"})),
                &Returning::All,
            )
            .await;
        assert_eq!(result.decision.map(|d| d.store()), Some(StoreKind::Hosted));

        let selected = f
            .router
            .select(
                "user_profiles",
                &SelectOptions::new().filter(Filter::new().eq("id", "u1")),
            )
            .await;
        assert_eq!(selected.data.len(), 1);
        assert_eq!(selected.data[0]["email"], json!("a@b.com"));
        assert_eq!(f.relational.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_table_defaults_to_hosted() {
        let f = fixture(RouterConfig::default());
        let result = f
            .router
            .select("feature_flags", &SelectOptions::new())
            .await;

        assert!(result.is_ok());
        assert_eq!(
            result.decision,
            Some(RoutingDecision::RoutedTo {
                store: StoreKind::Hosted
            })
        );
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_unknown_tables() {
        let f = fixture(RouterConfig {
            strict_tables: true,
            ..Default::default()
        });

        let result = f
            .router
            .select("feature_flags", &SelectOptions::new())
            .await;
        assert_eq!(
            result.error,
            Some(RouterError::UnknownTable("feature_flags".into()))
        );
        assert_eq!(result.decision, None);
        assert_eq!(f.hosted.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_when_not_configured() {
        let (hosted, router) = hosted_only();

        let result = router
            .insert(
                "mama_grace_conversations",
                &row(json!({"user_id": "u1", "question": "q", "response": "r"})),
                &Returning::All,
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(
            result.decision,
            Some(RoutingDecision::FallbackApplied {
                intended: StoreKind::Relational,
                actual: StoreKind::Hosted,
                reason: FallbackReason::NotConfigured,
            })
        );
        assert_eq!(hosted.rows("mama_grace_conversations").len(), 1);
    }

    #[tokio::test]
    async fn test_connection_failure_flips_state_and_falls_back() {
        let f = fixture(RouterConfig::default());
        f.relational.set_available(false);

        // First call fails on the relational store and marks it down
        let first = f
            .router
            .select("daily_checkins", &SelectOptions::new())
            .await;
        assert!(matches!(first.error, Some(RouterError::Query { .. })));
        assert!(!f.router.is_connected(StoreKind::Relational));

        // The next call falls back without touching the relational store
        let second = f
            .router
            .select("daily_checkins", &SelectOptions::new())
            .await;
        assert!(second.is_ok());
        assert_eq!(
            second.decision,
            Some(RoutingDecision::FallbackApplied {
                intended: StoreKind::Relational,
                actual: StoreKind::Hosted,
                reason: FallbackReason::Disconnected,
            })
        );
    }

    #[tokio::test]
    async fn test_fallback_rows_are_invisible_after_recovery() {
        let f = fixture(RouterConfig::default());
        f.router.mark_disconnected(StoreKind::Relational, "refused");

        f.router
            .insert(
                "support_actions",
                &row(json!({"id": "a1", "user_id": "u1"})),
                &Returning::Nothing,
            )
            .await;
        assert_eq!(f.hosted.rows("support_actions").len(), 1);

        // A health check rediscovers the relational store
        let report = f.router.health_check().await;
        assert!(report.relational);
        assert!(f.router.is_connected(StoreKind::Relational));

        // The row written during the outage stays on the hosted store
        let result = f
            .router
            .select(
                "support_actions",
                &SelectOptions::new().filter(Filter::new().eq("user_id", "u1")),
            )
            .await;
        assert!(result.is_ok());
        assert!(result.data.is_empty());
        assert_eq!(result.decision.map(|d| d.store()), Some(StoreKind::Relational));
    }

    #[tokio::test]
    async fn test_success_older_than_a_failure_does_not_recover() {
        let f = fixture(RouterConfig::default());

        let started = Utc::now() - chrono::Duration::seconds(1);
        f.router.mark_disconnected(StoreKind::Relational, "refused");
        f.router.mark_connected(StoreKind::Relational, started);
        assert!(!f.router.is_connected(StoreKind::Relational));

        // A call issued after the failure does recover the store
        let result = f
            .router
            .select("support_actions", &SelectOptions::new())
            .await;
        assert!(result.is_ok());
        assert_eq!(result.decision.map(|d| d.store()), Some(StoreKind::Hosted));
        f.router.mark_connected(StoreKind::Relational, Utc::now());
        assert!(f.router.is_connected(StoreKind::Relational));
    }

    #[tokio::test]
    async fn test_health_check_is_stable() {
        let f = fixture(RouterConfig::default());
        f.relational.set_available(false);

        let first = f.router.health_check().await;
        let second = f.router.health_check().await;

        assert!(first.hosted && second.hosted);
        assert!(!first.relational && !second.relational);
        assert_eq!(first.routing, second.routing);
        assert_eq!(first.routing.len(), 19);

        let relational = &second.connections[1];
        assert_eq!(relational.store, StoreKind::Relational);
        assert_eq!(relational.consecutive_failures, 2);
        assert!(matches!(
            relational.status,
            ConnectionStatus::Disconnected { .. }
        ));
    }

    #[tokio::test]
    async fn test_health_report_keys() {
        let (_, router) = hosted_only();
        let value = serde_json::to_value(router.health_check().await).unwrap();
        assert_eq!(value["supabase"], true);
        assert_eq!(value["aws"], false);
        assert_eq!(value["routing"]["support_actions"], "sensitive-partner");
        assert_eq!(value["connections"][1]["status"], "not_configured");
    }

    #[tokio::test]
    async fn test_execute_sql_requires_relational() {
        let (_, router) = hosted_only();
        let result = router.execute_sql("SELECT 1", &[]).await;
        assert!(matches!(
            result.error,
            Some(RouterError::BackendUnavailable(_))
        ));

        let f = fixture(RouterConfig::default());
        f.router.mark_disconnected(StoreKind::Relational, "refused");
        let result = f.router.execute_sql("SELECT 1", &[]).await;
        assert!(matches!(
            result.error,
            Some(RouterError::BackendUnavailable(_))
        ));
        assert_eq!(f.hosted.call_count(), 0);
    }

    #[tokio::test]
    async fn test_execute_sql_reaches_relational() {
        let f = fixture(RouterConfig::default());
        let result = f.router.execute_sql("SELECT 1", &[]).await;

        // The in-memory store has no SQL engine; the call still reached it
        assert!(matches!(
            result.error,
            Some(RouterError::Query {
                store: StoreKind::Relational,
                ..
            })
        ));
        assert!(f.router.is_connected(StoreKind::Relational));
    }

    #[tokio::test]
    async fn test_invalid_identifiers_never_reach_a_store() {
        let f = fixture(RouterConfig::default());

        let result = f
            .router
            .select("support_actions; DROP TABLE x", &SelectOptions::new())
            .await;
        assert!(matches!(result.error, Some(RouterError::InvalidQuery(_))));

        let result = f
            .router
            .select(
                "support_actions",
                &SelectOptions::new().order_by(OrderBy::desc("logged_at desc, 1")),
            )
            .await;
        assert!(matches!(result.error, Some(RouterError::InvalidQuery(_))));

        let result = f
            .router
            .insert("user_profiles", &row(json!({"bad key": 1})), &Returning::Nothing)
            .await;
        assert!(matches!(result.error, Some(RouterError::InvalidQuery(_))));

        assert_eq!(f.hosted.call_count(), 0);
        assert_eq!(f.relational.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unfiltered_writes_are_rejected() {
        let f = fixture(RouterConfig::default());

        let result = f
            .router
            .update(
                "ai_insights",
                &row(json!({"is_read": true})),
                &Filter::new(),
                &Returning::Nothing,
            )
            .await;
        assert!(matches!(result.error, Some(RouterError::InvalidQuery(_))));

        let result = f.router.delete("ai_insights", &Filter::new()).await;
        assert!(matches!(result.error, Some(RouterError::InvalidQuery(_))));
        assert_eq!(f.relational.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete_counts() {
        let f = fixture(RouterConfig::default());
        for id in ["i1", "i2"] {
            f.router
                .insert(
                    "ai_insights",
                    &row(json!({"id": id, "user_id": "u1", "is_read": false})),
                    &Returning::Nothing,
                )
                .await;
        }

        let updated = f
            .router
            .update(
                "ai_insights",
                &row(json!({"is_read": true})),
                &Filter::new().eq("id", "i1"),
                &Returning::Nothing,
            )
            .await;
        assert_eq!(updated.count, Some(1));
        assert!(updated.data.is_empty());

        let deleted = f
            .router
            .delete("ai_insights", &Filter::new().eq("user_id", "u1"))
            .await;
        assert_eq!(deleted.count, Some(2));
    }

    #[tokio::test]
    async fn test_health_check_recovers_disconnected_store() {
        let f = fixture(RouterConfig::default());
        f.relational.set_available(false);
        f.router.health_check().await;
        assert_eq!(
            f.router.decide("daily_checkins"),
            RoutingDecision::FallbackApplied {
                intended: StoreKind::Relational,
                actual: StoreKind::Hosted,
                reason: FallbackReason::Disconnected,
            }
        );

        f.relational.set_available(true);
        f.router.health_check().await;
        assert_eq!(
            f.router.decide("daily_checkins"),
            RoutingDecision::RoutedTo {
                store: StoreKind::Relational
            }
        );
    }

    #[tokio::test]
    async fn test_hosted_failure_is_captured() {
        let f = fixture(RouterConfig::default());
        f.hosted.set_available(false);

        let result = f
            .router
            .select("user_profiles", &SelectOptions::new())
            .await;
        assert!(result.data.is_empty());
        assert!(matches!(
            result.error,
            Some(RouterError::Query {
                store: StoreKind::Hosted,
                ..
            })
        ));
        // Non-sensitive tables never move, even with the hosted store down
        assert_eq!(
            f.router.decide("user_profiles"),
            RoutingDecision::RoutedTo {
                store: StoreKind::Hosted
            }
        );
    }

    #[tokio::test]
    async fn test_health_task_rechecks() {
        let f = fixture(RouterConfig::default());
        let router = Arc::new(f.router);
        f.relational.set_available(false);

        let handle = spawn_health_task(router.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!router.is_connected(StoreKind::Relational));
        handle.abort();
    }
}
