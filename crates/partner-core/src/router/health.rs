//! Store connection state

use chrono::{DateTime, Utc};
use partner_store::StoreKind;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::classification::Sensitivity;

/// Connection status of one store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionStatus {
    NotConfigured,
    Connected,
    Disconnected {
        reason: String,
        since: DateTime<Utc>,
    },
}

/// Connection state tracked per store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionState {
    pub store: StoreKind,
    #[serde(flatten)]
    pub status: ConnectionStatus,
    pub last_check: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    /// When the latest connection-level failure was recorded
    #[serde(skip)]
    pub last_failure: Option<DateTime<Utc>>,
}

impl ConnectionState {
    /// State for a configured store, assumed connected until proven otherwise
    pub fn configured(store: StoreKind) -> Self {
        Self {
            store,
            status: ConnectionStatus::Connected,
            last_check: None,
            consecutive_failures: 0,
            last_failure: None,
        }
    }

    pub fn not_configured(store: StoreKind) -> Self {
        Self {
            store,
            status: ConnectionStatus::NotConfigured,
            last_check: None,
            consecutive_failures: 0,
            last_failure: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn is_configured(&self) -> bool {
        self.status != ConnectionStatus::NotConfigured
    }

    /// Record a successful health check; returns true when this recovers
    /// a disconnected store
    pub fn record_success(&mut self, now: Option<DateTime<Utc>>) -> bool {
        if !self.is_configured() {
            return false;
        }

        let recovered = matches!(self.status, ConnectionStatus::Disconnected { .. });
        self.status = ConnectionStatus::Connected;
        self.consecutive_failures = 0;
        if now.is_some() {
            self.last_check = now;
        }
        recovered
    }

    /// Record a successful call that began at `started`
    ///
    /// A failure recorded after the call began is newer evidence than the
    /// call's success, so the state is left alone.
    pub fn record_call_success(&mut self, started: DateTime<Utc>) -> bool {
        if self.last_failure.is_some_and(|at| at >= started) {
            return false;
        }
        self.record_success(None)
    }

    /// Record a connection-level failure; returns true when this is the
    /// transition from connected to disconnected
    pub fn record_failure(&mut self, reason: &str, now: DateTime<Utc>, scheduled: bool) -> bool {
        if !self.is_configured() {
            return false;
        }

        self.consecutive_failures += 1;
        self.last_failure = Some(now);
        if scheduled {
            self.last_check = Some(now);
        }

        if let ConnectionStatus::Disconnected { reason: current, .. } = &mut self.status {
            *current = reason.to_string();
            return false;
        }

        self.status = ConnectionStatus::Disconnected {
            reason: reason.to_string(),
            since: now,
        };
        true
    }
}

/// Result of probing both stores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    #[serde(rename = "supabase")]
    pub hosted: bool,
    #[serde(rename = "aws")]
    pub relational: bool,
    pub routing: BTreeMap<&'static str, Sensitivity>,
    pub connections: Vec<ConnectionState>,
}
