//! Routing decisions

use partner_store::StoreKind;
use serde::Serialize;

/// Why a sensitive table went to the hosted store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No relational store is configured
    NotConfigured,
    /// The relational store is configured but currently unreachable
    Disconnected,
}

/// Outcome of routing one call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoutingDecision {
    /// Routed to the store the table's class calls for
    RoutedTo { store: StoreKind },
    /// Routed elsewhere because the intended store was unavailable
    FallbackApplied {
        intended: StoreKind,
        actual: StoreKind,
        reason: FallbackReason,
    },
}

impl RoutingDecision {
    /// Store the call actually went to
    pub fn store(&self) -> StoreKind {
        match self {
            RoutingDecision::RoutedTo { store } => *store,
            RoutingDecision::FallbackApplied { actual, .. } => *actual,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RoutingDecision::FallbackApplied { .. })
    }
}
