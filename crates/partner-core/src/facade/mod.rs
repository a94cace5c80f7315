//! Domain facade
//!
//! Named operations over the router. Each one targets a fixed table,
//! merges caller-supplied fields first and then stamps its own fields
//! (timestamps, defaults), so stamped values always win.

use chrono::{DateTime, SecondsFormat, Utc};
use partner_store::Row;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::classification::Sensitivity;
use crate::router::{DataRouter, HealthReport};

mod connections;
mod conversations;
mod insights;
mod profiles;
mod subscriptions;
mod support;

pub use connections::{PartnerStatus, generate_connection_code};
pub use conversations::group_sessions;
pub use support::{DEFAULT_CHECKIN_DAYS, DEFAULT_HISTORY_LIMIT, today};

/// Version reported by health endpoints
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Combined health of the service
#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub database: HealthReport,
    pub timestamp: String,
    pub version: &'static str,
}

/// Domain operations for the SupportPartner app
#[derive(Clone)]
pub struct SupportPartnerApi {
    router: Arc<DataRouter>,
}

impl SupportPartnerApi {
    pub fn new(router: Arc<DataRouter>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Arc<DataRouter> {
        &self.router
    }

    /// Health-check both stores
    pub async fn health_check(&self) -> SystemHealth {
        SystemHealth {
            database: self.router.health_check().await,
            timestamp: timestamp(Utc::now()),
            version: VERSION,
        }
    }

    /// The static table classification
    pub fn routing_info(&self) -> BTreeMap<&'static str, Sensitivity> {
        self.router.routing_table()
    }
}

/// RFC 3339 UTC with millisecond precision
pub(crate) fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Caller fields overlaid with stamped fields
pub(crate) fn stamped<const N: usize>(mut fields: Row, stamps: [(&str, Value); N]) -> Row {
    for (column, value) in stamps {
        fields.insert(column.to_string(), value);
    }
    fields
}
