//! Table classification
//!
//! Every logical table is either general-purpose (`non-phi`) or holds
//! sensitive relationship data (`sensitive-partner`). The map is static;
//! tables it does not name are treated as `non-phi`.

use partner_store::StoreKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Data sensitivity class of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sensitivity {
    NonPhi,
    SensitivePartner,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::NonPhi => "non-phi",
            Sensitivity::SensitivePartner => "sensitive-partner",
        }
    }

    /// Store this class belongs on when everything is up
    pub fn intended_store(&self) -> StoreKind {
        match self {
            Sensitivity::NonPhi => StoreKind::Hosted,
            Sensitivity::SensitivePartner => StoreKind::Relational,
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CLASSIFICATION: &[(&str, Sensitivity)] = &[
    // User management and app registry
    ("user_profiles", Sensitivity::NonPhi),
    ("app_registrations", Sensitivity::NonPhi),
    ("user_sessions", Sensitivity::NonPhi),
    // Billing
    ("subscription_plans", Sensitivity::NonPhi),
    ("user_subscriptions", Sensitivity::NonPhi),
    ("usage_tracking", Sensitivity::NonPhi),
    // Notifications
    ("notification_preferences", Sensitivity::NonPhi),
    ("scheduled_notifications", Sensitivity::NonPhi),
    ("emergency_contacts", Sensitivity::NonPhi),
    // Relationship data
    ("partner_connections", Sensitivity::SensitivePartner),
    ("ecosystem_sync", Sensitivity::SensitivePartner),
    ("support_actions", Sensitivity::SensitivePartner),
    ("progress_metrics", Sensitivity::SensitivePartner),
    ("daily_checkins", Sensitivity::SensitivePartner),
    ("mama_grace_conversations", Sensitivity::SensitivePartner),
    ("ai_insights", Sensitivity::SensitivePartner),
    ("crisis_situations", Sensitivity::SensitivePartner),
    ("audit_logs", Sensitivity::SensitivePartner),
    ("security_events", Sensitivity::SensitivePartner),
];

fn lookup(table: &str) -> Option<Sensitivity> {
    CLASSIFICATION
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, sensitivity)| *sensitivity)
}

/// Sensitivity of `table`, `non-phi` when unknown
pub fn classify(table: &str) -> Sensitivity {
    lookup(table).unwrap_or(Sensitivity::NonPhi)
}

/// Whether `table` is named in the classification map
pub fn is_classified(table: &str) -> bool {
    lookup(table).is_some()
}

/// The full classification map, ordered by table name
pub fn classification_map() -> BTreeMap<&'static str, Sensitivity> {
    CLASSIFICATION.iter().copied().collect()
}
