//! Partner connections (sensitive)

use chrono::Utc;
use partner_store::{Filter, OrderBy, Returning, Row, SelectOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::{SupportPartnerApi, stamped, timestamp};
use crate::error::RouterError;
use crate::result::QueryResult;

const TABLE: &str = "partner_connections";

const CODE_LENGTH: usize = 6;
const CODE_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Lifecycle of a partner connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerStatus {
    Pending,
    Active,
    Paused,
    Ended,
}

impl PartnerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerStatus::Pending => "pending",
            PartnerStatus::Active => "active",
            PartnerStatus::Paused => "paused",
            PartnerStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for PartnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartnerStatus {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PartnerStatus::Pending),
            "active" => Ok(PartnerStatus::Active),
            "paused" => Ok(PartnerStatus::Paused),
            "ended" => Ok(PartnerStatus::Ended),
            other => Err(RouterError::InvalidQuery(format!(
                "invalid partner connection status: {}",
                other
            ))),
        }
    }
}

/// Six upper-case base-36 characters from a random UUID
pub fn generate_connection_code() -> String {
    let mut n = uuid::Uuid::new_v4().as_u128();
    let mut code = String::with_capacity(CODE_LENGTH);
    for _ in 0..CODE_LENGTH {
        code.push(CODE_ALPHABET[(n % 36) as usize] as char);
        n /= 36;
    }
    code
}

impl SupportPartnerApi {
    /// Create a pending connection with a fresh connection code
    pub async fn create_partner_connection(&self, connection: Row) -> QueryResult {
        let now = Value::from(timestamp(Utc::now()));
        let row = stamped(
            connection,
            [
                ("connection_code", Value::from(generate_connection_code())),
                ("status", Value::from(PartnerStatus::Pending.as_str())),
                ("created_at", now.clone()),
                ("updated_at", now),
            ],
        );
        self.router.insert(TABLE, &row, &Returning::All).await
    }

    /// Whether `supporter_id` has an active connection with `partner_id`
    pub async fn has_active_connection(
        &self,
        supporter_id: &str,
        partner_id: &str,
    ) -> Result<bool, RouterError> {
        let options = SelectOptions::new()
            .columns(["id"])
            .filter(
                Filter::new()
                    .eq("supporter_id", supporter_id)
                    .eq("partner_id", partner_id)
                    .eq("status", PartnerStatus::Active.as_str()),
            )
            .limit(1);
        let rows = self.router.select(TABLE, &options).await.into_result()?;
        Ok(!rows.is_empty())
    }

    pub async fn get_user_partner_connections(&self, user_id: &str) -> QueryResult {
        let options = SelectOptions::new()
            .filter(Filter::new().eq("supporter_id", user_id))
            .order_by(OrderBy::desc("created_at"));
        self.router.select(TABLE, &options).await
    }

    /// Change the status of one of `supporter_id`'s connections
    pub async fn update_partner_connection_status(
        &self,
        supporter_id: &str,
        connection_id: &str,
        status: PartnerStatus,
    ) -> QueryResult {
        let now = Value::from(timestamp(Utc::now()));
        let mut patch = stamped(
            Row::new(),
            [
                ("status", Value::from(status.as_str())),
                ("updated_at", now.clone()),
            ],
        );
        if status == PartnerStatus::Active {
            patch.insert("connected_at".to_string(), now);
        }

        self.router
            .update(
                TABLE,
                &patch,
                &Filter::new()
                    .eq("id", connection_id)
                    .eq("supporter_id", supporter_id),
                &Returning::All,
            )
            .await
    }
}
