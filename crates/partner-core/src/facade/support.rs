//! Support actions and daily check-ins (sensitive)

use chrono::Utc;
use partner_store::{Filter, OrderBy, Returning, Row, SelectOptions};
use serde_json::Value;
use tracing::debug;

use super::{SupportPartnerApi, stamped, timestamp};
use crate::result::QueryResult;

const ACTIONS: &str = "support_actions";
const CHECKINS: &str = "daily_checkins";

/// Default page size for history listings
pub const DEFAULT_HISTORY_LIMIT: u64 = 50;
/// Default number of check-in days returned
pub const DEFAULT_CHECKIN_DAYS: u64 = 30;

/// Today's date in UTC, `YYYY-MM-DD`
pub fn today() -> String {
    Utc::now().date_naive().to_string()
}

impl SupportPartnerApi {
    pub async fn log_support_action(&self, action: Row) -> QueryResult {
        let now = Value::from(timestamp(Utc::now()));
        let row = stamped(action, [("logged_at", now.clone()), ("created_at", now)]);
        self.router.insert(ACTIONS, &row, &Returning::All).await
    }

    pub async fn get_user_support_actions(&self, user_id: &str, limit: u64) -> QueryResult {
        let options = SelectOptions::new()
            .filter(Filter::new().eq("user_id", user_id))
            .order_by(OrderBy::desc("logged_at"))
            .limit(limit);
        self.router.select(ACTIONS, &options).await
    }

    /// Actions logged for `partner_id`
    ///
    /// Visible to the partner and to supporters with an active connection;
    /// anyone else gets an empty list.
    pub async fn get_partner_support_actions(
        &self,
        viewer_id: &str,
        partner_id: &str,
        limit: u64,
    ) -> QueryResult {
        if viewer_id != partner_id {
            match self.has_active_connection(viewer_id, partner_id).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("{} has no active connection with {}", viewer_id, partner_id);
                    return QueryResult::empty();
                }
                Err(e) => return QueryResult::failed(e, None),
            }
        }

        let options = SelectOptions::new()
            .filter(Filter::new().eq("partner_id", partner_id))
            .order_by(OrderBy::desc("logged_at"))
            .limit(limit);
        self.router.select(ACTIONS, &options).await
    }

    pub async fn create_daily_checkin(&self, checkin: Row) -> QueryResult {
        let row = stamped(
            checkin,
            [("created_at", Value::from(timestamp(Utc::now())))],
        );
        self.router.insert(CHECKINS, &row, &Returning::All).await
    }

    /// Latest check-ins, one per day at most `days` rows
    pub async fn get_user_daily_checkins(&self, user_id: &str, days: u64) -> QueryResult {
        let options = SelectOptions::new()
            .filter(Filter::new().eq("user_id", user_id))
            .order_by(OrderBy::desc("checkin_date"))
            .limit(days);
        self.router.select(CHECKINS, &options).await
    }

    pub async fn get_today_checkin(&self, user_id: &str) -> QueryResult {
        let options = SelectOptions::new().filter(
            Filter::new()
                .eq("user_id", user_id)
                .eq("checkin_date", today()),
        );
        self.router.select(CHECKINS, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use partner_store::{Store, StoreKind};
    use serde_json::json;

    #[tokio::test]
    async fn test_support_actions_land_on_relational() {
        let h = harness();
        let result = h
            .api
            .log_support_action(row(json!({
                "user_id": "u1",
                "partner_id": "p1",
                "action_type": "emotional",
                "description": "Listened",
                "logged_at": "caller value"
            })))
            .await;

        assert!(result.is_ok());
        assert_eq!(result.decision.map(|d| d.store()), Some(StoreKind::Relational));
        let stored = &h.relational.rows("support_actions")[0];
        assert_ne!(stored["logged_at"], json!("caller value"));
        assert_eq!(stored["logged_at"], stored["created_at"]);
        assert!(h.hosted.rows("support_actions").is_empty());
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_limited() {
        let h = harness();
        for (i, logged_at) in ["2024-01-01", "2024-01-03", "2024-01-02"].iter().enumerate() {
            h.api
                .router()
                .insert(
                    "support_actions",
                    &row(json!({"id": i, "user_id": "u1", "partner_id": "p1", "logged_at": logged_at})),
                    &Returning::Nothing,
                )
                .await;
        }

        let result = h.api.get_user_support_actions("u1", 2).await;
        let dates: Vec<_> = result.data.iter().map(|r| r["logged_at"].clone()).collect();
        assert_eq!(dates, vec![json!("2024-01-03"), json!("2024-01-02")]);

        let result = h
            .api
            .get_partner_support_actions("p1", "p1", DEFAULT_HISTORY_LIMIT)
            .await;
        assert_eq!(result.data.len(), 3);
    }

    #[tokio::test]
    async fn test_partner_history_needs_an_active_connection() {
        let h = harness();
        h.api
            .log_support_action(row(json!({"user_id": "u1", "partner_id": "p1"})))
            .await;

        let stranger = h
            .api
            .get_partner_support_actions("u2", "p1", DEFAULT_HISTORY_LIMIT)
            .await;
        assert!(stranger.is_ok());
        assert!(stranger.data.is_empty());
        assert!(stranger.decision.is_none());

        h.relational
            .insert(
                "partner_connections",
                &row(json!({"id": "c1", "supporter_id": "u2", "partner_id": "p1", "status": "active"})),
                &Returning::Nothing,
            )
            .await
            .unwrap();
        let supporter = h
            .api
            .get_partner_support_actions("u2", "p1", DEFAULT_HISTORY_LIMIT)
            .await;
        assert_eq!(supporter.data.len(), 1);
    }

    #[tokio::test]
    async fn test_today_checkin() {
        let h = harness();
        h.api
            .create_daily_checkin(row(json!({"user_id": "u1", "checkin_date": "2000-01-01"})))
            .await;
        assert!(h.api.get_today_checkin("u1").await.data.is_empty());

        h.api
            .create_daily_checkin(row(json!({"user_id": "u1", "checkin_date": today(), "notes": "ok"})))
            .await;
        let result = h.api.get_today_checkin("u1").await;
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0]["notes"], json!("ok"));

        let all = h.api.get_user_daily_checkins("u1", DEFAULT_CHECKIN_DAYS).await;
        assert_eq!(all.data.len(), 2);
        assert_eq!(all.data[0]["checkin_date"], json!(today()));
    }
}
