//! Subscriptions and usage tracking (non-phi)

use chrono::{Duration, Utc};
use partner_store::{Filter, OrderBy, Returning, Row, SelectOptions};
use serde_json::{Value, json};

use super::{SupportPartnerApi, stamped, timestamp};
use crate::result::QueryResult;

const SUBSCRIPTIONS: &str = "user_subscriptions";
const USAGE: &str = "usage_tracking";

impl SupportPartnerApi {
    pub async fn create_subscription(&self, subscription: Row) -> QueryResult {
        let now = Value::from(timestamp(Utc::now()));
        let row = stamped(
            subscription,
            [("created_at", now.clone()), ("updated_at", now)],
        );
        self.router.insert(SUBSCRIPTIONS, &row, &Returning::All).await
    }

    /// Most recent active subscription
    pub async fn get_user_subscription(&self, user_id: &str) -> QueryResult {
        let options = SelectOptions::new()
            .filter(
                Filter::new()
                    .eq("user_id", user_id)
                    .eq("status", "active"),
            )
            .order_by(OrderBy::desc("created_at"))
            .limit(1);
        self.router.select(SUBSCRIPTIONS, &options).await
    }

    pub async fn update_subscription(&self, subscription_id: &str, updates: Row) -> QueryResult {
        let patch = stamped(
            updates,
            [("updated_at", Value::from(timestamp(Utc::now())))],
        );
        self.router
            .update(
                SUBSCRIPTIONS,
                &patch,
                &Filter::new().eq("id", subscription_id),
                &Returning::All,
            )
            .await
    }

    /// Record feature usage for the current UTC day
    pub async fn track_usage(&self, user_id: &str, feature: &str, count: i64) -> QueryResult {
        let now = Utc::now();
        let period_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|start| start.and_utc())
            .unwrap_or(now);
        let period_end = period_start + Duration::hours(24);

        let row = stamped(
            Row::new(),
            [
                ("user_id", Value::from(user_id)),
                ("feature_name", Value::from(feature)),
                ("usage_count", Value::from(count)),
                ("period_start", Value::from(timestamp(period_start))),
                ("period_end", Value::from(timestamp(period_end))),
                ("metadata", json!({})),
                ("created_at", Value::from(timestamp(now))),
            ],
        );
        self.router.insert(USAGE, &row, &Returning::Nothing).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    #[tokio::test]
    async fn test_latest_active_subscription() {
        let h = harness();
        for (id, status, created) in [
            ("s1", "active", "2024-01-01T00:00:00.000Z"),
            ("s2", "canceled", "2024-03-01T00:00:00.000Z"),
            ("s3", "active", "2024-02-01T00:00:00.000Z"),
        ] {
            h.api
                .create_subscription(row(json!({"id": id, "user_id": "u1", "status": status})))
                .await;
            // Overwrite the stamp so ordering is deterministic
            h.api
                .router()
                .update(
                    "user_subscriptions",
                    &row(json!({"created_at": created})),
                    &partner_store::Filter::new().eq("id", id),
                    &partner_store::Returning::Nothing,
                )
                .await;
        }

        let result = h.api.get_user_subscription("u1").await;
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0]["id"], json!("s3"));
    }

    #[tokio::test]
    async fn test_update_subscription_stamps() {
        let h = harness();
        h.api
            .create_subscription(row(json!({"id": "s1", "user_id": "u1", "status": "trialing"})))
            .await;

        let result = h
            .api
            .update_subscription("s1", row(json!({"status": "active", "updated_at": "x"})))
            .await;
        assert_eq!(result.data[0]["status"], json!("active"));
        assert_ne!(result.data[0]["updated_at"], json!("x"));
    }

    #[tokio::test]
    async fn test_track_usage_covers_current_day() {
        let h = harness();
        let result = h.api.track_usage("u1", "mama_grace_daily", 1).await;
        assert!(result.is_ok());

        let rows = h.hosted.rows("usage_tracking");
        assert_eq!(rows.len(), 1);
        let usage = &rows[0];
        assert_eq!(usage["feature_name"], json!("mama_grace_daily"));
        assert_eq!(usage["usage_count"], json!(1));
        assert_eq!(usage["metadata"], json!({}));

        let start: DateTime<Utc> = usage["period_start"].as_str().unwrap().parse().unwrap();
        let end: DateTime<Utc> = usage["period_end"].as_str().unwrap().parse().unwrap();
        assert_eq!(start.date_naive(), Utc::now().date_naive());
        assert_eq!(start.format("%H:%M:%S").to_string(), "00:00:00");
        assert_eq!((end - start).num_hours(), 24);
    }
}
