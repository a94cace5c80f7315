//! AI insights and crisis situations (sensitive)

use chrono::{Duration, Utc};
use partner_store::{Filter, OrderBy, Returning, Row, SelectOptions};
use serde_json::Value;

use super::{SupportPartnerApi, stamped, timestamp};
use crate::result::QueryResult;

const INSIGHTS: &str = "ai_insights";
const CRISES: &str = "crisis_situations";

const INSIGHT_PAGE: u64 = 50;

impl SupportPartnerApi {
    pub async fn create_ai_insight(&self, insight: Row) -> QueryResult {
        let row = stamped(
            insight,
            [
                ("is_read", Value::Bool(false)),
                ("created_at", Value::from(timestamp(Utc::now()))),
            ],
        );
        self.router.insert(INSIGHTS, &row, &Returning::All).await
    }

    pub async fn get_user_insights(&self, user_id: &str, unread_only: bool) -> QueryResult {
        let mut filter = Filter::new().eq("user_id", user_id);
        if unread_only {
            filter = filter.eq("is_read", false);
        }

        let options = SelectOptions::new()
            .filter(filter)
            .order_by(OrderBy::desc("created_at"))
            .limit(INSIGHT_PAGE);
        self.router.select(INSIGHTS, &options).await
    }

    /// Mark one of `user_id`'s insights as read
    pub async fn mark_insight_as_read(&self, user_id: &str, insight_id: &str) -> QueryResult {
        let patch = stamped(Row::new(), [("is_read", Value::Bool(true))]);
        self.router
            .update(
                INSIGHTS,
                &patch,
                &Filter::new().eq("id", insight_id).eq("user_id", user_id),
                &Returning::Nothing,
            )
            .await
    }

    /// Open a crisis with a follow-up due in 24 hours
    pub async fn create_crisis_situation(&self, crisis: Row) -> QueryResult {
        let now = Utc::now();
        let row = stamped(
            crisis,
            [
                ("follow_up_required", Value::Bool(true)),
                ("follow_up_at", Value::from(timestamp(now + Duration::hours(24)))),
                ("created_at", Value::from(timestamp(now))),
            ],
        );
        self.router.insert(CRISES, &row, &Returning::All).await
    }

    /// Unresolved crises, newest first
    pub async fn get_active_crisis_situations(&self, user_id: &str) -> QueryResult {
        let options = SelectOptions::new()
            .filter(Filter::new().eq("user_id", user_id).is_null("resolved_at"))
            .order_by(OrderBy::desc("created_at"));
        self.router.select(CRISES, &options).await
    }

    /// Resolve one of `user_id`'s crises
    pub async fn resolve_crisis_situation(
        &self,
        user_id: &str,
        crisis_id: &str,
        notes: &str,
    ) -> QueryResult {
        let patch = stamped(
            Row::new(),
            [
                ("resolution_notes", Value::from(notes)),
                ("resolved_at", Value::from(timestamp(Utc::now()))),
                ("follow_up_required", Value::Bool(false)),
            ],
        );
        self.router
            .update(
                CRISES,
                &patch,
                &Filter::new().eq("id", crisis_id).eq("user_id", user_id),
                &Returning::All,
            )
            .await
    }
}
