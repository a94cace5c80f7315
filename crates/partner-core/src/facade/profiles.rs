//! User profiles (non-phi)

use chrono::Utc;
use partner_store::{Filter, Returning, Row, SelectOptions};
use serde_json::Value;

use super::{SupportPartnerApi, stamped, timestamp};
use crate::result::QueryResult;

const TABLE: &str = "user_profiles";

impl SupportPartnerApi {
    pub async fn create_user_profile(&self, profile: Row) -> QueryResult {
        let now = Value::from(timestamp(Utc::now()));
        let row = stamped(
            profile,
            [
                ("created_at", now.clone()),
                ("updated_at", now.clone()),
                ("last_active_at", now),
            ],
        );
        self.router.insert(TABLE, &row, &Returning::All).await
    }

    pub async fn get_user_profile(&self, user_id: &str) -> QueryResult {
        let options = SelectOptions::new().filter(Filter::new().eq("id", user_id));
        self.router.select(TABLE, &options).await
    }

    pub async fn update_user_profile(&self, user_id: &str, updates: Row) -> QueryResult {
        let now = Value::from(timestamp(Utc::now()));
        let patch = stamped(
            updates,
            [("updated_at", now.clone()), ("last_active_at", now)],
        );
        self.router
            .update(
                TABLE,
                &patch,
                &Filter::new().eq("id", user_id),
                &Returning::All,
            )
            .await
    }

    pub async fn update_last_active(&self, user_id: &str) -> QueryResult {
        let patch = stamped(
            Row::new(),
            [("last_active_at", Value::from(timestamp(Utc::now())))],
        );
        self.router
            .update(
                TABLE,
                &patch,
                &Filter::new().eq("id", user_id),
                &Returning::Nothing,
            )
            .await
    }
}
