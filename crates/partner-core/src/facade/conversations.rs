//! Mama Grace conversation history (sensitive)

use chrono::Utc;
use partner_store::{Filter, OrderBy, Returning, Row, SelectOptions};
use serde_json::Value;

use super::{SupportPartnerApi, stamped, timestamp};
use crate::result::QueryResult;

const TABLE: &str = "mama_grace_conversations";

impl SupportPartnerApi {
    pub async fn save_mama_grace_conversation(&self, conversation: Row) -> QueryResult {
        let row = stamped(
            conversation,
            [("created_at", Value::from(timestamp(Utc::now())))],
        );
        self.router.insert(TABLE, &row, &Returning::All).await
    }

    pub async fn get_mama_grace_conversations(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        limit: u64,
    ) -> QueryResult {
        let mut filter = Filter::new().eq("user_id", user_id);
        if let Some(session_id) = session_id {
            filter = filter.eq("session_id", session_id);
        }

        let options = SelectOptions::new()
            .filter(filter)
            .order_by(OrderBy::desc("created_at"))
            .limit(limit);
        self.router.select(TABLE, &options).await
    }

    /// Conversations grouped by session, most recently active first
    pub async fn get_conversation_sessions(&self, user_id: &str) -> QueryResult {
        let options = SelectOptions::new()
            .columns(["session_id", "created_at"])
            .filter(Filter::new().eq("user_id", user_id))
            .order_by(OrderBy::desc("created_at"));

        let mut result = self.router.select(TABLE, &options).await;
        if result.is_ok() {
            result.data = group_sessions(&result.data);
            result.count = Some(result.data.len() as u64);
        }
        result
    }
}

/// Group rows ordered newest first into `{session_id, count, last_message}`
///
/// Sessions keep the order in which they first appear, so the newest
/// message of each session becomes its `last_message`.
pub fn group_sessions(rows: &[Row]) -> Vec<Row> {
    let mut sessions: Vec<(Value, u64, Value)> = Vec::new();

    for row in rows {
        let session_id = row.get("session_id").cloned().unwrap_or(Value::Null);
        match sessions.iter_mut().find(|(id, _, _)| *id == session_id) {
            Some((_, count, _)) => *count += 1,
            None => {
                let created_at = row.get("created_at").cloned().unwrap_or(Value::Null);
                sessions.push((session_id, 1, created_at));
            }
        }
    }

    sessions
        .into_iter()
        .map(|(session_id, count, last_message)| {
            let mut session = Row::new();
            session.insert("session_id".to_string(), session_id);
            session.insert("count".to_string(), Value::from(count));
            session.insert("last_message".to_string(), last_message);
            session
        })
        .collect()
}
