use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

/// Raw `subscriptions` row. Converted into a typed subscription before use.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SubscriptionRow {
    pub id: String,
    pub user_id: Uuid,
    pub status: String,
    pub plan: String,
    pub current_period_end: Option<NaiveDateTime>,
    pub cancel_at_period_end: Option<bool>,
    pub updated_at: NaiveDateTime,
}
