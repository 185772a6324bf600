use chrono::NaiveDateTime;
use uuid::Uuid;

pub struct SubscriptionUpsertRequest {
    pub id: String,
    pub user_id: Uuid,
    pub status: String,
    pub plan: String,
    pub current_period_end: Option<NaiveDateTime>,
    pub cancel_at_period_end: bool,
}
