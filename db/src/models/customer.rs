use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct BillingCustomer {
    pub user_id: Uuid,
    pub stripe_customer_id: String,
    pub created_at: NaiveDateTime,
}
