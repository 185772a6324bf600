use chrono::{DateTime, Utc};
use plans::{Entitlements, Subscription};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentSubscriptionResponse {
    pub subscription: Option<Subscription>,
    pub entitlements: Entitlements,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateAutoRenewRequest {
    pub auto_renew: bool,
}

#[derive(Debug, Serialize)]
pub struct AutoRenewResponse {
    pub subscription_id: String,
    pub status: String,
    pub cancel_at_period_end: bool,
    pub current_period_end: Option<DateTime<Utc>>,
}
