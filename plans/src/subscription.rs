use chrono::{DateTime, Utc};
use db::models::subscription::SubscriptionRow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::PlanTier;

/// Payment provider status of a subscription. Only `Active` grants paid
/// features; unrecognised values are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Unpaid,
    Incomplete,
    IncompleteExpired,
    Paused,
    Other(String),
}

impl SubscriptionStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "past_due" => SubscriptionStatus::PastDue,
            "canceled" => SubscriptionStatus::Canceled,
            "unpaid" => SubscriptionStatus::Unpaid,
            "incomplete" => SubscriptionStatus::Incomplete,
            "incomplete_expired" => SubscriptionStatus::IncompleteExpired,
            "paused" => SubscriptionStatus::Paused,
            other => SubscriptionStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Other(other) => other,
        }
    }

    pub fn is_active(&self) -> bool {
        *self == SubscriptionStatus::Active
    }

    /// The provider will never bill or reactivate a subscription in this
    /// state, so a new one may be started alongside it.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Canceled | SubscriptionStatus::IncompleteExpired
        )
    }
}

impl From<String> for SubscriptionStatus {
    fn from(value: String) -> Self {
        SubscriptionStatus::parse(&value)
    }
}

impl From<SubscriptionStatus> for String {
    fn from(value: SubscriptionStatus) -> Self {
        value.as_str().to_string()
    }
}

/// A user's subscription as written by the payment webhook. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user_id: Uuid,
    pub status: SubscriptionStatus,
    pub plan: PlanTier,
    /// Display only.
    pub current_period_end: Option<DateTime<Utc>>,
    /// Display only.
    pub cancel_at_period_end: bool,
}

impl Subscription {
    /// `plan == pro` and `status == active`. Any other status, including
    /// `past_due`, is treated as the free tier.
    pub fn is_active_pro(&self) -> bool {
        self.plan == PlanTier::Pro && self.status.is_active()
    }
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            user_id: row.user_id,
            status: SubscriptionStatus::parse(&row.status),
            plan: PlanTier::from_stored(&row.plan),
            current_period_end: row.current_period_end.map(|end| end.and_utc()),
            cancel_at_period_end: row.cancel_at_period_end.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn row(status: &str, plan: &str) -> SubscriptionRow {
        let ts = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        SubscriptionRow {
            id: "sub_123".to_string(),
            user_id: Uuid::new_v4(),
            status: status.to_string(),
            plan: plan.to_string(),
            current_period_end: Some(ts),
            cancel_at_period_end: None,
            updated_at: ts,
        }
    }

    #[test]
    fn row_conversion_defaults_missing_and_unknown_fields() {
        let sub = Subscription::from(row("active", "platinum"));
        assert_eq!(sub.plan, PlanTier::Free);
        assert!(!sub.cancel_at_period_end);
        assert_eq!(
            sub.current_period_end.map(|t| t.timestamp()),
            Some(1_740_830_400)
        );
    }

    #[test]
    fn unknown_status_is_kept_but_never_active() {
        let sub = Subscription::from(row("on_hold", "pro"));
        assert_eq!(sub.status, SubscriptionStatus::Other("on_hold".to_string()));
        assert_eq!(sub.status.as_str(), "on_hold");
        assert!(!sub.is_active_pro());
    }

    #[test]
    fn past_due_pro_is_not_active_pro() {
        assert!(!Subscription::from(row("past_due", "pro")).is_active_pro());
        assert!(Subscription::from(row("active", "pro")).is_active_pro());
    }

    #[test]
    fn only_ended_statuses_are_terminal() {
        assert!(SubscriptionStatus::Canceled.is_terminal());
        assert!(SubscriptionStatus::IncompleteExpired.is_terminal());
        for status in ["active", "trialing", "past_due", "unpaid", "incomplete", "paused"] {
            assert!(!SubscriptionStatus::parse(status).is_terminal(), "{}", status);
        }
        assert!(!SubscriptionStatus::Other("on_hold".to_string()).is_terminal());
    }

    #[test]
    fn status_serializes_as_provider_string() {
        let json = serde_json::to_value(SubscriptionStatus::PastDue).unwrap();
        assert_eq!(json, serde_json::json!("past_due"));
        let parsed: SubscriptionStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(parsed, SubscriptionStatus::Active);
    }
}
