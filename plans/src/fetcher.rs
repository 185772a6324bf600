use std::{future::Future, sync::Arc};

use common::error::{AppError, Res};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    resolver::{Entitlements, resolve},
    subscription::Subscription,
};

/// Backend lookup of at most one subscription per user.
pub trait SubscriptionSource: Send + Sync {
    fn find_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Res<Option<Subscription>>> + Send;
}

/// Reads the `subscriptions` table.
#[derive(Clone)]
pub struct PgSubscriptionSource {
    pool: Arc<PgPool>,
}

impl PgSubscriptionSource {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl SubscriptionSource for PgSubscriptionSource {
    async fn find_by_user(&self, user_id: Uuid) -> Res<Option<Subscription>> {
        let row = db::subscription::get_subscription_by_user_id(&*self.pool, user_id).await?;
        Ok(row.map(Subscription::from))
    }
}

/// Fetcher over the `subscriptions` table.
pub type PgSubscriptionFetcher = SubscriptionFetcher<PgSubscriptionSource>;

pub struct SubscriptionFetcher<S> {
    source: S,
}

impl<S: SubscriptionSource> SubscriptionFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetches the user's subscription; a missing record is `NotFound`.
    pub async fn fetch(&self, user_id: Uuid) -> Res<Subscription> {
        self.source
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No subscription for user {}", user_id)))
    }

    /// Fetches and resolves in one step. Failures never reach the caller:
    /// they settle on the free tier.
    pub async fn snapshot(&self, user_id: Uuid) -> (Option<Subscription>, Entitlements) {
        match self.fetch(user_id).await {
            Ok(subscription) => {
                let entitlements = resolve(Some(&subscription), false);
                (Some(subscription), entitlements)
            }
            Err(err) if err.is_not_found() => {
                log::debug!("User {} has no subscription, using free tier", user_id);
                (None, Entitlements::free())
            }
            Err(err) => {
                log::warn!(
                    "Subscription lookup failed for user {}, using free tier: {}",
                    user_id,
                    err
                );
                (None, Entitlements::free())
            }
        }
    }

    pub async fn entitlements(&self, user_id: Uuid) -> Entitlements {
        self.snapshot(user_id).await.1
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{
        catalog::{PlanCatalog, PlanTier},
        subscription::SubscriptionStatus,
    };

    enum Stub {
        Rows(HashMap<Uuid, Subscription>),
        Broken,
    }

    impl SubscriptionSource for Stub {
        async fn find_by_user(&self, user_id: Uuid) -> Res<Option<Subscription>> {
            match self {
                Stub::Rows(rows) => Ok(rows.get(&user_id).cloned()),
                Stub::Broken => Err(AppError::Internal("connection reset".to_string())),
            }
        }
    }

    fn pro_sub(user_id: Uuid) -> Subscription {
        Subscription {
            id: "sub_pro".to_string(),
            user_id,
            status: SubscriptionStatus::Active,
            plan: PlanTier::Pro,
            current_period_end: None,
            cancel_at_period_end: false,
        }
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let fetcher = SubscriptionFetcher::new(Stub::Rows(HashMap::new()));
        let err = fetcher.fetch(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_record_resolves_to_settled_free() {
        let fetcher = SubscriptionFetcher::new(Stub::Rows(HashMap::new()));
        let (sub, ent) = fetcher.snapshot(Uuid::new_v4()).await;
        assert!(sub.is_none());
        assert_eq!(ent, Entitlements::free());
        assert!(!ent.loading);
    }

    #[tokio::test]
    async fn backend_failure_resolves_to_settled_free() {
        let fetcher = SubscriptionFetcher::new(Stub::Broken);
        let ent = fetcher.entitlements(Uuid::new_v4()).await;
        assert_eq!(ent, Entitlements::free());
    }

    #[tokio::test]
    async fn active_pro_record_resolves_to_pro() {
        let user = Uuid::new_v4();
        let fetcher = SubscriptionFetcher::new(Stub::Rows(HashMap::from([(user, pro_sub(user))])));
        let (sub, ent) = fetcher.snapshot(user).await;
        assert_eq!(sub.map(|s| s.id), Some("sub_pro".to_string()));
        assert!(ent.is_pro);
        assert_eq!(ent.limits, *PlanCatalog::pro());
    }
}
