use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::{sync::watch, task::JoinHandle};
use uuid::Uuid;

use crate::{
    fetcher::{SubscriptionFetcher, SubscriptionSource},
    resolver::Entitlements,
};

/// Keeps an [`Entitlements`] value current for one owner.
///
/// The value starts out pending (free tier, `loading = true`). Changing the
/// user or calling [`refresh`](Self::refresh) starts a new fetch; results of
/// older fetches are discarded, and dropping the watch aborts the fetch in
/// flight so nothing is published for a disposed owner.
///
/// Meant for long-lived clients embedding this crate, such as a dashboard
/// session that re-renders pickers as the value changes. The HTTP service
/// resolves per request through [`SubscriptionFetcher`] instead.
pub struct EntitlementsWatch<S: SubscriptionSource + 'static> {
    fetcher: Arc<SubscriptionFetcher<S>>,
    tx: Arc<watch::Sender<Entitlements>>,
    generation: Arc<AtomicU64>,
    user_id: Option<Uuid>,
    started: bool,
    in_flight: Option<JoinHandle<()>>,
}

impl<S: SubscriptionSource + 'static> EntitlementsWatch<S> {
    pub fn new(fetcher: Arc<SubscriptionFetcher<S>>) -> Self {
        let (tx, _) = watch::channel(Entitlements::pending());
        Self {
            fetcher,
            tx: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            user_id: None,
            started: false,
            in_flight: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Entitlements> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Entitlements {
        *self.tx.borrow()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Switches the owner to another user (login/logout). No-op when the
    /// user is unchanged.
    pub fn set_user(&mut self, user_id: Option<Uuid>) {
        if self.started && self.user_id == user_id {
            return;
        }
        self.user_id = user_id;
        self.start_fetch();
    }

    /// Re-fetches for the current user, e.g. after an upgrade or cancel.
    pub fn refresh(&mut self) {
        self.start_fetch();
    }

    fn start_fetch(&mut self) {
        self.started = true;
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }

        let next = match self.user_id {
            Some(_) => Entitlements::pending(),
            None => Entitlements::free(),
        };
        let mut generation = 0;
        self.tx.send_modify(|current| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *current = next;
        });

        let Some(user_id) = self.user_id else {
            return;
        };

        let fetcher = Arc::clone(&self.fetcher);
        let tx = Arc::clone(&self.tx);
        let latest = Arc::clone(&self.generation);
        self.in_flight = Some(tokio::spawn(async move {
            let entitlements = fetcher.entitlements(user_id).await;
            let published = tx.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *current = entitlements;
                true
            });
            if !published {
                log::debug!("Discarding stale entitlements for user {}", user_id);
            }
        }));
    }
}

impl<S: SubscriptionSource + 'static> Drop for EntitlementsWatch<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.tx.send_if_modified(|_| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use common::error::{AppError, Res};
    use tokio::sync::Notify;

    use super::*;
    use crate::{
        catalog::{PlanCatalog, PlanTier},
        subscription::{Subscription, SubscriptionStatus},
    };

    /// Answers from a fixed table; users listed in `held` wait for `release`.
    struct Held {
        rows: HashMap<Uuid, Subscription>,
        held: Vec<Uuid>,
        release: Arc<Notify>,
    }

    impl SubscriptionSource for Held {
        async fn find_by_user(&self, user_id: Uuid) -> Res<Option<Subscription>> {
            if self.held.contains(&user_id) {
                self.release.notified().await;
            }
            Ok(self.rows.get(&user_id).cloned())
        }
    }

    struct Failing;

    impl SubscriptionSource for Failing {
        async fn find_by_user(&self, _user_id: Uuid) -> Res<Option<Subscription>> {
            Err(AppError::Internal("timeout".to_string()))
        }
    }

    fn sub(user_id: Uuid, plan: PlanTier, status: SubscriptionStatus) -> Subscription {
        Subscription {
            id: format!("sub_{}", user_id.simple()),
            user_id,
            status,
            plan,
            current_period_end: None,
            cancel_at_period_end: false,
        }
    }

    fn held(
        rows: Vec<Subscription>,
        held: Vec<Uuid>,
    ) -> (Arc<SubscriptionFetcher<Held>>, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        let source = Held {
            rows: rows.into_iter().map(|s| (s.user_id, s)).collect(),
            held,
            release: Arc::clone(&release),
        };
        (Arc::new(SubscriptionFetcher::new(source)), release)
    }

    #[tokio::test]
    async fn starts_pending_and_settles_on_fetch() {
        let user = Uuid::new_v4();
        let (fetcher, _) = held(vec![sub(user, PlanTier::Pro, SubscriptionStatus::Active)], vec![]);
        let mut watch = EntitlementsWatch::new(fetcher);
        assert_eq!(watch.current(), Entitlements::pending());

        let mut rx = watch.subscribe();
        watch.set_user(Some(user));
        let settled = *rx.wait_for(|e| !e.loading).await.unwrap();
        assert!(settled.is_pro);
        assert_eq!(settled.limits, *PlanCatalog::pro());
    }

    #[tokio::test]
    async fn no_user_is_settled_free_without_fetch() {
        let (fetcher, _) = held(vec![], vec![]);
        let mut watch = EntitlementsWatch::new(fetcher);
        watch.set_user(None);
        assert_eq!(watch.current(), Entitlements::free());
    }

    #[tokio::test]
    async fn failed_fetch_settles_on_free() {
        let mut watch = EntitlementsWatch::new(Arc::new(SubscriptionFetcher::new(Failing)));
        let mut rx = watch.subscribe();
        watch.set_user(Some(Uuid::new_v4()));
        let settled = *rx.wait_for(|e| !e.loading).await.unwrap();
        assert_eq!(settled, Entitlements::free());
    }

    #[tokio::test]
    async fn switching_user_discards_previous_fetch() {
        let slow = Uuid::new_v4();
        let fast = Uuid::new_v4();
        let (fetcher, release) = held(
            vec![
                sub(slow, PlanTier::Pro, SubscriptionStatus::Active),
                sub(fast, PlanTier::Pro, SubscriptionStatus::PastDue),
            ],
            vec![slow],
        );
        let mut watch = EntitlementsWatch::new(fetcher);
        let mut rx = watch.subscribe();

        watch.set_user(Some(slow));
        tokio::task::yield_now().await;
        watch.set_user(Some(fast));
        let settled = *rx.wait_for(|e| !e.loading).await.unwrap();
        assert!(!settled.is_pro);

        release.notify_waiters();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(watch.current(), settled);
        assert_eq!(watch.user_id(), Some(fast));
    }

    #[tokio::test]
    async fn dropped_watch_publishes_nothing() {
        let user = Uuid::new_v4();
        let (fetcher, release) = held(
            vec![sub(user, PlanTier::Pro, SubscriptionStatus::Active)],
            vec![user],
        );
        let mut watch = EntitlementsWatch::new(fetcher);
        let rx = watch.subscribe();

        watch.set_user(Some(user));
        tokio::task::yield_now().await;
        drop(watch);

        release.notify_waiters();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.borrow().loading);
        assert!(!rx.borrow().is_pro);
    }

    #[tokio::test]
    async fn same_user_does_not_refetch_but_refresh_does() {
        let user = Uuid::new_v4();
        let (fetcher, _) =
            held(vec![sub(user, PlanTier::Free, SubscriptionStatus::Active)], vec![]);
        let mut watch = EntitlementsWatch::new(fetcher);
        let mut rx = watch.subscribe();

        watch.set_user(Some(user));
        rx.wait_for(|e| !e.loading).await.unwrap();

        watch.set_user(Some(user));
        assert!(!rx.has_changed().unwrap());

        watch.refresh();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().loading);
        let settled = *rx.wait_for(|e| !e.loading).await.unwrap();
        assert!(!settled.is_pro);
    }
}
