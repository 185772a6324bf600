use serde::Serialize;

use crate::{
    catalog::{PlanCatalog, PlanLimits},
    subscription::Subscription,
};

/// The `(limits, is_pro, loading)` triple handed to gating callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entitlements {
    pub limits: PlanLimits,
    pub is_pro: bool,
    /// The subscription is still being fetched; callers must not trust
    /// `limits`/`is_pro` yet.
    pub loading: bool,
}

impl Entitlements {
    /// Free tier, settled.
    pub fn free() -> Self {
        resolve(None, false)
    }

    /// Free tier while the subscription fetch is pending.
    pub fn pending() -> Self {
        resolve(None, true)
    }

    /// Limits and pro flag that gating should act on. While loading this is
    /// always the free tier.
    pub fn effective(&self) -> (&PlanLimits, bool) {
        if self.loading {
            (PlanCatalog::free(), false)
        } else {
            (&self.limits, self.is_pro)
        }
    }
}

/// Derives the active limits from a subscription. Pure: the same input
/// always yields the same output, and a missing subscription is the free
/// tier rather than an error.
pub fn resolve(subscription: Option<&Subscription>, still_loading: bool) -> Entitlements {
    let is_pro = subscription.is_some_and(Subscription::is_active_pro);
    let limits = if is_pro {
        *PlanCatalog::pro()
    } else {
        *PlanCatalog::free()
    };

    Entitlements {
        limits,
        is_pro,
        loading: still_loading,
    }
}
