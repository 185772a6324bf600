//! Plan-gated feature access.
//!
//! A user's subscription record is resolved into exactly one set of
//! [`PlanLimits`](catalog::PlanLimits), and the gate functions decide whether
//! an action is allowed under those limits. Missing or unreadable
//! subscriptions always resolve to the free tier.

pub mod catalog;
pub mod fetcher;
pub mod gate;
pub mod resolver;
pub mod subscription;
pub mod watch;

pub use catalog::{PlanCatalog, PlanLimits, PlanTier, ProjectLimit};
pub use fetcher::{
    PgSubscriptionFetcher, PgSubscriptionSource, SubscriptionFetcher, SubscriptionSource,
};
pub use gate::{Feature, Gate, UpgradePrompt};
pub use resolver::{Entitlements, resolve};
pub use subscription::{Subscription, SubscriptionStatus};
pub use watch::EntitlementsWatch;
