use common::error::{AppError, Res};
use db::dtos::subscription::SubscriptionUpsertRequest;
use plans::PlanTier;
use sqlx::PgPool;
use stripe::{Event, EventObject, EventType, Expandable, Webhook};
use uuid::Uuid;

/// Creates an event for the webhook based on the request payload and signature.
/// Requires a webhook secret key.
pub fn construct_event(payload: &str, signature: &str, webhook_secret: &str) -> Res<Event> {
    match Webhook::construct_event(payload, signature, webhook_secret) {
        Ok(event) => Ok(event),
        Err(e) => {
            log::error!("Error constructing webhook event: {}", e);
            Err(AppError::BadRequest(format!("Webhook Error: {}", e)))
        }
    }
}

/// Processes the webhook event. Subscription lifecycle events are mirrored
/// into the `subscriptions` table; everything else is acknowledged.
pub async fn process_webhook_event(pool: &PgPool, pro_price_id: &str, event: Event) -> Res<()> {
    log::info!("Processing webhook event: {}", event.type_);

    match event.type_ {
        EventType::CustomerSubscriptionCreated
        | EventType::CustomerSubscriptionUpdated
        | EventType::CustomerSubscriptionDeleted => {
            if let EventObject::Subscription(subscription) = event.data.object {
                sync_subscription(pool, pro_price_id, &subscription).await?;
            }
        }
        EventType::CheckoutSessionCompleted => {
            if let EventObject::CheckoutSession(session) = event.data.object {
                log::info!("Checkout session completed: {}", session.id);
            }
        }
        _ => {
            log::info!("Unhandled event type: {}", event.type_);
        }
    }

    Ok(())
}

async fn sync_subscription(
    pool: &PgPool,
    pro_price_id: &str,
    subscription: &stripe::Subscription,
) -> Res<()> {
    let customer_id = match &subscription.customer {
        Expandable::Id(id) => id.to_string(),
        Expandable::Object(customer) => customer.id.to_string(),
    };

    let Some(user_id) = owner_of(pool, &customer_id, subscription).await? else {
        log::warn!(
            "Subscription {} belongs to unknown customer {}, ignoring",
            subscription.id,
            customer_id
        );
        return Ok(());
    };

    let price_ids: Vec<String> = subscription
        .items
        .data
        .iter()
        .filter_map(|item| item.price.as_ref().map(|price| price.id.to_string()))
        .collect();
    let plan = plan_for_prices(price_ids.iter().map(String::as_str), pro_price_id);

    let stored = db::subscription::upsert_subscription(
        pool,
        SubscriptionUpsertRequest {
            id: subscription.id.to_string(),
            user_id,
            status: subscription.status.to_string(),
            plan: plan.as_str().to_string(),
            current_period_end: chrono::DateTime::from_timestamp(
                subscription.current_period_end,
                0,
            )
            .map(|end| end.naive_utc()),
            cancel_at_period_end: subscription.cancel_at_period_end,
        },
    )
    .await?;

    match stored {
        Some(row) => log::info!(
            "Subscription {} for user {} is now {} ({})",
            row.id,
            row.user_id,
            row.status,
            row.plan
        ),
        None => log::warn!(
            "Ignoring {} subscription {} for user {}: another subscription is active",
            subscription.status,
            subscription.id,
            user_id
        ),
    }
    Ok(())
}

/// Resolves the user a subscription belongs to: the stored customer mapping
/// first, then the `user_id` metadata on the subscription.
async fn owner_of(
    pool: &PgPool,
    customer_id: &str,
    subscription: &stripe::Subscription,
) -> Res<Option<Uuid>> {
    if let Some(customer) = db::customer::get_customer_by_stripe_id(pool, customer_id).await? {
        return Ok(Some(customer.user_id));
    }
    Ok(subscription
        .metadata
        .get("user_id")
        .and_then(|id| Uuid::parse_str(id).ok()))
}

/// A subscription grants pro when any of its items is on the pro price.
pub(crate) fn plan_for_prices<'a>(
    price_ids: impl IntoIterator<Item = &'a str>,
    pro_price_id: &str,
) -> PlanTier {
    if !pro_price_id.is_empty() && price_ids.into_iter().any(|id| id == pro_price_id) {
        PlanTier::Pro
    } else {
        PlanTier::Free
    }
}
