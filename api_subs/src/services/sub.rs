use common::{
    error::{AppError, Res},
    stripe::{create_customer, parse_customer_id},
};
use plans::Subscription;
use sqlx::PgPool;
use stripe::{CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession};
use uuid::Uuid;

use crate::dtos::sub::{AutoRenewResponse, CheckoutRequest};

/// Returns the user's Stripe customer id, creating the customer on first use.
pub async fn get_or_create_customer_id(
    pool: &PgPool,
    client: &Client,
    user_id: Uuid,
    email: Option<&str>,
) -> Res<String> {
    if let Some(customer) = db::customer::get_customer_by_user_id(pool, user_id).await? {
        return Ok(customer.stripe_customer_id);
    }

    let customer = create_customer(client, user_id, email).await?;
    let customer_id = customer.id.to_string();
    if let Some(stored) = db::customer::insert_customer(pool, user_id, &customer_id).await? {
        log::info!(
            "Created Stripe customer {} for user {}",
            stored.stripe_customer_id,
            user_id
        );
        return Ok(stored.stripe_customer_id);
    }

    // a concurrent checkout stored its customer first
    log::warn!(
        "Stripe customer {} for user {} lost the race and stays unused",
        customer_id,
        user_id
    );
    db::customer::get_customer_by_user_id(pool, user_id)
        .await?
        .map(|stored| stored.stripe_customer_id)
        .ok_or_else(|| AppError::Internal(format!("Customer mapping for {} vanished", user_id)))
}

/// A second subscription on the same customer would leave two records
/// racing for the user's row, so checkout waits until the current one ends.
pub fn ensure_checkout_allowed(current: Option<&Subscription>) -> Res<()> {
    match current {
        Some(subscription) if !subscription.status.is_terminal() => {
            Err(AppError::Conflict(format!(
                "Subscription {} is still {}",
                subscription.id,
                subscription.status.as_str()
            )))
        }
        _ => Ok(()),
    }
}

/// Creates a checkout session for the pro price.
pub async fn create_pro_checkout_session(
    client: &Client,
    customer_id: &str,
    pro_price_id: &str,
    req: &CheckoutRequest,
) -> Res<CheckoutSession> {
    if pro_price_id.is_empty() {
        return Err(AppError::Internal(
            "STRIPE_PRO_PRICE_ID is not configured".to_string(),
        ));
    }

    let params = CreateCheckoutSession {
        line_items: Some(vec![stripe::CreateCheckoutSessionLineItems {
            price: Some(pro_price_id.to_string()),
            quantity: Some(1),
            ..Default::default()
        }]),
        mode: Some(CheckoutSessionMode::Subscription),
        success_url: Some(req.success_url.as_str()),
        cancel_url: Some(req.cancel_url.as_str()),
        customer: Some(parse_customer_id(customer_id)?),
        ..Default::default()
    };
    CheckoutSession::create(client, params)
        .await
        .map_err(AppError::from)
}

/// Update if the given subscription should be renewed.
/// The stored record follows once the provider sends the update webhook.
pub async fn update_subscription_auto_renew(
    client: &Client,
    subscription_id: &str,
    auto_renew: bool,
) -> Res<AutoRenewResponse> {
    let sub_id = subscription_id
        .parse::<stripe::SubscriptionId>()
        .map_err(|e| AppError::BadRequest(format!("Invalid subscription ID: {}", e)))?;

    // set cancel_at_period_end to the opposite of auto_renew (Stripe terminology)
    let subscription = stripe::Subscription::update(
        client,
        &sub_id,
        stripe::UpdateSubscription {
            cancel_at_period_end: Some(!auto_renew),
            ..Default::default()
        },
    )
    .await
    .map_err(AppError::from)?;

    Ok(AutoRenewResponse {
        subscription_id: subscription.id.to_string(),
        status: subscription.status.to_string(),
        cancel_at_period_end: subscription.cancel_at_period_end,
        current_period_end: chrono::DateTime::from_timestamp(subscription.current_period_end, 0),
    })
}

#[cfg(test)]
mod tests {
    use plans::{PlanTier, SubscriptionStatus};

    use super::*;

    fn subscription(status: &str) -> Subscription {
        Subscription {
            id: "sub_old".to_string(),
            user_id: Uuid::new_v4(),
            status: SubscriptionStatus::parse(status),
            plan: PlanTier::Pro,
            current_period_end: None,
            cancel_at_period_end: false,
        }
    }

    #[test]
    fn first_checkout_is_allowed() {
        assert!(ensure_checkout_allowed(None).is_ok());
    }

    #[test]
    fn past_due_subscription_blocks_a_second_checkout() {
        let err = ensure_checkout_allowed(Some(&subscription("past_due"))).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(ensure_checkout_allowed(Some(&subscription("active"))).is_err());
        assert!(ensure_checkout_allowed(Some(&subscription("unpaid"))).is_err());
    }

    #[test]
    fn ended_subscription_allows_checkout_again() {
        assert!(ensure_checkout_allowed(Some(&subscription("canceled"))).is_ok());
        assert!(ensure_checkout_allowed(Some(&subscription("incomplete_expired"))).is_ok());
    }
}
