use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
    jwt::JwtClaims,
    stripe,
};
use plans::PgSubscriptionFetcher;
use sqlx::PgPool;

use crate::{
    dtos::sub::{
        CheckoutRequest, CheckoutResponse, CurrentSubscriptionResponse, UpdateAutoRenewRequest,
    },
    services,
};

/// Returns the caller's subscription record (or `null`) together with the
/// entitlements it resolves to.
///
/// A missing or unreadable record is reported as the free tier, never as an
/// error.
#[get("/current")]
pub async fn get_current(
    claims: web::ReqData<JwtClaims>,
    fetcher: web::Data<PgSubscriptionFetcher>,
) -> Res<impl Responder> {
    let (subscription, entitlements) = fetcher.snapshot(claims.user_id()).await;
    Success::ok(CurrentSubscriptionResponse {
        subscription,
        entitlements,
    })
}

/// Returns only the resolved `(limits, is_pro, loading)` triple.
#[get("/limits")]
pub async fn get_limits(
    claims: web::ReqData<JwtClaims>,
    fetcher: web::Data<PgSubscriptionFetcher>,
) -> Res<impl Responder> {
    Success::ok(fetcher.entitlements(claims.user_id()).await)
}

/// Creates a Stripe checkout session for the Pro plan.
///
/// # Input
/// - `success_url`: where Stripe redirects after payment
/// - `cancel_url`: where Stripe redirects if the user backs out
///
/// # Output
/// - Success: `{ "url": "<checkout url>" }`
/// - Error: 409 Conflict while the caller still has a subscription the
///   provider may bill, `past_due` included
#[post("/checkout")]
pub async fn post_checkout(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<CheckoutRequest>,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
    fetcher: web::Data<PgSubscriptionFetcher>,
) -> Res<impl Responder> {
    let user_id = claims.user_id();
    let current = match fetcher.fetch(user_id).await {
        Ok(subscription) => Some(subscription),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };
    services::sub::ensure_checkout_allowed(current.as_ref())?;

    let client = stripe::create_client(&config.stripe.secret_key);
    let customer_id =
        services::sub::get_or_create_customer_id(&pool, &client, user_id, claims.email.as_deref())
            .await?;
    let session = services::sub::create_pro_checkout_session(
        &client,
        &customer_id,
        &config.stripe.pro_price_id,
        &req,
    )
    .await?;

    Success::created(CheckoutResponse {
        url: session.url.unwrap_or_default(),
    })
}

/// Turns auto-renewal of the caller's subscription on or off.
///
/// # Output
/// - Success: the subscription as the provider now reports it
/// - Error: 404 Not Found if the caller has no live subscription
#[post("/auto-renew")]
pub async fn post_auto_renew(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<UpdateAutoRenewRequest>,
    config: web::Data<Arc<Config>>,
    fetcher: web::Data<PgSubscriptionFetcher>,
) -> Res<impl Responder> {
    let subscription = fetcher.fetch(claims.user_id()).await?;
    if subscription.status.is_terminal() {
        return Err(AppError::NotFound(format!(
            "Subscription {} has already ended",
            subscription.id
        )));
    }

    let client = stripe::create_client(&config.stripe.secret_key);
    let updated =
        services::sub::update_subscription_auto_renew(&client, &subscription.id, req.auto_renew)
            .await?;

    Success::ok(updated)
}
