use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
};
use sqlx::PgPool;

use crate::services;

/// Handles Stripe webhook events.
///
/// Called by Stripe, not by the web app. Subscription created/updated/deleted
/// events are written to the `subscriptions` table, which is the only place
/// the subscription record changes.
///
/// # Output
/// - Success: 200 OK once the event is processed
/// - Error: 400 Bad Request for a missing or invalid signature
#[post("/webhook")]
async fn post_webhook(
    payload: String,
    req: actix_web::HttpRequest,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let signature = match req.headers().get("stripe-signature") {
        Some(signature) => signature.to_str().unwrap_or(""),
        None => return Err(AppError::BadRequest("Stripe signature missing".to_string())),
    };

    let event =
        services::pay::construct_event(&payload, signature, &config.stripe.webhook_secret)?;
    services::pay::process_webhook_event(&pool, &config.stripe.pro_price_id, event).await?;

    Success::ok("Webhook processed successfully")
}
