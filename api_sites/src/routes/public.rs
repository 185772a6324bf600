use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{error::Res, http::Success};
use plans::PgSubscriptionFetcher;
use sqlx::PgPool;

use crate::services;

/// Public view of a researcher's site. 404 for unknown or unpublished sites.
#[get("/{username}")]
pub async fn get_public_site(
    path: web::Path<String>,
    pool: web::Data<Arc<PgPool>>,
    fetcher: web::Data<PgSubscriptionFetcher>,
) -> Res<impl Responder> {
    let site = services::public::get_public_site(&pool, &fetcher, &path).await?;
    Success::ok(site)
}
