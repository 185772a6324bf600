use std::sync::Arc;

use actix_web::{HttpResponse, Responder, get, http::StatusCode, put, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use plans::PgSubscriptionFetcher;
use sqlx::PgPool;

use crate::{
    dtos::site::{UpdateLayoutRequest, UpdateSiteRequest, UpdateThemeRequest},
    services,
};

#[get("")]
pub async fn get_site(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let site = services::site::get_site(&pool, claims.user_id()).await?;
    Success::ok(site)
}

/// Saves profile fields. The username is slugged; 409 if another user has it.
#[put("")]
pub async fn put_site(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<UpdateSiteRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let site = services::site::save_site(&pool, claims.user_id(), req.into_inner()).await?;
    Success::ok(site)
}

/// Selects a theme. Unknown ids are 400; themes outside the plan are 403
/// with an upgrade prompt.
#[put("/theme")]
pub async fn put_theme(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<UpdateThemeRequest>,
    pool: web::Data<Arc<PgPool>>,
    fetcher: web::Data<PgSubscriptionFetcher>,
) -> Res<HttpResponse> {
    let user_id = claims.user_id();
    let entitlements = fetcher.entitlements(user_id).await;
    let outcome = services::site::set_theme(&pool, user_id, &req.theme, &entitlements).await?;
    Ok(outcome.into_response(StatusCode::OK))
}

/// Selects a layout. Same rules as the theme.
#[put("/layout")]
pub async fn put_layout(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<UpdateLayoutRequest>,
    pool: web::Data<Arc<PgPool>>,
    fetcher: web::Data<PgSubscriptionFetcher>,
) -> Res<HttpResponse> {
    let user_id = claims.user_id();
    let entitlements = fetcher.entitlements(user_id).await;
    let outcome = services::site::set_layout(&pool, user_id, &req.layout, &entitlements).await?;
    Ok(outcome.into_response(StatusCode::OK))
}
