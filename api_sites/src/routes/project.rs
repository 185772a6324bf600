use std::sync::Arc;

use actix_web::{HttpResponse, Responder, delete, get, http::StatusCode, post, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use plans::PgSubscriptionFetcher;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{dtos::project::CreateProjectRequest, services};

/// Lists the caller's projects, oldest first.
#[get("")]
pub async fn get_projects(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let projects = services::project::get_projects(&pool, claims.user_id()).await?;
    Success::ok(projects)
}

/// Creates a project.
///
/// # Output
/// - Success: 201 with the created project
/// - 403 with an upgrade prompt when the plan's project limit is reached,
///   or when `has_page` is requested on a plan without project pages
#[post("")]
pub async fn post_project(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<CreateProjectRequest>,
    pool: web::Data<Arc<PgPool>>,
    fetcher: web::Data<PgSubscriptionFetcher>,
) -> Res<HttpResponse> {
    let user_id = claims.user_id();
    let entitlements = fetcher.entitlements(user_id).await;
    let outcome =
        services::project::create_project(&pool, user_id, &entitlements, req.into_inner()).await?;
    Ok(outcome.into_response(StatusCode::CREATED))
}

#[delete("/{project_id}")]
pub async fn delete_project(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    services::project::delete_project(&pool, claims.user_id(), path.into_inner()).await?;
    Success::no_content()
}
