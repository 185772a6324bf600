use common::error::{AppError, Res};
use db::{dtos::site::SiteUpsertRequest, models::site::Site};
use plans::{Entitlements, Gate, PlanCatalog};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::{gated::Gated, site::UpdateSiteRequest},
    misc::slug,
};

pub async fn get_site(pool: &PgPool, user_id: Uuid) -> Res<Site> {
    db::site::get_site_by_user_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Site has not been set up yet".to_string()))
}

/// Creates or updates the profile part of the caller's site.
pub async fn save_site(pool: &PgPool, user_id: Uuid, req: UpdateSiteRequest) -> Res<Site> {
    let username = slug::username_from(&req.username)?;
    if db::site::exists_username_for_other_user(pool, &username, user_id).await? {
        return Err(AppError::Conflict(format!(
            "Username '{}' is already taken",
            username
        )));
    }

    let res = db::site::upsert_site(
        pool,
        SiteUpsertRequest {
            user_id,
            username: username.clone(),
            display_name: req.display_name.trim().to_string(),
            bio: req.bio,
            published: req.published,
        },
    )
    .await;

    match res {
        // lost a race with another user claiming the same name
        Err(AppError::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => Err(
            AppError::Conflict(format!("Username '{}' is already taken", username)),
        ),
        other => other,
    }
}

pub async fn set_theme(
    pool: &PgPool,
    user_id: Uuid,
    theme: &str,
    entitlements: &Entitlements,
) -> Res<Gated<Site>> {
    if !PlanCatalog::is_known_theme(theme) {
        return Err(AppError::BadRequest(format!("Unknown theme '{}'", theme)));
    }
    if let Err(refused) = Gated::check(Gate::theme(theme, entitlements)) {
        return Ok(refused);
    }
    let site = db::site::update_site_theme(pool, user_id, theme).await?;
    Ok(Gated::Done(site))
}

pub async fn set_layout(
    pool: &PgPool,
    user_id: Uuid,
    layout: &str,
    entitlements: &Entitlements,
) -> Res<Gated<Site>> {
    if !PlanCatalog::is_known_layout(layout) {
        return Err(AppError::BadRequest(format!("Unknown layout '{}'", layout)));
    }
    if let Err(refused) = Gated::check(Gate::layout(layout, entitlements)) {
        return Ok(refused);
    }
    let site = db::site::update_site_layout(pool, user_id, layout).await?;
    Ok(Gated::Done(site))
}
