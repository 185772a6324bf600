use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::site::SiteUpsertRequest, models::site::Site};

pub async fn get_site_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<Site>> {
    sqlx::query_as::<_, Site>("SELECT * FROM sites WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_site_by_username<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    username: &str,
) -> Res<Option<Site>> {
    sqlx::query_as::<_, Site>("SELECT * FROM sites WHERE username = $1")
        .bind(username)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn exists_username_for_other_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    username: &str,
    user_id: Uuid,
) -> Res<bool> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sites WHERE username = $1 AND user_id <> $2)",
    )
    .bind(username)
    .bind(user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn upsert_site<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: SiteUpsertRequest,
) -> Res<Site> {
    sqlx::query_as::<_, Site>(
        r#"
        INSERT INTO sites (user_id, username, display_name, bio, published)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE SET
            username = EXCLUDED.username,
            display_name = EXCLUDED.display_name,
            bio = EXCLUDED.bio,
            published = EXCLUDED.published,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(data.username)
    .bind(data.display_name)
    .bind(data.bio)
    .bind(data.published)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_site_theme<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    theme: &str,
) -> Res<Site> {
    sqlx::query_as::<_, Site>(
        "UPDATE sites SET theme = $1, updated_at = NOW() WHERE user_id = $2 RETURNING *",
    )
    .bind(theme)
    .bind(user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_site_layout<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    layout: &str,
) -> Res<Site> {
    sqlx::query_as::<_, Site>(
        "UPDATE sites SET layout = $1, updated_at = NOW() WHERE user_id = $2 RETURNING *",
    )
    .bind(layout)
    .bind(user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
