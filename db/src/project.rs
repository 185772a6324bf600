use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::project::ProjectCreateRequest, models::project::Project};

pub async fn get_projects_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Vec<Project>> {
    sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn count_projects_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_project<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: ProjectCreateRequest,
) -> Res<Project> {
    sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (user_id, title, summary, url, has_page, page_content)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(data.title)
    .bind(data.summary)
    .bind(data.url)
    .bind(data.has_page)
    .bind(data.page_content)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Deletes a project owned by `user_id`. Returns whether a row was removed.
pub async fn delete_project<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    project_id: Uuid,
) -> Res<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
        .bind(project_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Serializes project creation per user for the rest of the transaction.
pub async fn lock_projects_of_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(user_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}
