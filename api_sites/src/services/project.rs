use common::error::{AppError, Res};
use db::{dtos::project::ProjectCreateRequest, models::project::Project};
use plans::{Entitlements, Gate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::{gated::Gated, project::CreateProjectRequest};

pub async fn get_projects(pool: &PgPool, user_id: Uuid) -> Res<Vec<Project>> {
    db::project::get_projects_by_user_id(pool, user_id).await
}

/// Creates a project if the plan allows another one (and a project page,
/// when one is requested). Nothing is inserted when a gate refuses.
pub async fn create_project(
    pool: &PgPool,
    user_id: Uuid,
    entitlements: &Entitlements,
    req: CreateProjectRequest,
) -> Res<Gated<Project>> {
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::BadRequest("Project title is required".to_string()));
    }

    if req.has_page {
        if let Err(refused) = Gated::check(Gate::project_page(entitlements)) {
            return Ok(refused);
        }
    }

    let mut tx = pool.begin().await?;
    db::project::lock_projects_of_user(&mut *tx, user_id).await?;

    let count = db::project::count_projects_by_user_id(&mut *tx, user_id).await?;
    let count = u64::try_from(count).unwrap_or(0);
    if let Err(refused) = Gated::check(Gate::add_project(count, entitlements)) {
        log::debug!(
            "User {} refused project #{}: plan limit reached",
            user_id,
            count + 1
        );
        return Ok(refused);
    }

    let project = db::project::insert_project(
        &mut *tx,
        ProjectCreateRequest {
            user_id,
            title,
            summary: req.summary,
            url: req.url,
            has_page: req.has_page,
            page_content: if req.has_page { req.page_content } else { None },
        },
    )
    .await?;
    tx.commit().await?;

    Ok(Gated::Done(project))
}

pub async fn delete_project(pool: &PgPool, user_id: Uuid, project_id: Uuid) -> Res<()> {
    if db::project::delete_project(pool, user_id, project_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Project {} not found", project_id)))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{body, http::StatusCode};
    use plans::Feature;

    use super::*;

    fn request(has_page: bool) -> CreateProjectRequest {
        CreateProjectRequest {
            title: "Graph minors".to_string(),
            summary: String::new(),
            url: None,
            has_page,
            page_content: has_page.then(|| "# Results".to_string()),
        }
    }

    // refusals happen before the pool is touched, so no server is needed
    fn unconnected_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/scholarsite").unwrap()
    }

    #[tokio::test]
    async fn project_page_on_free_tier_is_refused() {
        let gated = create_project(
            &unconnected_pool(),
            Uuid::new_v4(),
            &Entitlements::free(),
            request(true),
        )
        .await
        .unwrap();

        match gated {
            Gated::UpgradeRequired(prompt) => assert_eq!(prompt.feature, Feature::ProjectPages),
            Gated::Done(_) => panic!("free tier must not get a project page"),
        }
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let mut req = request(false);
        req.title = "   ".to_string();
        let err = create_project(&unconnected_pool(), Uuid::new_v4(), &Entitlements::free(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[sqlx::test(migrations = "../db/migrations")]
    #[ignore = "Requires a Postgres server at DATABASE_URL"]
    async fn second_free_project_is_refused_without_insert(pool: PgPool) {
        let user_id = Uuid::new_v4();
        let free = Entitlements::free();

        let first = create_project(&pool, user_id, &free, request(false)).await.unwrap();
        assert!(matches!(first, Gated::Done(_)));

        let second = create_project(&pool, user_id, &free, request(false)).await.unwrap();
        let res = second.into_response(StatusCode::CREATED);
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let bytes = body::to_bytes(res.into_body()).await.unwrap();
        let prompt: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(prompt["feature"], "projects");
        assert_eq!(prompt["upgrade_required"], true);

        let count = db::project::count_projects_by_user_id(&pool, user_id).await.unwrap();
        assert_eq!(count, 1);
    }
}
