use common::error::{AppError, Res};
use db::models::{project::Project, site::Site};
use plans::{Entitlements, PgSubscriptionFetcher, gate};
use sqlx::PgPool;

use crate::{
    dtos::{project::PublicProject, site::PublicSiteResponse},
    misc::slug,
};

/// Loads a published site for anonymous visitors. Appearance and project
/// pages follow the owner's current plan, so a lapsed subscription falls
/// back to the free defaults without touching stored choices.
pub async fn get_public_site(
    pool: &PgPool,
    fetcher: &PgSubscriptionFetcher,
    username: &str,
) -> Res<PublicSiteResponse> {
    let username = slug::slugify(username);
    let site = db::site::get_site_by_username(pool, &username)
        .await?
        .filter(|site| site.published)
        .ok_or_else(|| AppError::NotFound(format!("No site at '{}'", username)))?;

    let entitlements = fetcher.entitlements(site.user_id).await;
    let projects = db::project::get_projects_by_user_id(pool, site.user_id).await?;

    Ok(render_site(site, projects, &entitlements))
}

fn render_site(
    site: Site,
    projects: Vec<Project>,
    entitlements: &Entitlements,
) -> PublicSiteResponse {
    let pages_allowed = gate::can_have_project_pages(&entitlements.limits);

    PublicSiteResponse {
        theme: gate::effective_theme(&site.theme, entitlements).to_string(),
        layout: gate::effective_layout(&site.layout, entitlements).to_string(),
        username: site.username,
        display_name: site.display_name,
        bio: site.bio,
        projects: projects
            .into_iter()
            .map(|project| PublicProject::from_project(project, pages_allowed))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use plans::{
        PgSubscriptionSource, PlanTier, Subscription, SubscriptionFetcher, SubscriptionStatus,
        resolve,
    };
    use uuid::Uuid;

    use super::*;

    fn now() -> chrono::NaiveDateTime {
        chrono::Utc::now().naive_utc()
    }

    fn site(user_id: Uuid) -> Site {
        Site {
            user_id,
            username: "ada-lovelace".to_string(),
            display_name: "Ada Lovelace".to_string(),
            bio: String::new(),
            theme: "ocean".to_string(),
            layout: "academic".to_string(),
            published: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn project(user_id: Uuid) -> Project {
        Project {
            id: Uuid::new_v4(),
            user_id,
            title: "Analytical engine".to_string(),
            summary: String::new(),
            url: None,
            has_page: true,
            page_content: Some("Notes".to_string()),
            created_at: now(),
        }
    }

    fn owner_on(user_id: Uuid, status: &str) -> Entitlements {
        let subscription = Subscription {
            id: "sub_1".to_string(),
            user_id,
            status: SubscriptionStatus::parse(status),
            plan: PlanTier::Pro,
            current_period_end: None,
            cancel_at_period_end: false,
        };
        resolve(Some(&subscription), false)
    }

    #[test]
    fn lapsed_owner_gets_free_appearance_and_no_pages() {
        let user_id = Uuid::new_v4();
        let rendered = render_site(
            site(user_id),
            vec![project(user_id)],
            &owner_on(user_id, "past_due"),
        );

        assert_eq!(rendered.theme, "light");
        assert_eq!(rendered.layout, "classic");
        assert!(!rendered.projects[0].has_page);
        assert!(rendered.projects[0].page_content.is_none());
    }

    #[test]
    fn paying_owner_keeps_stored_choices() {
        let user_id = Uuid::new_v4();
        let rendered = render_site(
            site(user_id),
            vec![project(user_id)],
            &owner_on(user_id, "active"),
        );

        assert_eq!(rendered.theme, "ocean");
        assert_eq!(rendered.layout, "academic");
        assert!(rendered.projects[0].has_page);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    #[ignore = "Requires a Postgres server at DATABASE_URL"]
    async fn public_site_of_lapsed_owner_falls_back(pool: PgPool) {
        let user_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO sites (user_id, username, theme, layout, published)
             VALUES ($1, 'ada-lovelace', 'ocean', 'academic', TRUE)",
        )
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO projects (user_id, title, has_page, page_content)
             VALUES ($1, 'Analytical engine', TRUE, 'Notes')",
        )
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO subscriptions (id, user_id, status, plan)
             VALUES ('sub_1', $1, 'past_due', 'pro')",
        )
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

        let fetcher =
            SubscriptionFetcher::new(PgSubscriptionSource::new(Arc::new(pool.clone())));
        let public = get_public_site(&pool, &fetcher, "Ada-Lovelace").await.unwrap();

        assert_eq!(public.theme, "light");
        assert_eq!(public.layout, "classic");
        assert_eq!(public.projects.len(), 1);
        assert!(!public.projects[0].has_page);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    #[ignore = "Requires a Postgres server at DATABASE_URL"]
    async fn unpublished_site_is_not_found(pool: PgPool) {
        sqlx::query("INSERT INTO sites (user_id, username) VALUES ($1, 'draft')")
            .bind(Uuid::new_v4())
            .execute(&pool)
            .await
            .unwrap();

        let fetcher =
            SubscriptionFetcher::new(PgSubscriptionSource::new(Arc::new(pool.clone())));
        let err = get_public_site(&pool, &fetcher, "draft").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
