use chrono::NaiveDateTime;
use db::models::project::Project;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub url: Option<String>,
    #[serde(default)]
    pub has_page: bool,
    pub page_content: Option<String>,
}

/// A project as shown on the public site.
#[derive(Debug, Serialize)]
pub struct PublicProject {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub url: Option<String>,
    pub has_page: bool,
    pub page_content: Option<String>,
    pub created_at: NaiveDateTime,
}

impl PublicProject {
    /// Project pages are dropped when the owner's plan no longer covers them.
    pub fn from_project(project: Project, pages_allowed: bool) -> Self {
        let has_page = project.has_page && pages_allowed;
        PublicProject {
            id: project.id,
            title: project.title,
            summary: project.summary,
            url: project.url,
            has_page,
            page_content: if has_page { project.page_content } else { None },
            created_at: project.created_at,
        }
    }
}
