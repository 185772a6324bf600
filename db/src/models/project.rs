use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub summary: String,
    pub url: Option<String>,
    pub has_page: bool,
    pub page_content: Option<String>,
    pub created_at: NaiveDateTime,
}
