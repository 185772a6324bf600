use uuid::Uuid;

pub struct ProjectCreateRequest {
    pub user_id: Uuid,
    pub title: String,
    pub summary: String,
    pub url: Option<String>,
    pub has_page: bool,
    pub page_content: Option<String>,
}
