use uuid::Uuid;

pub struct SiteUpsertRequest {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub published: bool,
}
