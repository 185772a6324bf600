use serde::{Deserialize, Serialize};

use super::project::PublicProject;

#[derive(Debug, Deserialize)]
pub struct UpdateSiteRequest {
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateThemeRequest {
    pub theme: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLayoutRequest {
    pub layout: String,
}

#[derive(Debug, Serialize)]
pub struct PublicSiteResponse {
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub theme: String,
    pub layout: String,
    pub projects: Vec<PublicProject>,
}
