use std::fmt;

use serde::{Deserialize, Serialize};

/// Billing level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
        }
    }

    /// Reads a stored plan value. Anything other than `pro` is the free tier.
    pub fn from_stored(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("pro") {
            PlanTier::Pro
        } else {
            PlanTier::Free
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum number of projects a plan allows. Serialized as a number, or
/// `null` when unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum ProjectLimit {
    Limited(u32),
    Unbounded,
}

impl ProjectLimit {
    /// Whether a user who already has `current_count` projects may add one more.
    pub fn allows_another(&self, current_count: u64) -> bool {
        match self {
            ProjectLimit::Limited(max) => current_count < u64::from(*max),
            ProjectLimit::Unbounded => true,
        }
    }
}

impl From<Option<u32>> for ProjectLimit {
    fn from(value: Option<u32>) -> Self {
        value.map_or(ProjectLimit::Unbounded, ProjectLimit::Limited)
    }
}

impl From<ProjectLimit> for Option<u32> {
    fn from(value: ProjectLimit) -> Self {
        match value {
            ProjectLimit::Limited(max) => Some(max),
            ProjectLimit::Unbounded => None,
        }
    }
}

/// Feature limits of one plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    pub max_projects: ProjectLimit,
    pub available_layouts: &'static [&'static str],
    pub available_themes: &'static [&'static str],
    pub can_customize: bool,
    pub can_have_project_pages: bool,
}

pub const DEFAULT_LAYOUT: &str = "classic";
pub const DEFAULT_THEME: &str = "light";

static FREE_LIMITS: PlanLimits = PlanLimits {
    max_projects: ProjectLimit::Limited(1),
    available_layouts: &[DEFAULT_LAYOUT],
    available_themes: &[DEFAULT_THEME, "dark"],
    can_customize: false,
    can_have_project_pages: false,
};

static PRO_LIMITS: PlanLimits = PlanLimits {
    max_projects: ProjectLimit::Unbounded,
    available_layouts: &[DEFAULT_LAYOUT, "modern", "minimal", "academic"],
    available_themes: &[DEFAULT_THEME, "dark", "ocean", "forest", "sunset", "slate"],
    can_customize: true,
    can_have_project_pages: true,
};

/// Static mapping from plan tier to its limits.
pub struct PlanCatalog;

impl PlanCatalog {
    pub fn limits(tier: PlanTier) -> &'static PlanLimits {
        match tier {
            PlanTier::Free => &FREE_LIMITS,
            PlanTier::Pro => &PRO_LIMITS,
        }
    }

    pub fn free() -> &'static PlanLimits {
        &FREE_LIMITS
    }

    pub fn pro() -> &'static PlanLimits {
        &PRO_LIMITS
    }

    /// Whether any tier offers this layout.
    pub fn is_known_layout(layout_id: &str) -> bool {
        [&FREE_LIMITS, &PRO_LIMITS]
            .iter()
            .any(|limits| limits.available_layouts.contains(&layout_id))
    }

    /// Whether any tier offers this theme.
    pub fn is_known_theme(theme_id: &str) -> bool {
        [&FREE_LIMITS, &PRO_LIMITS]
            .iter()
            .any(|limits| limits.available_themes.contains(&theme_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_tier_is_a_subset_of_pro() {
        let free = PlanCatalog::free();
        let pro = PlanCatalog::pro();
        assert!(free.available_layouts.iter().all(|l| pro.available_layouts.contains(l)));
        assert!(free.available_themes.iter().all(|t| pro.available_themes.contains(t)));
    }

    #[test]
    fn academic_layout_is_pro_only() {
        assert!(!PlanCatalog::free().available_layouts.contains(&"academic"));
        assert!(PlanCatalog::pro().available_layouts.contains(&"academic"));
        assert!(PlanCatalog::is_known_layout("academic"));
        assert!(!PlanCatalog::is_known_layout("brutalist"));
    }

    #[test]
    fn stored_plan_values_default_to_free() {
        assert_eq!(PlanTier::from_stored("pro"), PlanTier::Pro);
        assert_eq!(PlanTier::from_stored(" PRO "), PlanTier::Pro);
        assert_eq!(PlanTier::from_stored("free"), PlanTier::Free);
        assert_eq!(PlanTier::from_stored("enterprise"), PlanTier::Free);
        assert_eq!(PlanTier::from_stored(""), PlanTier::Free);
    }

    #[test]
    fn project_limit_serializes_unbounded_as_null() {
        let free = serde_json::to_value(PlanCatalog::free()).unwrap();
        let pro = serde_json::to_value(PlanCatalog::pro()).unwrap();
        assert_eq!(free["max_projects"], serde_json::json!(1));
        assert!(pro["max_projects"].is_null());

        let parsed: ProjectLimit = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, ProjectLimit::Unbounded);
    }
}
