use serde::Serialize;

use crate::{
    catalog::{DEFAULT_LAYOUT, DEFAULT_THEME, PlanLimits},
    resolver::Entitlements,
};

/// `current_count < max_projects`; always true when unbounded.
pub fn can_add_project(current_count: u64, limits: &PlanLimits) -> bool {
    limits.max_projects.allows_another(current_count)
}

pub fn is_layout_available(layout_id: &str, limits: &PlanLimits, is_pro: bool) -> bool {
    is_pro || limits.available_layouts.contains(&layout_id)
}

pub fn is_theme_available(theme_id: &str, limits: &PlanLimits, is_pro: bool) -> bool {
    is_pro || limits.available_themes.contains(&theme_id)
}

/// Custom styling beyond the catalog themes. Exposed for client editors;
/// the service has no customization endpoint to gate.
pub fn can_customize(limits: &PlanLimits) -> bool {
    limits.can_customize
}

pub fn can_have_project_pages(limits: &PlanLimits) -> bool {
    limits.can_have_project_pages
}

/// The layout to actually render: the requested one if the owner's plan
/// covers it, the default layout otherwise.
pub fn effective_layout<'a>(requested: &'a str, entitlements: &Entitlements) -> &'a str {
    let (limits, is_pro) = entitlements.effective();
    if is_layout_available(requested, limits, is_pro) {
        requested
    } else {
        DEFAULT_LAYOUT
    }
}

/// Theme counterpart of [`effective_layout`].
pub fn effective_theme<'a>(requested: &'a str, entitlements: &Entitlements) -> &'a str {
    let (limits, is_pro) = entitlements.effective();
    if is_theme_available(requested, limits, is_pro) {
        requested
    } else {
        DEFAULT_THEME
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Projects,
    ProjectPages,
    Layout,
    Theme,
}

/// Shown instead of performing a gated action the plan doesn't cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradePrompt {
    pub feature: Feature,
    pub message: String,
    pub upgrade_required: bool,
}

impl UpgradePrompt {
    fn new(feature: Feature, message: String) -> Self {
        UpgradePrompt {
            feature,
            message,
            upgrade_required: true,
        }
    }
}

/// Outcome of checking an action against the caller's entitlements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Allowed,
    UpgradeRequired(UpgradePrompt),
}

impl Gate {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Gate::Allowed)
    }

    pub fn into_result(self) -> Result<(), UpgradePrompt> {
        match self {
            Gate::Allowed => Ok(()),
            Gate::UpgradeRequired(prompt) => Err(prompt),
        }
    }

    pub fn add_project(current_count: u64, entitlements: &Entitlements) -> Self {
        let (limits, _) = entitlements.effective();
        if can_add_project(current_count, limits) {
            return Gate::Allowed;
        }
        let message = match Option::<u32>::from(limits.max_projects) {
            Some(1) => {
                "Your plan includes 1 project. Upgrade to Pro for unlimited projects.".to_string()
            }
            Some(max) => format!(
                "Your plan includes {} projects. Upgrade to Pro for unlimited projects.",
                max
            ),
            None => "Upgrade to Pro for unlimited projects.".to_string(),
        };
        Gate::UpgradeRequired(UpgradePrompt::new(Feature::Projects, message))
    }

    pub fn project_page(entitlements: &Entitlements) -> Self {
        let (limits, _) = entitlements.effective();
        if can_have_project_pages(limits) {
            Gate::Allowed
        } else {
            Gate::UpgradeRequired(UpgradePrompt::new(
                Feature::ProjectPages,
                "Dedicated project pages are a Pro feature. Upgrade to Pro to enable them."
                    .to_string(),
            ))
        }
    }

    pub fn layout(layout_id: &str, entitlements: &Entitlements) -> Self {
        let (limits, is_pro) = entitlements.effective();
        if is_layout_available(layout_id, limits, is_pro) {
            Gate::Allowed
        } else {
            Gate::UpgradeRequired(UpgradePrompt::new(
                Feature::Layout,
                format!("The \"{}\" layout is available on Pro. Upgrade to use it.", layout_id),
            ))
        }
    }

    pub fn theme(theme_id: &str, entitlements: &Entitlements) -> Self {
        let (limits, is_pro) = entitlements.effective();
        if is_theme_available(theme_id, limits, is_pro) {
            Gate::Allowed
        } else {
            Gate::UpgradeRequired(UpgradePrompt::new(
                Feature::Theme,
                format!("The \"{}\" theme is available on Pro. Upgrade to use it.", theme_id),
            ))
        }
    }
}
