//! Dashboard discovery on top of [`HomeAssistant`].
//!
//! Failures here degrade instead of propagating: a dashboard whose config
//! cannot be fetched is shown as a single entry, and a failing dashboard
//! list yields an empty home page section.

use inkdash_core::lovelace::{ViewStructure, candidate_url_paths};
use inkdash_core::path::dashboard_entries;
use inkdash_core::{DashboardInfo, DashboardPath, IconResolver, LovelaceConfig, NavEntry};

use crate::api::HomeAssistant;

/// Fetch a dashboard's config, trying each candidate URL path in turn.
pub async fn fetch_dashboard_config(
    ha: &dyn HomeAssistant,
    dashboard_id: &str,
) -> Option<LovelaceConfig> {
    for url_path in candidate_url_paths(dashboard_id) {
        match ha.lovelace_config(Some(&url_path)).await {
            Ok(config) => {
                log::debug!("Loaded dashboard '{dashboard_id}' from url_path '{url_path}'");
                return Some(config);
            }
            Err(e) => log::debug!("url_path '{url_path}' failed for '{dashboard_id}': {e}"),
        }
    }
    log::warn!("No Lovelace config found for dashboard '{dashboard_id}'");
    None
}

/// Config for a dashboard entry: its own `url_path` first, then the candidates.
async fn config_for(ha: &dyn HomeAssistant, dashboard: &DashboardInfo) -> Option<LovelaceConfig> {
    if let Some(url_path) = dashboard.url_path.as_deref()
        && let Ok(config) = ha.lovelace_config(Some(url_path)).await
    {
        return Some(config);
    }
    fetch_dashboard_config(ha, &dashboard.id).await
}

/// Config for a dashboard id, looked up the same way as the home page does.
///
/// The dashboard list supplies the registered `url_path`; when the list is
/// unavailable or does not mention the id, only the candidates are tried.
async fn config_by_id(ha: &dyn HomeAssistant, dashboard_id: &str) -> Option<LovelaceConfig> {
    let listed = match ha.lovelace_dashboards().await {
        Ok(dashboards) => dashboards.into_iter().find(|d| d.id == dashboard_id),
        Err(e) => {
            log::debug!("Dashboard list unavailable, trying candidates for '{dashboard_id}': {e}");
            None
        }
    };
    match listed {
        Some(dashboard) => config_for(ha, &dashboard).await,
        None => fetch_dashboard_config(ha, dashboard_id).await,
    }
}

/// One home-page entry per view of every dashboard.
pub async fn lovelace_nav_entries(ha: &dyn HomeAssistant) -> Vec<NavEntry> {
    let dashboards = match ha.lovelace_dashboards().await {
        Ok(dashboards) => dashboards,
        Err(e) => {
            log::warn!("Could not list Lovelace dashboards: {e}");
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for dashboard in &dashboards {
        let config = config_for(ha, dashboard).await;
        entries.extend(dashboard_entries(dashboard, config.as_ref()));
    }
    entries
}

/// Structure of the view a `lovelace-…` path points at.
///
/// An empty view path selects the dashboard's first view. Returns `None` for
/// other path kinds or when the dashboard or view cannot be found.
pub async fn view_structure(ha: &dyn HomeAssistant, path: &DashboardPath) -> Option<ViewStructure> {
    let DashboardPath::Lovelace {
        dashboard_id,
        view_path,
    } = path
    else {
        return None;
    };

    let config = config_by_id(ha, dashboard_id).await?;
    let view = if view_path.is_empty() {
        config.views.first()
    } else {
        config.find_view(view_path)
    };
    match view {
        Some(view) => Some(ViewStructure::from_view(view)),
        None => {
            log::warn!("View '{view_path}' not found in dashboard '{dashboard_id}'");
            None
        }
    }
}

/// Home-page entries for the rooms view: "All devices" then one per area.
pub async fn area_nav_entries(ha: &dyn HomeAssistant, resolver: &IconResolver) -> Vec<NavEntry> {
    let all = DashboardPath::All;
    let mut entries = vec![NavEntry::new(all.title(), &all)];
    match ha.areas().await {
        Ok(areas) => entries.extend(areas.into_iter().map(|area| {
            let icon = resolver.resolve_area(&area.id);
            NavEntry::new(area.name, &DashboardPath::Area(area.id)).with_icon(icon)
        })),
        Err(e) => log::warn!("Could not list areas: {e}"),
    }
    entries
}
