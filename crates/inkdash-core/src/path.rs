//! Dashboard paths and navigation entries.
//!
//! Every page the Kindle can open is addressed by a single path segment:
//!
//! | path                              | page                          |
//! |-----------------------------------|-------------------------------|
//! | `all`                             | every supported entity        |
//! | `area-{area_id}`                  | entities of one area          |
//! | `lovelace-{dashboard_id}-{view}`  | one view of a Lovelace board  |

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::icons::ResolvedIcon;
use crate::lovelace::{DashboardInfo, LovelaceConfig};

const AREA_PREFIX: &str = "area-";
const LOVELACE_PREFIX: &str = "lovelace-";
const DASHBOARD_PREFIX: &str = "dashboard_";

/// A parsed dashboard path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardPath {
    /// All supported entities.
    All,
    /// Entities of one area.
    Area(String),
    /// One view of a Lovelace dashboard; an empty view means the dashboard itself.
    Lovelace {
        /// Dashboard id, e.g. `dashboard_oscar`.
        dashboard_id: String,
        /// View path or title.
        view_path: String,
    },
    /// Anything else; rendered as an empty page.
    Unknown(String),
}

impl DashboardPath {
    /// Parse a path segment.
    pub fn parse(path: &str) -> Self {
        if path == "all" {
            return Self::All;
        }
        if let Some(area) = path.strip_prefix(AREA_PREFIX) {
            return Self::Area(area.to_string());
        }
        if let Some(rest) = path.strip_prefix(LOVELACE_PREFIX) {
            let (dashboard_id, view_path) = split_lovelace(rest);
            return Self::Lovelace {
                dashboard_id,
                view_path,
            };
        }
        Self::Unknown(path.to_string())
    }

    /// Page title.
    pub fn title(&self) -> String {
        match self {
            Self::All => "All devices".to_string(),
            Self::Area(area) => area.clone(),
            Self::Lovelace {
                dashboard_id,
                view_path,
            } => {
                if view_path.is_empty() {
                    dashboard_id.clone()
                } else {
                    view_path.clone()
                }
            }
            Self::Unknown(path) => path.clone(),
        }
    }
}

/// Split `dashboard_<name>-<view>` at the first dash after the prefix;
/// other ids split at their first dash.
fn split_lovelace(rest: &str) -> (String, String) {
    if let Some(after) = rest.strip_prefix(DASHBOARD_PREFIX) {
        return match after.split_once('-') {
            Some((name, view)) => (format!("{DASHBOARD_PREFIX}{name}"), view.to_string()),
            None => (rest.to_string(), String::new()),
        };
    }
    match rest.split_once('-') {
        Some((id, view)) => (id.to_string(), view.to_string()),
        None => (rest.to_string(), String::new()),
    }
}

impl FromStr for DashboardPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for DashboardPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Area(area) => write!(f, "{AREA_PREFIX}{area}"),
            Self::Lovelace {
                dashboard_id,
                view_path,
            } if view_path.is_empty() => write!(f, "{LOVELACE_PREFIX}{dashboard_id}"),
            Self::Lovelace {
                dashboard_id,
                view_path,
            } => write!(f, "{LOVELACE_PREFIX}{dashboard_id}-{view_path}"),
            Self::Unknown(path) => f.write_str(path),
        }
    }
}

/// A link on the home page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavEntry {
    /// Link text.
    pub title: String,
    /// Dashboard path the link opens.
    pub path: String,
    /// Optional icon.
    pub icon: Option<ResolvedIcon>,
}

impl NavEntry {
    /// Entry without icon.
    pub fn new(title: impl Into<String>, path: &DashboardPath) -> Self {
        Self {
            title: title.into(),
            path: path.to_string(),
            icon: None,
        }
    }

    /// Attach an icon.
    pub fn with_icon(mut self, icon: ResolvedIcon) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// Home-page entries for one dashboard: one per view, or a single entry for
/// the dashboard itself when its config is missing or has no views.
pub fn dashboard_entries(dashboard: &DashboardInfo, config: Option<&LovelaceConfig>) -> Vec<NavEntry> {
    let whole = || {
        vec![NavEntry::new(
            dashboard.display_title(),
            &DashboardPath::Lovelace {
                dashboard_id: dashboard.id.clone(),
                view_path: String::new(),
            },
        )]
    };

    match config {
        Some(config) if !config.views.is_empty() => config
            .views
            .iter()
            .map(|view| {
                let (path, title) = view.path_and_title();
                NavEntry::new(
                    title,
                    &DashboardPath::Lovelace {
                        dashboard_id: dashboard.id.clone(),
                        view_path: path,
                    },
                )
            })
            .collect(),
        _ => whole(),
    }
}
