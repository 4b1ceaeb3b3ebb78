//! Full HTML pages: home, dashboard and error.
//!
//! Pages are plain HTML 4-ish markup with inline CSS. The Kindle browser has
//! no reliable flexbox or grid support, so columns are `inline-block`
//! elements with percentage widths.

use std::fmt;
use std::str::FromStr;

use inkdash_core::lovelace::{EnrichedSection, EnrichedView};
use inkdash_core::{ColumnPreference, EntityView, Error, Layout, NavEntry};
use serde::{Deserialize, Serialize};

use crate::cards::{RenderContext, card_span, is_active_state, percent, render_card, tile_markup};
use crate::html::{dashboard_url, escape};
use crate::icon::IconRenderer;

/// Colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Black on white.
    #[default]
    Light,
    /// White on black.
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(Error::validation_field(
                "theme",
                format!("unknown theme '{other}' (expected light or dark)"),
            )),
        }
    }
}

/// Which list the home page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeView {
    /// Home Assistant areas.
    #[default]
    Rooms,
    /// Views of every Lovelace dashboard.
    Dashboards,
}

impl HomeView {
    /// Parse the `view` query parameter; anything but `dashboards` means rooms.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("dashboards") => Self::Dashboards,
            _ => Self::Rooms,
        }
    }
}

/// Page-level display options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    /// Seconds between automatic reloads; 0 disables reloading.
    pub auto_refresh: u32,
    /// Colour scheme.
    pub theme: Theme,
    /// Columns of the flat entity grid.
    pub grid_columns: ColumnPreference,
    /// Show a link back to the home page.
    pub show_back_button: bool,
    /// Show the time the page was rendered.
    pub show_last_update: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            auto_refresh: 0,
            theme: Theme::Light,
            grid_columns: ColumnPreference::Auto,
            show_back_button: true,
            show_last_update: true,
        }
    }
}

const STYLE: &str = "\
body{margin:0;padding:16px;font-family:Georgia,serif;font-size:28px;line-height:1.3}\
body.theme-light{background:#fff;color:#000}\
body.theme-dark{background:#000;color:#fff}\
a{color:inherit;text-decoration:none}\
header{border-bottom:3px solid;margin-bottom:16px;padding-bottom:8px}\
header h1{display:inline;font-size:40px;margin:0}\
.back{margin-right:24px}\
.updated{float:right;font-size:22px}\
.tabs a{display:inline-block;padding:8px 20px;border:2px solid;margin-right:8px}\
.tabs a.active{border-width:4px;font-weight:bold}\
.nav-list{list-style:none;padding:0}\
.nav-list li{border-bottom:1px solid;padding:20px 8px}\
.grid,.sections,.section-cards,.card-stack{font-size:0}\
.cell,.section{display:inline-block;vertical-align:top;box-sizing:border-box;font-size:28px}\
.cell{padding:6px}\
.section{padding:0 8px}\
.grid-auto .cell{width:300px}\
.card{border:2px solid;padding:12px;min-height:60px}\
.card-heading{border:none;min-height:0;padding:8px 0}\
.card-heading h2,.card-heading h3{margin:0}\
.is-active{border-width:5px}\
.is-unavailable{border-style:dashed}\
.icon{vertical-align:middle;margin-right:12px}\
.icon-ascii{font-family:monospace;font-weight:bold}\
.name{font-weight:bold}\
.state{display:block}\
.thermostat-current{font-size:56px}\
.card-entities ul{list-style:none;padding:0;margin:0}\
.card-entities li{padding:8px 0}\
.card-entities .state{display:inline;float:right}\
.empty,.error{padding:32px 0}";

fn page_start(title: &str, options: &PageOptions) -> String {
    let refresh = if options.auto_refresh > 0 {
        format!(
            r#"<meta http-equiv="refresh" content="{}">"#,
            options.auto_refresh
        )
    } else {
        String::new()
    };
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">{refresh}\
<title>{}</title><style>{STYLE}</style></head><body class=\"theme-{}\">",
        escape(title),
        options.theme
    )
}

const PAGE_END: &str = "</body></html>";

/// Home page listing rooms or dashboard views.
pub fn render_home(
    entries: &[NavEntry],
    view: HomeView,
    options: &PageOptions,
    icons: &IconRenderer,
) -> String {
    let mut out = page_start("Home Assistant", options);
    out.push_str("<header><h1>Home Assistant</h1></header>");

    let tab = |target: HomeView, href: &str, label: &str| {
        let class = if target == view { " class=\"active\"" } else { "" };
        format!(r#"<a{class} href="{href}">{label}</a>"#)
    };
    out.push_str(r#"<nav class="tabs">"#);
    out.push_str(&tab(HomeView::Rooms, "/?view=rooms", "Rooms"));
    out.push_str(&tab(HomeView::Dashboards, "/?view=dashboards", "Dashboards"));
    out.push_str("</nav>");

    if entries.is_empty() {
        out.push_str(r#"<p class="empty">Nothing to show.</p>"#);
    } else {
        out.push_str(r#"<ul class="nav-list">"#);
        for entry in entries {
            let icon = entry
                .icon
                .as_ref()
                .map(|icon| icons.render(icon))
                .unwrap_or_default();
            out.push_str(&format!(
                r#"<li><a href="{}">{icon}<span class="name">{}</span></a></li>"#,
                escape(&dashboard_url(&entry.path)),
                escape(&entry.title)
            ));
        }
        out.push_str("</ul>");
    }
    out.push_str(PAGE_END);
    out
}

/// Everything a dashboard page shows.
#[derive(Debug, Clone)]
pub struct DashboardPage<'a> {
    /// Page title.
    pub title: &'a str,
    /// Flat entity grid (`all` and area pages).
    pub entities: &'a [EntityView],
    /// Lovelace view (`lovelace-…` pages).
    pub view: Option<&'a EnrichedView>,
    /// Layout chosen for the display.
    pub layout: Layout,
    /// Render time, `HH:MM:SS`.
    pub last_update: Option<&'a str>,
}

fn header(title: &str, last_update: Option<&str>, options: &PageOptions) -> String {
    let mut out = String::from("<header>");
    if options.show_back_button {
        out.push_str(r#"<a class="back" href="/">&lt; Back</a>"#);
    }
    out.push_str(&format!("<h1>{}</h1>", escape(title)));
    if options.show_last_update
        && let Some(time) = last_update
    {
        out.push_str(&format!(
            r#"<span class="updated">Updated {}</span>"#,
            escape(time)
        ));
    }
    out.push_str("</header>");
    out
}

/// Dashboard page: a Lovelace view when present, otherwise the entity grid.
pub fn render_dashboard(page: &DashboardPage<'_>, options: &PageOptions, ctx: &RenderContext<'_>) -> String {
    let mut out = page_start(page.title, options);
    out.push_str(&header(page.title, page.last_update, options));

    match page.view {
        Some(view) => out.push_str(&render_view(view, page.layout, ctx)),
        None if page.entities.is_empty() => {
            out.push_str(r#"<p class="empty">No devices.</p>"#);
        }
        None => out.push_str(&render_entity_grid(page.entities, options.grid_columns, ctx)),
    }
    out.push_str(PAGE_END);
    out
}

fn render_entity_grid(entities: &[EntityView], columns: ColumnPreference, ctx: &RenderContext<'_>) -> String {
    let (class, style) = match columns {
        ColumnPreference::Auto => ("grid grid-auto", String::new()),
        ColumnPreference::Fixed(n) => ("grid", format!(r#" style="width:{}""#, percent(1, n))),
    };
    let mut out = format!(r#"<div class="{class}">"#);
    for entity in entities {
        let link = ctx.toggle_link_for(&entity.id, &entity.state);
        let state = match entity.attributes.get("unit_of_measurement").and_then(|u| u.as_str()) {
            Some(unit) => format!("{} {unit}", entity.state),
            None => entity.state.clone(),
        };
        let tile = tile_markup(
            &ctx.icons.render(&entity.icon),
            &entity.name,
            &state,
            link.as_deref(),
            is_active_state(&entity.state),
            entity.state == inkdash_core::entity::UNAVAILABLE,
        );
        out.push_str(&format!(r#"<div class="cell"{style}>{tile}</div>"#));
    }
    out.push_str("</div>");
    out
}

fn render_view(view: &EnrichedView, layout: Layout, ctx: &RenderContext<'_>) -> String {
    if !view.sections.is_empty() {
        let mut out = format!(
            r#"<div class="sections sections-{}">"#,
            layout.columns
        );
        for section in &view.sections {
            out.push_str(&render_section(section, layout.columns, ctx));
        }
        out.push_str("</div>");
        return out;
    }

    let width = percent(1, layout.columns);
    let mut out = String::from(r#"<div class="grid">"#);
    for card in &view.cards {
        out.push_str(&format!(
            r#"<div class="cell" style="width:{width}">{}</div>"#,
            render_card(card, ctx)
        ));
    }
    out.push_str("</div>");
    out
}

fn render_section(section: &EnrichedSection, columns: u32, ctx: &RenderContext<'_>) -> String {
    let span = section.column_span.unwrap_or(1).max(1);
    let mut out = format!(
        r#"<div class="section" style="width:{}">"#,
        percent(span, columns)
    );
    if let Some(title) = &section.title {
        out.push_str(&format!("<h2>{}</h2>", escape(title)));
    }
    out.push_str(r#"<div class="section-cards">"#);
    for card in &section.cards {
        out.push_str(&format!(
            r#"<div class="cell" style="width:{}">{}</div>"#,
            percent(card_span(&card.card), inkdash_core::layout::SECTION_GRID_CELLS),
            render_card(card, ctx)
        ));
    }
    out.push_str("</div></div>");
    out
}

/// Error page, e.g. when Home Assistant cannot be reached.
pub fn render_error(title: &str, message: &str, options: &PageOptions) -> String {
    let mut out = page_start(title, options);
    out.push_str(&header(title, None, options));
    out.push_str(&format!(r#"<p class="error">{}</p>"#, escape(message)));
    out.push_str(PAGE_END);
    out
}
