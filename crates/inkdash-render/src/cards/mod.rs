//! Lovelace card templates.
//!
//! Each template takes a card with its enriched entity state and returns an
//! HTML fragment. Card types without a template render as an HTML comment so
//! that the rest of the view still shows.

mod button;
mod entities;
mod heading;
mod thermostat;
mod tile;

use inkdash_core::entity::{UNAVAILABLE, is_toggleable};
use inkdash_core::layout::{ColumnSpan, SECTION_GRID_CELLS};
use inkdash_core::lovelace::{CardState, EnrichedCard};
use inkdash_core::{Card, IconResolver};

use crate::html::{escape, toggle_url};
use crate::icon::IconRenderer;

pub use tile::tile_markup;

/// What card templates need besides the card itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Icon resolver in the configured mode.
    pub resolver: &'a IconResolver,
    /// Icon markup.
    pub icons: &'a IconRenderer,
    /// Dashboard path of the page, for toggle links.
    pub page_path: &'a str,
}

impl<'a> RenderContext<'a> {
    /// Create a context.
    pub fn new(resolver: &'a IconResolver, icons: &'a IconRenderer, page_path: &'a str) -> Self {
        Self {
            resolver,
            icons,
            page_path,
        }
    }

    /// Icon markup for an entity state, honouring an `mdi:` override.
    pub fn state_icon(&self, state: &CardState, icon: Option<&str>) -> String {
        let icon = icon.or_else(|| state.attribute_str("icon"));
        self.icons
            .render(&self.resolver.resolve(state.domain(), &state.state, icon))
    }

    /// Toggle link for an entity, when its domain supports it and it is available.
    pub fn toggle_link(&self, state: &CardState) -> Option<String> {
        self.toggle_link_for(&state.entity_id, &state.state)
    }

    /// Toggle link for an entity id and its raw state.
    ///
    /// Unavailable entities and domains without a toggle service get none.
    pub fn toggle_link_for(&self, entity_id: &str, state: &str) -> Option<String> {
        (is_toggleable(entity_id) && state != UNAVAILABLE)
            .then(|| toggle_url(self.page_path, entity_id))
    }
}

/// Render one card.
pub fn render_card(card: &EnrichedCard, ctx: &RenderContext<'_>) -> String {
    match card.card.card_type.as_str() {
        "heading" => heading::render(card),
        "thermostat" => thermostat::render(card, ctx),
        "tile" | "entity" | "light" | "sensor" => tile::render(card, ctx),
        "button" => button::render(card, ctx),
        "entities" | "glance" => entities::render(card, ctx),
        "vertical-stack" => render_stack(card, ctx, "stack-vertical", 1),
        "horizontal-stack" => {
            let columns = u32::try_from(card.children.len()).unwrap_or(1).max(1);
            render_stack(card, ctx, "stack-horizontal", columns)
        }
        "grid" => {
            let columns = card
                .card
                .extra
                .get("columns")
                .and_then(serde_json::Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(3)
                .max(1);
            render_stack(card, ctx, "stack-grid", columns)
        }
        other => {
            log::debug!("No template for card type '{other}'");
            format!("<!-- unsupported card: {} -->", escape(other).replace("--", "-"))
        }
    }
}

fn render_stack(card: &EnrichedCard, ctx: &RenderContext<'_>, class: &str, columns: u32) -> String {
    let width = percent(1, columns);
    let mut out = format!(r#"<div class="card-stack {class}">"#);
    for child in &card.children {
        out.push_str(&format!(
            r#"<div class="cell" style="width:{width}">{}</div>"#,
            render_card(child, ctx)
        ));
    }
    out.push_str("</div>");
    out
}

/// Cells of the 12-cell section grid a card occupies.
///
/// Explicit `grid_options` win; otherwise the card type's usual size applies.
pub fn card_span(card: &Card) -> u32 {
    let span = card
        .grid_options
        .as_ref()
        .map_or(ColumnSpan::Auto, |options| options.column_span());
    match span {
        ColumnSpan::Cells(cells) => cells,
        ColumnSpan::Full => SECTION_GRID_CELLS,
        ColumnSpan::Auto => default_span(&card.card_type),
    }
}

fn default_span(card_type: &str) -> u32 {
    match card_type {
        "tile" | "entity" | "light" | "sensor" => 6,
        "button" => 3,
        _ => SECTION_GRID_CELLS,
    }
}

/// `part / whole` as a CSS percentage.
pub fn percent(part: u32, whole: u32) -> String {
    let whole = whole.max(1);
    let value = f64::from(part.min(whole)) * 100.0 / f64::from(whole);
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}%")
}

/// Human-readable state: value plus unit, or `Unavailable`.
pub fn format_state(state: &CardState) -> String {
    if state.state == UNAVAILABLE {
        return "Unavailable".to_string();
    }
    match state.attribute_str("unit_of_measurement") {
        Some(unit) => format!("{} {unit}", state.state),
        None => state.state.clone(),
    }
}

/// Whether a state reads as "active" for styling.
pub fn is_active(state: &CardState) -> bool {
    is_active_state(&state.state)
}

/// Whether a raw state string counts as active.
pub fn is_active_state(state: &str) -> bool {
    matches!(
        state,
        "on" | "open" | "opening" | "unlocked" | "cleaning" | "returning" | "heat" | "cool"
    )
}
