//! Tile card: icon, name and state of one entity; tapping toggles it.

use inkdash_core::lovelace::EnrichedCard;

use super::{RenderContext, format_state, is_active};
use crate::html::escape;

/// Tile markup shared by tile cards and the flat entity grid.
///
/// `icon` is already markup; `name` and `state` are escaped here.
pub fn tile_markup(
    icon: &str,
    name: &str,
    state: &str,
    link: Option<&str>,
    active: bool,
    unavailable: bool,
) -> String {
    let mut class = String::from("card card-tile");
    if active {
        class.push_str(" is-active");
    }
    if unavailable {
        class.push_str(" is-unavailable");
    }
    let body = format!(
        r#"{icon}<span class="name">{}</span><span class="state">{}</span>"#,
        escape(name),
        escape(state)
    );
    match link {
        Some(href) => format!(
            r#"<div class="{class}"><a class="tile-link" href="{}">{body}</a></div>"#,
            escape(href)
        ),
        None => format!(r#"<div class="{class}">{body}</div>"#),
    }
}

pub(super) fn render(card: &EnrichedCard, ctx: &RenderContext<'_>) -> String {
    let Some(state) = &card.state else {
        let name = card.card.name.as_deref().unwrap_or_default();
        return format!(
            r#"<div class="card card-tile is-unavailable"><span class="name">{}</span></div>"#,
            escape(name)
        );
    };
    let icon = ctx.state_icon(state, card.card.icon.as_deref());
    let link = ctx.toggle_link(state);
    tile_markup(
        &icon,
        card.display_name().unwrap_or(&state.entity_id),
        &format_state(state),
        link.as_deref(),
        is_active(state),
        state.is_unavailable(),
    )
}
