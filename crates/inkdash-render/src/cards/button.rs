//! Button card.
//!
//! Honours `show_name`, `show_icon` (both default on) and `show_state`
//! (default off). A button bound to a toggleable entity links to its toggle.

use inkdash_core::lovelace::EnrichedCard;

use super::{RenderContext, format_state, is_active};
use crate::html::escape;

pub(super) fn render(card: &EnrichedCard, ctx: &RenderContext<'_>) -> String {
    let show_name = card.card.extra_bool("show_name").unwrap_or(true);
    let show_icon = card.card.extra_bool("show_icon").unwrap_or(true);
    let show_state = card.card.extra_bool("show_state").unwrap_or(false);

    let mut body = String::new();
    if show_icon {
        let icon = match &card.state {
            Some(state) => ctx.state_icon(state, card.card.icon.as_deref()),
            None => ctx
                .icons
                .render(&ctx.resolver.resolve("", "", card.card.icon.as_deref())),
        };
        body.push_str(&icon);
    }
    if show_name && let Some(name) = card.display_name() {
        body.push_str(&format!(r#"<span class="name">{}</span>"#, escape(name)));
    }
    if show_state && let Some(state) = &card.state {
        body.push_str(&format!(
            r#"<span class="state">{}</span>"#,
            escape(&format_state(state))
        ));
    }

    let active = card.state.as_ref().is_some_and(is_active);
    let class = if active {
        "card card-button is-active"
    } else {
        "card card-button"
    };
    match card.state.as_ref().and_then(|s| ctx.toggle_link(s)) {
        Some(href) => format!(
            r#"<div class="{class}"><a class="button-link" href="{}">{body}</a></div>"#,
            escape(&href)
        ),
        None => format!(r#"<div class="{class}">{body}</div>"#),
    }
}
