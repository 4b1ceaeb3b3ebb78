//! Entities and glance cards: a titled list of entity rows.

use inkdash_core::lovelace::EnrichedCard;

use super::{RenderContext, format_state};
use crate::html::escape;

pub(super) fn render(card: &EnrichedCard, ctx: &RenderContext<'_>) -> String {
    let mut out = String::from(r#"<div class="card card-entities">"#);
    if let Some(title) = card.card.extra_str("title") {
        out.push_str(&format!("<h3>{}</h3>", escape(title)));
    }
    out.push_str("<ul>");
    for (row, state) in &card.rows {
        let name = row.name().unwrap_or(&state.friendly_name);
        let icon = ctx.state_icon(state, row.icon());
        let text = format!(
            r#"{icon}<span class="name">{}</span><span class="state">{}</span>"#,
            escape(name),
            escape(&format_state(state))
        );
        match ctx.toggle_link(state) {
            Some(href) => out.push_str(&format!(
                r#"<li><a href="{}">{text}</a></li>"#,
                escape(&href)
            )),
            None => out.push_str(&format!("<li>{text}</li>")),
        }
    }
    out.push_str("</ul></div>");
    out
}
