//! Heading card.

use inkdash_core::lovelace::EnrichedCard;

use crate::html::escape;

pub(super) fn render(card: &EnrichedCard) -> String {
    let text = card
        .card
        .heading
        .as_deref()
        .or(card.card.name.as_deref())
        .unwrap_or_default();
    let tag = match card.card.extra_str("heading_style") {
        Some("subtitle") => "h3",
        _ => "h2",
    };
    format!(
        r#"<div class="card card-heading"><{tag}>{}</{tag}></div>"#,
        escape(text)
    )
}
