//! Thermostat card: current and target temperature plus HVAC mode.

use inkdash_core::lovelace::EnrichedCard;

use super::RenderContext;
use crate::html::escape;

/// Format a temperature without a trailing `.0`.
fn format_temperature(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}°")
    } else {
        format!("{value:.1}°")
    }
}

pub(super) fn render(card: &EnrichedCard, ctx: &RenderContext<'_>) -> String {
    let Some(state) = &card.state else {
        return r#"<div class="card card-thermostat is-unavailable"></div>"#.to_string();
    };

    let name = card.display_name().unwrap_or(&state.entity_id);
    let mut out = format!(
        r#"<div class="card card-thermostat{}"><div class="card-header">{}<span class="name">{}</span></div>"#,
        if state.is_unavailable() {
            " is-unavailable"
        } else {
            ""
        },
        ctx.state_icon(state, card.card.icon.as_deref()),
        escape(name)
    );

    let current = state
        .attribute_f64("current_temperature")
        .map_or_else(|| "--".to_string(), format_temperature);
    out.push_str(&format!(
        r#"<div class="thermostat-current">{}</div>"#,
        escape(&current)
    ));

    let target = match (
        state.attribute_f64("temperature"),
        state.attribute_f64("target_temp_low"),
        state.attribute_f64("target_temp_high"),
    ) {
        (Some(t), _, _) => Some(format_temperature(t)),
        (None, Some(low), Some(high)) => Some(format!(
            "{} - {}",
            format_temperature(low),
            format_temperature(high)
        )),
        _ => None,
    };
    if let Some(target) = target {
        out.push_str(&format!(
            r#"<div class="thermostat-target">Target {}</div>"#,
            escape(&target)
        ));
    }

    let mode = match state.attribute_str("hvac_action") {
        Some(action) => format!("{} / {action}", state.state),
        None => state.state.clone(),
    };
    out.push_str(&format!(
        r#"<div class="thermostat-mode">{}</div></div>"#,
        escape(&mode)
    ));
    out
}
