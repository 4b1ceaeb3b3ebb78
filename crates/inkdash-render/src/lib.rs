#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! inkdash HTML rendering
//!
//! Turns enriched Lovelace views and entity lists into static pages the
//! Kindle experimental browser displays reliably: no scripts, no SVG, no
//! icon fonts and no emoji.
//!
//! # Modules
//!
//! - [`page`]: home, dashboard and error pages
//! - [`cards`]: heading, thermostat, tile, button and entities templates
//! - [`icon`]: icon markup
//! - [`html`]: escaping and URL helpers

pub mod cards;
pub mod html;
pub mod icon;
pub mod page;

// Re-exports for convenience
pub use cards::{RenderContext, render_card};
pub use icon::{DEFAULT_ICON_BASE, IconRenderer};
pub use page::{
    DashboardPage, HomeView, PageOptions, Theme, render_dashboard, render_error, render_home,
};
