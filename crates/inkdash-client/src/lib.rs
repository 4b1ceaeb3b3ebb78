#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! inkdash Home Assistant client
//!
//! REST calls (states, services, templates) go through [`RestClient`];
//! Lovelace dashboards are read over the websocket API with [`WsClient`].
//! [`HaClient`] combines both behind the [`HomeAssistant`] trait, which the
//! server depends on.

pub mod api;
pub mod dashboards;
pub mod error;
pub mod rest;
pub mod ws;

// Re-exports for convenience
pub use api::{HaClient, HomeAssistant, websocket_url};
pub use dashboards::{area_nav_entries, fetch_dashboard_config, lovelace_nav_entries, view_structure};
pub use error::{Error, Result};
pub use rest::{Area, REQUEST_TIMEOUT, RestClient, RetryPolicy};
pub use ws::WsClient;
