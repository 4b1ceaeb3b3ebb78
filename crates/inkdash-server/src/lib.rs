#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! inkdash HTTP server
//!
//! Serves Home Assistant dashboards as static HTML pages for the Kindle
//! experimental browser. The binary is `inkdash`; this library exposes the
//! pieces so they can be tested without a network listener.
//!
//! # Modules
//!
//! - [`config`]: TOML + environment configuration
//! - [`config_handlers`]: `inkdash config` subcommands
//! - [`cli`]: command-line definition
//! - [`routes`]: axum router and handlers
//! - [`state`]: shared request state
//! - [`error`]: error types and error pages

pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod error;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use config::InkdashConfig;
pub use error::{Error, PageError, Result};
pub use routes::{HealthResponse, router};
pub use state::AppState;

/// Bind the configured address and serve until the process is stopped.
pub async fn serve(config: &InkdashConfig) -> Result<()> {
    let state = AppState::connect(config)?;
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::io_with_path(e, addr.to_string()))?;

    tracing::info!(
        %addr,
        ha_url = %config.home_assistant.url,
        screen = %state.screen().name,
        icon_mode = %config.display.icon_mode,
        "inkdash listening"
    );
    axum::serve(listener, router(state))
        .await
        .map_err(|e| Error::io_with_path(e, addr.to_string()))
}
