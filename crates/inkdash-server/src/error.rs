//! Error types for inkdash-server

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use inkdash_render::{PageOptions, render_error};
use thiserror::Error;

/// Result type alias for inkdash-server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in inkdash-server
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from inkdash-core
    #[error("Core error: {0}")]
    Core(#[from] inkdash_core::Error),

    /// Error from inkdash-client
    #[error("Home Assistant error: {0}")]
    Client(#[from] inkdash_client::Error),

    /// I/O error with the path involved
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File or directory
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<std::path::Path>) -> Self {
        Error::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// A request failure rendered as an e-ink friendly HTML page.
#[derive(Debug)]
pub struct PageError {
    status: StatusCode,
    title: &'static str,
    message: String,
    options: PageOptions,
}

impl PageError {
    /// Home Assistant could not be reached or answered with an error.
    pub fn upstream(err: &inkdash_client::Error, options: &PageOptions) -> Self {
        tracing::error!("Home Assistant request failed: {err}");
        Self {
            status: StatusCode::BAD_GATEWAY,
            title: "Home Assistant unavailable",
            message: format!("Could not load data from Home Assistant: {err}"),
            options: options.clone(),
        }
    }

    /// HTTP status of the page.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let body = render_error(self.title, &self.message, &self.options);
        (self.status, Html(body)).into_response()
    }
}
