//! Error types for inkdash-client

use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Result type alias for inkdash-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to Home Assistant
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from inkdash-core
    #[error("Core error: {0}")]
    Core(#[from] inkdash_core::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    /// Home Assistant rejected the access token
    #[error("Authentication failed: {message}")]
    Auth {
        /// Message reported by Home Assistant
        message: String,
    },

    /// A websocket command returned `success: false`
    #[error("Command failed: {code} - {message}")]
    Command {
        /// Error code, e.g. `config_not_found`
        code: String,
        /// Human-readable message
        message: String,
    },

    /// Home Assistant did not answer in time
    #[error("Timed out after {after:?} waiting for {operation}")]
    Timeout {
        /// What was waited for, e.g. the websocket command type
        operation: String,
        /// Configured limit
        after: Duration,
    },

    /// Unexpected frame or closed connection
    #[error("Protocol error: {message}")]
    Protocol {
        /// What went wrong
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client misconfiguration
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },
}

impl From<tungstenite::Error> for Error {
    fn from(err: tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}

impl Error {
    /// Whether the request may succeed when repeated.
    ///
    /// Only connection failures qualify; a request that reached Home
    /// Assistant is never replayed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_connect(),
            Error::WebSocket(_) => false,
            Error::Core(_)
            | Error::Auth { .. }
            | Error::Command { .. }
            | Error::Timeout { .. }
            | Error::Protocol { .. }
            | Error::Serialization(_)
            | Error::Config { .. } => false,
        }
    }

    /// Creates a new protocol error.
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Error::Protocol {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
