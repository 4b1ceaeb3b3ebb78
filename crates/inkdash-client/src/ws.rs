//! Home Assistant WebSocket API client.
//!
//! Lovelace configuration is only exposed over the websocket API. Each
//! command opens its own connection:
//!
//! ```text
//! server: {"type": "auth_required"}
//! client: {"type": "auth", "access_token": "..."}
//! server: {"type": "auth_ok"}            (or auth_invalid)
//! client: {"id": 7, "type": "lovelace/config", "url_path": "..."}
//! server: {"id": 7, "type": "result", "success": true, "result": {...}}
//! ```
//!
//! The whole exchange, connect included, is bounded by [`REQUEST_TIMEOUT`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use inkdash_core::{DashboardInfo, LovelaceConfig};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio_tungstenite::tungstenite::Message;

use crate::rest::REQUEST_TIMEOUT;
use crate::{Error, Result};

/// Error payload of a failed command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandError {
    /// Error code.
    #[serde(default)]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Any frame received from Home Assistant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Incoming {
    /// Frame type (`auth_required`, `auth_ok`, `result`, `event`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Command id, for `result` frames.
    #[serde(default)]
    pub id: Option<u64>,
    /// Command outcome.
    #[serde(default)]
    pub success: Option<bool>,
    /// Command result.
    #[serde(default)]
    pub result: Option<Value>,
    /// Command error.
    #[serde(default)]
    pub error: Option<CommandError>,
    /// Message of `auth_invalid` frames.
    #[serde(default)]
    pub message: Option<String>,
}

impl Incoming {
    /// Parse a text frame.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Turn a `result` frame into its payload.
    pub fn into_result(self) -> Result<Value> {
        if self.kind != "result" {
            return Err(Error::protocol(format!(
                "expected a result frame, got '{}'",
                self.kind
            )));
        }
        if self.success == Some(true) {
            return Ok(self.result.unwrap_or(Value::Null));
        }
        let error = self.error.unwrap_or(CommandError {
            code: "unknown_error".to_string(),
            message: "command failed without an error payload".to_string(),
        });
        Err(Error::Command {
            code: error.code,
            message: error.message,
        })
    }
}

/// The `auth` frame.
pub fn auth_frame(token: &str) -> Value {
    json!({ "type": "auth", "access_token": token })
}

/// A command frame: `params` are merged next to `id` and `type`.
pub fn command_frame(id: u64, command_type: &str, params: Map<String, Value>) -> Value {
    let mut frame = params;
    frame.insert("id".to_string(), json!(id));
    frame.insert("type".to_string(), json!(command_type));
    Value::Object(frame)
}

/// Client for `ws(s)://<host>/api/websocket`.
#[derive(Debug)]
pub struct WsClient {
    url: String,
    token: String,
    next_id: AtomicU64,
    timeout: Duration,
}

impl WsClient {
    /// Create a client; no connection is made until a command is sent.
    pub fn new(url: &str, token: &str) -> Result<Self> {
        let url = url.trim();
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(Error::config(format!(
                "Home Assistant websocket URL must start with ws:// or wss://, got '{url}'"
            )));
        }
        Ok(Self {
            url: url.to_string(),
            token: token.to_string(),
            next_id: AtomicU64::new(1),
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Override the limit for one command exchange.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The websocket URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Authenticate, send one command and return its result.
    pub async fn send_command(&self, command_type: &str, params: Map<String, Value>) -> Result<Value> {
        tokio::time::timeout(self.timeout, self.exchange(command_type, params))
            .await
            .map_err(|_| {
                log::warn!("websocket command {command_type} timed out after {:?}", self.timeout);
                Error::Timeout {
                    operation: command_type.to_string(),
                    after: self.timeout,
                }
            })?
    }

    async fn exchange(&self, command_type: &str, params: Map<String, Value>) -> Result<Value> {
        let (mut socket, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;

        let outcome: Result<Value> = async {
            let hello = next_frame(&mut socket).await?;
            if hello.kind != "auth_required" {
                return Err(Error::protocol(format!(
                    "expected auth_required, got '{}'",
                    hello.kind
                )));
            }

            socket
                .send(Message::text(auth_frame(&self.token).to_string()))
                .await?;
            let auth = next_frame(&mut socket).await?;
            if auth.kind != "auth_ok" {
                return Err(Error::Auth {
                    message: auth
                        .message
                        .unwrap_or_else(|| format!("unexpected '{}' frame", auth.kind)),
                });
            }

            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            log::debug!("websocket command #{id}: {command_type}");
            socket
                .send(Message::text(command_frame(id, command_type, params).to_string()))
                .await?;

            loop {
                let frame = next_frame(&mut socket).await?;
                if frame.kind == "result" && frame.id == Some(id) {
                    return frame.into_result();
                }
            }
        }
        .await;

        if let Err(e) = socket.close(None).await {
            log::debug!("websocket close failed: {e}");
        }
        outcome
    }

    /// `lovelace/dashboards/list`
    pub async fn lovelace_dashboards(&self) -> Result<Vec<DashboardInfo>> {
        let result = self
            .send_command("lovelace/dashboards/list", Map::new())
            .await?;
        if result.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(result)?)
    }

    /// `lovelace/config`, for the default dashboard when `url_path` is `None`.
    pub async fn lovelace_config(&self, url_path: Option<&str>) -> Result<LovelaceConfig> {
        let mut params = Map::new();
        if let Some(path) = url_path {
            params.insert("url_path".to_string(), json!(path));
        }
        let result = self.send_command("lovelace/config", params).await?;
        Ok(serde_json::from_value(result)?)
    }
}

async fn next_frame<S>(socket: &mut S) -> Result<Incoming>
where
    S: futures::Stream<Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>>
        + Unpin,
{
    while let Some(message) = socket.next().await {
        match message? {
            Message::Text(text) => return Incoming::parse(text.as_str()),
            Message::Close(_) => break,
            _ => continue,
        }
    }
    Err(Error::protocol("connection closed by Home Assistant"))
}
