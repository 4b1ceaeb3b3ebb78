//! The `HomeAssistant` trait and its live implementation.
//!
//! Pages are built against the trait so that the server can be exercised
//! without a running Home Assistant.

use async_trait::async_trait;
use inkdash_core::{DashboardInfo, EntityState, LovelaceConfig, entity::entity_domain};

use crate::rest::{Area, RestClient};
use crate::ws::WsClient;
use crate::{Error, Result};

/// Everything inkdash asks of Home Assistant.
#[async_trait]
pub trait HomeAssistant: Send + Sync {
    /// Current state of every entity.
    async fn states(&self) -> Result<Vec<EntityState>>;

    /// Named areas.
    async fn areas(&self) -> Result<Vec<Area>>;

    /// Entity ids of an area (`all` for every entity).
    async fn area_entities(&self, area_id: &str) -> Result<Vec<String>>;

    /// Call `domain.service` on one entity.
    async fn call_service(&self, domain: &str, service: &str, entity_id: &str) -> Result<()>;

    /// Registered Lovelace dashboards.
    async fn lovelace_dashboards(&self) -> Result<Vec<DashboardInfo>>;

    /// Configuration of a dashboard (`None` for the default one).
    async fn lovelace_config(&self, url_path: Option<&str>) -> Result<LovelaceConfig>;

    /// Toggle an entity through its own domain's `toggle` service.
    async fn toggle(&self, entity_id: &str) -> Result<()> {
        let domain = entity_domain(entity_id);
        if domain.is_empty() || domain == entity_id {
            return Err(inkdash_core::Error::validation_field(
                "entity_id",
                format!("'{entity_id}' has no domain"),
            )
            .into());
        }
        self.call_service(domain, "toggle", entity_id).await
    }
}

/// REST + websocket client for a live Home Assistant.
#[derive(Debug)]
pub struct HaClient {
    rest: RestClient,
    ws: WsClient,
}

impl HaClient {
    /// Build a client from the REST base URL, websocket URL and access token.
    pub fn new(base_url: &str, ws_url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            rest: RestClient::new(base_url, token)?,
            ws: WsClient::new(ws_url, token)?,
        })
    }

    /// Build from pre-configured parts.
    pub fn from_parts(rest: RestClient, ws: WsClient) -> Self {
        Self { rest, ws }
    }

    /// The REST client.
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// The websocket client.
    pub fn ws(&self) -> &WsClient {
        &self.ws
    }
}

/// Websocket URL for a REST base URL: `http(s)://host` → `ws(s)://host/api/websocket`.
pub fn websocket_url(base_url: &str) -> Result<String> {
    let base = base_url.trim().trim_end_matches('/');
    let ws = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(Error::config(format!(
            "cannot derive a websocket URL from '{base_url}'"
        )));
    };
    Ok(format!("{ws}/api/websocket"))
}

#[async_trait]
impl HomeAssistant for HaClient {
    async fn states(&self) -> Result<Vec<EntityState>> {
        self.rest.states().await
    }

    async fn areas(&self) -> Result<Vec<Area>> {
        self.rest.areas().await
    }

    async fn area_entities(&self, area_id: &str) -> Result<Vec<String>> {
        self.rest.area_entities(area_id).await
    }

    async fn call_service(&self, domain: &str, service: &str, entity_id: &str) -> Result<()> {
        let changed = self.rest.call_service(domain, service, entity_id).await?;
        log::debug!("{domain}.{service} changed {} entities", changed.len());
        Ok(())
    }

    async fn lovelace_dashboards(&self) -> Result<Vec<DashboardInfo>> {
        self.ws.lovelace_dashboards().await
    }

    async fn lovelace_config(&self, url_path: Option<&str>) -> Result<LovelaceConfig> {
        self.ws.lovelace_config(url_path).await
    }
}
