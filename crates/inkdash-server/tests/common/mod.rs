//! Common test utilities: an in-memory Home Assistant and request helpers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use inkdash_client::{Area, Error, HomeAssistant, Result};
use inkdash_core::{DashboardInfo, EntityState, IconMode, LovelaceConfig};
use inkdash_server::{AppState, InkdashConfig, router};
use tower::ServiceExt;

/// Home Assistant double with canned data.
#[derive(Default)]
pub struct FakeHomeAssistant {
    pub states: Vec<EntityState>,
    pub areas: Vec<Area>,
    pub area_entities: HashMap<String, Vec<String>>,
    pub dashboards: Vec<DashboardInfo>,
    pub configs: HashMap<String, LovelaceConfig>,
    /// Every REST call fails, as if Home Assistant were down.
    pub offline: bool,
    /// Service calls received, as `domain.service entity_id`.
    pub calls: Mutex<Vec<String>>,
}

impl FakeHomeAssistant {
    /// A small house: kitchen light, office switch, hall sensor and a media player.
    pub fn house() -> Self {
        Self {
            states: vec![
                EntityState::new("light.kitchen", "on").with_attribute("friendly_name", "Kitchen"),
                EntityState::new("switch.office", "off")
                    .with_attribute("friendly_name", "Office fan"),
                EntityState::new("sensor.hall", "21.5")
                    .with_attribute("friendly_name", "Hall")
                    .with_attribute("unit_of_measurement", "°C"),
                EntityState::new("media_player.tv", "playing"),
            ],
            areas: vec![
                Area {
                    id: "kitchen".to_string(),
                    name: "Kitchen".to_string(),
                },
                Area {
                    id: "attic".to_string(),
                    name: "Attic".to_string(),
                },
            ],
            area_entities: HashMap::from([
                ("kitchen".to_string(), vec!["light.kitchen".to_string()]),
                ("attic".to_string(), Vec::new()),
            ]),
            dashboards: vec![DashboardInfo {
                id: "dashboard_oscar".to_string(),
                title: Some("Oscar".to_string()),
                url_path: Some("dashboard-oscar".to_string()),
            }],
            configs: HashMap::from([("dashboard-oscar".to_string(), oscar_config())]),
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::house()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            Err(Error::protocol("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl HomeAssistant for FakeHomeAssistant {
    async fn states(&self) -> Result<Vec<EntityState>> {
        self.check_online()?;
        Ok(self.states.clone())
    }

    async fn areas(&self) -> Result<Vec<Area>> {
        self.check_online()?;
        Ok(self.areas.clone())
    }

    async fn area_entities(&self, area_id: &str) -> Result<Vec<String>> {
        self.check_online()?;
        Ok(self.area_entities.get(area_id).cloned().unwrap_or_default())
    }

    async fn call_service(&self, domain: &str, service: &str, entity_id: &str) -> Result<()> {
        self.check_online()?;
        self.calls
            .lock()
            .unwrap()
            .push(format!("{domain}.{service} {entity_id}"));
        Ok(())
    }

    async fn lovelace_dashboards(&self) -> Result<Vec<DashboardInfo>> {
        self.check_online()?;
        Ok(self.dashboards.clone())
    }

    async fn lovelace_config(&self, url_path: Option<&str>) -> Result<LovelaceConfig> {
        self.check_online()?;
        self.configs
            .get(url_path.unwrap_or_default())
            .cloned()
            .ok_or(Error::Command {
                code: "config_not_found".to_string(),
                message: "No config found.".to_string(),
            })
    }
}

/// A sections view and a classic view.
pub fn oscar_config() -> LovelaceConfig {
    serde_json::from_str(
        r#"{"views": [
            {"title": "Ada", "path": "ada", "type": "sections", "max_columns": 2,
             "sections": [
                {"type": "grid", "cards": [
                    {"type": "heading", "heading": "Lights"},
                    {"type": "tile", "entity": "light.kitchen"},
                    {"type": "tile", "entity": "light.gone"}
                ]},
                {"type": "grid", "cards": [
                    {"type": "entities", "title": "Climate", "entities": ["sensor.hall"]}
                ]}
             ]},
            {"title": "Energy", "path": "energy",
             "cards": [{"type": "button", "entity": "switch.office"}]}
        ]}"#,
    )
    .expect("valid lovelace config")
}

/// Config used by the harness: ASCII icons so pages can be matched as text.
pub fn test_config() -> InkdashConfig {
    let mut config = InkdashConfig::default();
    config.display.icon_mode = IconMode::Ascii;
    config
}

/// Router plus the fake behind it.
pub struct TestApp {
    pub router: Router,
    pub ha: Arc<FakeHomeAssistant>,
}

impl TestApp {
    pub fn new(ha: FakeHomeAssistant) -> Self {
        Self::with_config(ha, &test_config())
    }

    pub fn with_config(ha: FakeHomeAssistant, config: &InkdashConfig) -> Self {
        let ha = Arc::new(ha);
        let state = AppState::new(ha.clone(), config).expect("valid test config");
        Self {
            router: router(state),
            ha,
        }
    }

    /// GET a URI and return status, `Location` header and body.
    pub async fn get(&self, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Response {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            bytes: bytes.to_vec(),
        }
    }
}

/// What a test inspects of a response.
pub struct Response {
    pub status: StatusCode,
    pub location: Option<String>,
    /// Body decoded as UTF-8, lossily for binary files.
    pub body: String,
    pub bytes: Vec<u8>,
}
