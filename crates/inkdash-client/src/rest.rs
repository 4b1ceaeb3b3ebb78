//! Home Assistant REST API client.
//!
//! Connection failures are retried with exponential backoff (three attempts,
//! starting at 500 ms); anything that reached the server is returned as is.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use inkdash_core::EntityState;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Upper bound for one request, REST or websocket.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A Home Assistant area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Area id, e.g. `kuchnia`.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Retry settings for connection failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries.
    pub max_retries: usize,
    /// Delay before the first retry.
    pub min_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_times(self.max_retries)
    }
}

/// Template listing `[area_id, area_name]` pairs in one round trip.
const AREAS_TEMPLATE: &str = "{% set ns = namespace(items=[]) %}\
{% for a in areas() %}{% set ns.items = ns.items + [[a, area_name(a)]] %}{% endfor %}\
{{ ns.items | tojson }}";

const ALL_ENTITIES_TEMPLATE: &str = "{{ states | map(attribute='entity_id') | list | tojson }}";

/// Thin client for `/api/*` endpoints.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    retry: RetryPolicy,
}

impl RestClient {
    /// Create a client for `base_url` (e.g. `http://homeassistant.local:8123`).
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::config(format!(
                "Home Assistant URL must start with http:// or https://, got '{base_url}'"
            )));
        }
        if token.trim().is_empty() {
            return Err(Error::config("Home Assistant token is empty"));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            token: token.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Absolute URL of an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn with_retry_on_connect<T, F, Fut>(&self, what: &str, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        op.retry(self.retry.backoff())
            .when(Error::is_retryable)
            .notify(|err, delay| {
                log::warn!("{what} failed ({err}), retrying in {delay:?}");
            })
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let (http, url, token) = (&self.http, &url, &self.token);
        self.with_retry_on_connect(path, || async move {
            let response = http
                .get(url)
                .bearer_auth(token)
                .send()
                .await?
                .error_for_status()?;
            Ok(response.json::<T>().await?)
        })
        .await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &serde_json::Value) -> Result<T> {
        let url = self.url(path);
        let (http, url, token) = (&self.http, &url, &self.token);
        self.with_retry_on_connect(path, || async move {
            let response = http
                .post(url)
                .bearer_auth(token)
                .json(body)
                .send()
                .await?
                .error_for_status()?;
            Ok(response.json::<T>().await?)
        })
        .await
    }

    /// `GET /api/states`
    pub async fn states(&self) -> Result<Vec<EntityState>> {
        self.get_json("api/states").await
    }

    /// `GET /api/states/{entity_id}`
    pub async fn state(&self, entity_id: &str) -> Result<EntityState> {
        validate_identifier("entity_id", entity_id)?;
        self.get_json(&format!("api/states/{entity_id}")).await
    }

    /// `POST /api/services/{domain}/{service}` for one entity.
    ///
    /// Returns the states Home Assistant reports as changed.
    pub async fn call_service(
        &self,
        domain: &str,
        service: &str,
        entity_id: &str,
    ) -> Result<Vec<EntityState>> {
        validate_identifier("domain", domain)?;
        validate_identifier("service", service)?;
        validate_identifier("entity_id", entity_id)?;
        log::info!("Calling {domain}.{service} on {entity_id}");
        self.post_json(
            &format!("api/services/{domain}/{service}"),
            &serde_json::json!({ "entity_id": entity_id }),
        )
        .await
    }

    /// `POST /api/template`, parsing the rendered text as JSON.
    pub async fn render_template<T: DeserializeOwned>(&self, template: &str) -> Result<T> {
        let url = self.url("api/template");
        let body = serde_json::json!({ "template": template });
        let (http, url, token, body) = (&self.http, &url, &self.token, &body);
        let text = self
            .with_retry_on_connect("api/template", || async move {
                let response = http
                    .post(url)
                    .bearer_auth(token)
                    .json(body)
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.text().await?)
            })
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// All named areas.
    pub async fn areas(&self) -> Result<Vec<Area>> {
        let pairs: Vec<(String, Option<String>)> = self.render_template(AREAS_TEMPLATE).await?;
        Ok(areas_from_pairs(pairs))
    }

    /// Entity ids of an area; `all` lists every entity.
    pub async fn area_entities(&self, area_id: &str) -> Result<Vec<String>> {
        self.render_template(&area_entities_template(area_id)?).await
    }
}

fn areas_from_pairs(pairs: Vec<(String, Option<String>)>) -> Vec<Area> {
    pairs
        .into_iter()
        .filter_map(|(id, name)| match name {
            Some(name) if !name.is_empty() && name != "null" => Some(Area { id, name }),
            _ => None,
        })
        .collect()
}

fn area_entities_template(area_id: &str) -> Result<String> {
    if area_id == "all" {
        return Ok(ALL_ENTITIES_TEMPLATE.to_string());
    }
    validate_identifier("area_id", area_id)?;
    Ok(format!("{{{{ area_entities('{area_id}') | tojson }}}}"))
}

/// Ids are interpolated into URLs and templates; only Home Assistant's own
/// slug alphabet is accepted.
fn validate_identifier(field: &str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(())
    } else {
        Err(inkdash_core::Error::validation_field(field, format!("invalid identifier '{value}'")).into())
    }
}
