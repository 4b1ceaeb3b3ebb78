//! Server configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. defaults
//! 2. the TOML config file
//! 3. sectioned variables `INKDASH_<SECTION>_<KEY>` for the `home_assistant`,
//!    `server` and `display` sections, e.g. `INKDASH_SERVER_PORT`
//! 4. the variable names of existing container deployments (below)
//!
//! A `.env` file in the working directory (or a parent) is read into the
//! environment first; variables already set are kept.
//!
//! | variable                | key                           |
//! |-------------------------|-------------------------------|
//! | `HA_URL`                | `home_assistant.url`          |
//! | `HA_WS_URL`             | `home_assistant.ws_url`       |
//! | `HA_TOKEN`              | `home_assistant.token`        |
//! | `AUTO_REFRESH_INTERVAL` | `page.auto_refresh`           |
//! | `THEME`                 | `page.theme`                  |
//! | `GRID_COLUMNS`          | `page.grid_columns`           |
//! | `SHOW_BACK_BUTTON`      | `page.show_back_button`       |
//! | `SHOW_LAST_UPDATE`      | `page.show_last_update`       |
//! | `ICON_MODE`             | `display.icon_mode`           |
//! | `INKDASH_HOST`          | `server.host`                 |
//! | `INKDASH_PORT`          | `server.port`                 |

use std::net::SocketAddr;
use std::path::PathBuf;

use inkdash_core::{
    ColumnPreference, IconMap, IconMode, IconOverride, IconResolver, LayoutSelector, ScreenProfile,
    layout::DEFAULT_BREAKPOINT,
};
use inkdash_render::{PageOptions, Theme};
use confyg::{Confygery, env};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "INKDASH_CONFIG";

/// Prefix of the sectioned environment variables.
pub const ENV_PREFIX: &str = "inkdash";

/// Sections that sectioned environment variables may set.
pub const ENV_SECTIONS: [&str; 3] = ["home_assistant", "server", "display"];

/// Connection to Home Assistant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeAssistantConfig {
    /// REST base URL, e.g. `http://homeassistant.local:8123`.
    pub url: String,
    /// Websocket URL; derived from `url` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_url: Option<String>,
    /// Long-lived access token.
    pub token: String,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    #[serde(deserialize_with = "lenient::number")]
    pub port: u16,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10010,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Target display and icon rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Which icon rendition pages use.
    pub icon_mode: IconMode,
    /// Built-in screen profile name.
    pub screen: String,
    /// Explicit screen width; overrides `screen` together with `screen_height`.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_number"
    )]
    pub screen_width: Option<u32>,
    /// Explicit screen height.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_number"
    )]
    pub screen_height: Option<u32>,
    /// Width from which sections go side by side.
    #[serde(deserialize_with = "lenient::number")]
    pub breakpoint: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            icon_mode: IconMode::Image,
            screen: ScreenProfile::kindle_1264().name,
            screen_width: None,
            screen_height: None,
            breakpoint: DEFAULT_BREAKPOINT,
        }
    }
}

/// Complete inkdash configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InkdashConfig {
    /// Home Assistant connection.
    pub home_assistant: HomeAssistantConfig,
    /// HTTP listener.
    pub server: ServerConfig,
    /// Display settings.
    pub display: DisplayConfig,
    /// Page options.
    pub page: PageOptions,
    /// Device icon overrides.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub icons: Vec<IconOverride>,
    /// Area icon overrides (`domain` holds the area id).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub area_icons: Vec<IconOverride>,
}

impl InkdashConfig {
    /// Name used in messages and the config directory.
    pub fn project_name() -> &'static str {
        "inkdash"
    }

    /// `<config dir>/inkdash/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::project_name()).join("config.toml"))
    }

    /// Explicit path, then `INKDASH_CONFIG`, then the default location.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Parse TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("invalid config: {e}")))
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Load `.env`, the file (if present) and environment overrides.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        load_dotenv();
        let content = match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => {
                log::debug!("Loading config from {}", path.display());
                std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?
            }
            Some(path) if explicit.is_some() => {
                return Err(Error::config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            _ => String::new(),
        };
        let mut config = Self::layered(&content)?;
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Merge the file contents with the sectioned `INKDASH_*` variables.
    fn layered(content: &str) -> Result<Self> {
        let mut opts = env::Options::with_top_level(ENV_PREFIX);
        for section in ENV_SECTIONS {
            opts.add_section(section);
        }
        let config: Self = (|| {
            Confygery::new()?
                .add_str(content)?
                .add_env(opts)?
                .build()
        })()
        .map_err(|e| Error::config(format!("invalid config: {e}")))?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("HA_URL") {
            self.home_assistant.url = url;
        }
        if let Some(ws_url) = get("HA_WS_URL") {
            self.home_assistant.ws_url = Some(ws_url);
        }
        if let Some(token) = get("HA_TOKEN") {
            self.home_assistant.token = token;
        }
        if let Some(value) = get("AUTO_REFRESH_INTERVAL") {
            self.page.auto_refresh = parse_env("AUTO_REFRESH_INTERVAL", &value)?;
        }
        if let Some(value) = get("THEME") {
            self.page.theme = value.parse::<Theme>()?;
        }
        if let Some(value) = get("GRID_COLUMNS") {
            self.page.grid_columns = value.parse::<ColumnPreference>()?;
        }
        if let Some(value) = get("SHOW_BACK_BUTTON") {
            self.page.show_back_button = value.trim().eq_ignore_ascii_case("true");
        }
        if let Some(value) = get("SHOW_LAST_UPDATE") {
            self.page.show_last_update = value.trim().eq_ignore_ascii_case("true");
        }
        if let Some(value) = get("ICON_MODE") {
            self.display.icon_mode = value.parse::<IconMode>()?;
        }
        if let Some(host) = get("INKDASH_HOST") {
            self.server.host = host;
        }
        if let Some(value) = get("INKDASH_PORT") {
            self.server.port = parse_env("INKDASH_PORT", &value)?;
        }
        Ok(())
    }

    /// Check that everything needed to serve is present.
    pub fn validate(&self) -> Result<()> {
        if self.home_assistant.url.trim().is_empty() {
            return Err(Error::config(
                "Home Assistant URL is not set (HA_URL or home_assistant.url)",
            ));
        }
        if self.home_assistant.token.trim().is_empty() {
            return Err(Error::config(
                "Home Assistant token is not set (HA_TOKEN or home_assistant.token)",
            ));
        }
        self.ws_url()?;
        self.screen()?;
        self.layout_selector()?;
        self.resolver()?;
        Ok(())
    }

    /// Websocket URL, derived from the REST URL when not configured.
    pub fn ws_url(&self) -> Result<String> {
        match &self.home_assistant.ws_url {
            Some(url) => Ok(url.clone()),
            None => Ok(inkdash_client::websocket_url(&self.home_assistant.url)?),
        }
    }

    /// The target screen.
    pub fn screen(&self) -> Result<ScreenProfile> {
        match (self.display.screen_width, self.display.screen_height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => {
                Ok(ScreenProfile::custom("custom", width, height, 300))
            }
            (Some(_), _) | (_, Some(_)) => Err(Error::config(
                "screen_width and screen_height must both be set and positive",
            )),
            (None, None) => ScreenProfile::by_name(&self.display.screen).ok_or_else(|| {
                let known: Vec<String> = ScreenProfile::builtin().into_iter().map(|p| p.name).collect();
                Error::config(format!(
                    "unknown screen '{}' (known: {})",
                    self.display.screen,
                    known.join(", ")
                ))
            }),
        }
    }

    /// Layout selector with the configured breakpoint and grid columns.
    pub fn layout_selector(&self) -> Result<LayoutSelector> {
        Ok(LayoutSelector::new(self.display.breakpoint)?.with_entity_columns(self.page.grid_columns))
    }

    /// Icon resolver with overrides applied.
    pub fn resolver(&self) -> Result<IconResolver> {
        let mut devices = IconMap::builtin();
        devices.apply_overrides(&self.icons)?;
        let mut areas = IconMap::builtin_areas();
        areas.apply_overrides(&self.area_icons)?;
        Ok(IconResolver::new(devices, areas, self.display.icon_mode))
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                Error::config(format!(
                    "invalid bind address {}:{}: {e}",
                    self.server.host, self.server.port
                ))
            })
    }

    /// The configuration as the environment variables a container would use.
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            ("HA_URL".to_string(), self.home_assistant.url.clone()),
            ("HA_TOKEN".to_string(), self.home_assistant.token.clone()),
        ];
        if let Some(ws_url) = &self.home_assistant.ws_url {
            vars.push(("HA_WS_URL".to_string(), ws_url.clone()));
        }
        vars.extend([
            ("AUTO_REFRESH_INTERVAL".to_string(), self.page.auto_refresh.to_string()),
            ("THEME".to_string(), self.page.theme.to_string()),
            ("GRID_COLUMNS".to_string(), self.page.grid_columns.to_string()),
            ("SHOW_BACK_BUTTON".to_string(), self.page.show_back_button.to_string()),
            ("SHOW_LAST_UPDATE".to_string(), self.page.show_last_update.to_string()),
            ("ICON_MODE".to_string(), self.display.icon_mode.to_string()),
            ("INKDASH_HOST".to_string(), self.server.host.clone()),
            ("INKDASH_PORT".to_string(), self.server.port.to_string()),
        ]);
        vars
    }
}

/// Read `.env` into the process environment; returns the file used.
///
/// Variables that are already set keep their values.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            log::debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            log::warn!("Ignoring unreadable .env file: {e}");
            None
        }
    }
}

/// Numbers that may arrive as strings from environment variables.
mod lenient {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString<T> {
        Number(T),
        String(String),
    }

    fn parse<T, E>(value: NumberOrString<T>) -> std::result::Result<T, E>
    where
        T: FromStr,
        T::Err: Display,
        E: serde::de::Error,
    {
        match value {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s.trim().parse().map_err(E::custom),
        }
    }

    pub fn number<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        parse(NumberOrString::deserialize(deserializer)?)
    }

    pub fn optional_number<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        Option::<NumberOrString<T>>::deserialize(deserializer)?
            .map(parse::<T, D::Error>)
            .transpose()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(format!("{key}: invalid value '{value}': {e}")))
}
