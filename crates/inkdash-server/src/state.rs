//! Shared request state.

use std::path::PathBuf;
use std::sync::Arc;

use inkdash_client::{HaClient, HomeAssistant};
use inkdash_core::{IconResolver, LayoutSelector, ScreenProfile};
use inkdash_render::{IconRenderer, PageOptions};

use crate::Result;
use crate::config::InkdashConfig;

/// Everything handlers need; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Home Assistant access.
    pub ha: Arc<dyn HomeAssistant>,
    inner: Arc<Settings>,
}

struct Settings {
    resolver: IconResolver,
    icons: IconRenderer,
    selector: LayoutSelector,
    screen: ScreenProfile,
    page: PageOptions,
    static_dir: PathBuf,
}

impl AppState {
    /// State backed by the given Home Assistant implementation.
    pub fn new(ha: Arc<dyn HomeAssistant>, config: &InkdashConfig) -> Result<Self> {
        let inner = Settings {
            resolver: config.resolver()?,
            icons: IconRenderer::default(),
            selector: config.layout_selector()?,
            screen: config.screen()?,
            page: config.page.clone(),
            static_dir: config.server.static_dir.clone(),
        };
        Ok(Self {
            ha,
            inner: Arc::new(inner),
        })
    }

    /// State talking to the Home Assistant instance in the config.
    pub fn connect(config: &InkdashConfig) -> Result<Self> {
        config.validate()?;
        let client = HaClient::new(
            &config.home_assistant.url,
            &config.ws_url()?,
            &config.home_assistant.token,
        )?;
        Self::new(Arc::new(client), config)
    }

    /// Icon resolver.
    pub fn resolver(&self) -> &IconResolver {
        &self.inner.resolver
    }

    /// Icon markup renderer.
    pub fn icons(&self) -> &IconRenderer {
        &self.inner.icons
    }

    /// Layout selector.
    pub fn selector(&self) -> &LayoutSelector {
        &self.inner.selector
    }

    /// Default target screen.
    pub fn screen(&self) -> &ScreenProfile {
        &self.inner.screen
    }

    /// Page options.
    pub fn page(&self) -> &PageOptions {
        &self.inner.page
    }

    /// Directory served under `/static`.
    pub fn static_dir(&self) -> &PathBuf {
        &self.inner.static_dir
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("screen", &self.inner.screen)
            .field("page", &self.inner.page)
            .finish_non_exhaustive()
    }
}
