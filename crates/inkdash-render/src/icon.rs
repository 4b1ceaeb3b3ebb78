//! Icon markup.

use inkdash_core::{Representation, ResolvedIcon};

use crate::html::escape;

/// URL prefix of the bundled icon PNGs.
pub const DEFAULT_ICON_BASE: &str = "/static/icons/";

/// Turns resolved icons into markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRenderer {
    base_url: String,
    size: u32,
}

impl IconRenderer {
    /// Renderer for icons served under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url, size: 48 }
    }

    /// Set the pixel size of image icons.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// URL of an icon image.
    pub fn image_url(&self, file: &str) -> String {
        format!("{}{}", self.base_url, file)
    }

    /// Markup for one icon. The label always ends up as alt text or title.
    pub fn render(&self, icon: &ResolvedIcon) -> String {
        let label = escape(&icon.label);
        match &icon.representation {
            Representation::Image(file) => format!(
                r#"<img class="icon" src="{}" alt="{label}" width="{size}" height="{size}">"#,
                escape(&self.image_url(file)),
                size = self.size,
            ),
            Representation::Ascii(token) => format!(
                r#"<span class="icon icon-ascii" title="{label}">{}</span>"#,
                escape(token)
            ),
            Representation::Text(text) => {
                format!(r#"<span class="icon icon-text">{}</span>"#, escape(text))
            }
        }
    }
}

impl Default for IconRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_BASE)
    }
}
