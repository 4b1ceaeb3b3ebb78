//! E-ink-safe icon resolution.
//!
//! The Kindle browser renders PNG images, ASCII and plain text reliably, but
//! not emoji, SVG or icon fonts. Every entry in an [`IconMap`] therefore
//! carries three renditions (image file, ASCII token, text label) and the
//! active [`IconMode`] picks one of them.
//!
//! # Example
//!
//! ```rust
//! use inkdash_core::icons::{IconMode, IconResolver, Representation};
//!
//! let resolver = IconResolver::kindle_safe();
//! let icon = resolver.resolve("light", "on", None);
//! assert_eq!(icon.representation, Representation::Image("light_on.png".into()));
//!
//! let ascii = IconResolver::kindle_safe().with_mode(IconMode::Ascii);
//! assert_eq!(ascii.resolve("light", "on", None).representation.as_str(), "[O]");
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ============================================================================
// Mode and representation
// ============================================================================

/// Which rendition of an icon entry is emitted.
///
/// Config files and the environment accept the same spellings: both go
/// through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IconMode {
    /// Static PNG image under the icon base URL.
    #[default]
    Image,
    /// ASCII bracket token such as `[O]`.
    Ascii,
    /// Short text label such as `Light on`.
    Text,
}

impl fmt::Display for IconMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Ascii => write!(f, "ascii"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl FromStr for IconMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" | "png" | "kindle-safe" => Ok(Self::Image),
            "ascii" => Ok(Self::Ascii),
            "text" => Ok(Self::Text),
            other => Err(Error::validation_field(
                "icon_mode",
                format!("unknown icon mode '{other}' (expected image, ascii or text)"),
            )),
        }
    }
}

impl TryFrom<String> for IconMode {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<IconMode> for String {
    fn from(mode: IconMode) -> Self {
        mode.to_string()
    }
}

/// A renderable icon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Representation {
    /// PNG file name, relative to the icon base URL.
    Image(String),
    /// ASCII bracket token.
    Ascii(String),
    /// Short text label.
    Text(String),
}

impl Representation {
    /// The raw value (file name, token or label).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Image(s) | Self::Ascii(s) | Self::Text(s) => s,
        }
    }

    /// The mode this representation belongs to.
    pub fn mode(&self) -> IconMode {
        match self {
            Self::Image(_) => IconMode::Image,
            Self::Ascii(_) => IconMode::Ascii,
            Self::Text(_) => IconMode::Text,
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Entries and keys
// ============================================================================

/// The three renditions of one icon plus its accessible label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconEntry {
    /// PNG file name.
    pub image: String,
    /// ASCII token.
    pub ascii: String,
    /// Human-readable label, also used as alt text.
    pub label: String,
}

impl IconEntry {
    /// Create an entry from its three renditions.
    pub fn new(
        image: impl Into<String>,
        ascii: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            image: image.into(),
            ascii: ascii.into(),
            label: label.into(),
        }
    }

    /// The rendition for `mode`.
    pub fn representation(&self, mode: IconMode) -> Representation {
        match mode {
            IconMode::Image => Representation::Image(self.image.clone()),
            IconMode::Ascii => Representation::Ascii(self.ascii.clone()),
            IconMode::Text => Representation::Text(self.label.clone()),
        }
    }

    /// Whether `repr` is one of this entry's renditions.
    pub fn matches(&self, repr: &Representation) -> bool {
        match repr {
            Representation::Image(s) => *s == self.image,
            Representation::Ascii(s) => *s == self.ascii,
            Representation::Text(s) => *s == self.label,
        }
    }

    /// Check that the entry only uses glyphs the e-ink browser can show.
    pub fn validate(&self) -> Result<()> {
        if !self.ascii.is_ascii() || self.ascii.trim().is_empty() {
            return Err(Error::validation_field(
                "ascii",
                format!("'{}' is not a printable ASCII token", self.ascii),
            ));
        }
        if !self.image.is_ascii() || !self.image.to_ascii_lowercase().ends_with(".png") {
            return Err(Error::validation_field(
                "image",
                format!("'{}' is not a PNG file name", self.image),
            ));
        }
        if self.label.trim().is_empty() || !is_eink_safe(&self.label) {
            return Err(Error::validation_field(
                "label",
                format!("'{}' contains glyphs the e-ink browser cannot render", self.label),
            ));
        }
        Ok(())
    }
}

/// State part of an [`IconKey`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateMatch {
    /// Matches one state exactly (after normalization).
    Exact(String),
    /// Matches every state of the domain.
    Any,
}

/// Lookup key of an [`IconMap`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IconKey {
    /// Entity domain, e.g. `light`.
    pub domain: String,
    /// State selector.
    pub state: StateMatch,
}

impl IconKey {
    /// Key for an exact domain/state pair.
    pub fn exact(domain: &str, state: &str) -> Self {
        Self {
            domain: domain.to_ascii_lowercase(),
            state: StateMatch::Exact(state.to_ascii_lowercase()),
        }
    }

    /// Wildcard key for every state of a domain.
    pub fn any(domain: &str) -> Self {
        Self {
            domain: domain.to_ascii_lowercase(),
            state: StateMatch::Any,
        }
    }
}

impl fmt::Display for IconKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            StateMatch::Exact(state) => write!(f, "{}/{state}", self.domain),
            StateMatch::Any => write!(f, "{}/*", self.domain),
        }
    }
}

/// A user-supplied entry layered on top of the built-in table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconOverride {
    /// Entity domain (or area id for area overrides).
    pub domain: String,
    /// Exact state; `None` matches every state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// PNG file name.
    pub image: String,
    /// ASCII token.
    pub ascii: String,
    /// Text label.
    pub label: String,
}

impl IconOverride {
    fn key(&self) -> IconKey {
        match &self.state {
            Some(state) => IconKey::exact(&self.domain, state),
            None => IconKey::any(&self.domain),
        }
    }

    fn entry(&self) -> IconEntry {
        IconEntry::new(&self.image, &self.ascii, &self.label)
    }
}

// ============================================================================
// IconMap
// ============================================================================

/// Statically initialized `(domain, state)` → [`IconEntry`] table with an
/// explicit default entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconMap {
    entries: BTreeMap<IconKey, IconEntry>,
    default: IconEntry,
}

/// Documented device entries: (domain, state or `None` for any, image, ascii, label).
const DEVICE_ICONS: &[(&str, Option<&str>, &str, &str, &str)] = &[
    ("light", Some("on"), "light_on.png", "[O]", "Light on"),
    ("light", Some("off"), "light_off.png", "[.]", "Light off"),
    ("switch", Some("on"), "switch_on.png", "[I]", "Switch on"),
    ("switch", Some("off"), "switch_off.png", "[0]", "Switch off"),
    ("fan", Some("on"), "fan_on.png", "[*]", "Fan on"),
    ("fan", Some("off"), "fan_off.png", "[o]", "Fan off"),
    ("vacuum", Some("on"), "vacuum_on.png", "[V]", "Vacuum running"),
    ("vacuum", Some("off"), "vacuum_off.png", "[v]", "Vacuum docked"),
    ("climate", None, "climate.png", "[T]", "Thermostat"),
    ("lock", Some("locked"), "lock_locked.png", "[L]", "Locked"),
    ("lock", Some("unlocked"), "lock_unlocked.png", "[U]", "Unlocked"),
    ("cover", Some("open"), "cover_open.png", "[^]", "Blind open"),
    ("cover", Some("closed"), "cover_closed.png", "[_]", "Blind closed"),
    ("sensor", None, "sensor.png", "[#]", "Sensor"),
];

/// Area entries for the rooms overview.
const AREA_ICONS: &[(&str, &str, &str, &str)] = &[
    ("kitchen", "area_kitchen.png", "[K]", "Kitchen"),
    ("kuchnia", "area_kitchen.png", "[K]", "Kitchen"),
    ("bathroom", "area_bathroom.png", "[B]", "Bathroom"),
    ("office", "area_office.png", "[W]", "Office"),
    ("balcony", "area_outdoor.png", "[P]", "Outdoor"),
    ("tarace", "area_outdoor.png", "[P]", "Outdoor"),
    ("terrace", "area_outdoor.png", "[P]", "Outdoor"),
];

impl IconMap {
    /// An empty map that resolves everything to `default`.
    pub fn new(default: IconEntry) -> Self {
        Self {
            entries: BTreeMap::new(),
            default,
        }
    }

    /// The built-in device table.
    pub fn builtin() -> Self {
        let mut map = Self::new(IconEntry::new("unknown.png", "[?]", "Unknown"));
        for (domain, state, image, ascii, label) in DEVICE_ICONS {
            let key = match state {
                Some(state) => IconKey::exact(domain, state),
                None => IconKey::any(domain),
            };
            map.entries.insert(key, IconEntry::new(*image, *ascii, *label));
        }
        map
    }

    /// The built-in area table.
    pub fn builtin_areas() -> Self {
        let mut map = Self::new(IconEntry::new("area.png", "[+]", "Area"));
        for (area, image, ascii, label) in AREA_ICONS {
            map.entries
                .insert(IconKey::any(area), IconEntry::new(*image, *ascii, *label));
        }
        map
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, key: IconKey, entry: IconEntry) -> Option<IconEntry> {
        self.entries.insert(key, entry)
    }

    /// Replace the default entry.
    pub fn with_default(mut self, default: IconEntry) -> Self {
        self.default = default;
        self
    }

    /// Layer validated overrides onto the map.
    pub fn apply_overrides(&mut self, overrides: &[IconOverride]) -> Result<()> {
        for item in overrides {
            let entry = item.entry();
            entry.validate()?;
            log::debug!("Icon override {} -> {}", item.key(), entry.ascii);
            self.entries.insert(item.key(), entry);
        }
        Ok(())
    }

    /// Exact match first, then the domain wildcard.
    pub fn lookup(&self, domain: &str, state: &str) -> Option<&IconEntry> {
        self.entries
            .get(&IconKey::exact(domain, state))
            .or_else(|| self.entries.get(&IconKey::any(domain)))
    }

    /// Whether the domain has any entry.
    pub fn knows_domain(&self, domain: &str) -> bool {
        let domain = domain.to_ascii_lowercase();
        self.entries.keys().any(|k| k.domain == domain)
    }

    /// The fallback entry.
    pub fn default_entry(&self) -> &IconEntry {
        &self.default
    }

    /// Iterate over all non-default entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&IconKey, &IconEntry)> {
        self.entries.iter()
    }

    /// Number of non-default entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries besides the default.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for IconMap {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Result of resolving an icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIcon {
    /// What to render.
    pub representation: Representation,
    /// Accessible label (alt text).
    pub label: String,
    /// True when the default placeholder was used.
    pub fallback: bool,
}

/// MDI identifiers that imply a device domain.
const MDI_ALIASES: &[(&str, &str)] = &[
    ("mdi:lightbulb", "light"),
    ("mdi:lightbulb-outline", "light"),
    ("mdi:lightbulb-on", "light"),
    ("mdi:ceiling-light", "light"),
    ("mdi:lamp", "light"),
    ("mdi:floor-lamp", "light"),
    ("mdi:toggle-switch", "switch"),
    ("mdi:power-socket-eu", "switch"),
    ("mdi:power-plug", "switch"),
    ("mdi:fan", "fan"),
    ("mdi:robot-vacuum", "vacuum"),
    ("mdi:thermostat", "climate"),
    ("mdi:home-thermometer", "climate"),
    ("mdi:radiator", "climate"),
    ("mdi:lock", "lock"),
    ("mdi:door-closed-lock", "lock"),
    ("mdi:blinds", "cover"),
    ("mdi:roller-shade", "cover"),
    ("mdi:window-shutter", "cover"),
    ("mdi:thermometer", "sensor"),
    ("mdi:water-percent", "sensor"),
    ("mdi:gauge", "sensor"),
];

/// Multi-valued Home Assistant states folded onto the table's states.
const STATE_ALIASES: &[(&str, &str, &str)] = &[
    ("vacuum", "cleaning", "on"),
    ("vacuum", "returning", "on"),
    ("vacuum", "docked", "off"),
    ("vacuum", "idle", "off"),
    ("vacuum", "paused", "off"),
    ("cover", "opening", "open"),
    ("cover", "closing", "closed"),
];

/// Lower-case, trim and fold state aliases.
pub fn normalize_state<'a>(domain: &str, state: &'a str) -> Cow<'a, str> {
    let trimmed = state.trim();
    let lowered: Cow<'a, str> = if trimmed.chars().any(|c| c.is_ascii_uppercase()) {
        Cow::Owned(trimmed.to_ascii_lowercase())
    } else {
        Cow::Borrowed(trimmed)
    };
    let alias = STATE_ALIASES
        .iter()
        .find(|(d, from, _)| domain.eq_ignore_ascii_case(d) && *from == lowered.as_ref())
        .map(|(_, _, to)| *to);
    match alias {
        Some(to) => Cow::Borrowed(to),
        None => lowered,
    }
}

/// The device domain implied by an `mdi:` icon identifier, if known.
pub fn mdi_domain(icon: &str) -> Option<&'static str> {
    let icon = icon.trim().to_ascii_lowercase();
    MDI_ALIASES
        .iter()
        .find(|(name, _)| *name == icon)
        .map(|(_, domain)| *domain)
}

/// Whether text avoids emoji and pictographic glyphs.
///
/// Latin letters (including diacritics), digits and ASCII punctuation pass;
/// anything from the general punctuation block upwards is rejected.
pub fn is_eink_safe(text: &str) -> bool {
    text.chars()
        .all(|c| (c as u32) < 0x2000 && !c.is_control() && c != '\u{FE0F}')
}

/// Pure, deterministic icon lookup for devices and areas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconResolver {
    devices: IconMap,
    areas: IconMap,
    mode: IconMode,
}

impl IconResolver {
    /// Create a resolver from explicit tables.
    pub fn new(devices: IconMap, areas: IconMap, mode: IconMode) -> Self {
        Self {
            devices,
            areas,
            mode,
        }
    }

    /// Built-in tables, image mode.
    pub fn kindle_safe() -> Self {
        Self::new(IconMap::builtin(), IconMap::builtin_areas(), IconMode::Image)
    }

    /// Switch the rendition mode.
    pub fn with_mode(mut self, mode: IconMode) -> Self {
        self.mode = mode;
        self
    }

    /// The active mode.
    pub fn mode(&self) -> IconMode {
        self.mode
    }

    /// The device table.
    pub fn devices(&self) -> &IconMap {
        &self.devices
    }

    /// Mutable access to the device table.
    pub fn devices_mut(&mut self) -> &mut IconMap {
        &mut self.devices
    }

    /// Mutable access to the area table.
    pub fn areas_mut(&mut self) -> &mut IconMap {
        &mut self.areas
    }

    /// Entry for a device, following the documented resolution order.
    ///
    /// Returns the entry and whether it is the default placeholder.
    pub fn entry(&self, domain: &str, state: &str, icon: Option<&str>) -> (&IconEntry, bool) {
        let state = normalize_state(domain, state);
        if let Some(entry) = self.devices.lookup(domain, &state) {
            return (entry, false);
        }
        if let Some(alias) = icon.and_then(mdi_domain) {
            let state = normalize_state(alias, &state);
            if let Some(entry) = self.devices.lookup(alias, &state) {
                return (entry, false);
            }
        }
        (self.devices.default_entry(), true)
    }

    /// Resolve a device icon in the active mode.
    pub fn resolve(&self, domain: &str, state: &str, icon: Option<&str>) -> ResolvedIcon {
        let (entry, fallback) = self.entry(domain, state, icon);
        ResolvedIcon {
            representation: entry.representation(self.mode),
            label: entry.label.clone(),
            fallback,
        }
    }

    /// Resolve an area icon in the active mode.
    pub fn resolve_area(&self, area_id: &str) -> ResolvedIcon {
        let (entry, fallback) = match self.areas.lookup(area_id, "") {
            Some(entry) => (entry, false),
            None => (self.areas.default_entry(), true),
        };
        ResolvedIcon {
            representation: entry.representation(self.mode),
            label: entry.label.clone(),
            fallback,
        }
    }

    /// Human-readable label for a device representation.
    pub fn label_for(&self, repr: &Representation) -> Option<&str> {
        self.devices
            .entries()
            .map(|(_, entry)| entry)
            .chain(std::iter::once(self.devices.default_entry()))
            .find(|entry| entry.matches(repr))
            .map(|entry| entry.label.as_str())
    }

    /// Representation (in the active mode) for a device label.
    pub fn representation_for_label(&self, label: &str) -> Option<Representation> {
        self.devices
            .entries()
            .map(|(_, entry)| entry)
            .chain(std::iter::once(self.devices.default_entry()))
            .find(|entry| entry.label == label)
            .map(|entry| entry.representation(self.mode))
    }
}

impl Default for IconResolver {
    fn default() -> Self {
        Self::kindle_safe()
    }
}

// ============================================================================
// Tests
// ============================================================================
