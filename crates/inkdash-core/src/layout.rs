//! Breakpoint-based layout selection for Kindle screens.
//!
//! Lovelace `sections` views are stacked on narrow screens and placed side by
//! side on wide ones. `max_columns` (per view) and `grid_options` (per card)
//! belong to Home Assistant; they are carried through as opaque constraints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Width at which sections switch from stacked to side by side.
pub const DEFAULT_BREAKPOINT: u32 = 1300;

/// Number of cells in a Lovelace section grid row.
pub const SECTION_GRID_CELLS: u32 = 12;

// ============================================================================
// ScreenProfile
// ============================================================================

/// Geometry of a target display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenProfile {
    /// Profile name, e.g. `kindle-1264`.
    pub name: String,
    /// Width in pixels (portrait).
    pub width: u32,
    /// Height in pixels (portrait).
    pub height: u32,
    /// Pixel density.
    pub ppi: u32,
}

impl ScreenProfile {
    /// 1264×1680 at 300 PPI.
    pub fn kindle_1264() -> Self {
        Self::custom("kindle-1264", 1264, 1680, 300)
    }

    /// 1236×1648 at 300 PPI.
    pub fn kindle_1236() -> Self {
        Self::custom("kindle-1236", 1236, 1648, 300)
    }

    /// Arbitrary geometry.
    pub fn custom(name: impl Into<String>, width: u32, height: u32, ppi: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            ppi,
        }
    }

    /// All built-in profiles.
    pub fn builtin() -> Vec<Self> {
        vec![Self::kindle_1264(), Self::kindle_1236()]
    }

    /// Look up a built-in profile by name.
    pub fn by_name(name: &str) -> Option<Self> {
        Self::builtin().into_iter().find(|p| p.name == name)
    }

    /// Nominal aspect ratio as `(width, height)`, e.g. `(3, 4)`.
    ///
    /// Panel pixels rarely reduce to a clean ratio (1264×1680 is 79:105), so
    /// the result is the closest entry of [`COMMON_RATIOS`], oriented like the
    /// screen.
    pub fn aspect_ratio(&self) -> (u32, u32) {
        let long = self.width.max(self.height);
        let short = self.width.min(self.height);
        if short == 0 {
            return (self.width, self.height);
        }
        let actual = f64::from(long) / f64::from(short);
        let (l, s) = COMMON_RATIOS
            .iter()
            .copied()
            .min_by(|a, b| {
                let da = (f64::from(a.0) / f64::from(a.1) - actual).abs();
                let db = (f64::from(b.0) / f64::from(b.1) - actual).abs();
                da.total_cmp(&db)
            })
            .unwrap_or((long, short));
        if self.is_portrait() { (s, l) } else { (l, s) }
    }

    /// Whether the screen is taller than wide.
    pub fn is_portrait(&self) -> bool {
        self.height >= self.width
    }
}

impl Default for ScreenProfile {
    fn default() -> Self {
        Self::kindle_1264()
    }
}

/// Display ratios as `(long side, short side)`.
pub const COMMON_RATIOS: [(u32, u32); 8] = [
    (1, 1),
    (5, 4),
    (4, 3),
    (3, 2),
    (16, 10),
    (5, 3),
    (16, 9),
    (21, 9),
];

// ============================================================================
// Layout
// ============================================================================

/// Arrangement of a view's sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Sections stacked vertically.
    SingleColumn,
    /// Sections placed side by side.
    TwoColumn,
}

impl LayoutMode {
    /// Column count of the mode before constraints.
    pub fn columns(self) -> u32 {
        match self {
            Self::SingleColumn => 1,
            Self::TwoColumn => 2,
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleColumn => write!(f, "single-column"),
            Self::TwoColumn => write!(f, "two-column"),
        }
    }
}

/// Constraints supplied by the dashboard configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridConstraints {
    /// The view's `max_columns`, if set.
    pub max_columns: Option<u32>,
}

impl GridConstraints {
    /// Constraint from a view's `max_columns`.
    pub fn max_columns(max_columns: u32) -> Self {
        Self {
            max_columns: Some(max_columns),
        }
    }
}

/// Outcome of layout selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// Mode chosen from the width.
    pub mode: LayoutMode,
    /// Effective number of section columns (≥ 1).
    pub columns: u32,
    /// `max_columns` passed through unchanged.
    pub max_columns: Option<u32>,
}

impl Layout {
    /// Whether sections end up stacked.
    pub fn is_stacked(&self) -> bool {
        self.columns == 1
    }
}

// ============================================================================
// ColumnPreference
// ============================================================================

/// Column count for flat entity grids: automatic or fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnPreference {
    /// Let the page fill the row with as many tiles as fit.
    #[default]
    Auto,
    /// A fixed number of columns.
    Fixed(u32),
}

impl fmt::Display for ColumnPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Fixed(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for ColumnPreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") || s.is_empty() {
            return Ok(Self::Auto);
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self::Fixed(n)),
            _ => Err(Error::validation_field(
                "grid_columns",
                format!("expected 'auto' or a positive number, got '{s}'"),
            )),
        }
    }
}

impl Serialize for ColumnPreference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Auto => serializer.serialize_str("auto"),
            Self::Fixed(n) => serializer.serialize_u32(*n),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnPreference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(0) => Err(serde::de::Error::custom("grid_columns must be positive")),
            Raw::Number(n) => Ok(Self::Fixed(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ============================================================================
// GridOptions
// ============================================================================

/// A `grid_options` size: a cell count or a keyword such as `full`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridSize {
    /// Number of grid cells.
    Cells(u32),
    /// Keyword value (`full`, `auto`).
    Keyword(String),
}

/// Per-card `grid_options` from a sections view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridOptions {
    /// Horizontal size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<GridSize>,
    /// Vertical size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<GridSize>,
}

/// How a card spans its section grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSpan {
    /// Span this many of the [`SECTION_GRID_CELLS`].
    Cells(u32),
    /// Span the whole row.
    Full,
    /// Card decides; no explicit span.
    Auto,
}

impl GridOptions {
    /// Horizontal span, clamped to the section grid.
    pub fn column_span(&self) -> ColumnSpan {
        match &self.columns {
            Some(GridSize::Cells(n)) => ColumnSpan::Cells((*n).clamp(1, SECTION_GRID_CELLS)),
            Some(GridSize::Keyword(k)) if k.eq_ignore_ascii_case("full") => ColumnSpan::Full,
            _ => ColumnSpan::Auto,
        }
    }

    /// Vertical span in rows, if numeric.
    pub fn row_span(&self) -> Option<u32> {
        match &self.rows {
            Some(GridSize::Cells(n)) if *n > 0 => Some(*n),
            _ => None,
        }
    }
}

// ============================================================================
// LayoutSelector
// ============================================================================

/// Chooses section layout from display width and dashboard constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSelector {
    breakpoint: u32,
    entity_columns: ColumnPreference,
}

impl LayoutSelector {
    /// Selector with an explicit breakpoint.
    pub fn new(breakpoint: u32) -> Result<Self> {
        if breakpoint == 0 {
            return Err(Error::config("breakpoint must be positive"));
        }
        Ok(Self {
            breakpoint,
            entity_columns: ColumnPreference::Auto,
        })
    }

    /// Set the column preference for flat entity grids.
    pub fn with_entity_columns(mut self, preference: ColumnPreference) -> Self {
        self.entity_columns = preference;
        self
    }

    /// The configured breakpoint.
    pub fn breakpoint(&self) -> u32 {
        self.breakpoint
    }

    /// The column preference for flat entity grids.
    pub fn entity_columns(&self) -> ColumnPreference {
        self.entity_columns
    }

    /// Mode for a width, ignoring constraints.
    pub fn mode_for_width(&self, width: u32) -> LayoutMode {
        if width >= self.breakpoint {
            LayoutMode::TwoColumn
        } else {
            LayoutMode::SingleColumn
        }
    }

    /// Select the section layout for a width.
    pub fn select(&self, width: u32, constraints: GridConstraints) -> Layout {
        let mode = self.mode_for_width(width);
        let columns = match constraints.max_columns {
            Some(max) => mode.columns().min(max.max(1)),
            None => mode.columns(),
        };
        Layout {
            mode,
            columns,
            max_columns: constraints.max_columns,
        }
    }

    /// Select the section layout for a screen profile.
    pub fn select_for(&self, screen: &ScreenProfile, constraints: GridConstraints) -> Layout {
        self.select(screen.width, constraints)
    }
}

impl Default for LayoutSelector {
    fn default() -> Self {
        Self {
            breakpoint: DEFAULT_BREAKPOINT,
            entity_columns: ColumnPreference::Auto,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_kindle_profiles_are_three_by_four() {
        assert_eq!(ScreenProfile::kindle_1264().aspect_ratio(), (3, 4));
        assert_eq!(ScreenProfile::kindle_1236().aspect_ratio(), (3, 4));
        assert!(ScreenProfile::kindle_1264().is_portrait());
        assert_eq!(ScreenProfile::kindle_1236().ppi, 300);
    }

    #[test]
    fn test_aspect_ratio_snaps_and_keeps_orientation() {
        assert_eq!(ScreenProfile::custom("tv", 1920, 1080, 96).aspect_ratio(), (16, 9));
        assert_eq!(ScreenProfile::custom("tab", 1200, 1920, 224).aspect_ratio(), (10, 16));
        assert_eq!(ScreenProfile::custom("sq", 1000, 1003, 100).aspect_ratio(), (1, 1));
        assert_eq!(ScreenProfile::custom("zero", 0, 600, 100).aspect_ratio(), (0, 600));
    }

    #[test]
    fn test_profile_by_name() {
        assert_eq!(
            ScreenProfile::by_name("kindle-1236"),
            Some(ScreenProfile::kindle_1236())
        );
        assert_eq!(ScreenProfile::by_name("paperwhite-9000"), None);
    }

    #[test]
    fn test_kindle_portrait_is_single_column() {
        let selector = LayoutSelector::default();
        let layout = selector.select_for(&ScreenProfile::kindle_1264(), GridConstraints::default());
        assert_eq!(layout.mode, LayoutMode::SingleColumn);
        assert!(layout.is_stacked());
    }

    #[test]
    fn test_breakpoint_edges() {
        let selector = LayoutSelector::default();
        assert_eq!(selector.mode_for_width(1299), LayoutMode::SingleColumn);
        assert_eq!(selector.mode_for_width(1300), LayoutMode::TwoColumn);
        assert_eq!(selector.mode_for_width(1680), LayoutMode::TwoColumn);
    }

    #[test]
    fn test_max_columns_caps_two_column() {
        let selector = LayoutSelector::default();
        let layout = selector.select(1680, GridConstraints::max_columns(1));
        assert_eq!(layout.mode, LayoutMode::TwoColumn);
        assert_eq!(layout.columns, 1);
        assert_eq!(layout.max_columns, Some(1));
    }

    #[test]
    fn test_max_columns_zero_never_yields_zero_columns() {
        let layout = LayoutSelector::default().select(1680, GridConstraints::max_columns(0));
        assert_eq!(layout.columns, 1);
    }

    #[test]
    fn test_max_columns_above_mode_is_passed_through() {
        let layout = LayoutSelector::default().select(1400, GridConstraints::max_columns(4));
        assert_eq!(layout.columns, 2);
        assert_eq!(layout.max_columns, Some(4));
    }

    #[test]
    fn test_zero_breakpoint_rejected() {
        assert!(LayoutSelector::new(0).is_err());
        assert_eq!(LayoutSelector::new(900).unwrap().breakpoint(), 900);
    }

    #[test]
    fn test_column_preference_parse() {
        assert_eq!("auto".parse::<ColumnPreference>().unwrap(), ColumnPreference::Auto);
        assert_eq!("3".parse::<ColumnPreference>().unwrap(), ColumnPreference::Fixed(3));
        assert!("0".parse::<ColumnPreference>().is_err());
        assert!("wide".parse::<ColumnPreference>().is_err());
    }

    #[test]
    fn test_column_preference_deserialize() {
        let fixed: ColumnPreference = serde_json::from_str("2").unwrap();
        assert_eq!(fixed, ColumnPreference::Fixed(2));
        let auto: ColumnPreference = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(auto, ColumnPreference::Auto);
        assert!(serde_json::from_str::<ColumnPreference>("0").is_err());
    }

    #[test]
    fn test_grid_options_spans() {
        let opts: GridOptions = serde_json::from_str(r#"{"columns": 6, "rows": 2}"#).unwrap();
        assert_eq!(opts.column_span(), ColumnSpan::Cells(6));
        assert_eq!(opts.row_span(), Some(2));

        let full: GridOptions = serde_json::from_str(r#"{"columns": "full"}"#).unwrap();
        assert_eq!(full.column_span(), ColumnSpan::Full);

        let wide: GridOptions = serde_json::from_str(r#"{"columns": 48}"#).unwrap();
        assert_eq!(wide.column_span(), ColumnSpan::Cells(12));

        assert_eq!(GridOptions::default().column_span(), ColumnSpan::Auto);
    }

    proptest! {
        #[test]
        fn test_threshold_partition(width in 0u32..5000) {
            let layout = LayoutSelector::default().select(width, GridConstraints::default());
            if width < DEFAULT_BREAKPOINT {
                prop_assert_eq!(layout.columns, 1);
            } else {
                prop_assert_eq!(layout.columns, 2);
            }
        }

        #[test]
        fn test_columns_within_bounds(width in 0u32..5000, max in proptest::option::of(0u32..8)) {
            let layout = LayoutSelector::default().select(width, GridConstraints { max_columns: max });
            prop_assert!(layout.columns >= 1);
            prop_assert!(layout.columns <= layout.mode.columns());
            if let Some(max) = max {
                prop_assert!(layout.columns <= max.max(1));
            }
        }
    }
}
