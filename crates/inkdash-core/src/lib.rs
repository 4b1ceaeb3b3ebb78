#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! inkdash core library
//!
//! Pure building blocks shared by every inkdash crate. It has no internal
//! inkdash dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`icons`]: e-ink-safe icon resolution
//! - [`layout`]: screen profiles and breakpoint-based layout selection
//! - [`lovelace`]: Lovelace dashboard model and state enrichment
//! - [`entity`]: entity states and filtering
//! - [`path`]: dashboard paths and home-page navigation
//! - [`error`]: error types and Result alias

pub mod entity;
pub mod error;
pub mod icons;
pub mod layout;
pub mod lovelace;
pub mod path;

// Re-exports for convenience
pub use entity::{EntityState, EntityView, StateIndex, filter_entities};
pub use error::{Error, Result};
pub use icons::{IconEntry, IconMap, IconMode, IconOverride, IconResolver, Representation, ResolvedIcon};
pub use layout::{
    ColumnPreference, GridConstraints, GridOptions, Layout, LayoutMode, LayoutSelector,
    ScreenProfile,
};
pub use lovelace::{Card, DashboardInfo, EnrichedView, LovelaceConfig, View, ViewStructure};
pub use path::{DashboardPath, NavEntry};
