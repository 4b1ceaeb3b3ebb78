//! Lovelace dashboard configuration model.
//!
//! Only the fields inkdash renders are typed; everything else a card carries
//! is preserved in [`Card::extra`] so that templates can read it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::{EntityState, StateIndex, UNAVAILABLE};
use crate::layout::{GridConstraints, GridOptions};

/// Default `max_columns` of a sections view.
pub const DEFAULT_MAX_COLUMNS: u32 = 4;

/// One entry of `lovelace/dashboards/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardInfo {
    /// Storage id, e.g. `dashboard_oscar`.
    pub id: String,
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// URL path, e.g. `dashboard-oscar`.
    #[serde(default)]
    pub url_path: Option<String>,
}

impl DashboardInfo {
    /// Title, or the id when untitled.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// URL paths to try when fetching a dashboard's config, in order.
///
/// Dashboard ids and URL paths drift apart (`dashboard_oscar` is usually
/// served at `dashboard-oscar`), so several spellings are tried.
pub fn candidate_url_paths(dashboard_id: &str) -> Vec<String> {
    let mut candidates = Vec::with_capacity(3);
    for candidate in [
        dashboard_id.replace('_', "-"),
        dashboard_id.replace("dashboard_", ""),
        dashboard_id.to_string(),
    ] {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Result of `lovelace/config`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LovelaceConfig {
    /// Dashboard title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Views in display order.
    #[serde(default)]
    pub views: Vec<View>,
}

impl LovelaceConfig {
    /// Find a view by path, falling back to its title.
    pub fn find_view(&self, view_path: &str) -> Option<&View> {
        self.views.iter().find(|v| v.matches(view_path))
    }
}

/// A dashboard view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct View {
    /// URL segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// View type (`sections`, `masonry`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub view_type: Option<String>,
    /// Maximum section columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_columns: Option<u32>,
    /// Sections of a sections view.
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Cards of a classic view.
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl View {
    /// Whether this view uses the sections layout.
    pub fn is_sections(&self) -> bool {
        self.view_type.as_deref() == Some("sections") && !self.sections.is_empty()
    }

    /// Whether `view_path` names this view (by path or title).
    pub fn matches(&self, view_path: &str) -> bool {
        self.path.as_deref() == Some(view_path) || self.title.as_deref() == Some(view_path)
    }

    /// Path and title with each filling in for the other when missing.
    pub fn path_and_title(&self) -> (String, String) {
        let path = self.path.clone().unwrap_or_default();
        let title = self.title.clone().unwrap_or_default();
        match (path.is_empty(), title.is_empty()) {
            (true, _) => (title.clone(), title),
            (false, true) => (path.clone(), path),
            (false, false) => (path, title),
        }
    }

    /// Entity ids referenced by the view's cards, in order.
    pub fn entity_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        let cards: Box<dyn Iterator<Item = &Card> + '_> = if self.is_sections() {
            Box::new(self.sections.iter().flat_map(|s| s.cards.iter()))
        } else {
            Box::new(self.cards.iter())
        };
        for card in cards {
            card.collect_entity_ids(&mut ids);
        }
        ids
    }
}

/// A section of a sections view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
    /// Section type (usually `grid`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub section_type: Option<String>,
    /// Section title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Section cards.
    #[serde(default)]
    pub cards: Vec<Card>,
    /// Columns spanned in the view grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_span: Option<u32>,
}

/// An `entities` list item: an id or an object with an `entity` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    /// Bare entity id.
    Id(String),
    /// Row object with an entity.
    Row {
        /// Entity id.
        entity: String,
        /// Display name override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Icon override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
    },
    /// Anything else (dividers, section rows, ...).
    Other(Value),
}

impl EntityRef {
    /// The referenced entity id, if any.
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id.as_str()),
            Self::Row { entity, .. } => Some(entity.as_str()),
            Self::Other(_) => None,
        }
    }

    /// Display name override.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Row { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    /// Icon override.
    pub fn icon(&self) -> Option<&str> {
        match self {
            Self::Row { icon, .. } => icon.as_deref(),
            _ => None,
        }
    }
}

/// A Lovelace card.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Card {
    /// Card type (`tile`, `heading`, `thermostat`, `button`, ...).
    #[serde(rename = "type", default)]
    pub card_type: String,
    /// Single entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Entity list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<EntityRef>,
    /// Name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Icon override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Heading text of a heading card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    /// Child cards of stack cards.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<Card>,
    /// Placement inside a section grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_options: Option<GridOptions>,
    /// Every other card field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Card {
    /// Card of the given type bound to one entity.
    pub fn for_entity(card_type: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            card_type: card_type.into(),
            entity: Some(entity.into()),
            ..Self::default()
        }
    }

    /// Append referenced entity ids (own entity, list, then children).
    pub fn collect_entity_ids(&self, ids: &mut Vec<String>) {
        if let Some(entity) = &self.entity {
            ids.push(entity.clone());
        }
        ids.extend(
            self.entities
                .iter()
                .filter_map(EntityRef::entity_id)
                .map(str::to_string),
        );
        for child in &self.cards {
            child.collect_entity_ids(ids);
        }
    }

    /// A string field from [`Card::extra`].
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// A boolean field from [`Card::extra`].
    pub fn extra_bool(&self, key: &str) -> Option<bool> {
        self.extra.get(key).and_then(Value::as_bool)
    }
}

// ============================================================================
// View structure and state enrichment
// ============================================================================

/// The parts of a view needed for rendering, with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewStructure {
    /// View type, `cards` when unset.
    pub view_type: String,
    /// View title.
    pub title: String,
    /// `max_columns`, 4 when unset.
    pub max_columns: u32,
    /// Sections (sections views).
    pub sections: Vec<Section>,
    /// Cards (classic views).
    pub cards: Vec<Card>,
}

impl ViewStructure {
    /// Extract the renderable structure of a view.
    pub fn from_view(view: &View) -> Self {
        Self {
            view_type: view.view_type.clone().unwrap_or_else(|| "cards".to_string()),
            title: view.title.clone().unwrap_or_default(),
            max_columns: view.max_columns.unwrap_or(DEFAULT_MAX_COLUMNS),
            sections: view.sections.clone(),
            cards: view.cards.clone(),
        }
    }

    /// Constraints to hand to the layout selector.
    pub fn grid_constraints(&self) -> GridConstraints {
        GridConstraints::max_columns(self.max_columns)
    }

    /// Attach entity state to every card.
    pub fn enrich(&self, states: &StateIndex) -> EnrichedView {
        EnrichedView {
            view_type: self.view_type.clone(),
            title: self.title.clone(),
            max_columns: self.max_columns,
            sections: self
                .sections
                .iter()
                .map(|section| EnrichedSection {
                    title: section.title.clone(),
                    column_span: section.column_span,
                    cards: section.cards.iter().map(|c| enrich_card(c, states)).collect(),
                })
                .collect(),
            cards: self.cards.iter().map(|c| enrich_card(c, states)).collect(),
        }
    }
}

/// Entity state attached to a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardState {
    /// Entity id.
    pub entity_id: String,
    /// State, `unavailable` when the entity is unknown.
    pub state: String,
    /// Attributes, empty when unknown.
    pub attributes: Map<String, Value>,
    /// Friendly name, the entity id when unknown.
    pub friendly_name: String,
}

impl CardState {
    /// Look up `entity_id`, substituting an unavailable placeholder.
    pub fn lookup(entity_id: &str, states: &StateIndex) -> Self {
        match states.get(entity_id) {
            Some(state) => Self::from_state(state),
            None => Self {
                entity_id: entity_id.to_string(),
                state: UNAVAILABLE.to_string(),
                attributes: Map::new(),
                friendly_name: entity_id.to_string(),
            },
        }
    }

    fn from_state(state: &EntityState) -> Self {
        Self {
            entity_id: state.entity_id.clone(),
            state: state.state.clone(),
            attributes: state.attributes.clone(),
            friendly_name: state.friendly_name().to_string(),
        }
    }

    /// The entity's domain.
    pub fn domain(&self) -> &str {
        crate::entity::entity_domain(&self.entity_id)
    }

    /// A string attribute.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// A numeric attribute.
    pub fn attribute_f64(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(Value::as_f64)
    }

    /// Whether the entity was missing from the state list.
    pub fn is_unavailable(&self) -> bool {
        self.state == UNAVAILABLE
    }
}

/// A card with its entity state and enriched children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedCard {
    /// Original card configuration.
    pub card: Card,
    /// State of `card.entity`, if the card has one.
    pub state: Option<CardState>,
    /// States of `card.entities`, in order.
    pub rows: Vec<(EntityRef, CardState)>,
    /// Enriched child cards.
    pub children: Vec<EnrichedCard>,
}

impl EnrichedCard {
    /// Display name: card override, then friendly name, then entity id.
    pub fn display_name(&self) -> Option<&str> {
        self.card
            .name
            .as_deref()
            .or_else(|| self.state.as_ref().map(|s| s.friendly_name.as_str()))
    }
}

/// Attach state to one card (recursively for stacks).
pub fn enrich_card(card: &Card, states: &StateIndex) -> EnrichedCard {
    EnrichedCard {
        card: card.clone(),
        state: card
            .entity
            .as_deref()
            .map(|id| CardState::lookup(id, states)),
        rows: card
            .entities
            .iter()
            .filter_map(|r| {
                r.entity_id()
                    .map(|id| (r.clone(), CardState::lookup(id, states)))
            })
            .collect(),
        children: card.cards.iter().map(|c| enrich_card(c, states)).collect(),
    }
}

/// A section with enriched cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedSection {
    /// Section title.
    pub title: Option<String>,
    /// Columns spanned in the view grid.
    pub column_span: Option<u32>,
    /// Cards.
    pub cards: Vec<EnrichedCard>,
}

/// A view ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedView {
    /// View type.
    pub view_type: String,
    /// View title.
    pub title: String,
    /// `max_columns`.
    pub max_columns: u32,
    /// Sections.
    pub sections: Vec<EnrichedSection>,
    /// Classic-view cards.
    pub cards: Vec<EnrichedCard>,
}

impl EnrichedView {
    /// Constraints to hand to the layout selector.
    pub fn grid_constraints(&self) -> GridConstraints {
        GridConstraints::max_columns(self.max_columns)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::layout::ColumnSpan;

    const SECTIONS_CONFIG: &str = r#"{
        "title": "Oscar",
        "views": [
            {
                "title": "Ada",
                "path": "ada",
                "type": "sections",
                "max_columns": 2,
                "sections": [
                    {
                        "type": "grid",
                        "cards": [
                            {"type": "heading", "heading": "Living room"},
                            {"type": "tile", "entity": "light.ceiling",
                             "grid_options": {"columns": 6}},
                            {"type": "thermostat", "entity": "climate.radiator",
                             "features": [{"type": "climate-hvac-modes"}]}
                        ]
                    },
                    {
                        "type": "grid",
                        "cards": [
                            {"type": "entities", "entities": [
                                "switch.kettle",
                                {"entity": "lock.door", "name": "Front door"},
                                {"type": "divider"}
                            ]}
                        ]
                    }
                ]
            },
            {"title": "Energy", "cards": [{"type": "button", "entity": "switch.boiler"}]}
        ]
    }"#;

    fn config() -> LovelaceConfig {
        serde_json::from_str(SECTIONS_CONFIG).unwrap()
    }

    #[test]
    fn test_candidate_url_paths() {
        assert_eq!(
            candidate_url_paths("dashboard_oscar"),
            vec!["dashboard-oscar", "oscar", "dashboard_oscar"]
        );
        assert_eq!(candidate_url_paths("home"), vec!["home"]);
    }

    #[test]
    fn test_find_view_by_path_and_title() {
        let config = config();
        assert_eq!(config.find_view("ada").unwrap().title.as_deref(), Some("Ada"));
        assert!(config.find_view("Energy").is_some());
        assert!(config.find_view("missing").is_none());
    }

    #[test]
    fn test_sections_entity_extraction() {
        let config = config();
        let ids = config.find_view("ada").unwrap().entity_ids();
        assert_eq!(
            ids,
            vec!["light.ceiling", "climate.radiator", "switch.kettle", "lock.door"]
        );
    }

    #[test]
    fn test_classic_entity_extraction() {
        let config = config();
        assert_eq!(config.find_view("Energy").unwrap().entity_ids(), vec!["switch.boiler"]);
    }

    #[test]
    fn test_stack_children_are_extracted() {
        let card: Card = serde_json::from_str(
            r#"{"type": "vertical-stack", "cards": [
                {"type": "tile", "entity": "light.a"},
                {"type": "tile", "entity": "light.b"}
            ]}"#,
        )
        .unwrap();
        let mut ids = Vec::new();
        card.collect_entity_ids(&mut ids);
        assert_eq!(ids, vec!["light.a", "light.b"]);
    }

    #[test]
    fn test_unknown_card_fields_are_preserved() {
        let config = config();
        let view = config.find_view("ada").unwrap();
        let thermostat = &view.sections[0].cards[2];
        assert!(thermostat.extra.contains_key("features"));
        assert_eq!(
            view.sections[0].cards[1].grid_options.as_ref().unwrap().column_span(),
            ColumnSpan::Cells(6)
        );
    }

    #[test]
    fn test_view_structure_defaults() {
        let config = config();
        let energy = ViewStructure::from_view(config.find_view("Energy").unwrap());
        assert_eq!(energy.view_type, "cards");
        assert_eq!(energy.max_columns, DEFAULT_MAX_COLUMNS);

        let ada = ViewStructure::from_view(config.find_view("ada").unwrap());
        assert_eq!(ada.view_type, "sections");
        assert_eq!(ada.grid_constraints().max_columns, Some(2));
    }

    #[test]
    fn test_enrichment_marks_missing_entities_unavailable() {
        let config = config();
        let structure = ViewStructure::from_view(config.find_view("ada").unwrap());
        let states = StateIndex::new(vec![
            EntityState::new("light.ceiling", "on").with_attribute("friendly_name", "Ceiling"),
        ]);
        let view = structure.enrich(&states);

        let tile = &view.sections[0].cards[1];
        let state = tile.state.as_ref().unwrap();
        assert_eq!(state.state, "on");
        assert_eq!(tile.display_name(), Some("Ceiling"));

        let thermostat = view.sections[0].cards[2].state.as_ref().unwrap();
        assert!(thermostat.is_unavailable());
        assert_eq!(thermostat.friendly_name, "climate.radiator");
        assert!(thermostat.attributes.is_empty());

        let heading = &view.sections[0].cards[0];
        assert!(heading.state.is_none());

        let entities = &view.sections[1].cards[0];
        assert_eq!(entities.rows.len(), 2);
        assert_eq!(entities.rows[1].0.name(), Some("Front door"));
    }

    #[test]
    fn test_path_and_title_fill_in() {
        let untitled = View {
            path: Some("energy".to_string()),
            ..View::default()
        };
        assert_eq!(untitled.path_and_title(), ("energy".to_string(), "energy".to_string()));

        let pathless = View {
            title: Some("Home".to_string()),
            ..View::default()
        };
        assert_eq!(pathless.path_and_title(), ("Home".to_string(), "Home".to_string()));
    }

    #[test]
    fn test_dashboard_display_title() {
        let info: DashboardInfo =
            serde_json::from_str(r#"{"id": "dashboard_oscar", "url_path": "dashboard-oscar"}"#)
                .unwrap();
        assert_eq!(info.display_title(), "dashboard_oscar");
    }
}
