//! Home Assistant entity states and filtering.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::icons::{IconResolver, ResolvedIcon};

/// Domains shown on the flat entity pages.
pub const SUPPORTED_DOMAINS: &[&str] = &[
    "light", "switch", "fan", "cover", "climate", "sensor", "lock", "vacuum",
];

/// Domains that answer to `<domain>.toggle`.
pub const TOGGLE_DOMAINS: &[&str] = &["light", "switch", "fan", "cover", "lock", "vacuum"];

/// State reported for entities missing from the state list.
pub const UNAVAILABLE: &str = "unavailable";

/// The domain part of an entity id (`light.kitchen` → `light`).
pub fn entity_domain(entity_id: &str) -> &str {
    entity_id.split('.').next().unwrap_or(entity_id)
}

/// Whether the entity's domain supports a toggle action.
pub fn is_toggleable(entity_id: &str) -> bool {
    TOGGLE_DOMAINS.contains(&entity_domain(entity_id))
}

/// One entry of `GET /api/states`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// Entity id, e.g. `light.kitchen`.
    pub entity_id: String,
    /// Raw state string.
    pub state: String,
    /// State attributes.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Last state change (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_changed: Option<String>,
    /// Last update (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl EntityState {
    /// Create a state without attributes.
    pub fn new(entity_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes: Map::new(),
            last_changed: None,
            last_updated: None,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The entity's domain.
    pub fn domain(&self) -> &str {
        entity_domain(&self.entity_id)
    }

    /// `friendly_name` attribute, or the entity id.
    pub fn friendly_name(&self) -> &str {
        self.attribute_str("friendly_name")
            .unwrap_or(&self.entity_id)
    }

    /// A string attribute.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// A numeric attribute.
    pub fn attribute_f64(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(Value::as_f64)
    }

    /// `icon` attribute (usually an `mdi:` identifier).
    pub fn icon(&self) -> Option<&str> {
        self.attribute_str("icon")
    }

    /// `unit_of_measurement` attribute.
    pub fn unit(&self) -> Option<&str> {
        self.attribute_str("unit_of_measurement")
    }
}

/// States indexed by entity id.
#[derive(Debug, Clone, Default)]
pub struct StateIndex {
    states: HashMap<String, EntityState>,
}

impl StateIndex {
    /// Index a state list.
    pub fn new(states: Vec<EntityState>) -> Self {
        Self {
            states: states
                .into_iter()
                .map(|s| (s.entity_id.clone(), s))
                .collect(),
        }
    }

    /// State for an entity id.
    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.states.get(entity_id)
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// An entity prepared for the flat entity grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    /// Entity id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Raw state.
    pub state: String,
    /// Entity domain.
    pub domain: String,
    /// Resolved icon.
    pub icon: ResolvedIcon,
    /// State attributes.
    pub attributes: Map<String, Value>,
}

impl EntityView {
    /// Whether a toggle link should be offered.
    pub fn toggleable(&self) -> bool {
        TOGGLE_DOMAINS.contains(&self.domain.as_str()) && self.state != UNAVAILABLE
    }
}

/// Select and decorate entities for display.
///
/// `entity_ids` restricts the result to the given ids (in state-list order);
/// `filter_types` drops domains outside [`SUPPORTED_DOMAINS`].
pub fn filter_entities(
    states: &[EntityState],
    entity_ids: Option<&[String]>,
    filter_types: bool,
    resolver: &IconResolver,
) -> Vec<EntityView> {
    let allowed: Option<std::collections::HashSet<&str>> = entity_ids
        .filter(|ids| !ids.is_empty())
        .map(|ids| ids.iter().map(String::as_str).collect());

    states
        .iter()
        .filter(|s| {
            allowed
                .as_ref()
                .is_none_or(|ids| ids.contains(s.entity_id.as_str()))
        })
        .filter(|s| !filter_types || SUPPORTED_DOMAINS.contains(&s.domain()))
        .map(|s| EntityView {
            id: s.entity_id.clone(),
            name: s.friendly_name().to_string(),
            state: s.state.clone(),
            domain: s.domain().to_string(),
            icon: resolver.resolve(s.domain(), &s.state, s.icon()),
            attributes: s.attributes.clone(),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::icons::IconMode;

    fn sample_states() -> Vec<EntityState> {
        vec![
            EntityState::new("light.kitchen", "on").with_attribute("friendly_name", "Kitchen"),
            EntityState::new("switch.kettle", "off"),
            EntityState::new("automation.morning", "on"),
            EntityState::new("sensor.outside", "4.5")
                .with_attribute("unit_of_measurement", "°C"),
        ]
    }

    #[test]
    fn test_entity_domain() {
        assert_eq!(entity_domain("light.kitchen"), "light");
        assert_eq!(entity_domain("nodot"), "nodot");
    }

    #[test]
    fn test_friendly_name_falls_back_to_id() {
        let states = sample_states();
        assert_eq!(states[0].friendly_name(), "Kitchen");
        assert_eq!(states[1].friendly_name(), "switch.kettle");
        assert_eq!(states[3].unit(), Some("°C"));
    }

    #[test]
    fn test_filter_drops_unsupported_domains() {
        let resolver = IconResolver::kindle_safe();
        let views = filter_entities(&sample_states(), None, true, &resolver);
        let ids: Vec<_> = views.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["light.kitchen", "switch.kettle", "sensor.outside"]);
    }

    #[test]
    fn test_filter_keeps_everything_without_type_filter() {
        let resolver = IconResolver::kindle_safe();
        let views = filter_entities(&sample_states(), None, false, &resolver);
        assert_eq!(views.len(), 4);
    }

    #[test]
    fn test_filter_by_ids() {
        let resolver = IconResolver::kindle_safe().with_mode(IconMode::Ascii);
        let ids = vec!["switch.kettle".to_string(), "automation.morning".to_string()];
        let views = filter_entities(&sample_states(), Some(&ids), true, &resolver);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, "switch.kettle");
        assert_eq!(views[0].icon.representation.as_str(), "[0]");
        assert!(views[0].toggleable());
    }

    #[test]
    fn test_empty_id_list_means_no_restriction() {
        let resolver = IconResolver::kindle_safe();
        let views = filter_entities(&sample_states(), Some(&[]), true, &resolver);
        assert_eq!(views.len(), 3);
    }

    #[test]
    fn test_state_index_lookup() {
        let index = StateIndex::new(sample_states());
        assert_eq!(index.len(), 4);
        assert_eq!(index.get("switch.kettle").unwrap().state, "off");
        assert!(index.get("light.missing").is_none());
    }

    #[test]
    fn test_state_deserializes_from_api_payload() {
        let json = r#"{
            "entity_id": "climate.living_room",
            "state": "heat",
            "attributes": {"current_temperature": 20.5, "temperature": 21},
            "last_changed": "2024-01-01T10:00:00+00:00"
        }"#;
        let state: EntityState = serde_json::from_str(json).unwrap();
        assert_eq!(state.domain(), "climate");
        assert_eq!(state.attribute_f64("current_temperature"), Some(20.5));
        assert_eq!(state.attribute_f64("temperature"), Some(21.0));
        assert!(state.last_updated.is_none());
    }

    #[test]
    fn test_sensor_is_not_toggleable() {
        assert!(!is_toggleable("sensor.outside"));
        assert!(is_toggleable("light.kitchen"));
    }
}
