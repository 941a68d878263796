//! Static descriptors for the editable character fields the panel attaches to.
//!
//! One `FieldConfig` per text field in the host's character editor. The set is
//! fixed at load time; the host integration layer reads it to decide where to
//! mount the panel buttons, and every other module keys storage and titles off
//! the entries here.

use serde::Serialize;

/// Extension key holding the current storage schema: a map from field name to
/// its ordered variant list.
pub const EXTENSION_KEY: &str = "alternate_fields";

#[derive(Debug, Clone, Serialize)]
pub struct FieldConfig {
    /// Internal field name; also the key inside the `alternate_fields` map.
    pub field: &'static str,
    /// Singular label, used for numbered variant titles ("Description #1").
    pub label: &'static str,
    /// Plural label shown on the injected panel button.
    pub button_name: &'static str,
    /// Editor panel the button is injected into.
    pub selector: &'static str,
    /// Sibling element the button is inserted after.
    pub inject_point: &'static str,
    /// Per-field storage key used by older releases; migrated on first load.
    pub legacy_key: &'static str,
}

pub const FIELD_CONFIGS: &[FieldConfig] = &[
    FieldConfig {
        field: "description",
        label: "Description",
        button_name: "Descriptions",
        selector: "#description_div",
        inject_point: "#character_open_media_overrides",
        legacy_key: "alternate_descriptions",
    },
    FieldConfig {
        field: "personality",
        label: "Personality",
        button_name: "Personalities",
        selector: "#personality_div",
        inject_point: ".notes-link",
        legacy_key: "alternate_personalities",
    },
    FieldConfig {
        field: "scenario",
        label: "Scenario",
        button_name: "Scenarios",
        selector: "#scenario_div",
        inject_point: ".notes-link",
        legacy_key: "alternate_scenarios",
    },
    FieldConfig {
        field: "first_message",
        label: "First Message",
        button_name: "First Messages",
        selector: "#first_message_div",
        inject_point: ".notes-link",
        legacy_key: "alternate_first_messages",
    },
];

/// Look up a field descriptor by its internal name.
pub fn find_field(name: &str) -> Option<&'static FieldConfig> {
    FIELD_CONFIGS.iter().find(|f| f.field == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_field() {
        assert!(find_field("description").is_some());
        assert!(find_field("personality").is_some());
        assert!(find_field("mood").is_none());
    }

    #[test]
    fn test_field_names_are_unique() {
        for (i, a) in FIELD_CONFIGS.iter().enumerate() {
            for b in &FIELD_CONFIGS[i + 1..] {
                assert_ne!(a.field, b.field);
                assert_ne!(a.legacy_key, b.legacy_key);
            }
        }
    }
}
