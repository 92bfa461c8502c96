//! Core domain types for the ansible-data dataset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level keys of a persisted dataset, in serialization order.
pub const DATASET_KEYS: [&str; 3] = ["modules", "directives", "lookup_plugins"];

/// Fields carried by every module entry, in serialization order.
pub const MODULE_KEYS: [&str; 4] = ["module", "short_description", "options", "deprecated"];

// ---------------------------------------------------------------------------
// ModuleDescriptor
// ---------------------------------------------------------------------------

/// The documented surface of one module, projected down to [`MODULE_KEYS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Module name as declared by its doc block (or its catalog name).
    pub module: String,
    /// One-line summary.
    pub short_description: Option<String>,
    /// Option schema (`name -> {description, required, default, choices, ...}`).
    pub options: Option<serde_json::Value>,
    /// Deprecation notice, usually a string or a mapping.
    pub deprecated: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Directives / lookups
// ---------------------------------------------------------------------------

/// Directive name → entity kinds accepting it, in aggregation order.
pub type DirectiveIndex = BTreeMap<String, Vec<String>>;

/// Lookup plugin names in discovery order.
pub type LookupPluginIndex = Vec<String>;

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Root structure for `ansible-data.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Sorted, deduplicated module descriptors.
    pub modules: Vec<ModuleDescriptor>,
    /// Directive applicability index.
    pub directives: DirectiveIndex,
    /// Lookup plugin names.
    pub lookup_plugins: LookupPluginIndex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_serialize_as_null() {
        let desc = ModuleDescriptor {
            module: "ping".into(),
            short_description: Some("Pings".into()),
            options: None,
            deprecated: None,
        };

        let value = serde_json::to_value(&desc).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "module": "ping",
                "short_description": "Pings",
                "options": null,
                "deprecated": null,
            })
        );
    }

    #[test]
    fn dataset_serializes_keys_in_order() {
        let json = serde_json::to_string(&Dataset::default()).expect("serialize");
        assert_eq!(json, r#"{"modules":[],"directives":{},"lookup_plugins":[]}"#);
    }

    #[test]
    fn dataset_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/ansible-data.fixture.json")
            .expect("read fixture");
        let parsed: Dataset = serde_json::from_str(&fixture).expect("deserialize fixture dataset");
        assert_eq!(parsed.modules.len(), 4);
        assert_eq!(parsed.modules[0].module, "command");
        assert_eq!(parsed.modules[0].options.as_ref().unwrap()["creates"]["required"], false);
        assert_eq!(parsed.directives["with_"], vec!["Task".to_string()]);
        assert_eq!(parsed.lookup_plugins, vec!["env", "file"]);
    }
}
