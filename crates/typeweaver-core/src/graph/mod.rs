//! In-memory model and operation graphs handed from the schema adapter to the
//! rewriters and on to the renderer.
//!
//! The graphs are plain owned values: each rewriter stage takes `&mut` access
//! for the duration of one schema source and nothing else aliases them.

pub mod model;
pub mod operation;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub use model::{ContainerKind, ModelGraph, ModelNode, PropertyNode};
pub use operation::{
    relink_has_more, ApiGraph, ApiInterface, ApiKeyLocation, AuthKind, AuthMethod, OperationNode,
    ParameterLocation, ParameterNode, ResponseNode,
};

/// Specification extensions (keys starting with `x-`) attached to a schema entity
pub type VendorExtensions = BTreeMap<String, JsonValue>;

/// Fully-qualified names a generated unit must import.
///
/// Deduplicated by value, insertion order preserved so output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportSet(Vec<String>);

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `fully_qualified_name` unless an equal entry exists. Returns `true` if added.
    pub fn insert(&mut self, fully_qualified_name: impl Into<String>) -> bool {
        let fully_qualified_name = fully_qualified_name.into();
        if self.contains(&fully_qualified_name) {
            return false;
        }
        self.0.push(fully_qualified_name);
        true
    }

    pub fn contains(&self, fully_qualified_name: &str) -> bool {
        self.0.iter().any(|existing| existing == fully_qualified_name)
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.insert(name);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Collects the `x-` keys of a JSON object
pub fn extract_vendor_extensions(object: &serde_json::Map<String, JsonValue>) -> VendorExtensions {
    object
        .iter()
        .filter(|(k, _)| k.starts_with("x-"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import_set_dedups_and_keeps_order() {
        let mut imports = ImportSet::new();
        assert!(imports.insert("com.acme.B"));
        assert!(imports.insert("com.acme.A"));
        assert!(!imports.insert("com.acme.B"));
        assert_eq!(imports.iter().collect::<Vec<_>>(), vec!["com.acme.B", "com.acme.A"]);
    }

    #[test]
    fn test_import_set_serializes_as_list() {
        let mut imports = ImportSet::new();
        imports.extend(["java.util.List", "java.util.List", "java.util.Map"]);
        assert_eq!(
            serde_json::to_value(&imports).unwrap(),
            json!(["java.util.List", "java.util.Map"])
        );
    }

    #[test]
    fn test_extract_vendor_extensions() {
        let object = json!({"type": "string", "x-type": "Money", "x-other": [1]});
        let extensions = extract_vendor_extensions(object.as_object().unwrap());
        assert_eq!(extensions.len(), 2);
        assert_eq!(extensions["x-type"], json!("Money"));
    }
}
