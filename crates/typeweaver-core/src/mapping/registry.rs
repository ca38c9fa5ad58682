//! Alias to target type lookup table

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::utils::simple_name;
use crate::Error;

/// A resolved mapping from a schema alias to a target type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub alias: String,
    pub fully_qualified_name: String,
    /// Last `.`-segment of `fully_qualified_name`
    pub simple_name: String,
}

impl TypeDescriptor {
    pub fn new(alias: impl Into<String>, fully_qualified_name: impl Into<String>) -> Self {
        let fully_qualified_name = fully_qualified_name.into();
        Self {
            alias: alias.into(),
            simple_name: simple_name(&fully_qualified_name).to_string(),
            fully_qualified_name,
        }
    }
}

/// Flat alias table built once per generation session and read-only afterwards
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under its alias, returning the one it replaced
    pub(crate) fn insert(&mut self, descriptor: TypeDescriptor) -> Option<TypeDescriptor> {
        self.entries.insert(descriptor.alias.clone(), descriptor)
    }

    pub fn get(&self, alias: &str) -> Option<&TypeDescriptor> {
        self.entries.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// Looks up an alias that must exist because code will import it.
    ///
    /// # Errors
    ///
    /// [`Error::UnresolvedAlias`] naming `entity` when the alias is unknown.
    pub fn require(&self, alias: &str, entity: &str) -> crate::Result<&TypeDescriptor> {
        self.get(alias)
            .ok_or_else(|| Error::unresolved(alias, entity))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors sorted by alias
    pub fn descriptors(&self) -> Vec<&TypeDescriptor> {
        let mut descriptors: Vec<_> = self.entries.values().collect();
        descriptors.sort_by(|a, b| a.alias.cmp(&b.alias));
        descriptors
    }
}

impl FromIterator<TypeDescriptor> for TypeRegistry {
    fn from_iter<I: IntoIterator<Item = TypeDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for descriptor in iter {
            registry.insert(descriptor);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_simple_name() {
        let descriptor = TypeDescriptor::new("Money", "com.acme.types.Money");
        assert_eq!(descriptor.simple_name, "Money");
        let unqualified = TypeDescriptor::new("Id", "Identifier");
        assert_eq!(unqualified.simple_name, "Identifier");
    }

    #[test]
    fn test_require_reports_alias_and_entity() {
        let registry = TypeRegistry::new();
        match registry.require("Money", "Order.total") {
            Err(Error::UnresolvedAlias { alias, entity }) => {
                assert_eq!(alias, "Money");
                assert_eq!(entity, "Order.total");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_insert_replaces_and_returns_previous() {
        let mut registry = TypeRegistry::new();
        assert!(registry
            .insert(TypeDescriptor::new("Money", "a.Money"))
            .is_none());
        let previous = registry.insert(TypeDescriptor::new("Money", "b.Money"));
        assert_eq!(previous.unwrap().fully_qualified_name, "a.Money");
        assert_eq!(registry.get("Money").unwrap().fully_qualified_name, "b.Money");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_descriptors_sorted() {
        let registry: TypeRegistry = [
            TypeDescriptor::new("Zed", "z.Zed"),
            TypeDescriptor::new("Alpha", "a.Alpha"),
        ]
        .into_iter()
        .collect();
        let aliases: Vec<_> = registry.descriptors().iter().map(|d| d.alias.as_str()).collect();
        assert_eq!(aliases, vec!["Alpha", "Zed"]);
    }
}
