//! Model (class) side of the graph

use serde::{Deserialize, Serialize};

use super::{ImportSet, VendorExtensions};

/// All models parsed from one schema source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelGraph {
    pub models: Vec<ModelNode>,
}

impl ModelGraph {
    pub fn get(&self, name: &str) -> Option<&ModelNode> {
        self.models.iter().find(|m| m.name == name)
    }
}

/// A schema definition that becomes one generated class
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelNode {
    /// Name of the definition in the schema
    pub name: String,
    /// Name of the generated class (schema name plus model suffix)
    pub class_name: String,
    pub description: Option<String>,
    pub properties: Vec<PropertyNode>,
    /// Resolved parent type, possibly instantiated (`Base<Money>`)
    pub parent: Option<String>,
    pub vendor_extensions: VendorExtensions,
    pub imports: ImportSet,
}

impl ModelNode {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            description: None,
            properties: Vec::new(),
            parent: None,
            vendor_extensions: VendorExtensions::new(),
            imports: ImportSet::new(),
        }
    }
}

/// Collection shape of a container property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    List,
    Set,
    Map,
}

impl ContainerKind {
    /// Target type of the container around an already resolved element type
    pub fn wrap(self, element: &str) -> String {
        match self {
            Self::List => format!("List<{element}>"),
            Self::Set => format!("Set<{element}>"),
            Self::Map => format!("Map<String, {element}>"),
        }
    }

    pub fn import(self) -> &'static str {
        match self {
            Self::List => "java.util.List",
            Self::Set => "java.util.Set",
            Self::Map => "java.util.Map",
        }
    }
}

/// A single field of a model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyNode {
    pub name: String,
    /// Primitive type declared in the schema (`string`, `integer`, `array`, ...)
    pub declared_type: String,
    pub format: Option<String>,
    /// Type before target mapping: an alias, a model name or the element type of a container
    pub base_type: String,
    /// Type as it appears in generated code
    pub resolved_type: String,
    /// Whether the property carries generic template arguments
    pub is_generic: bool,
    pub template_arguments: Vec<String>,
    pub container: Option<ContainerKind>,
    /// Element of a container property
    pub items: Option<Box<PropertyNode>>,
    pub required: bool,
    pub vendor_extensions: VendorExtensions,
}

impl PropertyNode {
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        resolved_type: impl Into<String>,
    ) -> Self {
        let resolved_type = resolved_type.into();
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            format: None,
            base_type: resolved_type.clone(),
            resolved_type,
            is_generic: false,
            template_arguments: Vec::new(),
            container: None,
            items: None,
            required: false,
            vendor_extensions: VendorExtensions::new(),
        }
    }

    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_wrap() {
        assert_eq!(ContainerKind::List.wrap("Money"), "List<Money>");
        assert_eq!(ContainerKind::Map.wrap("Integer"), "Map<String, Integer>");
    }

    #[test]
    fn test_property_defaults_base_to_resolved() {
        let prop = PropertyNode::new("id", "integer", "Long");
        assert_eq!(prop.base_type, "Long");
        assert!(!prop.is_generic);
        assert!(!prop.is_container());
    }

    #[test]
    fn test_graph_lookup() {
        let graph = ModelGraph {
            models: vec![ModelNode::new("Pet", "Pet")],
        };
        assert!(graph.get("Pet").is_some());
        assert!(graph.get("Order").is_none());
    }
}
