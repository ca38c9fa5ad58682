//! Schema type to target type mapping

use serde_json::Value as JsonValue;

use crate::config::DateLibrary;
use crate::graph::{extract_vendor_extensions, ContainerKind, PropertyNode};
use crate::naming::NamePolicy;
use crate::openapi::ref_name;
use crate::utils::simple_name;

const UUID: &str = "java.util.UUID";
const BIG_DECIMAL: &str = "java.math.BigDecimal";
const FILE: &str = "java.io.File";

/// Maps schema fragments to typed [`PropertyNode`]s
#[derive(Debug, Clone)]
pub struct TypeMapper<'a> {
    date_library: DateLibrary,
    names: &'a NamePolicy,
}

impl<'a> TypeMapper<'a> {
    pub fn new(date_library: DateLibrary, names: &'a NamePolicy) -> Self {
        Self {
            date_library,
            names,
        }
    }

    /// Property for `schema`, pushing the imports its target type needs.
    ///
    /// `$ref` schemas become the referenced model's class name; arrays and maps
    /// carry their element as `items`.
    pub fn property(&self, name: &str, schema: &JsonValue, imports: &mut Vec<String>) -> PropertyNode {
        let mut property = self.map(name, schema, imports);
        if let Some(object) = schema.as_object() {
            property.vendor_extensions = extract_vendor_extensions(object);
        }
        property
    }

    fn map(&self, name: &str, schema: &JsonValue, imports: &mut Vec<String>) -> PropertyNode {
        if let Some(reference) = schema.get("$ref").and_then(JsonValue::as_str) {
            return PropertyNode::new(name, "object", self.names.model_name(ref_name(reference)));
        }

        let format = schema.get("format").and_then(JsonValue::as_str);
        let declared = schema
            .get("type")
            .and_then(JsonValue::as_str)
            .unwrap_or("object");

        let mut property = match declared {
            "array" => {
                let kind = if schema.get("uniqueItems").and_then(JsonValue::as_bool) == Some(true) {
                    ContainerKind::Set
                } else {
                    ContainerKind::List
                };
                let items = self.property(name, schema.get("items").unwrap_or(&JsonValue::Null), imports);
                container(name, declared, kind, items, imports)
            }
            "object" => match schema.get("additionalProperties") {
                Some(values) if values.is_object() => {
                    let items = self.property(name, values, imports);
                    container(name, declared, ContainerKind::Map, items, imports)
                }
                _ => PropertyNode::new(name, declared, "Object"),
            },
            other => PropertyNode::new(name, other, self.primitive(other, format, imports)),
        };
        property.format = format.map(String::from);
        property
    }

    /// Simple target name of a primitive schema type
    pub fn primitive(&self, declared: &str, format: Option<&str>, imports: &mut Vec<String>) -> String {
        let name = match (declared, format) {
            ("string", Some("date")) => return qualified(self.date_library.date_type(), imports),
            ("string", Some("date-time")) => {
                return qualified(self.date_library.date_time_type(), imports)
            }
            ("string", Some("uuid")) => return qualified(UUID, imports),
            ("string", Some("byte" | "binary")) => "byte[]",
            ("string", _) => "String",
            ("integer", Some("int64")) => "Long",
            ("integer", _) => "Integer",
            ("number", Some("float")) => "Float",
            ("number", Some("double")) => "Double",
            ("number", _) => return qualified(BIG_DECIMAL, imports),
            ("boolean", _) => "Boolean",
            ("file", _) => return qualified(FILE, imports),
            _ => "Object",
        };
        name.to_string()
    }
}

fn container(
    name: &str,
    declared: &str,
    kind: ContainerKind,
    items: PropertyNode,
    imports: &mut Vec<String>,
) -> PropertyNode {
    imports.push(kind.import().to_string());
    let mut property = PropertyNode::new(name, declared, kind.wrap(&items.resolved_type));
    property.base_type = items.base_type.clone();
    property.container = Some(kind);
    property.items = Some(Box::new(items));
    property
}

fn qualified(fully_qualified_name: &str, imports: &mut Vec<String>) -> String {
    imports.push(fully_qualified_name.to_string());
    simple_name(fully_qualified_name).to_string()
}
