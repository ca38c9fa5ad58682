use log::debug;
use serde_json::Value as JsonValue;

use super::SchemaAdapter;
use crate::graph::{extract_vendor_extensions, ModelGraph, ModelNode};
use crate::openapi::ref_name;

pub(super) fn build(adapter: &SchemaAdapter<'_>) -> crate::Result<ModelGraph> {
    let mut graph = ModelGraph::default();
    let Some(schemas) = adapter.context.schemas() else {
        return Ok(graph);
    };
    for (name, schema) in schemas {
        let schema = adapter.context.resolve(schema)?;
        graph.models.push(build_model(adapter, name, schema)?);
    }
    debug!("Parsed {} models", graph.models.len());
    Ok(graph)
}

fn build_model(
    adapter: &SchemaAdapter<'_>,
    name: &str,
    schema: &JsonValue,
) -> crate::Result<ModelNode> {
    let mut model = ModelNode::new(name, adapter.names.model_name(name));
    model.description = schema
        .get("description")
        .and_then(JsonValue::as_str)
        .map(String::from);
    if let Some(object) = schema.as_object() {
        model.vendor_extensions = extract_vendor_extensions(object);
    }

    // allOf: the first referenced member is the parent, inline members add fields
    let mut members: Vec<&JsonValue> = vec![schema];
    if let Some(all_of) = schema.get("allOf").and_then(JsonValue::as_array) {
        for member in all_of {
            match member.get("$ref").and_then(JsonValue::as_str) {
                Some(reference) if model.parent.is_none() => {
                    model.parent = Some(adapter.names.model_name(ref_name(reference)));
                }
                _ => members.push(adapter.context.resolve(member)?),
            }
        }
    }

    let mut imports = Vec::new();
    for member in members {
        let required = required_fields(member);
        let Some(properties) = member.get("properties").and_then(JsonValue::as_object) else {
            continue;
        };
        for (property_name, property_schema) in properties {
            let mut property = adapter
                .types
                .property(property_name, property_schema, &mut imports);
            property.required = required.iter().any(|r| r == property_name);
            model.properties.push(property);
        }
    }
    model.imports.extend(imports);
    Ok(model)
}

fn required_fields(schema: &JsonValue) -> Vec<String> {
    schema
        .get("required")
        .and_then(JsonValue::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(JsonValue::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
