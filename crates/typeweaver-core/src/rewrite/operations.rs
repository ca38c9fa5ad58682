//! Type substitution, security header injection and grouping of operations

use log::debug;
use serde_json::Value as JsonValue;

use super::models::rewrite_property;
use super::RewriteOptions;
use crate::extensions::{self, X_TYPE};
use crate::graph::{
    relink_has_more, ApiGraph, ApiInterface, OperationNode, ParameterLocation, ParameterNode,
    PropertyNode,
};
use crate::mapping::TypeRegistry;
use crate::naming::NamePolicy;
use crate::Error;

/// Key of the nested schema inside a body parameter fragment
const SCHEMA_KEY: &str = "schema";

/// Rewrite every operation of `graph` against `registry`.
///
/// Operations are rewritten one at a time; an error leaves the failing
/// operation untouched.
pub fn rewrite_operations(
    graph: &mut ApiGraph,
    registry: &TypeRegistry,
    options: &RewriteOptions,
) -> crate::Result<()> {
    let base_path = if options.base_path_as_root {
        graph.base_path.as_deref().filter(|bp| !bp.trim_matches('/').is_empty())
    } else {
        None
    };
    for operation in &mut graph.operations {
        rewrite_operation(operation, registry, options)?;
        operation.group_key = match extensions::interface_name(&operation.path_extensions) {
            Some(name) => name,
            None => resource_group(&operation.path, base_path),
        };
        debug!(
            "{} {} -> group '{}'",
            operation.method, operation.path, operation.group_key
        );
    }
    Ok(())
}

fn rewrite_operation(
    operation: &mut OperationNode,
    registry: &TypeRegistry,
    options: &RewriteOptions,
) -> crate::Result<()> {
    let mut imports = Vec::new();

    let mut return_property = operation.return_property.clone();
    let return_type = match return_property.as_mut() {
        Some(property) => {
            let entity = format!("{}.return", operation.operation_id);
            rewrite_property(property, &entity, registry, &mut imports)?;
            Some(property.resolved_type.clone())
        }
        None => operation
            .return_type
            .as_deref()
            .map(|rt| substitute(rt, registry, &mut imports)),
    };
    let mut responses = operation.responses.clone();
    for response in &mut responses {
        if let Some(schema) = response.schema.as_mut() {
            let entity = format!("{}.{}", operation.operation_id, response.code);
            rewrite_property(schema, &entity, registry, &mut imports)?;
            response.base_type = Some(element_type(schema).to_string());
        } else if let Some(base_type) = response.base_type.as_deref() {
            response.base_type = Some(substitute(base_type, registry, &mut imports));
        }
    }

    let mut parameters = operation.parameters.clone();
    for param in &mut parameters {
        let entity = format!("{}.{}", operation.operation_id, param.name);
        if param.is_body_param {
            rewrite_body_param(param, &entity, registry, &mut imports)?;
        } else {
            rewrite_param(param, &entity, registry, &mut imports)?;
        }
    }

    if options.security_headers_as_arguments {
        inject_security_headers(&operation.auth_methods, &mut parameters);
    }
    relink_has_more(&mut parameters);

    operation.return_type = return_type;
    operation.return_property = return_property;
    operation.responses = responses;
    operation.parameters = parameters;
    operation.imports.extend(imports);
    Ok(())
}

fn substitute(type_name: &str, registry: &TypeRegistry, imports: &mut Vec<String>) -> String {
    match registry.get(type_name) {
        Some(descriptor) => {
            imports.push(descriptor.fully_qualified_name.clone());
            descriptor.simple_name.clone()
        }
        None => type_name.to_string(),
    }
}

fn rewrite_param(
    param: &mut ParameterNode,
    entity: &str,
    registry: &TypeRegistry,
    imports: &mut Vec<String>,
) -> crate::Result<()> {
    if let (Some(kind), Some(items)) = (param.container, param.items.as_deref_mut()) {
        rewrite_property(items, &format!("{entity}[]"), registry, imports)?;
        param.base_type = items.base_type.clone();
        param.resolved_type = kind.wrap(&items.resolved_type);
    }
    let symbolic = extensions::symbolic_type(
        &param.declared_type,
        param.format.as_deref(),
        &param.vendor_extensions,
        entity,
    )?;
    if let Some(alias) = symbolic {
        let descriptor = registry.require(&alias, entity)?;
        imports.push(descriptor.fully_qualified_name.clone());
        param.resolved_type = descriptor.simple_name.clone();
        param.base_type = alias;
    }
    Ok(())
}

/// Resolved element of a container, the type itself otherwise
fn element_type(property: &PropertyNode) -> &str {
    match property.items.as_deref() {
        Some(items) => element_type(items),
        None => &property.resolved_type,
    }
}

/// Looks for `x-type` under the nested `schema` of the raw body fragment.
///
/// Container bodies only record the extension and import the element type;
/// their declared collection type is kept.
fn rewrite_body_param(
    param: &mut ParameterNode,
    entity: &str,
    registry: &TypeRegistry,
    imports: &mut Vec<String>,
) -> crate::Result<()> {
    let Some(fragment) = param.raw_schema_fragment.as_deref() else {
        return Ok(());
    };
    let fragment: JsonValue = serde_json::from_str(fragment)
        .map_err(|e| Error::schema(format!("Malformed schema fragment of {entity}: {e}")))?;
    let Some(value) = find_path(&fragment, SCHEMA_KEY).and_then(|s| find_path(s, X_TYPE)) else {
        return Ok(());
    };
    let alias = value
        .as_str()
        .map(str::trim)
        .ok_or_else(|| Error::schema(format!("{X_TYPE} of {entity} must be a string, found {value}")))?;
    if alias.is_empty() {
        return Ok(());
    }

    let descriptor = registry.require(alias, entity)?;
    imports.push(descriptor.fully_qualified_name.clone());
    param
        .vendor_extensions
        .insert(X_TYPE.to_string(), JsonValue::String(alias.to_string()));
    if !param.is_container {
        param.base_type = alias.to_string();
        param.resolved_type = descriptor.simple_name.clone();
        param.is_primitive_type = true;
    }
    debug!("{} body resolved {} -> {}", entity, alias, descriptor.fully_qualified_name);
    Ok(())
}

/// First value stored under `key`, searching each entry depth-first in document order
fn find_path<'a>(value: &'a JsonValue, key: &str) -> Option<&'a JsonValue> {
    match value {
        JsonValue::Object(map) => map.iter().find_map(|(k, v)| {
            if k == key {
                Some(v)
            } else {
                find_path(v, key)
            }
        }),
        JsonValue::Array(items) => items.iter().find_map(|item| find_path(item, key)),
        _ => None,
    }
}

fn inject_security_headers(
    auth_methods: &[crate::graph::AuthMethod],
    parameters: &mut Vec<ParameterNode>,
) {
    for auth in auth_methods.iter().filter(|a| a.is_header_api_key()) {
        let Some(header) = auth.key_param_name.as_deref() else {
            continue;
        };
        let exists = parameters.iter().any(|p| {
            p.location == ParameterLocation::Header && p.name.eq_ignore_ascii_case(header)
        });
        if exists {
            debug!("Header {} already declared, not injected", header);
            continue;
        }
        parameters.push(ParameterNode::security_header(
            header,
            auth.description.clone(),
        ));
    }
}

/// First segment of the resource path, read below `base_path` when given.
///
/// `/pets/{id}` -> `pets`; with base path `/store/v1` -> `store`.
pub fn resource_group(path: &str, base_path: Option<&str>) -> String {
    let full = match base_path {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/')),
        None => path.to_string(),
    };
    full.split('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Split rewritten operations into named interfaces, in first-seen group order
pub fn group_operations(graph: &ApiGraph, names: &NamePolicy) -> Vec<ApiInterface> {
    let mut interfaces: Vec<ApiInterface> = Vec::new();
    for operation in &graph.operations {
        let name = names.interface_name(&operation.group_key);
        let index = match interfaces.iter().position(|i| i.name == name) {
            Some(index) => index,
            None => {
                interfaces.push(ApiInterface {
                    name,
                    group_key: operation.group_key.clone(),
                    operations: Vec::new(),
                    imports: Default::default(),
                });
                interfaces.len() - 1
            }
        };
        let interface = &mut interfaces[index];
        interface
            .imports
            .extend(operation.imports.iter().map(String::from));
        interface.operations.push(operation.clone());
    }
    interfaces
}
