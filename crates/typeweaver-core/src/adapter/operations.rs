use log::{debug, warn};
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::SchemaAdapter;
use crate::graph::{
    extract_vendor_extensions, relink_has_more, ApiGraph, ApiKeyLocation, AuthKind, AuthMethod,
    OperationNode, ParameterLocation, ParameterNode, PropertyNode, ResponseNode,
    VendorExtensions,
};
use crate::Error;

const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Body parameter name for OpenAPI 3 request bodies
const DEFAULT_BODY_NAME: &str = "body";
const BODY_NAME_EXTENSION: &str = "x-codegen-request-body-name";

pub(super) fn build(adapter: &SchemaAdapter<'_>) -> crate::Result<ApiGraph> {
    let mut graph = ApiGraph {
        base_path: adapter.context.base_path(),
        operations: Vec::new(),
    };
    let Some(paths) = adapter.context.paths() else {
        return Ok(graph);
    };
    for (path, item) in paths {
        let item = adapter.context.resolve(item)?;
        let Some(item) = item.as_object() else {
            continue;
        };
        let path_extensions = extract_vendor_extensions(item);
        let shared_params = item.get("parameters").and_then(JsonValue::as_array);

        for method in METHODS {
            let Some(method_item) = item.get(method).and_then(JsonValue::as_object) else {
                continue;
            };
            let mut operation = build_operation(adapter, path, method, method_item, shared_params)?;
            operation.path_extensions = path_extensions.clone();
            graph.operations.push(operation);
        }
    }
    debug!("Parsed {} operations", graph.operations.len());
    Ok(graph)
}

fn build_operation(
    adapter: &SchemaAdapter<'_>,
    path: &str,
    method: &str,
    method_item: &JsonMap<String, JsonValue>,
    shared_params: Option<&Vec<JsonValue>>,
) -> crate::Result<OperationNode> {
    let operation_id = method_item
        .get("operationId")
        .and_then(JsonValue::as_str)
        .map(String::from)
        .unwrap_or_else(|| {
            format!(
                "{}_{}",
                method,
                path.trim_start_matches('/').replace('/', "_")
            )
        });
    let mut operation = OperationNode::new(operation_id, method, path);
    operation.summary = method_item
        .get("summary")
        .and_then(JsonValue::as_str)
        .map(String::from);
    operation.vendor_extensions = extract_vendor_extensions(method_item);

    let mut imports = Vec::new();

    // operation parameters override path parameters with the same name and location
    let mut raw_params: Vec<&JsonValue> = Vec::new();
    let own_params = method_item.get("parameters").and_then(JsonValue::as_array);
    for param in shared_params.into_iter().chain(own_params).flatten() {
        let param = adapter.context.resolve(param)?;
        let key = (param.get("name"), param.get("in"));
        raw_params.retain(|p| (p.get("name"), p.get("in")) != key);
        raw_params.push(param);
    }
    for param in raw_params {
        operation
            .parameters
            .push(build_parameter(adapter, &operation.operation_id, param, &mut imports)?);
    }
    if let Some(body) = method_item.get("requestBody") {
        let body = adapter.context.resolve(body)?;
        if let Some(param) = build_request_body(adapter, body, &mut imports)? {
            operation.parameters.push(param);
        }
    }
    relink_has_more(&mut operation.parameters);

    // first 2xx response wins, `default` only when there is none
    let mut success: Option<Option<PropertyNode>> = None;
    let mut fallback: Option<PropertyNode> = None;
    if let Some(responses) = method_item.get("responses").and_then(JsonValue::as_object) {
        for (code, response) in responses {
            let response = adapter.context.resolve(response)?;
            let typed = response_schema(adapter.context.is_swagger2(), response)
                .map(|schema| adapter.types.property(code, schema, &mut imports));
            if code.starts_with('2') && success.is_none() {
                success = Some(typed.clone());
            } else if code == "default" {
                fallback = typed.clone();
            }
            operation.responses.push(ResponseNode {
                code: code.clone(),
                description: response
                    .get("description")
                    .and_then(JsonValue::as_str)
                    .map(String::from),
                base_type: typed.as_ref().map(|p| p.base_type.clone()),
                schema: typed,
            });
        }
    }
    operation.return_property = success.unwrap_or(fallback);
    operation.return_type = operation
        .return_property
        .as_ref()
        .map(|p| p.resolved_type.clone());

    let security = method_item
        .get("security")
        .and_then(JsonValue::as_array)
        .or_else(|| adapter.context.global_security());
    if let Some(requirements) = security {
        operation.auth_methods = auth_methods(adapter, requirements);
    }

    operation.imports.extend(imports);
    Ok(operation)
}

fn build_parameter(
    adapter: &SchemaAdapter<'_>,
    operation_id: &str,
    param: &JsonValue,
    imports: &mut Vec<String>,
) -> crate::Result<ParameterNode> {
    let name = param
        .get("name")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::schema(format!("Parameter without a name in {operation_id}")))?;
    let location_name = param.get("in").and_then(JsonValue::as_str).unwrap_or_default();
    let location = ParameterLocation::parse(location_name).ok_or_else(|| {
        Error::schema(format!(
            "Unknown location '{location_name}' of parameter {operation_id}.{name}"
        ))
    })?;

    // Swagger 2.0 non-body parameters carry their type inline
    let typed = adapter
        .types
        .property(name, param.get("schema").unwrap_or(param), imports);

    let mut node = ParameterNode::new(name, location, typed.declared_type, typed.resolved_type);
    node.base_type = typed.base_type;
    node.format = typed.format;
    node.is_container = typed.container.is_some();
    node.container = typed.container;
    if location != ParameterLocation::Body {
        node.items = typed.items;
    }
    node.is_primitive_type = is_primitive(&node.declared_type) && !node.is_container;
    node.description = param
        .get("description")
        .and_then(JsonValue::as_str)
        .map(String::from);
    node.required = location == ParameterLocation::Path
        || param.get("required").and_then(JsonValue::as_bool).unwrap_or(false);

    let mut extensions: VendorExtensions = typed.vendor_extensions;
    if let Some(object) = param.as_object() {
        extensions.extend(extract_vendor_extensions(object));
    }
    node.vendor_extensions = extensions;
    if location == ParameterLocation::Body {
        node.raw_schema_fragment = Some(serde_json::to_string(param)?);
    }
    Ok(node)
}

fn build_request_body(
    adapter: &SchemaAdapter<'_>,
    body: &JsonValue,
    imports: &mut Vec<String>,
) -> crate::Result<Option<ParameterNode>> {
    let Some(media) = first_media(body) else {
        return Ok(None);
    };
    let Some(schema) = media.get("schema") else {
        return Ok(None);
    };
    let name = body
        .get(BODY_NAME_EXTENSION)
        .and_then(JsonValue::as_str)
        .unwrap_or(DEFAULT_BODY_NAME);
    let typed = adapter.types.property(name, schema, imports);

    let mut node = ParameterNode::new(
        name,
        ParameterLocation::Body,
        typed.declared_type,
        typed.resolved_type,
    );
    node.base_type = typed.base_type;
    node.format = typed.format;
    node.is_container = typed.container.is_some();
    node.required = body.get("required").and_then(JsonValue::as_bool).unwrap_or(false);
    node.description = body
        .get("description")
        .and_then(JsonValue::as_str)
        .map(String::from);
    if let Some(object) = body.as_object() {
        node.vendor_extensions = extract_vendor_extensions(object);
    }
    node.raw_schema_fragment = Some(serde_json::to_string(media)?);
    Ok(Some(node))
}

/// `application/json` media of an OpenAPI 3 body or response, else the first one
fn first_media(value: &JsonValue) -> Option<&JsonValue> {
    let content = value.get("content")?.as_object()?;
    content
        .get("application/json")
        .or_else(|| content.values().next())
}

fn response_schema(is_swagger2: bool, response: &JsonValue) -> Option<&JsonValue> {
    if is_swagger2 {
        response.get("schema")
    } else {
        first_media(response).and_then(|media| media.get("schema"))
    }
}

fn is_primitive(declared_type: &str) -> bool {
    matches!(declared_type, "string" | "integer" | "number" | "boolean")
}

fn auth_methods(adapter: &SchemaAdapter<'_>, requirements: &[JsonValue]) -> Vec<AuthMethod> {
    let schemes = adapter.context.security_schemes();
    let mut methods: Vec<AuthMethod> = Vec::new();
    for requirement in requirements.iter().filter_map(JsonValue::as_object) {
        for name in requirement.keys() {
            if methods.iter().any(|m| &m.name == name) {
                continue;
            }
            let Some(scheme) = schemes.and_then(|s| s.get(name)) else {
                warn!("Security requirement '{}' has no matching scheme", name);
                continue;
            };
            match auth_method(name, scheme) {
                Some(method) => methods.push(method),
                None => warn!("Unsupported security scheme '{}'", name),
            }
        }
    }
    methods
}

fn auth_method(name: &str, scheme: &JsonValue) -> Option<AuthMethod> {
    let text = |key: &str| scheme.get(key).and_then(JsonValue::as_str);
    let kind = match text("type")? {
        "apiKey" => AuthKind::ApiKey,
        "basic" => AuthKind::Basic,
        "http" => match text("scheme").map(str::to_ascii_lowercase).as_deref() {
            Some("basic") => AuthKind::Basic,
            Some("bearer") => AuthKind::Bearer,
            _ => return None,
        },
        "oauth2" => AuthKind::OAuth2,
        "openIdConnect" => AuthKind::OpenIdConnect,
        _ => return None,
    };
    let key_location = match (kind, text("in")) {
        (AuthKind::ApiKey, Some("header")) => Some(ApiKeyLocation::Header),
        (AuthKind::ApiKey, Some("query")) => Some(ApiKeyLocation::Query),
        (AuthKind::ApiKey, Some("cookie")) => Some(ApiKeyLocation::Cookie),
        _ => None,
    };
    Some(AuthMethod {
        name: name.to_string(),
        kind,
        key_param_name: (kind == AuthKind::ApiKey)
            .then(|| text("name").map(String::from))
            .flatten(),
        key_location,
        description: text("description").map(String::from),
    })
}
