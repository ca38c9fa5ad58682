//! Operation (API method) side of the graph

use serde::{Deserialize, Serialize};

use super::{ContainerKind, ImportSet, PropertyNode, VendorExtensions};

/// All operations parsed from one schema source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGraph {
    /// Base path declared by the schema (`basePath` or the path of the first server URL)
    pub base_path: Option<String>,
    pub operations: Vec<OperationNode>,
}

/// A single API method
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationNode {
    pub operation_id: String,
    /// Lowercase HTTP method
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
    pub return_type: Option<String>,
    /// Typed schema of the response the return type was taken from
    #[serde(skip)]
    pub return_property: Option<PropertyNode>,
    pub responses: Vec<ResponseNode>,
    pub parameters: Vec<ParameterNode>,
    pub auth_methods: Vec<AuthMethod>,
    /// Logical interface the operation is emitted under
    pub group_key: String,
    /// Extensions of the enclosing path item, shared by every operation of that path
    pub path_extensions: VendorExtensions,
    pub vendor_extensions: VendorExtensions,
    pub imports: ImportSet,
}

impl OperationNode {
    pub fn new(
        operation_id: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let path = path.into();
        Self {
            operation_id: operation_id.into(),
            method: method.into(),
            group_key: path.clone(),
            path,
            summary: None,
            return_type: None,
            return_property: None,
            responses: Vec::new(),
            parameters: Vec::new(),
            auth_methods: Vec::new(),
            path_extensions: VendorExtensions::new(),
            vendor_extensions: VendorExtensions::new(),
            imports: ImportSet::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseNode {
    /// Status code or `default`
    pub code: String,
    pub description: Option<String>,
    /// Element type of the response body
    pub base_type: Option<String>,
    #[serde(skip)]
    pub schema: Option<PropertyNode>,
}

/// Where a parameter is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
    FormData,
}

impl ParameterLocation {
    pub fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            "body" => Some(Self::Body),
            "formData" => Some(Self::FormData),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterNode {
    pub name: String,
    pub location: ParameterLocation,
    pub description: Option<String>,
    pub declared_type: String,
    pub format: Option<String>,
    pub base_type: String,
    pub resolved_type: String,
    pub is_body_param: bool,
    pub is_container: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerKind>,
    /// Element of a container parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertyNode>>,
    pub is_primitive_type: bool,
    pub required: bool,
    /// Trailing-comma flag for templates: set on every parameter except the last
    pub has_more: bool,
    /// Serialized schema of a body parameter, parsed again to find nested `x-type`
    pub raw_schema_fragment: Option<String>,
    pub vendor_extensions: VendorExtensions,
}

impl ParameterNode {
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        declared_type: impl Into<String>,
        resolved_type: impl Into<String>,
    ) -> Self {
        let resolved_type = resolved_type.into();
        Self {
            name: name.into(),
            location,
            description: None,
            declared_type: declared_type.into(),
            format: None,
            base_type: resolved_type.clone(),
            resolved_type,
            is_body_param: location == ParameterLocation::Body,
            is_container: false,
            container: None,
            items: None,
            is_primitive_type: false,
            required: location == ParameterLocation::Path,
            has_more: false,
            raw_schema_fragment: None,
            vendor_extensions: VendorExtensions::new(),
        }
    }

    /// Required string header carrying an API key credential
    pub fn security_header(name: impl Into<String>, description: Option<String>) -> Self {
        let mut param = Self::new(name, ParameterLocation::Header, "string", "String");
        param.description = description;
        param.required = true;
        param.is_primitive_type = true;
        param
    }
}

/// Sets `has_more` on every parameter but the last
pub fn relink_has_more(parameters: &mut [ParameterNode]) {
    let last = parameters.len().saturating_sub(1);
    for (index, param) in parameters.iter_mut().enumerate() {
        param.has_more = index < last;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthKind {
    ApiKey,
    Basic,
    Bearer,
    OAuth2,
    OpenIdConnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

/// A security scheme required by an operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthMethod {
    /// Name of the scheme in the schema's security definitions
    pub name: String,
    pub kind: AuthKind,
    /// Header/query/cookie name carrying an API key
    pub key_param_name: Option<String>,
    pub key_location: Option<ApiKeyLocation>,
    pub description: Option<String>,
}

impl AuthMethod {
    pub fn is_header_api_key(&self) -> bool {
        self.kind == AuthKind::ApiKey && self.key_location == Some(ApiKeyLocation::Header)
    }
}

/// Operations grouped under one generated interface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInterface {
    pub name: String,
    pub group_key: String,
    pub operations: Vec<OperationNode>,
    pub imports: ImportSet,
}
