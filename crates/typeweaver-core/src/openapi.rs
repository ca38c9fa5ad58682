//! OpenAPI / Swagger document loading and lookups.
//!
//! Both Swagger 2.0 and OpenAPI 3 documents are accepted. The document is kept
//! as raw JSON; [`crate::adapter`] turns it into graphs.
//!
//! # Examples
//!
//! ```no_run
//! use typeweaver_core::openapi::OpenApiContext;
//! use typeweaver_core::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let spec = OpenApiContext::from_file_or_url("petstore.yaml").await?;
//!
//! if let Some(title) = spec.title() {
//!     println!("API Title: {}", title);
//! }
//! println!("Base path: {:?}", spec.base_path());
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde_json::{Map as JsonMap, Value as JsonValue};
use tokio::fs;
use url::Url;

use crate::Error;

/// Guard against `$ref` chains pointing at each other
const MAX_REF_DEPTH: usize = 32;

/// A loaded schema document
#[derive(Debug, Clone, serde::Serialize)]
#[serde(transparent)]
pub struct OpenApiContext {
    /// The raw JSON value of the document
    pub json: JsonValue,
}

impl OpenApiContext {
    pub fn new(json: JsonValue) -> Self {
        Self { json }
    }

    /// Load from a file or an http(s) URL (YAML or JSON)
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> crate::Result<Self> {
        let location = location.as_ref();

        if location.starts_with("http://") || location.starts_with("https://") {
            return Self::from_url(location).await;
        }

        Self::from_file(location).await
    }

    /// Load from a file (YAML or JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!("Failed to read schema {}: {}", path.display(), e))
        })?;
        Self::parse_content(&content).map_err(|e| {
            Error::schema(format!(
                "Failed to parse schema at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load from a URL (YAML or JSON)
    pub async fn from_url(url: &str) -> crate::Result<Self> {
        let response = reqwest::get(url).await.map_err(|e| {
            Error::config(format!("Failed to fetch schema from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::config(format!(
                "Failed to fetch schema from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await.map_err(|e| {
            Error::config(format!("Failed to read response from {}: {}", url, e))
        })?;

        Self::parse_content(&content).map_err(|e| {
            Error::schema(format!("Failed to parse schema from {}: {}", url, e))
        })
    }

    /// Parse content as either JSON or YAML
    pub fn parse_content(content: &str) -> Result<Self, String> {
        if let Ok(json) = serde_json::from_str(content) {
            return Ok(Self { json });
        }

        match serde_yaml::from_str::<JsonValue>(content) {
            Ok(json) if json.is_object() => Ok(Self { json }),
            Ok(_) => Err("document is not an object".to_string()),
            Err(_) => Err("content is neither valid JSON nor YAML".to_string()),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.json.get("info")?.get("title")?.as_str()
    }

    pub fn version(&self) -> Option<&str> {
        self.json.get("info")?.get("version")?.as_str()
    }

    /// `true` for Swagger 2.0, `false` for OpenAPI 3
    pub fn is_swagger2(&self) -> bool {
        self.json.get("swagger").is_some()
    }

    /// Base path of every resource path.
    ///
    /// Swagger 2.0 `basePath`, or the path component of the first OpenAPI 3
    /// server URL. `None` when absent or `/`.
    pub fn base_path(&self) -> Option<String> {
        let raw = if self.is_swagger2() {
            self.json.get("basePath")?.as_str()?.to_string()
        } else {
            let url = self
                .json
                .get("servers")?
                .as_array()?
                .first()?
                .get("url")?
                .as_str()?;
            match Url::parse(url) {
                Ok(parsed) => parsed.path().to_string(),
                // relative server URLs are plain paths
                Err(_) => url.to_string(),
            }
        };
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        Some(if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        })
    }

    pub fn paths(&self) -> Option<&JsonMap<String, JsonValue>> {
        self.json.get("paths")?.as_object()
    }

    /// Named schemas: `definitions` (Swagger 2.0) or `components.schemas`
    pub fn schemas(&self) -> Option<&JsonMap<String, JsonValue>> {
        if self.is_swagger2() {
            self.json.get("definitions")?.as_object()
        } else {
            self.json.get("components")?.get("schemas")?.as_object()
        }
    }

    /// `securityDefinitions` (Swagger 2.0) or `components.securitySchemes`
    pub fn security_schemes(&self) -> Option<&JsonMap<String, JsonValue>> {
        if self.is_swagger2() {
            self.json.get("securityDefinitions")?.as_object()
        } else {
            self.json.get("components")?.get("securitySchemes")?.as_object()
        }
    }

    /// Document-wide security requirements
    pub fn global_security(&self) -> Option<&Vec<JsonValue>> {
        self.json.get("security")?.as_array()
    }

    /// Follows local `$ref`s until a non-reference value is reached.
    ///
    /// # Errors
    ///
    /// [`Error::Schema`] for dangling, external or looping references.
    pub fn resolve<'a>(&'a self, value: &'a JsonValue) -> crate::Result<&'a JsonValue> {
        let mut current = value;
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = current.get("$ref").and_then(JsonValue::as_str) else {
                return Ok(current);
            };
            let pointer = reference.strip_prefix('#').ok_or_else(|| {
                Error::schema(format!("Unsupported external reference '{}'", reference))
            })?;
            current = self.json.pointer(pointer).ok_or_else(|| {
                Error::schema(format!("Reference '{}' not found", reference))
            })?;
        }
        Err(Error::schema(format!(
            "Reference chain deeper than {} starting at {}",
            MAX_REF_DEPTH, value
        )))
    }
}

/// Last segment of a `$ref`: `#/definitions/Pet` -> `Pet`
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}
