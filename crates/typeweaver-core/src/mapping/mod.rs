//! Declarative type mapping configuration and the registry built from it.
//!
//! A [`DataTypeMapping`] names three kinds of sources, merged in this order:
//!
//! 1. `directMap`: explicit `alias -> fully.qualified.Name` pairs
//! 2. `packages`: namespaces scanned through a [`TypeDiscoverer`]; a trailing
//!    `.**` includes nested namespaces
//! 3. `externalResources`: URIs of further mapping documents of the same
//!    shape, merged recursively in the same order
//!
//! # Examples
//!
//! ```
//! use typeweaver_core::mapping::DataTypeMapping;
//!
//! let mapping: DataTypeMapping = serde_yaml::from_str(
//!     r#"
//! directMap:
//!   Money: com.acme.types.Money
//! packages: com.acme.events.**
//! "#,
//! )
//! .unwrap();
//! assert_eq!(mapping.direct_map["Money"], "com.acme.types.Money");
//! assert_eq!(mapping.packages, vec!["com.acme.events.**".to_string()]);
//! ```

pub mod builder;
pub mod discover;
pub mod registry;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;

pub use builder::{TypeRegistryBuilder, DEFAULT_FETCH_TIMEOUT};
pub use discover::{DiscoveredType, ManifestDiscoverer, NamespaceScope, TypeDiscoverer, TypeKind};
pub use registry::{TypeDescriptor, TypeRegistry};

/// Mapping sources for one configuration level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeMapping {
    /// Explicit alias to fully-qualified name pairs
    #[serde(default)]
    pub direct_map: BTreeMap<String, String>,

    /// Namespace specifiers to scan, optionally ending in `.**`
    #[serde(default, deserialize_with = "deserialize_strings")]
    pub packages: Vec<String>,

    /// URIs of further mapping documents
    #[serde(default, deserialize_with = "deserialize_strings")]
    pub external_resources: Vec<String>,
}

impl DataTypeMapping {
    pub fn is_empty(&self) -> bool {
        self.direct_map.is_empty() && self.packages.is_empty() && self.external_resources.is_empty()
    }

    /// Parse a mapping document (YAML or JSON). An empty or `null` document is an empty mapping.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mapping: Option<Self> = serde_yaml::from_str(content)?;
        Ok(mapping.unwrap_or_default())
    }
}

/// Accepts a single string, a list of strings or null
fn deserialize_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = SerdeValue::deserialize(deserializer)?;

    let mut result: Vec<String> = Vec::new();
    match value {
        SerdeValue::Unit | SerdeValue::Option(None) => {}
        SerdeValue::String(s) => result.push(s),
        SerdeValue::Seq(seq) => {
            for item in seq {
                match item {
                    SerdeValue::String(s) => {
                        if !result.contains(&s) {
                            result.push(s);
                        }
                    }
                    _ => {
                        return Err(serde::de::Error::custom(
                            "Expected string or array of strings",
                        ))
                    }
                }
            }
        }
        _ => {
            return Err(serde::de::Error::custom(
                "Expected string or array of strings",
            ))
        }
    }
    Ok(result)
}
