//! Naming rules for generated interfaces and models.

use serde::{Deserialize, Serialize};

use crate::utils::to_upper_camel_case;

/// Label used for operations whose group key is empty (e.g. the `/` path)
pub const DEFAULT_GROUP: &str = "Default";

/// Suffixes appended to generated interface and model names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePolicy {
    /// Appended to every API interface name (e.g. `Api`)
    pub api_suffix: Option<String>,
    /// Appended to every generated model class name (e.g. `Dto`)
    pub model_suffix: Option<String>,
}

impl NamePolicy {
    pub fn new(api_suffix: Option<String>, model_suffix: Option<String>) -> Self {
        Self {
            api_suffix: api_suffix.filter(|s| !s.is_empty()),
            model_suffix: model_suffix.filter(|s| !s.is_empty()),
        }
    }

    /// Name of the interface an operation group is emitted under.
    ///
    /// Interface names are always sanitized and camel-cased since they name a
    /// type; the suffix is only appended when configured.
    pub fn interface_name(&self, group_key: &str) -> String {
        let mut name = to_upper_camel_case(&sanitize(group_key));
        if name.is_empty() {
            name = DEFAULT_GROUP.to_string();
        }
        if let Some(suffix) = &self.api_suffix {
            name.push_str(suffix);
        }
        name
    }

    /// Class name of a schema model. Without a model suffix the schema name is kept.
    pub fn model_name(&self, schema_name: &str) -> String {
        match &self.model_suffix {
            Some(suffix) => {
                let mut name = to_upper_camel_case(&sanitize(schema_name));
                if name.is_empty() {
                    name = DEFAULT_GROUP.to_string();
                }
                name.push_str(suffix);
                name
            }
            None => schema_name.to_string(),
        }
    }
}

/// Replaces any character that is not ASCII alphanumeric or `_` with `_`
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
