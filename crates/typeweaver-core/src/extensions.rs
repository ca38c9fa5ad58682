//! Reads the generator directives carried as vendor extensions.
//!
//! | key                        | where            | meaning                                   |
//! |----------------------------|------------------|-------------------------------------------|
//! | `x-type`                   | property, param  | alias of the real type of a `string` field |
//! | `x-superClass`             | model            | alias of the parent class (one value)     |
//! | `x-superClassTemplateArgs` | model            | generic arguments of the parent class     |
//! | `x-typeTemplateArgs`       | property         | generic arguments of the field type       |
//! | `x-interfaceName`          | path item        | interface every operation of the path lands in |
//!
//! A `string` field whose `format` starts with `x-` is shorthand for `x-type`:
//! `format: x-Money` behaves like `x-type: Money`. An explicit `x-type` wins.

use serde_json::Value as JsonValue;

use crate::graph::VendorExtensions;
use crate::Error;

pub const X_TYPE: &str = "x-type";
pub const X_SUPER_CLASS: &str = "x-superClass";
pub const X_SUPER_CLASS_TEMPLATE_ARGS: &str = "x-superClassTemplateArgs";
pub const X_TYPE_TEMPLATE_ARGS: &str = "x-typeTemplateArgs";
pub const X_INTERFACE_NAME: &str = "x-interfaceName";

/// Private-use prefix of a format naming a symbolic type
pub const FORMAT_PREFIX: &str = "x-";

/// Template argument meaning "unspecified"; passed through and never imported
pub const WILDCARD: &str = "?";

/// Symbolic type of a field, if any.
///
/// Only fields declared as `string` qualify. `x-type` is checked first, then a
/// format carrying the private-use prefix.
pub fn symbolic_type(
    declared_type: &str,
    format: Option<&str>,
    extensions: &VendorExtensions,
    entity: &str,
) -> crate::Result<Option<String>> {
    if !declared_type.eq_ignore_ascii_case("string") {
        return Ok(None);
    }
    if let Some(value) = extensions.get(X_TYPE) {
        let alias = value.as_str().ok_or_else(|| {
            Error::schema(format!("{X_TYPE} of {entity} must be a string, found {value}"))
        })?;
        return Ok(non_blank(alias));
    }
    Ok(format
        .and_then(|f| f.strip_prefix(FORMAT_PREFIX))
        .and_then(non_blank))
}

/// The superclass alias of a model.
///
/// # Errors
///
/// [`Error::Schema`] unless the extension holds exactly one string.
pub fn superclass(extensions: &VendorExtensions, entity: &str) -> crate::Result<Option<String>> {
    let Some(value) = extensions.get(X_SUPER_CLASS) else {
        return Ok(None);
    };
    let values = string_list(value, X_SUPER_CLASS, entity)?;
    match values.as_slice() {
        [single] => Ok(Some(single.clone())),
        _ => Err(Error::schema(format!(
            "{X_SUPER_CLASS} extension of {entity} must have exactly one value, found {}",
            values.len()
        ))),
    }
}

/// Ordered generic arguments stored under `key`.
///
/// Accepts a list or a comma-separated string (`"Money, ?"`).
pub fn template_arguments(
    extensions: &VendorExtensions,
    key: &str,
    entity: &str,
) -> crate::Result<Option<Vec<String>>> {
    let Some(value) = extensions.get(key) else {
        return Ok(None);
    };
    let args = match value {
        JsonValue::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        other => string_list(other, key, entity)?,
    };
    Ok(Some(args))
}

/// Interface override of a path item
pub fn interface_name(extensions: &VendorExtensions) -> Option<String> {
    extensions
        .get(X_INTERFACE_NAME)
        .and_then(JsonValue::as_str)
        .and_then(non_blank)
}

fn string_list(value: &JsonValue, key: &str, entity: &str) -> crate::Result<Vec<String>> {
    match value {
        JsonValue::String(s) => Ok(vec![s.clone()]),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(String::from).ok_or_else(|| {
                    Error::schema(format!(
                        "{key} extension of {entity} must contain only strings, found {item}"
                    ))
                })
            })
            .collect(),
        other => Err(Error::schema(format!(
            "{key} extension of {entity} must be a string or a list of strings, found {other}"
        ))),
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ext(pairs: &[(&str, JsonValue)]) -> VendorExtensions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_symbolic_type_from_extension() {
        let e = ext(&[(X_TYPE, json!("Money"))]);
        assert_eq!(
            symbolic_type("string", None, &e, "p").unwrap(),
            Some("Money".to_string())
        );
        assert_eq!(
            symbolic_type("STRING", None, &e, "p").unwrap(),
            Some("Money".to_string())
        );
    }

    #[test]
    fn test_symbolic_type_requires_string() {
        let e = ext(&[(X_TYPE, json!("Money"))]);
        assert_eq!(symbolic_type("integer", Some("x-Money"), &e, "p").unwrap(), None);
    }

    #[test]
    fn test_symbolic_type_from_format() {
        let e = VendorExtensions::new();
        assert_eq!(
            symbolic_type("string", Some("x-Currency"), &e, "p").unwrap(),
            Some("Currency".to_string())
        );
        assert_eq!(symbolic_type("string", Some("date-time"), &e, "p").unwrap(), None);
        assert_eq!(symbolic_type("string", Some("x-"), &e, "p").unwrap(), None);
    }

    #[test]
    fn test_extension_wins_over_format() {
        let e = ext(&[(X_TYPE, json!("Money"))]);
        assert_eq!(
            symbolic_type("string", Some("x-Currency"), &e, "p").unwrap(),
            Some("Money".to_string())
        );
    }

    #[test]
    fn test_symbolic_type_rejects_non_string() {
        let e = ext(&[(X_TYPE, json!(42))]);
        assert!(matches!(
            symbolic_type("string", None, &e, "p"),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_superclass_arity() {
        let one = ext(&[(X_SUPER_CLASS, json!(["Base"]))]);
        assert_eq!(superclass(&one, "M").unwrap(), Some("Base".to_string()));

        let bare = ext(&[(X_SUPER_CLASS, json!("Base"))]);
        assert_eq!(superclass(&bare, "M").unwrap(), Some("Base".to_string()));

        let two = ext(&[(X_SUPER_CLASS, json!(["A", "B"]))]);
        match superclass(&two, "M") {
            Err(Error::Schema(msg)) => assert!(msg.contains("exactly one value")),
            other => panic!("unexpected: {other:?}"),
        }

        let none = ext(&[(X_SUPER_CLASS, json!([]))]);
        assert!(superclass(&none, "M").is_err());

        assert_eq!(superclass(&VendorExtensions::new(), "M").unwrap(), None);
    }

    #[test]
    fn test_template_arguments_forms() {
        let list = ext(&[(X_TYPE_TEMPLATE_ARGS, json!(["Money", "?"]))]);
        assert_eq!(
            template_arguments(&list, X_TYPE_TEMPLATE_ARGS, "p").unwrap(),
            Some(vec!["Money".to_string(), "?".to_string()])
        );
        let csv = ext(&[(X_TYPE_TEMPLATE_ARGS, json!("Money, ?"))]);
        assert_eq!(
            template_arguments(&csv, X_TYPE_TEMPLATE_ARGS, "p").unwrap(),
            Some(vec!["Money".to_string(), "?".to_string()])
        );
        let bad = ext(&[(X_TYPE_TEMPLATE_ARGS, json!([1]))]);
        assert!(template_arguments(&bad, X_TYPE_TEMPLATE_ARGS, "p").is_err());
    }

    #[test]
    fn test_interface_name() {
        let e = ext(&[(X_INTERFACE_NAME, json!("Payments"))]);
        assert_eq!(interface_name(&e), Some("Payments".to_string()));
        assert_eq!(interface_name(&VendorExtensions::new()), None);
    }
}
