//! Post-processing passes over the parsed graphs.
//!
//! [`rewrite_models`] and [`rewrite_operations`] substitute registry types into
//! a [`ModelGraph`](crate::graph::ModelGraph) and an
//! [`ApiGraph`](crate::graph::ApiGraph) in place; [`group_operations`] then
//! splits the operations into the interfaces handed to the renderer.

pub mod models;
pub mod operations;

use crate::extensions::WILDCARD;
use crate::mapping::TypeRegistry;
use crate::naming::NamePolicy;

pub use models::rewrite_models;
pub use operations::{group_operations, resource_group, rewrite_operations};

/// Switches that change how operations are rewritten
#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    /// Inject one header parameter per header API key credential
    pub security_headers_as_arguments: bool,
    /// Group operations by the first segment of `basePath + path`
    pub base_path_as_root: bool,
    pub names: NamePolicy,
}

/// Target simple name of `type_name` if it is a registered alias, else `type_name` unchanged
pub fn resolve_type(registry: &TypeRegistry, type_name: &str) -> String {
    registry
        .get(type_name)
        .map_or_else(|| type_name.to_string(), |d| d.simple_name.clone())
}

/// Writes `base<args...>`, resolving every argument through the registry.
///
/// Known aliases are replaced by their simple name and their fully-qualified
/// name is pushed to `imports`; unknown arguments and the wildcard are kept
/// verbatim and never imported.
pub fn instantiate(
    base: &str,
    arguments: &[String],
    registry: &TypeRegistry,
    imports: &mut Vec<String>,
) -> String {
    if arguments.is_empty() {
        return base.to_string();
    }
    let resolved: Vec<String> = arguments
        .iter()
        .map(|arg| {
            if arg == WILDCARD {
                return arg.clone();
            }
            match registry.get(arg) {
                Some(descriptor) => {
                    imports.push(descriptor.fully_qualified_name.clone());
                    descriptor.simple_name.clone()
                }
                None => arg.clone(),
            }
        })
        .collect();
    format!("{}<{}>", base, resolved.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::TypeDescriptor;

    fn registry() -> TypeRegistry {
        [
            TypeDescriptor::new("X", "com.acme.ResolvedX"),
            TypeDescriptor::new("Page", "com.acme.paging.Page"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_resolve_type() {
        let registry = registry();
        assert_eq!(resolve_type(&registry, "X"), "ResolvedX");
        assert_eq!(resolve_type(&registry, "Integer"), "Integer");
    }

    #[test]
    fn test_instantiate_with_wildcard() {
        let mut imports = Vec::new();
        let rendered = instantiate(
            "Resolved",
            &["X".to_string(), "?".to_string()],
            &registry(),
            &mut imports,
        );
        assert_eq!(rendered, "Resolved<ResolvedX, ?>");
        assert_eq!(imports, vec!["com.acme.ResolvedX".to_string()]);
    }

    #[test]
    fn test_instantiate_unknown_args_verbatim() {
        let mut imports = Vec::new();
        let rendered = instantiate("Page", &["Long".to_string()], &registry(), &mut imports);
        assert_eq!(rendered, "Page<Long>");
        assert!(imports.is_empty());
    }

    #[test]
    fn test_instantiate_without_arguments() {
        let mut imports = Vec::new();
        assert_eq!(instantiate("Page", &[], &registry(), &mut imports), "Page");
    }
}
