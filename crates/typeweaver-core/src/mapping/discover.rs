//! Namespace scanning.
//!
//! Type discovery is a capability of the host build: whatever the generated
//! code can reference must be known up front. [`TypeDiscoverer`] abstracts it;
//! [`ManifestDiscoverer`] backs it with type manifests, YAML files listing the
//! fully-qualified names available to the build:
//!
//! ```yaml
//! types:
//!   - com.acme.types.Money
//!   - name: com.acme.types.Shape
//!     kind: interface
//! ```

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::utils::{namespace_of, simple_name};
use crate::Error;

/// Marker turning a namespace specifier into a recursive scan
pub const RECURSIVE_MARKER: &str = ".**";

static NAMESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
        .expect("namespace pattern is a valid regex")
});

/// A parsed `packages` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceScope {
    pub namespace: String,
    pub recursive: bool,
}

impl NamespaceScope {
    /// Parse a specifier such as `com.acme.types` or `com.acme.**`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the specifier is not a dotted identifier path
    /// with an optional trailing `.**`.
    pub fn parse(specifier: &str) -> crate::Result<Self> {
        let specifier = specifier.trim();
        let (namespace, recursive) = match specifier.strip_suffix(RECURSIVE_MARKER) {
            Some(prefix) => (prefix, true),
            None => (specifier, false),
        };
        if !NAMESPACE_RE.is_match(namespace) {
            return Err(Error::config(format!(
                "Invalid namespace specifier '{specifier}': expected a dotted name optionally ending in '{RECURSIVE_MARKER}'"
            )));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            recursive,
        })
    }

    /// Whether a type living in `type_namespace` is covered by this scope
    pub fn matches(&self, type_namespace: &str) -> bool {
        if type_namespace == self.namespace {
            return true;
        }
        self.recursive
            && type_namespace
                .strip_prefix(self.namespace.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// Kind of a discovered type. Every kind is registered; the kind is informational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Abstract,
    Interface,
    Enum,
    Annotation,
    Record,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredType {
    pub simple_name: String,
    pub fully_qualified_name: String,
    pub kind: TypeKind,
}

impl DiscoveredType {
    pub fn new(fully_qualified_name: impl Into<String>, kind: TypeKind) -> Self {
        let fully_qualified_name = fully_qualified_name.into();
        Self {
            simple_name: simple_name(&fully_qualified_name).to_string(),
            fully_qualified_name,
            kind,
        }
    }

    pub fn namespace(&self) -> &str {
        namespace_of(&self.fully_qualified_name)
    }
}

/// Source of the types reachable by the build
pub trait TypeDiscoverer: Send + Sync {
    /// Lazily yields every known type inside `scope`
    fn discover<'a>(
        &'a self,
        scope: &'a NamespaceScope,
    ) -> Box<dyn Iterator<Item = DiscoveredType> + Send + 'a>;
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    types: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        kind: TypeKind,
    },
}

/// [`TypeDiscoverer`] over a fixed list of types loaded from manifests
#[derive(Debug, Clone, Default)]
pub struct ManifestDiscoverer {
    types: Vec<DiscoveredType>,
}

impl ManifestDiscoverer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discoverer over plain class names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: names
                .into_iter()
                .map(|name| DiscoveredType::new(name, TypeKind::Class))
                .collect(),
        }
    }

    /// Parse a manifest document
    pub fn parse(content: &str) -> crate::Result<Self> {
        let manifest: ManifestFile = serde_yaml::from_str(content)?;
        let types = manifest
            .types
            .into_iter()
            .map(|entry| match entry {
                ManifestEntry::Name(name) => DiscoveredType::new(name, TypeKind::Class),
                ManifestEntry::Detailed { name, kind } => DiscoveredType::new(name, kind),
            })
            .collect();
        Ok(Self { types })
    }

    /// Load a manifest from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!(
                "Failed to read type manifest {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content).map_err(|e| {
            Error::config(format!(
                "Invalid type manifest {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Adds the types of `other`
    pub fn merge(&mut self, other: Self) {
        self.types.extend(other.types);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeDiscoverer for ManifestDiscoverer {
    fn discover<'a>(
        &'a self,
        scope: &'a NamespaceScope,
    ) -> Box<dyn Iterator<Item = DiscoveredType> + Send + 'a> {
        Box::new(
            self.types
                .iter()
                .filter(move |t| scope.matches(t.namespace()))
                .cloned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discoverer() -> ManifestDiscoverer {
        ManifestDiscoverer::from_names([
            "com.acme.types.Money",
            "com.acme.types.geo.Point",
            "com.acme.typesextra.Other",
            "com.acme.Root",
        ])
    }

    fn names(discoverer: &ManifestDiscoverer, specifier: &str) -> Vec<String> {
        let scope = NamespaceScope::parse(specifier).unwrap();
        let mut found: Vec<String> = discoverer
            .discover(&scope)
            .map(|t| t.fully_qualified_name)
            .collect();
        found.sort();
        found
    }

    #[test]
    fn test_exact_scope() {
        assert_eq!(
            names(&discoverer(), "com.acme.types"),
            vec!["com.acme.types.Money".to_string()]
        );
    }

    #[test]
    fn test_recursive_scope_respects_dot_boundary() {
        assert_eq!(
            names(&discoverer(), "com.acme.types.**"),
            vec![
                "com.acme.types.Money".to_string(),
                "com.acme.types.geo.Point".to_string()
            ]
        );
    }

    #[test]
    fn test_invalid_specifiers() {
        for specifier in ["", "com..acme", "com.acme.*", "1com.acme", "com acme", ".**"] {
            assert!(
                matches!(NamespaceScope::parse(specifier), Err(Error::Configuration(_))),
                "{specifier} should be rejected"
            );
        }
    }

    #[test]
    fn test_manifest_includes_every_kind() {
        let manifest = ManifestDiscoverer::parse(
            r#"
types:
  - com.acme.types.Money
  - name: com.acme.types.Shape
    kind: interface
  - name: com.acme.types.AbstractEntity
    kind: abstract
"#,
        )
        .unwrap();
        let scope = NamespaceScope::parse("com.acme.types").unwrap();
        let found: Vec<_> = manifest.discover(&scope).collect();
        assert_eq!(found.len(), 3);
        assert_eq!(found[1].kind, TypeKind::Interface);
        assert_eq!(found[1].simple_name, "Shape");
    }

    #[tokio::test]
    async fn test_from_file_missing() {
        let result = ManifestDiscoverer::from_file("/nonexistent/types.yaml").await;
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
