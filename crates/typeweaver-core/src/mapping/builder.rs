//! Resolves a [`DataTypeMapping`] into a [`TypeRegistry`].

use std::path::PathBuf;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use log::{debug, info, warn};
use tokio::fs;
use url::Url;

use super::discover::{NamespaceScope, TypeDiscoverer};
use super::registry::{TypeDescriptor, TypeRegistry};
use super::DataTypeMapping;
use crate::Error;

/// Upper bound on a single remote mapping document fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds registries from mapping configurations.
///
/// Sources are merged direct map first, then packages, then external
/// resources; each external document is merged depth-first in the same order,
/// so a later source overrides an earlier alias.
pub struct TypeRegistryBuilder<'d> {
    discoverer: &'d dyn TypeDiscoverer,
    client: reqwest::Client,
    fetch_timeout: Duration,
}

impl<'d> TypeRegistryBuilder<'d> {
    pub fn new(discoverer: &'d dyn TypeDiscoverer) -> Self {
        Self {
            discoverer,
            client: reqwest::Client::new(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Resolve every source of `mapping` into one registry.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if a namespace specifier is invalid, a remote
    /// document cannot be fetched in time or parsed, or remote documents
    /// reference each other in a cycle.
    pub async fn build(&self, mapping: &DataTypeMapping) -> crate::Result<TypeRegistry> {
        let mut registry = TypeRegistry::new();
        let mut chain = Vec::new();
        self.merge(mapping, None, &mut registry, &mut chain).await?;
        Ok(registry)
    }

    fn merge<'a>(
        &'a self,
        mapping: &'a DataTypeMapping,
        base: Option<&'a Url>,
        registry: &'a mut TypeRegistry,
        chain: &'a mut Vec<Url>,
    ) -> BoxFuture<'a, crate::Result<()>> {
        async move {
            for (alias, fully_qualified_name) in &mapping.direct_map {
                register(registry, TypeDescriptor::new(alias, fully_qualified_name));
            }

            for specifier in &mapping.packages {
                let scope = NamespaceScope::parse(specifier)?;
                info!("# Scanning package {}", specifier);
                for discovered in self.discoverer.discover(&scope) {
                    register(
                        registry,
                        TypeDescriptor::new(discovered.simple_name, discovered.fully_qualified_name),
                    );
                }
            }

            for reference in &mapping.external_resources {
                let url = resolve_reference(reference, base)?;
                if chain.contains(&url) {
                    let cycle: Vec<&str> = chain
                        .iter()
                        .map(Url::as_str)
                        .chain(std::iter::once(url.as_str()))
                        .collect();
                    return Err(Error::config(format!(
                        "Cyclic external mapping resources: {}",
                        cycle.join(" -> ")
                    )));
                }
                info!("--- External Resource -> {} ---", url);
                let nested = self.fetch(&url).await?;
                chain.push(url.clone());
                self.merge(&nested, Some(&url), &mut *registry, &mut *chain)
                    .await?;
                chain.pop();
            }
            Ok(())
        }
        .boxed()
    }

    async fn fetch(&self, url: &Url) -> crate::Result<DataTypeMapping> {
        let content = tokio::time::timeout(self.fetch_timeout, self.read(url))
            .await
            .map_err(|_| {
                Error::config(format!(
                    "Timed out after {:?} fetching mapping resource {}",
                    self.fetch_timeout, url
                ))
            })??;
        DataTypeMapping::parse(&content).map_err(|e| {
            Error::config(format!("Malformed mapping resource {}: {}", url, e))
        })
    }

    async fn read(&self, url: &Url) -> crate::Result<String> {
        match url.scheme() {
            "http" | "https" => {
                let response = self.client.get(url.clone()).send().await.map_err(|e| {
                    Error::config(format!("Failed to fetch mapping resource {}: {}", url, e))
                })?;
                if !response.status().is_success() {
                    return Err(Error::config(format!(
                        "Failed to fetch mapping resource {}: HTTP {}",
                        url,
                        response.status()
                    )));
                }
                response.text().await.map_err(|e| {
                    Error::config(format!("Failed to read mapping resource {}: {}", url, e))
                })
            }
            "file" => {
                let path: PathBuf = url.to_file_path().map_err(|_| {
                    Error::config(format!("Invalid file URL for mapping resource: {}", url))
                })?;
                fs::read_to_string(&path).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to read mapping resource {}: {}",
                        path.display(),
                        e
                    ))
                })
            }
            other => Err(Error::config(format!(
                "Unsupported scheme '{}' for mapping resource {}",
                other, url
            ))),
        }
    }
}

/// Absolute URIs are used as is; relative ones resolve against the referencing document
fn resolve_reference(reference: &str, base: Option<&Url>) -> crate::Result<Url> {
    let resolved = match base {
        Some(base) => base.join(reference),
        None => Url::parse(reference),
    };
    resolved.map_err(|e| {
        Error::config(format!(
            "Invalid external mapping resource '{}': {}",
            reference, e
        ))
    })
}

fn register(registry: &mut TypeRegistry, descriptor: TypeDescriptor) {
    debug!(
        "Mapping {} -> {}",
        descriptor.alias, descriptor.fully_qualified_name
    );
    if let Some(previous) = registry.insert(descriptor) {
        if let Some(current) = registry.get(&previous.alias) {
            if current.fully_qualified_name != previous.fully_qualified_name {
                warn!(
                    "Alias {} remapped from {} to {}",
                    previous.alias, previous.fully_qualified_name, current.fully_qualified_name
                );
            }
        }
    }
}
