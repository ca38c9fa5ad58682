//! One generation run: the registry plus the passes applied to each schema source.

use log::info;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tokio::sync::OnceCell;

use crate::adapter::SchemaAdapter;
use crate::config::Config;
use crate::generate::GenerateTarget;
use crate::graph::{ApiInterface, ModelNode};
use crate::mapping::{ManifestDiscoverer, TypeRegistry, TypeRegistryBuilder};
use crate::openapi::OpenApiContext;
use crate::rewrite::{group_operations, rewrite_models, rewrite_operations};

/// What the renderer receives for one schema source
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSchema {
    pub title: Option<String>,
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<ModelNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apis: Option<Vec<ApiInterface>>,
    pub additional_properties: JsonMap<String, JsonValue>,
}

/// Owns the configuration and the lazily built [`TypeRegistry`].
///
/// The registry is built on first use and shared by every source processed
/// through the session.
pub struct GenerationSession {
    config: Config,
    discoverer: ManifestDiscoverer,
    registry: OnceCell<TypeRegistry>,
}

impl GenerationSession {
    /// Session whose package scans see the types of the configured manifests
    pub async fn new(config: Config) -> crate::Result<Self> {
        let mut discoverer = ManifestDiscoverer::new();
        for manifest in &config.type_manifests {
            discoverer.merge(ManifestDiscoverer::from_file(manifest).await?);
        }
        Ok(Self::with_discoverer(config, discoverer))
    }

    pub fn with_discoverer(config: Config, discoverer: ManifestDiscoverer) -> Self {
        Self {
            config,
            discoverer,
            registry: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The registry, built on the first call
    pub async fn registry(&self) -> crate::Result<&TypeRegistry> {
        self.registry
            .get_or_try_init(|| async {
                let registry = TypeRegistryBuilder::new(&self.discoverer)
                    .with_fetch_timeout(self.config.fetch_timeout())
                    .build(&self.config.data_type_mapping)
                    .await?;
                info!("# Data Type Mapping ({} aliases)", registry.len());
                for descriptor in registry.descriptors() {
                    info!(
                        "{} -> {}",
                        descriptor.alias, descriptor.fully_qualified_name
                    );
                }
                Ok::<_, crate::Error>(registry)
            })
            .await
    }

    /// Adapt and rewrite one schema document
    pub async fn process(
        &self,
        context: &OpenApiContext,
        target: GenerateTarget,
    ) -> crate::Result<ProcessedSchema> {
        let registry = self.registry().await?;
        let options = &self.config.options;
        let names = options.name_policy();
        let adapter = SchemaAdapter::new(context, options.date_library, &names);

        let models = if target.includes_models() {
            let mut graph = adapter.models()?;
            rewrite_models(&mut graph, registry)?;
            info!("Rewrote {} models", graph.models.len());
            Some(graph.models)
        } else {
            None
        };

        let apis = if target.includes_apis() {
            let mut graph = adapter.operations()?;
            rewrite_operations(&mut graph, registry, &options.rewrite_options())?;
            let interfaces = group_operations(&graph, &names);
            info!(
                "Rewrote {} operations into {} interfaces",
                graph.operations.len(),
                interfaces.len()
            );
            Some(interfaces)
        } else {
            None
        };

        Ok(ProcessedSchema {
            title: context.title().map(String::from),
            version: context.version().map(String::from),
            models,
            apis,
            additional_properties: self.config.additional_properties(),
        })
    }
}
