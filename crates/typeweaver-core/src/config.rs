//! Configuration management for a typeweaver run.
//!
//! A [`Config`] names the schema sources, where the hand-off documents go, the
//! type mapping used to build the registry, and the generation options the
//! rewriters and renderer consume. It is loaded from YAML, or from TOML when
//! the file extension is `.toml`.
//!
//! # Examples
//!
//! ```no_run
//! use typeweaver_core::config::{Config, DateLibrary};
//!
//! # #[tokio::main]
//! # async fn main() -> typeweaver_core::Result<()> {
//! // Create a new config programmatically
//! let mut config = Config::new(["petstore.yaml"], "generated");
//! config.options.date_library = DateLibrary::Joda;
//! config.options.api_suffix = Some("Api".to_string());
//!
//! // Or load it from a file
//! let config = Config::from_file("typeweaver.yaml").await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use tokio::fs;

use crate::mapping::{DataTypeMapping, DEFAULT_FETCH_TIMEOUT};
use crate::naming::NamePolicy;
use crate::rewrite::RewriteOptions;
use crate::Error;

/// Configuration for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Schema documents to process, as paths or URLs
    #[serde(default)]
    pub source_files: Vec<String>,

    /// Directory receiving one hand-off document per source
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_package: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_package: Option<String>,

    #[serde(default)]
    pub verbose: bool,

    /// Sources of the type registry
    #[serde(default)]
    pub data_type_mapping: DataTypeMapping,

    /// Type manifests listing the types package scans can discover
    #[serde(default)]
    pub type_manifests: Vec<String>,

    /// Timeout for each external mapping resource fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(flatten)]
    pub options: GenerationOptions,
}

/// Options owned by the host and consumed by the rewriters and renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    /// Java 8 language mode (generic-aware templates)
    pub enable_generics: bool,
    /// Bean validation annotations on generated code
    pub enable_validation: bool,
    pub date_library: DateLibrary,
    pub security_headers_as_arguments: bool,
    pub base_path_as_root: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name_suffix: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            enable_generics: false,
            enable_validation: true,
            date_library: DateLibrary::default(),
            security_headers_as_arguments: true,
            base_path_as_root: true,
            api_suffix: None,
            model_name_suffix: None,
        }
    }
}

impl GenerationOptions {
    pub fn name_policy(&self) -> NamePolicy {
        NamePolicy::new(self.api_suffix.clone(), self.model_name_suffix.clone())
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            security_headers_as_arguments: self.security_headers_as_arguments,
            base_path_as_root: self.base_path_as_root,
            names: self.name_policy(),
        }
    }
}

/// Library backing `date` and `date-time` fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum DateLibrary {
    /// `java.util.Date`
    #[serde(rename = "legacy")]
    Legacy,
    /// `java.time` with offset date-times
    #[serde(rename = "java8")]
    Java8,
    /// `java.time` with local date-times
    #[default]
    #[serde(rename = "java8-localdatetime")]
    #[value(name = "java8-localdatetime")]
    Java8LocalDateTime,
    #[serde(rename = "joda")]
    Joda,
    #[serde(rename = "threetenbp")]
    Threetenbp,
}

impl DateLibrary {
    /// Name passed to the renderer
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Java8 => "java8",
            Self::Java8LocalDateTime => "java8-localdatetime",
            Self::Joda => "joda",
            Self::Threetenbp => "threetenbp",
        }
    }

    /// Fully-qualified type of a `date` field
    pub fn date_type(self) -> &'static str {
        match self {
            Self::Legacy => "java.util.Date",
            Self::Java8 | Self::Java8LocalDateTime => "java.time.LocalDate",
            Self::Joda => "org.joda.time.LocalDate",
            Self::Threetenbp => "org.threeten.bp.LocalDate",
        }
    }

    /// Fully-qualified type of a `date-time` field
    pub fn date_time_type(self) -> &'static str {
        match self {
            Self::Legacy => "java.util.Date",
            Self::Java8 => "java.time.OffsetDateTime",
            Self::Java8LocalDateTime => "java.time.LocalDateTime",
            Self::Joda => "org.joda.time.DateTime",
            Self::Threetenbp => "org.threeten.bp.OffsetDateTime",
        }
    }
}

impl Config {
    /// Create a new Config with default options
    pub fn new<I, S>(source_files: I, output_dir: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source_files: source_files.into_iter().map(Into::into).collect(),
            output_dir: output_dir.into(),
            model_package: None,
            api_package: None,
            verbose: false,
            data_type_mapping: DataTypeMapping::default(),
            type_manifests: Vec::new(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            options: GenerationOptions::default(),
        }
    }

    /// Load configuration from a YAML or TOML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config = if is_toml(path) {
            toml::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    /// Save configuration to a file, as TOML when the extension says so
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let content = if is_toml(path) {
            toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?
        } else {
            serde_yaml::to_string(self)?
        };
        fs::write(path, content).await?;
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        if self.fetch_timeout_secs == 0 {
            DEFAULT_FETCH_TIMEOUT
        } else {
            Duration::from_secs(self.fetch_timeout_secs)
        }
    }

    /// Properties exported to the renderer alongside the graphs
    pub fn additional_properties(&self) -> JsonMap<String, JsonValue> {
        let mut properties = JsonMap::new();
        properties.insert(
            "dateLibrary".into(),
            json!(self.options.date_library.as_str()),
        );
        properties.insert(
            "useBeanValidation".into(),
            json!(self.options.enable_validation),
        );
        properties.insert("java8".into(), json!(self.options.enable_generics));
        if let Some(package) = &self.model_package {
            properties.insert("modelPackage".into(), json!(package));
        }
        if let Some(package) = &self.api_package {
            properties.insert("apiPackage".into(), json!(package));
        }
        properties
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn default_output_dir() -> String {
    "generated".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_config_roundtrip() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("typeweaver.yaml");

        let mut config = Config::new(["petstore.yaml"], "out");
        config
            .data_type_mapping
            .direct_map
            .insert("Money".into(), "com.acme.types.Money".into());
        config.options.api_suffix = Some("Api".into());
        config.save(&file_path).await?;

        let loaded = Config::from_file(&file_path).await?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[tokio::test]
    async fn test_toml_roundtrip() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("typeweaver.toml");

        let mut config = Config::new(["a.json", "b.json"], "out");
        config.options.date_library = DateLibrary::Threetenbp;
        config.save(&file_path).await?;

        let loaded = Config::from_file(&file_path).await?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("sourceFiles: [api.yaml]").unwrap();
        assert_eq!(config.output_dir, "generated");
        assert_eq!(config.fetch_timeout(), DEFAULT_FETCH_TIMEOUT);
        assert!(config.options.enable_validation);
        assert!(config.options.security_headers_as_arguments);
        assert!(config.options.base_path_as_root);
        assert!(!config.options.enable_generics);
        assert_eq!(config.options.date_library, DateLibrary::Java8LocalDateTime);
    }

    #[test]
    fn test_options_from_yaml() {
        let config: Config = serde_yaml::from_str(
            r#"
sourceFiles: [api.yaml]
dateLibrary: joda
securityHeadersAsArguments: false
apiSuffix: Api
modelNameSuffix: ""
dataTypeMapping:
  directMap:
    Money: com.acme.types.Money
  packages: com.acme.events.**
"#,
        )
        .unwrap();
        assert_eq!(config.options.date_library, DateLibrary::Joda);
        assert!(!config.options.security_headers_as_arguments);
        let names = config.options.name_policy();
        assert_eq!(names.api_suffix.as_deref(), Some("Api"));
        assert_eq!(names.model_suffix, None);
        assert_eq!(config.data_type_mapping.packages, vec!["com.acme.events.**"]);
    }

    #[test]
    fn test_additional_properties() {
        let mut config = Config::new(["api.yaml"], "out");
        config.model_package = Some("com.acme.model".into());
        let properties = config.additional_properties();
        assert_eq!(properties["dateLibrary"], json!("java8-localdatetime"));
        assert_eq!(properties["useBeanValidation"], json!(true));
        assert_eq!(properties["java8"], json!(false));
        assert_eq!(properties["modelPackage"], json!("com.acme.model"));
        assert!(!properties.contains_key("apiPackage"));
    }

    #[test]
    fn test_date_library_types() {
        assert_eq!(DateLibrary::Legacy.date_time_type(), "java.util.Date");
        assert_eq!(DateLibrary::Java8.date_time_type(), "java.time.OffsetDateTime");
        assert_eq!(
            DateLibrary::from_str("java8-localdatetime", true),
            Ok(DateLibrary::Java8LocalDateTime)
        );
    }
}
