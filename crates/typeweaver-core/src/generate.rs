//! Generation entry point: runs every configured source through one session.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{config::Config, openapi::OpenApiContext, session::GenerationSession, Error};

/// Which graphs a run produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GenerateTarget {
    Models,
    Apis,
    #[default]
    All,
}

impl GenerateTarget {
    pub fn includes_models(self) -> bool {
        matches!(self, Self::Models | Self::All)
    }

    pub fn includes_apis(self) -> bool {
        matches!(self, Self::Apis | Self::All)
    }
}

/// Process every source file of `config` and write one `<stem>.json` hand-off
/// document per source into the output directory.
///
/// Returns the written paths in source order.
pub async fn generate(config: &Config, target: GenerateTarget) -> crate::Result<Vec<PathBuf>> {
    if config.source_files.is_empty() {
        return Err(Error::config("No source files configured"));
    }

    // 1. One session, one registry for all sources
    let session = GenerationSession::new(config.clone()).await?;

    // 2. Output directory
    let output_dir = PathBuf::from(&config.output_dir);
    fs::create_dir_all(&output_dir).await?;

    // 3. Adapt, rewrite and hand off each source
    let mut written = Vec::with_capacity(config.source_files.len());
    for source in &config.source_files {
        info!("Processing {}", source);
        let context = OpenApiContext::from_file_or_url(source).await?;
        let processed = session.process(&context, target).await?;

        let path = output_dir.join(format!("{}.json", output_stem(source)));
        fs::write(&path, serde_json::to_string_pretty(&processed)?).await?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// `specs/petstore.yaml` -> `petstore`, also for URLs
fn output_stem(source: &str) -> String {
    let trimmed = source.split(['?', '#']).next().unwrap_or(source);
    Path::new(trimmed.trim_end_matches('/'))
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("schema")
        .to_string()
}
