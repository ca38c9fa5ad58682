//! typeweaver CLI entrypoint
//! Parses command-line arguments and dispatches to the core library.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use typeweaver_core::{Config, DateLibrary, GenerateTarget, GenerationSession};

#[derive(Parser)]
#[command(name = "typeweaver")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Rewrite schema sources against the type registry and write hand-off documents
    Generate {
        /// Configuration file (YAML, or TOML with a .toml extension)
        #[arg(long, short)]
        config: PathBuf,
        /// Which graphs to produce
        #[arg(long, value_enum, default_value_t = GenerateTarget::All)]
        target: GenerateTarget,
        /// Schema paths or URLs replacing the configured source files
        #[arg(long = "source")]
        sources: Vec<String>,
        /// Output directory replacing the configured one
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Date library replacing the configured one
        #[arg(long, value_enum)]
        date_library: Option<DateLibrary>,
    },
    /// Print the alias table built from the configured type mapping
    Registry {
        /// Configuration file (YAML, or TOML with a .toml extension)
        #[arg(long, short)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = match &cli.command {
        Commands::Generate { config, .. } | Commands::Registry { config } => config.clone(),
    };
    let mut config = Config::from_file(&config_path)
        .await
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    config.verbose |= cli.verbose;
    init_logging(config.verbose);
    tracing::debug!("Loaded config {}", config_path.display());

    match cli.command {
        Commands::Generate {
            target,
            sources,
            output_dir,
            date_library,
            ..
        } => {
            if !sources.is_empty() {
                config.source_files = sources;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir.to_string_lossy().into_owned();
            }
            if let Some(library) = date_library {
                config.options.date_library = library;
            }

            let written = typeweaver_core::generate(&config, target)
                .await
                .context("Generation failed")?;
            for path in written {
                println!("{}", path.display());
            }
        }
        Commands::Registry { .. } => {
            let session = GenerationSession::new(config)
                .await
                .context("Failed to load type manifests")?;
            let registry = session
                .registry()
                .await
                .context("Failed to build the type registry")?;
            for descriptor in registry.descriptors() {
                println!("{} -> {}", descriptor.alias, descriptor.fully_qualified_name);
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_arguments() {
        let cli = Cli::try_parse_from([
            "typeweaver",
            "generate",
            "--config",
            "typeweaver.yaml",
            "--target",
            "models",
            "--source",
            "a.yaml",
            "--source",
            "b.yaml",
            "--date-library",
            "java8-localdatetime",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate {
                target,
                sources,
                date_library,
                ..
            } => {
                assert_eq!(target, GenerateTarget::Models);
                assert_eq!(sources, vec!["a.yaml", "b.yaml"]);
                assert_eq!(date_library, Some(DateLibrary::Java8LocalDateTime));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_registry_arguments() {
        let cli = Cli::try_parse_from(["typeweaver", "registry", "-c", "typeweaver.toml"]).unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Registry { config } => assert_eq!(config, Path::new("typeweaver.toml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
