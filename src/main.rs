//! apiforge CLI entrypoint
//! Parses command-line arguments and dispatches to the generator.
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use apiforge::generation::Target;
use apiforge::infrastructure::templates::export_embedded;
use apiforge::{GenerateUseCase, GeneratorConfig};

#[derive(Parser)]
#[command(name = "apiforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate a client library from an OpenAPI document
    Generate {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        spec: Option<PathBuf>,
        /// Target language, see `apiforge targets`
        #[arg(short, long)]
        target: Option<String>,
        /// Output directory for generated code
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Template directory searched before the built-in templates
        #[arg(long)]
        template_dir: Option<PathBuf>,
        /// Configuration file (TOML, YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Option override as key=value, repeatable
        #[arg(short = 'D', long = "define", value_name = "KEY=VALUE")]
        defines: Vec<String>,
    },
    /// List supported targets
    Targets,
    /// Describe the options a target accepts
    Options {
        #[arg(short, long)]
        target: String,
    },
    /// Manage template sets
    Templates {
        #[command(subcommand)]
        action: TemplateCommands,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum TemplateCommands {
    /// Write the built-in templates of a target to a directory for customization
    Export {
        #[arg(short, long)]
        target: String,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let use_case = GenerateUseCase::default();
    match cli.command {
        Commands::Generate {
            spec,
            target,
            output,
            template_dir,
            config,
            defines,
        } => {
            let mut generator_config = match &config {
                Some(path) => GeneratorConfig::load(path)
                    .await
                    .with_context(|| format!("Failed to load config file {}", path.display()))?,
                None => GeneratorConfig::default(),
            };
            if spec.is_some() {
                generator_config.spec = spec;
            }
            if target.is_some() {
                generator_config.target = target;
            }
            if output.is_some() {
                generator_config.output = output;
            }
            if template_dir.is_some() {
                generator_config.templates = template_dir;
            }
            for define in &defines {
                generator_config
                    .apply_define(define)
                    .with_context(|| format!("Invalid option override '{define}'"))?;
            }

            let report = use_case
                .execute(&generator_config)
                .await
                .context("Generation failed")?;
            info!(
                files = report.files.len(),
                warnings = report.diagnostics.len(),
                "Generation finished"
            );
        }
        Commands::Targets => {
            for target in Target::all() {
                println!("{:<10} {}", target.as_str(), target.display_name());
            }
        }
        Commands::Options { target } => {
            let target = Target::from_str(&target)?;
            for option in use_case.options_for(target)? {
                let default = option
                    .default
                    .as_ref()
                    .map(|d| d.to_json().to_string())
                    .unwrap_or_else(|| "unset".to_string());
                println!(
                    "{:<34} {:<8} {:<14} {}",
                    option.name,
                    option.kind.to_string(),
                    default,
                    option.description
                );
            }
        }
        Commands::Templates { action } => match action {
            TemplateCommands::Export { target, output } => {
                let target = Target::from_str(&target)?;
                let count = export_embedded(target, &output)
                    .await
                    .with_context(|| format!("Failed to export templates to {}", output.display()))?;
                println!("Exported {count} template files to {}", output.display());
            }
        },
    }
    Ok(())
}
