///
/// This module implements the CLI interface for glue-deploy: command parsing,
/// the async entrypoint and writing the compiled template.
///
/// All core business logic (config schema, compilation, the staging pipeline)
/// lives in the [`glue-deploy-core`] crate. This module is strictly CLI glue:
/// it picks a store (S3 or dry run), runs the pipeline and prints the outcome.
///
/// ## How To Use
/// - For command-line users: use the installed `glue-deploy` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`],
///   or [`package`] with any [`BlobStore`].
///
/// [`glue-deploy-core`]: ../../glue-deploy-core/
use crate::dry_run::DryRunStore;
use crate::load_config::load_config;
use crate::s3::S3BlobStore;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glue_deploy_core::config::GluePluginConfig;
use glue_deploy_core::contract::BlobStore;
use glue_deploy_core::deploy::{DeployReport, Deployer};
use glue_deploy_core::template::TemplateSections;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI for glue-deploy: stage Glue artifacts and compile CloudFormation.
#[derive(Parser)]
#[clap(
    name = "glue-deploy",
    version,
    about = "Stage AWS Glue job scripts in S3 and compile jobs and triggers into CloudFormation"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload job scripts and support files, then write the compiled template
    Package {
        /// Path to the service YAML file holding a `custom.Glue` block
        #[clap(long)]
        config: PathBuf,
        /// File to write the CloudFormation JSON to (stdout when omitted)
        #[clap(long)]
        output: Option<PathBuf>,
        /// Directory local paths are relative to (defaults to the config file's directory)
        #[clap(long)]
        service_root: Option<PathBuf>,
        /// AWS region override
        #[clap(long)]
        region: Option<String>,
        /// Log uploads and bucket creation instead of performing them
        #[clap(long)]
        dry_run: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Package {
            config,
            output,
            service_root,
            region,
            dry_run,
        } => {
            let plugin_config = load_config(&config)?;
            let service_root = service_root.unwrap_or_else(|| {
                config
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default()
            });
            tracing::info!(command = "package", dry_run, service_root = %service_root.display(), "Starting packaging");

            let mut template = TemplateSections::new();
            let report = if dry_run {
                let store = DryRunStore::new();
                package(&store, plugin_config.as_ref(), &service_root, &mut template).await?
            } else {
                let store = S3BlobStore::from_env(region).await;
                package(&store, plugin_config.as_ref(), &service_root, &mut template).await?
            };

            match &report {
                Some(report) => tracing::info!(command = "package", ?report, "Packaging complete"),
                None => tracing::info!(command = "package", "No Glue config, nothing packaged"),
            }
            write_template(&template, output.as_deref())
        }
    }
}

/// Run the staging pipeline against `store`.
pub async fn package<S>(
    store: &S,
    config: Option<&GluePluginConfig>,
    service_root: &Path,
    template: &mut TemplateSections,
) -> Result<Option<DeployReport>>
where
    S: BlobStore + ?Sized,
{
    Deployer::new(store, service_root)
        .run(config, template)
        .await
        .map_err(|e| {
            tracing::error!(command = "package", error = %e, "Packaging failed");
            anyhow::Error::new(e).context("Glue packaging failed")
        })
}

/// Write the template as CloudFormation JSON to `output`, or stdout.
pub fn write_template(template: &TemplateSections, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(&template.to_cloudformation())
        .context("Failed to render template")?;
    match output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write template to {}", path.display()))?;
            tracing::info!(output = %path.display(), "Template written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
