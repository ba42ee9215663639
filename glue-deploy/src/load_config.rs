/// `load_config` module: resolves the Glue plugin block from a service YAML file.
///
/// This module is the only place where untrusted YAML is parsed and mapped to
/// the strongly-typed [`GluePluginConfig`] of the core crate.
///
/// # Responsibilities
/// - Read the service file and parse it as YAML
/// - Locate the plugin block under `custom.Glue` (or a top-level `Glue`)
/// - Report "no plugin config" as `Ok(None)`, which the pipeline treats as a no-op
/// - Ensure robust error messages for CLI and tests: any failure in loading
///   must result in clear diagnostics
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics,
/// and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use glue_deploy_core::config::GluePluginConfig;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const PLUGIN_KEY: &str = "Glue";

/// Loads a service YAML file and returns its Glue plugin configuration, if any.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Option<GluePluginConfig>> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let document: Value = match serde_yaml::from_str(&config_content) {
        Ok(doc) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            doc
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let Some(block) = plugin_block(&document) else {
        info!(config_path = ?path_ref, "No Glue plugin block found");
        return Ok(None);
    };

    let config: GluePluginConfig = serde_yaml::from_value(block.clone())
        .with_context(|| format!("Invalid {PLUGIN_KEY} config in {}", path_ref.display()))?;
    config.trace_loaded();
    Ok(Some(config))
}

fn plugin_block(document: &Value) -> Option<&Value> {
    document
        .get("custom")
        .and_then(|custom| custom.get(PLUGIN_KEY))
        .or_else(|| document.get(PLUGIN_KEY))
        .filter(|block| !block.is_null())
}
