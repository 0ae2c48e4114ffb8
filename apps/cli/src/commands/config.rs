//! # Config Commands
//!
//! Inspecting and persisting the client configuration.

use std::path::PathBuf;

use pharma_client::ClientConfig;
use serde::Serialize;
use tracing::debug;

use crate::error::CliResult;

/// The effective configuration and where it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub config: ClientConfig,
}

/// Shows the configuration after file and environment overrides.
///
/// ## When Used
/// - Checking which backend the CLI talks to
/// - Finding where the cart is stored
pub fn show(config: &ClientConfig, path: Option<PathBuf>) -> ConfigResponse {
    debug!("config show");
    ConfigResponse {
        path: path.or_else(ClientConfig::default_config_path),
        data_dir: config.data_dir(),
        config: config.clone(),
    }
}

/// Writes the effective configuration to `path` (or the default location).
pub fn save(config: &ClientConfig, path: Option<PathBuf>) -> CliResult<ConfigResponse> {
    let written = config.save(path)?;
    Ok(ConfigResponse {
        path: Some(written),
        data_dir: config.data_dir(),
        config: config.clone(),
    })
}
