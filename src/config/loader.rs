//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: AppConfig =
    toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  info!(
    networks = config.networks.len(),
    max_attempts = config.poller.max_attempts,
    poll_interval_ms = config.poller.poll_interval_ms,
    stop_on_first_error = config.batch.stop_on_first_error,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.gateway.name.is_empty(),
    "Gateway name must not be empty"
  );

  // Poller validation
  anyhow::ensure!(
    config.poller.max_attempts > 0,
    "Poller max_attempts must be positive, got {}",
    config.poller.max_attempts
  );
  anyhow::ensure!(
    config.poller.poll_interval_ms > 0,
    "Poller poll_interval_ms must be positive"
  );
  anyhow::ensure!(
    config.poller.check_timeout_ms > 0,
    "Poller check_timeout_ms must be positive"
  );

  // Network validation
  anyhow::ensure!(
    config.networks.values().any(|n| n.enabled),
    "At least one network must be configured and enabled"
  );

  for (network, node) in &config.networks {
    anyhow::ensure!(
      node.endpoint.starts_with("http://") || node.endpoint.starts_with("https://"),
      "Network {} endpoint must be an http(s) URL, got {:?}",
      network,
      node.endpoint
    );
    anyhow::ensure!(
      node.timeout_seconds > 0,
      "Network {} timeout_seconds must be positive",
      network
    );
    anyhow::ensure!(
      node.rpc_username.is_some() == node.rpc_password.is_some(),
      "Network {} must set rpc_username and rpc_password together",
      network
    );
    anyhow::ensure!(
      !(node.auth_token.is_some() && node.rpc_username.is_some()),
      "Network {} cannot combine auth_token with basic auth",
      network
    );
  }

  Ok(())
}
