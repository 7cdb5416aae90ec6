//! Configuration Module - TOML-based Gateway Configuration
//!
//! Loads and validates configuration from `config.toml`. Every node
//! endpoint and credentialed connection detail is externalized here -
//! nothing network-specific is hardcoded in the domain layer. Sender
//! credentials are NOT config: they arrive per-request and are never
//! persisted.

pub mod loader;

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::adapters::rpc::{RpcAuth, RpcClientConfig};
use crate::domain::network::NetworkId;
use crate::usecases::batch::BatchPolicy;
use crate::usecases::poller::PollPolicy;

/// Top-level gateway configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the gateway begins serving.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Gateway identity and HTTP surface.
  pub gateway: GatewayConfig,
  /// Confirmation polling budget.
  #[serde(default)]
  pub poller: PollerConfig,
  /// Batch failure policy.
  #[serde(default)]
  pub batch: BatchPolicy,
  /// Metrics and health endpoints.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Node connections, one table per served network.
  pub networks: HashMap<NetworkId, NetworkConfig>,
}

/// Gateway identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
  /// Human-readable instance name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// HTTP API bind address.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
}

/// Confirmation polling budget.
///
/// Durations are milliseconds in TOML; converted once into a
/// [`PollPolicy`] at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
  /// Maximum confirmation checks before reporting timed_out.
  #[serde(default = "default_max_attempts")]
  pub max_attempts: u32,
  /// Wait between consecutive checks (milliseconds).
  #[serde(default = "default_poll_interval_ms")]
  pub poll_interval_ms: u64,
  /// Upper bound on one confirmation check (milliseconds).
  #[serde(default = "default_check_timeout_ms")]
  pub check_timeout_ms: u64,
}

impl Default for PollerConfig {
  fn default() -> Self {
    Self {
      max_attempts: default_max_attempts(),
      poll_interval_ms: default_poll_interval_ms(),
      check_timeout_ms: default_check_timeout_ms(),
    }
  }
}

impl PollerConfig {
  pub fn to_policy(&self) -> PollPolicy {
    PollPolicy {
      max_attempts: self.max_attempts,
      poll_interval: Duration::from_millis(self.poll_interval_ms),
      check_timeout: Duration::from_millis(self.check_timeout_ms),
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable the Prometheus/health server.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self { enabled: true, bind_address: default_metrics_addr() }
  }
}

/// Per-network node connection.
///
/// `auth_token` is bearer auth for hosted providers; `rpc_username` and
/// `rpc_password` are basic auth for self-hosted wallet-RPC nodes. The
/// two modes are mutually exclusive. These authenticate the gateway to
/// its node, not the sender to the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
  /// Node or signing-sidecar base URL.
  pub endpoint: String,
  /// Bearer token for hosted node providers.
  pub auth_token: Option<String>,
  /// Basic-auth username (bitcoind-style wallet RPC).
  pub rpc_username: Option<String>,
  /// Basic-auth password.
  pub rpc_password: Option<String>,
  /// Chain selector for nodes that multiplex chains (Tezos `main`).
  pub chain: Option<String>,
  /// Per-call request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// Maximum transport retries on transient node errors.
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  /// Whether this network is served.
  #[serde(default = "default_true")]
  pub enabled: bool,
}

impl NetworkConfig {
  /// Build the node client configuration for this network.
  pub fn rpc_config(&self) -> RpcClientConfig {
    let auth = match (&self.auth_token, &self.rpc_username, &self.rpc_password) {
      (Some(token), _, _) => RpcAuth::Bearer(token.clone()),
      (None, Some(username), Some(password)) => RpcAuth::Basic {
        username: username.clone(),
        password: password.clone(),
      },
      _ => RpcAuth::None,
    };

    RpcClientConfig {
      endpoint: self.endpoint.trim_end_matches('/').to_string(),
      timeout: Duration::from_secs(self.timeout_seconds),
      max_retries: self.max_retries,
      retry_base_delay: Duration::from_millis(200),
      auth,
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_bind_address() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_true() -> bool {
  true
}

fn default_max_attempts() -> u32 {
  10
}

fn default_poll_interval_ms() -> u64 {
  5_000
}

fn default_check_timeout_ms() -> u64 {
  10_000
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_timeout() -> u64 {
  30
}

fn default_max_retries() -> u32 {
  3
}
