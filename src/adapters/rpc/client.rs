//! Node RPC Client - Shared HTTP Transport for All Chain Shims
//!
//! Wraps reqwest with per-call timeouts, bounded retries with exponential
//! backoff, and per-network auth for every node interaction. Both
//! JSON-RPC 2.0 chains and REST-shaped chains go through here, so retry
//! and error-normalization behavior is identical across networks.
//!
//! Transport retries on 429/5xx are connection plumbing; they are not
//! confirmation retries — those happen only in the confirmation poller.

use std::time::Duration;

use base64::Engine;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::error::{GatewayError, GatewayResult, normalize};
use crate::domain::network::NetworkId;

/// Node authentication modes.
#[derive(Debug, Clone, Default)]
pub enum RpcAuth {
  /// Open endpoint.
  #[default]
  None,
  /// `Authorization: Bearer <token>` (hosted node providers).
  Bearer(String),
  /// HTTP basic auth (bitcoind-style wallet RPC).
  Basic { username: String, password: String },
}

/// Configuration for one network's node client.
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
  /// Node or signing-sidecar base URL.
  pub endpoint: String,
  /// Per-call request timeout.
  pub timeout: Duration,
  /// Maximum retries on transient errors.
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff).
  pub retry_base_delay: Duration,
  /// Node authentication.
  pub auth: RpcAuth,
}

impl Default for RpcClientConfig {
  fn default() -> Self {
    Self {
      endpoint: String::new(),
      timeout: Duration::from_secs(30),
      max_retries: 3,
      retry_base_delay: Duration::from_millis(200),
      auth: RpcAuth::None,
    }
  }
}

/// HTTP client bound to one network's node endpoint.
pub struct RpcClient {
  http: Client,
  config: RpcClientConfig,
  network: NetworkId,
}

impl RpcClient {
  /// Build the client. Connection pooling is shared across all calls for
  /// this network; construction happens once at startup.
  pub fn new(network: NetworkId, config: RpcClientConfig) -> anyhow::Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()?;

    Ok(Self { http, config, network })
  }

  pub fn network(&self) -> NetworkId {
    self.network
  }

  pub fn endpoint(&self) -> &str {
    &self.config.endpoint
  }

  /// Issue a JSON-RPC 2.0 call to the endpoint root.
  pub async fn json_rpc(&self, method: &str, params: Value) -> GatewayResult<Value> {
    self.json_rpc_at("", method, params).await
  }

  /// Issue a JSON-RPC 2.0 call to a sub-path of the endpoint
  /// (Avalanche mounts chain VMs under `/ext/bc/...`).
  pub async fn json_rpc_at(
    &self,
    path: &str,
    method: &str,
    params: Value,
  ) -> GatewayResult<Value> {
    let envelope = json!({
      "jsonrpc": "2.0",
      "id": 1,
      "method": method,
      "params": params,
    });

    let body = self.post_json(path, &envelope).await?;

    if let Some(error) = body.get("error") {
      let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("node returned an unstructured error")
        .to_string();
      return Err(normalize(self.network, &message));
    }

    body
      .get("result")
      .cloned()
      .ok_or_else(|| {
        GatewayError::network_error(self.network, "node response missing result")
      })
  }

  /// GET a JSON document from a REST-shaped node API.
  pub async fn get_json(&self, path: &str) -> GatewayResult<Value> {
    let url = format!("{}{}", self.config.endpoint, path);
    let request = self.http.get(&url);
    self.execute_with_retry(request, "GET", path).await
  }

  /// POST a JSON body to a REST-shaped node API.
  pub async fn post_json(&self, path: &str, body: &Value) -> GatewayResult<Value> {
    let url = format!("{}{}", self.config.endpoint, path);
    let request = self.http.post(&url).json(body);
    self.execute_with_retry(request, "POST", path).await
  }

  /// Lightweight reachability probe against a known-cheap path.
  pub async fn probe(&self, path: &str) -> bool {
    let url = format!("{}{}", self.config.endpoint, path);
    match self.http.get(&url).send().await {
      Ok(response) => !response.status().is_server_error(),
      Err(_) => false,
    }
  }

  /// Execute with auth, bounded retries, and taxonomy mapping.
  async fn execute_with_retry(
    &self,
    request: RequestBuilder,
    method: &str,
    path: &str,
  ) -> GatewayResult<Value> {
    let mut last_error = None;

    for attempt in 0..=self.config.max_retries {
      if attempt > 0 {
        let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
        debug!(
          network = %self.network,
          attempt,
          delay_ms = delay.as_millis() as u64,
          "retrying node call"
        );
        sleep(delay).await;
      }

      let mut req = request.try_clone().ok_or_else(|| {
        GatewayError::network_error(self.network, "failed to clone node request")
      })?;

      req = match &self.config.auth {
        RpcAuth::None => req,
        RpcAuth::Bearer(token) => req.bearer_auth(token),
        RpcAuth::Basic { username, password } => {
          let raw = format!("{username}:{password}");
          let encoded = base64::engine::general_purpose::STANDARD.encode(raw);
          req.header("Authorization", format!("Basic {encoded}"))
        }
      };

      match req.send().await {
        Ok(response) => {
          let status = response.status();
          match status {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => {
              return response.json::<Value>().await.map_err(|e| {
                GatewayError::network_error(
                  self.network,
                  format!("node returned malformed JSON: {e}"),
                )
              });
            }
            StatusCode::TOO_MANY_REQUESTS => {
              warn!(network = %self.network, method, path, "node rate limited, backing off");
              last_error = Some(GatewayError::network_error(
                self.network,
                "node rate limited",
              ));
              continue;
            }
            status if status.is_server_error() => {
              warn!(network = %self.network, method, path, %status, "node server error, retrying");
              last_error = Some(GatewayError::network_error(
                self.network,
                format!("node server error: {status}"),
              ));
              continue;
            }
            status => {
              let body = response.text().await.unwrap_or_default();
              return Err(self.map_client_error(status, &body));
            }
          }
        }
        Err(e) => {
          warn!(network = %self.network, method, path, error = %e, attempt, "node call failed");
          last_error = Some(GatewayError::network_error(
            self.network,
            format!("transport error: {e}"),
          ));
          continue;
        }
      }
    }

    Err(last_error.unwrap_or_else(|| {
      GatewayError::network_error(self.network, "node retries exhausted")
    }))
  }

  /// Map a non-retryable HTTP status onto the taxonomy, keeping the raw
  /// node body as context.
  fn map_client_error(&self, status: StatusCode, body: &str) -> GatewayError {
    match status {
      StatusCode::NOT_FOUND => GatewayError::not_found(
        self.network,
        if body.is_empty() { "no ledger record" } else { body }.to_string(),
      ),
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
        GatewayError::invalid_credential(
          self.network,
          format!("node rejected credentials ({status}): {body}"),
        )
      }
      _ => normalize(self.network, body),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_config_matches_node_budget() {
    let config = RpcClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
  }

  #[test]
  fn test_map_client_error_statuses() {
    let client = RpcClient::new(
      NetworkId::Tezos,
      RpcClientConfig { endpoint: "http://localhost:8732".into(), ..Default::default() },
    )
    .unwrap();

    let e = client.map_client_error(StatusCode::NOT_FOUND, "");
    assert_eq!(e.kind(), "not_found");

    let e = client.map_client_error(StatusCode::UNAUTHORIZED, "bad token");
    assert_eq!(e.kind(), "invalid_credential");

    let e = client.map_client_error(StatusCode::BAD_REQUEST, "invalid address: tz1??");
    assert_eq!(e.kind(), "invalid_address");
  }
}
