//! HTTP Routes - The Gateway's Request Surface
//!
//! axum 0.7 handlers over the router and batch orchestrator. Handlers
//! parse and validate the wire shape, then delegate; all chain behavior
//! lives below the `ChainAdapter` seam. Each handler records a request
//! counter, a latency observation, and an error counter on failure.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use tracing::info;

use crate::adapters::http::error::{self, ApiError};
use crate::adapters::http::types::{
  BalanceResponse, BatchRequest, BatchResponse, ContractRequest,
  ContractResponse, MonitorResponse, SendRequest, SendResponse,
};
use crate::adapters::metrics::MetricsRegistry;
use crate::domain::error::GatewayResult;
use crate::domain::network::NetworkId;
use crate::domain::transfer::{
  BatchItem, ContractCall, ItemOutcome, TransactionRef, TransactionStatus,
  TransferRequest,
};
use crate::usecases::batch::BatchOrchestrator;
use crate::usecases::gateway::GatewayRouter;

/// Shared handler state, cloned per request.
#[derive(Clone)]
pub struct AppState {
  pub gateway: Arc<GatewayRouter>,
  pub batch: Arc<BatchOrchestrator>,
  pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
  /// Close out one request: latency observation plus error counting.
  fn complete<T>(
    &self,
    network: NetworkId,
    operation: &str,
    started: Instant,
    result: GatewayResult<T>,
  ) -> Result<T, ApiError> {
    self
      .metrics
      .observe_latency(network, operation, started.elapsed().as_secs_f64());
    result.map_err(|e| {
      self.metrics.record_error(&e);
      e.into()
    })
  }
}

/// Assemble the gateway's route table.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/networks", get(list_networks))
    .route("/:network/balance/:address", get(balance))
    .route("/:network/send", post(send))
    .route("/:network/send/batch", post(send_batch))
    .route("/:network/transaction/:txref", get(monitor_transaction))
    .route("/:network/transaction/details/:txref", get(transaction_details))
    .route("/:network/contract/:contract", post(call_contract))
    .with_state(state)
}

fn parse_network(raw: &str) -> Result<NetworkId, ApiError> {
  NetworkId::from_str(raw).map_err(|_| ApiError::UnknownNetwork(raw.to_string()))
}

fn ensure_positive(amount: Decimal) -> Result<(), ApiError> {
  if amount <= Decimal::ZERO {
    return Err(ApiError::Validation(format!(
      "amount must be positive, got {amount}"
    )));
  }
  Ok(())
}

/// `GET /networks` — the networks this instance serves.
async fn list_networks(State(state): State<AppState>) -> Json<Vec<String>> {
  Json(
    state
      .gateway
      .networks()
      .into_iter()
      .map(|n| n.to_string())
      .collect(),
  )
}

/// `GET /{network}/balance/{address}`
async fn balance(
  State(state): State<AppState>,
  Path((network, address)): Path<(String, String)>,
) -> Result<Json<BalanceResponse>, ApiError> {
  let network = parse_network(&network)?;
  state.metrics.record_request(network, "balance");
  let started = Instant::now();

  let result = state.gateway.balance(network, &address).await;
  let balance = state.complete(network, "balance", started, result)?;

  Ok(Json(BalanceResponse { network: network.to_string(), address, balance }))
}

/// `POST /{network}/send`
async fn send(
  State(state): State<AppState>,
  Path(network): Path<String>,
  Json(request): Json<SendRequest>,
) -> Result<Json<SendResponse>, ApiError> {
  let network = parse_network(&network)?;
  ensure_positive(request.amount)?;
  if request.credential.is_empty() {
    return Err(ApiError::Validation("credential must not be empty".into()));
  }

  state.metrics.record_request(network, "send");
  let started = Instant::now();

  let transfer = TransferRequest {
    from: request.from_address,
    to: request.to_address,
    amount: request.amount,
    credential: request.credential,
  };
  let result = state.gateway.send(network, &transfer).await;
  let transaction_ref = state.complete(network, "send", started, result)?;

  Ok(Json(SendResponse { network: network.to_string(), transaction_ref }))
}

/// `POST /{network}/send/batch`
///
/// Always answers with the full per-item report. When any item failed,
/// the status code is the first failure's mapping, so fail-fast callers
/// see the abort while still learning which items went through.
async fn send_batch(
  State(state): State<AppState>,
  Path(network): Path<String>,
  Json(request): Json<BatchRequest>,
) -> Result<Response, ApiError> {
  let network = parse_network(&network)?;
  if request.transactions.is_empty() {
    return Err(ApiError::Validation("batch must contain at least one item".into()));
  }
  for (index, item) in request.transactions.iter().enumerate() {
    if item.amount <= Decimal::ZERO {
      return Err(ApiError::Validation(format!(
        "item {index} amount must be positive, got {}",
        item.amount
      )));
    }
  }

  state.metrics.record_request(network, "send_batch");
  let started = Instant::now();

  let items: Vec<BatchItem> = request
    .transactions
    .into_iter()
    .map(|i| BatchItem { to: i.to_address, amount: i.amount })
    .collect();
  let result = state
    .batch
    .submit(network, &request.from_address, &request.credential, &items)
    .await;
  let report = state.complete(network, "send_batch", started, result)?;

  let mut first_failure = None;
  for outcome in &report.outcomes {
    let label = match outcome {
      ItemOutcome::Sent(_) => "sent",
      ItemOutcome::Failed(e) => {
        if first_failure.is_none() {
          first_failure = Some(e.clone());
        }
        "failed"
      }
      ItemOutcome::Skipped => "skipped",
    };
    state.metrics.record_batch_item(network, label);
  }

  let http_status = match &first_failure {
    Some(e) => {
      state.metrics.record_error(e);
      error::status_for(e)
    }
    None => StatusCode::OK,
  };

  Ok((http_status, Json(BatchResponse::from(report))).into_response())
}

/// `GET /{network}/transaction/{txref}`
///
/// Blocks until the confirmation poller reaches a terminal status. The
/// status code mirrors the outcome: 200 confirmed, 504 the ledger was
/// still deciding when attempts ran out, 502 a confirmation check hit a
/// hard node error.
async fn monitor_transaction(
  State(state): State<AppState>,
  Path((network, txref)): Path<(String, String)>,
) -> Result<Response, ApiError> {
  let network = parse_network(&network)?;
  state.metrics.record_request(network, "monitor");
  let started = Instant::now();

  let txref = TransactionRef::new(txref);
  let result = state.gateway.monitor_transaction(network, &txref).await;
  let outcome = state.complete(network, "monitor", started, result)?;
  state.metrics.record_confirmation(network, outcome.status);
  state.metrics.observe_poll_attempts(network, outcome.attempts);

  let http_status = match outcome.status {
    TransactionStatus::Confirmed => StatusCode::OK,
    TransactionStatus::TimedOut => StatusCode::GATEWAY_TIMEOUT,
    TransactionStatus::Failed => StatusCode::BAD_GATEWAY,
    // The poller only returns terminal statuses.
    TransactionStatus::Pending => StatusCode::OK,
  };

  info!(
    %network,
    %txref,
    status = %outcome.status,
    attempts = outcome.attempts,
    "confirmation watch finished"
  );

  let body = MonitorResponse {
    network: network.to_string(),
    transaction_ref: txref,
    status: outcome.status,
  };
  Ok((http_status, Json(body)).into_response())
}

/// `GET /{network}/transaction/details/{txref}`
async fn transaction_details(
  State(state): State<AppState>,
  Path((network, txref)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
  let network = parse_network(&network)?;
  state.metrics.record_request(network, "details");
  let started = Instant::now();

  let txref = TransactionRef::new(txref);
  let result = state.gateway.transaction_details(network, &txref).await;
  let details = state.complete(network, "details", started, result)?;

  Ok(Json(details))
}

/// `POST /{network}/contract/{contract}`
async fn call_contract(
  State(state): State<AppState>,
  Path((network, contract)): Path<(String, String)>,
  Json(request): Json<ContractRequest>,
) -> Result<Json<ContractResponse>, ApiError> {
  let network = parse_network(&network)?;
  state.metrics.record_request(network, "contract");
  let started = Instant::now();

  let call = ContractCall {
    contract,
    method: request.method,
    params: request.params,
    credential: request.credential,
  };
  let result = state.gateway.call_contract(network, &call).await;
  let transaction_ref = state.complete(network, "contract", started, result)?;

  Ok(Json(ContractResponse { network: network.to_string(), transaction_ref }))
}
