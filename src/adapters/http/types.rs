//! HTTP Wire Types - Request and Response DTOs
//!
//! JSON field names are camelCase on the wire. The submission reference
//! field is `transactionRef` on every response that carries one,
//! regardless of what the underlying chain calls it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::transfer::{
  BatchReport, Credential, ItemOutcome, TransactionRef, TransactionStatus,
};

/// Body of `POST /{network}/send`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
  pub from_address: String,
  pub to_address: String,
  /// Amount in the network's human unit.
  pub amount: Decimal,
  /// Signing secret; consumed by the node call, never logged or stored.
  pub credential: Credential,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
  pub network: String,
  pub transaction_ref: TransactionRef,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
  pub network: String,
  pub address: String,
  /// Balance in the network's human unit.
  pub balance: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorResponse {
  pub network: String,
  pub transaction_ref: TransactionRef,
  pub status: TransactionStatus,
}

/// Body of `POST /{network}/send/batch`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
  pub from_address: String,
  pub credential: Credential,
  pub transactions: Vec<BatchRequestItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequestItem {
  pub to_address: String,
  pub amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
  pub batch_id: Uuid,
  pub network: String,
  pub submitted_at: DateTime<Utc>,
  /// References of submitted items, in input order.
  pub transaction_refs: Vec<TransactionRef>,
  /// Items actually submitted.
  pub submitted: usize,
  pub outcomes: Vec<BatchOutcome>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub failed_index: Option<usize>,
}

/// One item's result, same position as in the request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
  pub status: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub transaction_ref: Option<TransactionRef>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl From<BatchReport> for BatchResponse {
  fn from(report: BatchReport) -> Self {
    let transaction_refs = report.refs();
    let submitted = report.submitted();
    let outcomes = report
      .outcomes
      .into_iter()
      .map(|outcome| match outcome {
        ItemOutcome::Sent(txref) => BatchOutcome {
          status: "sent",
          transaction_ref: Some(txref),
          error: None,
          message: None,
        },
        ItemOutcome::Failed(e) => BatchOutcome {
          status: "failed",
          transaction_ref: None,
          error: Some(e.kind().to_string()),
          message: Some(e.message().to_string()),
        },
        ItemOutcome::Skipped => BatchOutcome {
          status: "skipped",
          transaction_ref: None,
          error: None,
          message: None,
        },
      })
      .collect();

    Self {
      batch_id: report.batch_id,
      network: report.network.to_string(),
      submitted_at: report.submitted_at,
      transaction_refs,
      submitted,
      outcomes,
      failed_index: report.failed_index,
    }
  }
}

/// Body of `POST /{network}/contract/{contractAddress}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRequest {
  /// Entry point / method, when the chain addresses one.
  pub method: Option<String>,
  /// Chain-shaped parameters, passed through opaquely.
  #[serde(default)]
  pub params: serde_json::Value,
  pub credential: Option<Credential>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractResponse {
  pub network: String,
  pub transaction_ref: TransactionRef,
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_send_request_wire_shape_is_camel_case() {
    let body = r#"{
      "fromAddress": "tz1sender",
      "toAddress": "tz1receiver",
      "amount": "1.5",
      "credential": "edsk..."
    }"#;
    let request: SendRequest = serde_json::from_str(body).unwrap();
    assert_eq!(request.amount, dec!(1.5));
  }

  #[test]
  fn test_send_response_uses_transaction_ref_field() {
    let response = SendResponse {
      network: "tezos".into(),
      transaction_ref: TransactionRef::new("op123"),
    };
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["transactionRef"], "op123");
  }

  #[test]
  fn test_batch_outcome_omits_absent_fields() {
    let outcome = BatchOutcome {
      status: "skipped",
      transaction_ref: None,
      error: None,
      message: None,
    };
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "skipped" }));
  }
}
