//! HTTP Error Mapping - Taxonomy to Status Codes
//!
//! One place decides which status a failure deserves, so handlers never
//! collapse everything into a blanket 500. Client mistakes (bad address,
//! bad credential, malformed request) get 4xx; upstream ledger trouble
//! gets the matching 5xx.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::error::GatewayError;

/// Failure surface of the HTTP layer.
#[derive(Debug)]
pub enum ApiError {
  /// A normalized gateway failure.
  Gateway(GatewayError),
  /// The request body failed validation before reaching the gateway.
  Validation(String),
  /// The path named a network identifier outside the supported set.
  UnknownNetwork(String),
}

impl From<GatewayError> for ApiError {
  fn from(e: GatewayError) -> Self {
    Self::Gateway(e)
  }
}

/// JSON error body returned for every non-2xx response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
  /// Stable machine-readable tag.
  pub error: String,
  /// Network the failure was observed on, when known.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub network: Option<String>,
  /// Human-readable detail. Upstream node messages are preserved.
  pub message: String,
}

/// Status code for a taxonomy kind.
pub fn status_for(error: &GatewayError) -> StatusCode {
  match error {
    GatewayError::InvalidAddress { .. } => StatusCode::BAD_REQUEST,
    GatewayError::InvalidCredential { .. } => StatusCode::UNAUTHORIZED,
    GatewayError::NotFound { .. } => StatusCode::NOT_FOUND,
    GatewayError::InsufficientBalance { .. } => StatusCode::CONFLICT,
    GatewayError::UnsupportedOperation { .. } => StatusCode::NOT_IMPLEMENTED,
    GatewayError::Network { .. } => StatusCode::BAD_GATEWAY,
    GatewayError::TransactionTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      Self::Gateway(e) => (
        status_for(&e),
        ErrorBody {
          error: e.kind().to_string(),
          network: Some(e.network().to_string()),
          message: e.message().to_string(),
        },
      ),
      Self::Validation(message) => (
        StatusCode::BAD_REQUEST,
        ErrorBody { error: "invalid_request".to_string(), network: None, message },
      ),
      Self::UnknownNetwork(name) => (
        StatusCode::BAD_REQUEST,
        ErrorBody {
          error: "invalid_request".to_string(),
          network: None,
          message: format!("unknown network {name:?}"),
        },
      ),
    };

    (status, Json(body)).into_response()
  }
}
