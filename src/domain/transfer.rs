//! Transfer domain types.
//!
//! The gateway-facing vocabulary: addresses, credentials, transaction
//! references, transfer/contract requests, confirmation status, and the
//! batch submission types. Addresses and transaction references are
//! opaque — the gateway passes them through without parsing; only the
//! selected adapter knows their network-specific shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::GatewayError;
use crate::domain::network::{Amount, NetworkId};

/// Opaque network-specific account address.
pub type Address = String;

/// Opaque identifier returned by a successful submission (txid / hash /
/// signature). Immutable once created; keys all later status and detail
/// lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionRef(pub String);

impl TransactionRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network-specific signing secret (private key, mnemonic, seed, signer
/// URI). Held only for the duration of a send; never persisted.
///
/// `Debug` and `Display` are redacted so the secret cannot leak through
/// tracing spans, error messages, or panics.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Expose the secret for the node call. Call sites are the adapters
    /// only; the value must never reach a log statement.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

/// A single-transfer submission request.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Sending account address.
    pub from: Address,
    /// Receiving account address.
    pub to: Address,
    /// Amount in the network's human unit. Must be positive.
    pub amount: Amount,
    /// Signing secret for the sending account.
    pub credential: Credential,
}

/// A contract invocation request.
///
/// `method` is optional because some chains address entry points by
/// contract alone (Tezos default entrypoint, Tron trigger payloads).
#[derive(Debug, Clone)]
pub struct ContractCall {
    /// Deployed contract address.
    pub contract: Address,
    /// Entry point / method name, when the chain addresses one.
    pub method: Option<String>,
    /// Chain-shaped call parameters, passed through opaquely.
    pub params: serde_json::Value,
    /// Signing secret, when the call mutates state.
    pub credential: Option<Credential>,
}

/// Confirmation state of a submitted transaction.
///
/// Created implicitly as `Pending` at submission; transitions happen only
/// inside the confirmation poller. `Confirmed`, `TimedOut`, and `Failed`
/// are terminal — there is no path back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Submitted, ledger still deciding.
    Pending,
    /// The network's confirmation predicate held.
    Confirmed,
    /// Attempts exhausted while the ledger was still deciding.
    TimedOut,
    /// A confirmation check failed with a hard RPC error.
    Failed,
}

impl TransactionStatus {
    /// Whether this status can never change again.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::TimedOut => write!(f, "timed_out"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One entry of a batch submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Receiving address for this item.
    pub to: Address,
    /// Amount in the network's human unit.
    pub amount: Amount,
}

/// Outcome of a single batch item, in input order.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    /// Submitted; the ledger returned a reference.
    Sent(TransactionRef),
    /// Submission failed with a normalized error.
    Failed(GatewayError),
    /// Never attempted because an earlier item failed (fail-fast policy).
    Skipped,
}

impl ItemOutcome {
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// Result of a batch submission. Outcomes preserve input order; the batch
/// owns no atomicity guarantee beyond that ordering.
#[derive(Debug)]
pub struct BatchReport {
    /// Correlation id for logs and metrics.
    pub batch_id: Uuid,
    /// Network the batch targeted.
    pub network: NetworkId,
    /// When the gateway accepted the batch.
    pub submitted_at: DateTime<Utc>,
    /// Per-item outcomes, same order as the input items.
    pub outcomes: Vec<ItemOutcome>,
    /// Index of the first failed item, if any.
    pub failed_index: Option<usize>,
}

impl BatchReport {
    /// Number of items actually submitted.
    pub fn submitted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_sent()).count()
    }

    /// References of submitted items, in input order.
    pub fn refs(&self) -> Vec<TransactionRef> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ItemOutcome::Sent(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether every item was submitted.
    pub fn all_sent(&self) -> bool {
        self.failed_index.is_none()
            && self.outcomes.iter().all(ItemOutcome::is_sent)
    }
}
