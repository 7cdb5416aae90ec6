//! Chain Adapter Port - Uniform Ledger Capability Interface
//!
//! Defines the trait every supported network implements. This is the seam
//! of the whole gateway: all network-specific knowledge (address formats,
//! unit scales, confirmation signaling, contract-call semantics) lives
//! inside exactly one implementation of this trait and nowhere else.
//! Callers — HTTP routes, the batch orchestrator, the poller — only ever
//! see this shape.

use async_trait::async_trait;

use crate::domain::error::GatewayResult;
use crate::domain::network::{Amount, NetworkId};
use crate::domain::transfer::{
  Address, ContractCall, TransactionRef, TransferRequest,
};

/// Uniform capability set over one ledger.
///
/// Implementations are stateless with respect to individual calls; the
/// only state they hold is their underlying node client handle, which is
/// safe for concurrent read access. Per-account sequencing is enforced
/// above this trait by the address sequencer, not inside adapters.
#[async_trait]
pub trait ChainAdapter: Send + Sync + 'static {
  /// The network this adapter serves.
  fn network(&self) -> NetworkId;

  /// Static capability flag: whether this ledger is programmable.
  ///
  /// Contract dispatch checks this flag before invoking the adapter, so
  /// non-programmable chains (Litecoin, Ripple) reject contract calls
  /// without any runtime probe or network traffic.
  fn supports_contracts(&self) -> bool;

  /// Query the spendable balance of an address, in the human unit.
  ///
  /// # Errors
  /// `Network` on RPC/timeout failure; `InvalidAddress` when the ledger
  /// itself rejects the address encoding.
  async fn balance(&self, address: &Address) -> GatewayResult<Amount>;

  /// Construct, sign, and broadcast a transfer.
  ///
  /// # Errors
  /// `InsufficientBalance`, `InvalidCredential`, or `Network`.
  async fn send(&self, transfer: &TransferRequest) -> GatewayResult<TransactionRef>;

  /// Network-specific confirmation predicate: has the ledger accepted
  /// this transaction as final (per this chain's notion of final)?
  ///
  /// A `false` means "still deciding", not failure. The confirmation
  /// poller drives this repeatedly; adapters never loop themselves.
  async fn is_confirmed(&self, txref: &TransactionRef) -> GatewayResult<bool>;

  /// Fetch the ledger's record of a transaction as a network-shaped
  /// JSON bag. Fails with `NotFound` when the ledger has no record.
  async fn transaction_details(
    &self,
    txref: &TransactionRef,
  ) -> GatewayResult<serde_json::Value>;

  /// Invoke a deployed contract.
  ///
  /// Non-programmable chains return `UnsupportedOperation` without
  /// attempting any network call.
  async fn call_contract(&self, call: &ContractCall) -> GatewayResult<TransactionRef>;

  /// Lightweight node reachability probe for readiness checks.
  async fn is_healthy(&self) -> bool;
}
