//! Gateway Router - Network Dispatch Over the Adapter Set
//!
//! Owns exactly one live adapter instance per configured network for the
//! process lifetime, built once at startup and passed by reference to
//! every request handler — no module-level singletons. Dispatch is a map
//! lookup; everything network-specific happens behind the adapter seam.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::domain::error::{GatewayError, GatewayResult};
use crate::domain::network::{Amount, NetworkId};
use crate::domain::transfer::{
  Address, ContractCall, TransactionRef, TransferRequest,
};
use crate::ports::chain_adapter::ChainAdapter;
use crate::usecases::poller::{ConfirmationPoller, PollOutcome, PollPolicy};
use crate::usecases::sequencer::AddressSequencer;

/// Uniform entry point for all gateway operations.
pub struct GatewayRouter {
  /// One adapter per configured network. Read-only after construction.
  adapters: HashMap<NetworkId, Arc<dyn ChainAdapter>>,
  /// The single confirmation retry loop.
  poller: ConfirmationPoller,
  /// Per-sender ordering locks.
  sequencer: AddressSequencer,
  /// Cancellation fan-out for in-flight confirmation polls.
  cancel_tx: broadcast::Sender<()>,
}

impl GatewayRouter {
  /// Assemble the router from already-constructed adapters.
  ///
  /// Adapter construction (client handshakes, connection pools) happens
  /// once in the composition root; the router only dispatches.
  pub fn new(
    adapters: Vec<Arc<dyn ChainAdapter>>,
    policy: PollPolicy,
    cancel_tx: broadcast::Sender<()>,
  ) -> Self {
    let adapters: HashMap<NetworkId, Arc<dyn ChainAdapter>> = adapters
      .into_iter()
      .map(|a| (a.network(), a))
      .collect();

    info!(
      networks = adapters.len(),
      max_attempts = policy.max_attempts,
      poll_interval_ms = policy.poll_interval.as_millis() as u64,
      "Gateway router assembled"
    );

    Self {
      adapters,
      poller: ConfirmationPoller::new(policy),
      sequencer: AddressSequencer::new(),
      cancel_tx,
    }
  }

  /// Resolve a network to its adapter.
  ///
  /// A network missing from the configured set is an
  /// `UnsupportedOperation` — the identifier itself is valid, this
  /// deployment just doesn't serve it.
  pub fn adapter(&self, network: NetworkId) -> GatewayResult<&Arc<dyn ChainAdapter>> {
    self.adapters.get(&network).ok_or_else(|| {
      GatewayError::unsupported(network, "network not configured on this gateway")
    })
  }

  /// Networks this gateway instance serves.
  pub fn networks(&self) -> Vec<NetworkId> {
    let mut networks: Vec<NetworkId> = self.adapters.keys().copied().collect();
    networks.sort_by_key(|n| n.to_string());
    networks
  }

  pub(crate) fn sequencer(&self) -> &AddressSequencer {
    &self.sequencer
  }

  /// Query an address balance in the network's human unit.
  #[instrument(skip(self), fields(%network))]
  pub async fn balance(
    &self,
    network: NetworkId,
    address: &Address,
  ) -> GatewayResult<Amount> {
    self.adapter(network)?.balance(address).await
  }

  /// Submit a single transfer under the sender's ordering lock.
  #[instrument(skip(self, transfer), fields(%network, from = %transfer.from))]
  pub async fn send(
    &self,
    network: NetworkId,
    transfer: &TransferRequest,
  ) -> GatewayResult<TransactionRef> {
    let adapter = self.adapter(network)?;
    let _guard = self.sequencer.acquire(network, &transfer.from).await;
    let txref = adapter.send(transfer).await?;
    info!(%network, %txref, "transfer submitted");
    Ok(txref)
  }

  /// Poll a submitted transaction to a terminal confirmation status.
  ///
  /// Blocks the calling task for up to `max_attempts * poll_interval`.
  /// Gateway shutdown cancels the wait via the broadcast channel; an
  /// aborted HTTP request cancels it by dropping the future. The outcome
  /// carries the number of predicate checks consumed.
  #[instrument(skip(self), fields(%network, %txref))]
  pub async fn monitor_transaction(
    &self,
    network: NetworkId,
    txref: &TransactionRef,
  ) -> GatewayResult<PollOutcome> {
    let adapter = self.adapter(network)?;
    self
      .poller
      .watch(adapter.as_ref(), txref, self.cancel_tx.subscribe())
      .await
  }

  /// Fetch the ledger's record of a transaction.
  #[instrument(skip(self), fields(%network, %txref))]
  pub async fn transaction_details(
    &self,
    network: NetworkId,
    txref: &TransactionRef,
  ) -> GatewayResult<serde_json::Value> {
    self.adapter(network)?.transaction_details(txref).await
  }

  /// Invoke a contract on a programmable network.
  ///
  /// The capability flag is checked before the adapter is touched, so
  /// non-programmable chains reject without any network traffic.
  #[instrument(skip(self, call), fields(%network, contract = %call.contract))]
  pub async fn call_contract(
    &self,
    network: NetworkId,
    call: &ContractCall,
  ) -> GatewayResult<TransactionRef> {
    let adapter = self.adapter(network)?;
    if !adapter.supports_contracts() {
      return Err(GatewayError::unsupported(
        network,
        "network has no contract programmability",
      ));
    }
    adapter.call_contract(call).await
  }

  /// Readiness probe: true when every configured adapter's node answers.
  pub async fn all_healthy(&self) -> bool {
    for adapter in self.adapters.values() {
      if !adapter.is_healthy().await {
        return false;
      }
    }
    true
  }

  /// Per-network node reachability snapshot, for probes and gauges.
  pub async fn health_by_network(&self) -> Vec<(NetworkId, bool)> {
    let mut health = Vec::with_capacity(self.adapters.len());
    for (network, adapter) in &self.adapters {
      health.push((*network, adapter.is_healthy().await));
    }
    health
  }
}
