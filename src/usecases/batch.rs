//! Batch Orchestrator - Ordered Replay of Single Transfers
//!
//! Replays `send` over an ordered list of `{to, amount}` items sharing one
//! sender and credential. Input order is preserved and the whole batch
//! runs under the sender's ordering lock, because many ledgers demand
//! monotonically increasing per-account sequence numbers.
//!
//! The failure policy is explicit configuration, not an accident of
//! control flow: `stop_on_first_error = true` (default) aborts on the
//! first failure and marks the rest `Skipped`; `false` attempts every
//! item and reports each outcome.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::GatewayResult;
use crate::domain::network::NetworkId;
use crate::domain::transfer::{
  Address, BatchItem, BatchReport, Credential, ItemOutcome, TransferRequest,
};
use crate::usecases::gateway::GatewayRouter;

/// Batch failure policy.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BatchPolicy {
  /// Abort the batch on the first failed item (fail-fast) instead of
  /// attempting every item (best-effort).
  #[serde(default = "default_stop_on_first_error")]
  pub stop_on_first_error: bool,
}

fn default_stop_on_first_error() -> bool {
  true
}

impl Default for BatchPolicy {
  fn default() -> Self {
    Self { stop_on_first_error: true }
  }
}

/// Sequential batch submission over the gateway router.
pub struct BatchOrchestrator {
  router: Arc<GatewayRouter>,
  policy: BatchPolicy,
}

impl BatchOrchestrator {
  pub fn new(router: Arc<GatewayRouter>, policy: BatchPolicy) -> Self {
    Self { router, policy }
  }

  pub fn policy(&self) -> BatchPolicy {
    self.policy
  }

  /// Submit the items strictly in input order.
  ///
  /// The sender's ordering lock is held across the whole batch, so no
  /// other send for this `(network, from)` can interleave. Returns a
  /// per-item report either way; `Err` only when the network itself is
  /// not configured.
  #[instrument(skip(self, credential, items), fields(%network, from = %from, items = items.len()))]
  pub async fn submit(
    &self,
    network: NetworkId,
    from: &Address,
    credential: &Credential,
    items: &[BatchItem],
  ) -> GatewayResult<BatchReport> {
    let adapter = Arc::clone(self.router.adapter(network)?);
    let _guard = self.router.sequencer().acquire(network, from).await;

    let batch_id = Uuid::new_v4();
    let submitted_at = Utc::now();
    let mut outcomes = Vec::with_capacity(items.len());
    let mut failed_index = None;
    let mut aborted = false;

    for (index, item) in items.iter().enumerate() {
      if aborted {
        outcomes.push(ItemOutcome::Skipped);
        continue;
      }

      let transfer = TransferRequest {
        from: from.clone(),
        to: item.to.clone(),
        amount: item.amount,
        credential: credential.clone(),
      };

      match adapter.send(&transfer).await {
        Ok(txref) => {
          info!(%batch_id, index, %txref, "batch item submitted");
          outcomes.push(ItemOutcome::Sent(txref));
        }
        Err(e) => {
          warn!(%batch_id, index, error = %e, "batch item failed");
          if failed_index.is_none() {
            failed_index = Some(index);
          }
          outcomes.push(ItemOutcome::Failed(e));
          if self.policy.stop_on_first_error {
            aborted = true;
          }
        }
      }
    }

    let report =
      BatchReport { batch_id, network, submitted_at, outcomes, failed_index };
    info!(
      %batch_id,
      submitted = report.submitted(),
      failed_index = ?report.failed_index,
      "batch finished"
    );
    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};

  use async_trait::async_trait;
  use rust_decimal_macros::dec;
  use tokio::sync::broadcast;

  use crate::domain::error::{GatewayError, GatewayResult};
  use crate::domain::network::Amount;
  use crate::domain::transfer::{ContractCall, TransactionRef};
  use crate::ports::chain_adapter::ChainAdapter;
  use crate::usecases::poller::PollPolicy;

  /// Adapter stub that fails sends to a designated address.
  struct FlakyAdapter {
    sends: AtomicU32,
    poison_to: &'static str,
  }

  #[async_trait]
  impl ChainAdapter for FlakyAdapter {
    fn network(&self) -> NetworkId {
      NetworkId::Solana
    }

    fn supports_contracts(&self) -> bool {
      true
    }

    async fn balance(&self, _a: &Address) -> GatewayResult<Amount> {
      unimplemented!("not exercised")
    }

    async fn send(&self, t: &TransferRequest) -> GatewayResult<TransactionRef> {
      let n = self.sends.fetch_add(1, Ordering::SeqCst);
      if t.to == self.poison_to {
        return Err(GatewayError::insufficient_balance(
          NetworkId::Solana,
          "balance too low for item",
        ));
      }
      Ok(TransactionRef::new(format!("sig_{n}")))
    }

    async fn is_confirmed(&self, _r: &TransactionRef) -> GatewayResult<bool> {
      Ok(true)
    }

    async fn transaction_details(
      &self,
      _r: &TransactionRef,
    ) -> GatewayResult<serde_json::Value> {
      unimplemented!("not exercised")
    }

    async fn call_contract(&self, _c: &ContractCall) -> GatewayResult<TransactionRef> {
      unimplemented!("not exercised")
    }

    async fn is_healthy(&self) -> bool {
      true
    }
  }

  fn router_with(adapter: Arc<FlakyAdapter>) -> Arc<GatewayRouter> {
    let (cancel_tx, _) = broadcast::channel(1);
    Arc::new(GatewayRouter::new(
      vec![adapter],
      PollPolicy::default(),
      cancel_tx,
    ))
  }

  fn items() -> Vec<BatchItem> {
    vec![
      BatchItem { to: "addr_a".into(), amount: dec!(1) },
      BatchItem { to: "addr_poison".into(), amount: dec!(2) },
      BatchItem { to: "addr_c".into(), amount: dec!(3) },
    ]
  }

  #[tokio::test]
  async fn test_short_circuit_skips_items_after_first_failure() {
    let adapter = Arc::new(FlakyAdapter {
      sends: AtomicU32::new(0),
      poison_to: "addr_poison",
    });
    let orchestrator = BatchOrchestrator::new(
      router_with(Arc::clone(&adapter)),
      BatchPolicy { stop_on_first_error: true },
    );

    let report = orchestrator
      .submit(
        NetworkId::Solana,
        &"sender".to_string(),
        &Credential::new("key"),
        &items(),
      )
      .await
      .unwrap();

    assert_eq!(report.failed_index, Some(1));
    assert_eq!(report.submitted(), 1);
    assert!(matches!(report.outcomes[0], ItemOutcome::Sent(_)));
    assert!(matches!(report.outcomes[1], ItemOutcome::Failed(_)));
    assert!(matches!(report.outcomes[2], ItemOutcome::Skipped));
    // The third item was never attempted on the wire.
    assert_eq!(adapter.sends.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_best_effort_attempts_every_item() {
    let adapter = Arc::new(FlakyAdapter {
      sends: AtomicU32::new(0),
      poison_to: "addr_poison",
    });
    let orchestrator = BatchOrchestrator::new(
      router_with(Arc::clone(&adapter)),
      BatchPolicy { stop_on_first_error: false },
    );

    let report = orchestrator
      .submit(
        NetworkId::Solana,
        &"sender".to_string(),
        &Credential::new("key"),
        &items(),
      )
      .await
      .unwrap();

    assert_eq!(report.failed_index, Some(1));
    assert_eq!(report.submitted(), 2);
    assert!(matches!(report.outcomes[2], ItemOutcome::Sent(_)));
    assert_eq!(adapter.sends.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn test_all_items_succeed_yields_refs_in_order() {
    let adapter = Arc::new(FlakyAdapter {
      sends: AtomicU32::new(0),
      poison_to: "never-matched",
    });
    let orchestrator =
      BatchOrchestrator::new(router_with(adapter), BatchPolicy::default());

    let report = orchestrator
      .submit(
        NetworkId::Solana,
        &"sender".to_string(),
        &Credential::new("key"),
        &items(),
      )
      .await
      .unwrap();

    assert!(report.all_sent());
    let refs = report.refs();
    assert_eq!(refs.len(), 3);
    assert_eq!(refs[0].as_str(), "sig_0");
    assert_eq!(refs[2].as_str(), "sig_2");
  }

  #[tokio::test]
  async fn test_unconfigured_network_is_unsupported() {
    let adapter = Arc::new(FlakyAdapter {
      sends: AtomicU32::new(0),
      poison_to: "",
    });
    let orchestrator =
      BatchOrchestrator::new(router_with(adapter), BatchPolicy::default());

    let err = orchestrator
      .submit(
        NetworkId::Cardano,
        &"sender".to_string(),
        &Credential::new("key"),
        &items(),
      )
      .await
      .unwrap_err();
    assert_eq!(err.kind(), "unsupported_operation");
  }
}
