//! Confirmation Poller - Bounded-Retry Confirmation State Machine
//!
//! Turns an asynchronous ledger's eventual confirmation into a bounded
//! synchronous-looking result. One reusable loop for every network; the
//! per-network "is this confirmed?" predicate lives in the adapter.
//!
//! This is the only place in the gateway where retries happen.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::domain::error::{GatewayError, GatewayResult};
use crate::domain::transfer::{TransactionRef, TransactionStatus};
use crate::ports::chain_adapter::ChainAdapter;

/// Retry budget for confirmation polling.
///
/// `check_timeout` bounds each individual predicate check so a single
/// hung RPC cannot consume the whole retry window silently.
#[derive(Debug, Clone)]
pub struct PollPolicy {
  /// Maximum predicate checks before reporting `TimedOut`.
  pub max_attempts: u32,
  /// Wait between consecutive checks.
  pub poll_interval: Duration,
  /// Upper bound on one predicate check.
  pub check_timeout: Duration,
}

impl Default for PollPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 10,
      poll_interval: Duration::from_secs(5),
      check_timeout: Duration::from_secs(10),
    }
  }
}

/// Terminal status of one confirmation watch plus the number of
/// predicate checks it consumed (feeds the poll-attempt histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
  pub status: TransactionStatus,
  pub attempts: u32,
}

/// Bounded-retry poller shared by all adapters.
///
/// State machine: `Pending -> Confirmed` (predicate true),
/// `Pending -> Pending` (predicate false, attempts remain),
/// `Pending -> TimedOut` (attempts exhausted),
/// `Pending -> Failed` (hard RPC error during a check).
/// Terminal states never transition back.
pub struct ConfirmationPoller {
  policy: PollPolicy,
}

impl ConfirmationPoller {
  pub fn new(policy: PollPolicy) -> Self {
    Self { policy }
  }

  pub fn policy(&self) -> &PollPolicy {
    &self.policy
  }

  /// Poll the adapter's confirmation predicate until a terminal status.
  ///
  /// Invokes the predicate at most `max_attempts` times, sleeping
  /// `poll_interval` between checks (never after the last one). A check
  /// exceeding `check_timeout` counts as one unconfirmed attempt; an
  /// explicit RPC error is terminal `Failed` — callers can distinguish
  /// "ledger still deciding" (`TimedOut`) from "node rejected the query".
  ///
  /// `cancel` aborts the wait early (request abort, process shutdown);
  /// cancellation surfaces as a `TransactionTimeout` error rather than a
  /// fake terminal status, so it is distinguishable from node faults.
  pub async fn watch(
    &self,
    adapter: &dyn ChainAdapter,
    txref: &TransactionRef,
    mut cancel: broadcast::Receiver<()>,
  ) -> GatewayResult<PollOutcome> {
    let network = adapter.network();

    for attempt in 1..=self.policy.max_attempts {
      let check = timeout(self.policy.check_timeout, adapter.is_confirmed(txref));

      let outcome = tokio::select! {
        biased;
        _ = cancel.recv() => {
          debug!(%network, %txref, attempt, "confirmation poll cancelled");
          return Err(GatewayError::timeout(
            network,
            "confirmation poll cancelled",
          ));
        }
        outcome = check => outcome,
      };

      match outcome {
        Ok(Ok(true)) => {
          debug!(%network, %txref, attempt, "transaction confirmed");
          return Ok(PollOutcome {
            status: TransactionStatus::Confirmed,
            attempts: attempt,
          });
        }
        Ok(Ok(false)) => {
          debug!(%network, %txref, attempt, "not yet confirmed");
        }
        Ok(Err(e)) => {
          warn!(%network, %txref, attempt, error = %e, "confirmation check failed");
          return Ok(PollOutcome {
            status: TransactionStatus::Failed,
            attempts: attempt,
          });
        }
        Err(_elapsed) => {
          warn!(
            %network,
            %txref,
            attempt,
            timeout_ms = self.policy.check_timeout.as_millis() as u64,
            "confirmation check timed out, counting as unconfirmed"
          );
        }
      }

      if attempt < self.policy.max_attempts {
        tokio::select! {
          biased;
          _ = cancel.recv() => {
            debug!(%network, %txref, attempt, "confirmation poll cancelled during wait");
            return Err(GatewayError::timeout(
              network,
              "confirmation poll cancelled",
            ));
          }
          () = sleep(self.policy.poll_interval) => {}
        }
      }
    }

    debug!(
      %network,
      %txref,
      attempts = self.policy.max_attempts,
      "confirmation attempts exhausted"
    );
    Ok(PollOutcome {
      status: TransactionStatus::TimedOut,
      attempts: self.policy.max_attempts,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use std::sync::atomic::{AtomicU32, Ordering};

  use async_trait::async_trait;

  use crate::domain::network::{Amount, NetworkId};
  use crate::domain::transfer::{Address, ContractCall, TransferRequest};

  /// Adapter stub whose predicate is scripted per attempt.
  struct ScriptedAdapter {
    checks: AtomicU32,
    /// Attempt number on which the predicate turns true (0 = never).
    confirm_on: u32,
    /// Attempt number on which the check errors (0 = never).
    error_on: u32,
  }

  impl ScriptedAdapter {
    fn new(confirm_on: u32, error_on: u32) -> Self {
      Self { checks: AtomicU32::new(0), confirm_on, error_on }
    }

    fn check_count(&self) -> u32 {
      self.checks.load(Ordering::SeqCst)
    }
  }

  #[async_trait]
  impl ChainAdapter for ScriptedAdapter {
    fn network(&self) -> NetworkId {
      NetworkId::Tezos
    }

    fn supports_contracts(&self) -> bool {
      true
    }

    async fn balance(&self, _address: &Address) -> GatewayResult<Amount> {
      unimplemented!("not exercised")
    }

    async fn send(&self, _t: &TransferRequest) -> GatewayResult<TransactionRef> {
      unimplemented!("not exercised")
    }

    async fn is_confirmed(&self, _txref: &TransactionRef) -> GatewayResult<bool> {
      let attempt = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
      if self.error_on != 0 && attempt == self.error_on {
        return Err(GatewayError::network_error(NetworkId::Tezos, "rpc fault"));
      }
      Ok(self.confirm_on != 0 && attempt >= self.confirm_on)
    }

    async fn transaction_details(
      &self,
      _txref: &TransactionRef,
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

  fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy {
      max_attempts,
      poll_interval: Duration::from_millis(1),
      check_timeout: Duration::from_millis(100),
    }
  }

  #[tokio::test]
  async fn test_never_confirmed_times_out_after_exact_attempts() {
    let adapter = Arc::new(ScriptedAdapter::new(0, 0));
    let poller = ConfirmationPoller::new(fast_policy(10));
    let (_tx, rx) = broadcast::channel(1);

    let outcome = poller
      .watch(adapter.as_ref(), &TransactionRef::new("op_never"), rx)
      .await
      .unwrap();

    assert_eq!(outcome.status, TransactionStatus::TimedOut);
    assert_eq!(outcome.attempts, 10);
    assert_eq!(adapter.check_count(), 10);
  }

  #[tokio::test]
  async fn test_confirmed_on_third_attempt_checks_exactly_three_times() {
    let adapter = Arc::new(ScriptedAdapter::new(3, 0));
    let poller = ConfirmationPoller::new(fast_policy(10));
    let (_tx, rx) = broadcast::channel(1);

    let outcome = poller
      .watch(adapter.as_ref(), &TransactionRef::new("op_applied"), rx)
      .await
      .unwrap();

    assert_eq!(outcome.status, TransactionStatus::Confirmed);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(adapter.check_count(), 3);
  }

  #[tokio::test]
  async fn test_confirmed_on_first_attempt_checks_once() {
    let adapter = Arc::new(ScriptedAdapter::new(1, 0));
    let poller = ConfirmationPoller::new(fast_policy(10));
    let (_tx, rx) = broadcast::channel(1);

    let outcome = poller
      .watch(adapter.as_ref(), &TransactionRef::new("op_fast"), rx)
      .await
      .unwrap();

    assert_eq!(outcome.status, TransactionStatus::Confirmed);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(adapter.check_count(), 1);
  }

  #[tokio::test]
  async fn test_rpc_error_is_terminal_failed_not_timed_out() {
    let adapter = Arc::new(ScriptedAdapter::new(0, 2));
    let poller = ConfirmationPoller::new(fast_policy(10));
    let (_tx, rx) = broadcast::channel(1);

    let outcome = poller
      .watch(adapter.as_ref(), &TransactionRef::new("op_err"), rx)
      .await
      .unwrap();

    assert_eq!(outcome.status, TransactionStatus::Failed);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(adapter.check_count(), 2);
  }

  #[tokio::test]
  async fn test_cancellation_aborts_wait_early() {
    let adapter = Arc::new(ScriptedAdapter::new(0, 0));
    let poller = ConfirmationPoller::new(PollPolicy {
      max_attempts: 10,
      poll_interval: Duration::from_secs(60),
      check_timeout: Duration::from_millis(100),
    });
    let (tx, rx) = broadcast::channel(1);

    let watcher = {
      let adapter = Arc::clone(&adapter);
      tokio::spawn(async move {
        let poller = poller;
        poller
          .watch(adapter.as_ref(), &TransactionRef::new("op_cancel"), rx)
          .await
      })
    };

    // Let the first check land, then cancel during the long wait.
    tokio::time::sleep(Duration::from_millis(20)).await;
    tx.send(()).unwrap();

    let result = watcher.await.unwrap();
    let err = result.unwrap_err();
    // Cancellation is a timeout, not a node fault.
    assert_eq!(err.kind(), "transaction_timeout");
    assert!(adapter.check_count() < 10);
  }
}
