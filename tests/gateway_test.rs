//! Integration Tests - Router, Poller, and Batch Over Mock Adapters
//!
//! Tests the interaction between usecases and the adapter port. Uses
//! mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use rust_decimal_macros::dec;
use tokio::sync::broadcast;

use multichain_gateway::domain::error::{GatewayError, GatewayResult};
use multichain_gateway::domain::network::{Amount, NetworkId};
use multichain_gateway::domain::transfer::{
    Address, BatchItem, ContractCall, Credential, ItemOutcome, TransactionRef,
    TransactionStatus, TransferRequest,
};
use multichain_gateway::ports::chain_adapter::ChainAdapter;
use multichain_gateway::usecases::batch::{BatchOrchestrator, BatchPolicy};
use multichain_gateway::usecases::gateway::GatewayRouter;
use multichain_gateway::usecases::poller::PollPolicy;

// ---- Mock Definitions ----

mock! {
    pub Adapter {}

    #[async_trait]
    impl ChainAdapter for Adapter {
        fn network(&self) -> NetworkId;
        fn supports_contracts(&self) -> bool;
        async fn balance(&self, address: &Address) -> GatewayResult<Amount>;
        async fn send(&self, transfer: &TransferRequest) -> GatewayResult<TransactionRef>;
        async fn is_confirmed(&self, txref: &TransactionRef) -> GatewayResult<bool>;
        async fn transaction_details(
            &self,
            txref: &TransactionRef,
        ) -> GatewayResult<serde_json::Value>;
        async fn call_contract(&self, call: &ContractCall) -> GatewayResult<TransactionRef>;
        async fn is_healthy(&self) -> bool;
    }
}

fn fast_policy() -> PollPolicy {
    PollPolicy {
        max_attempts: 10,
        poll_interval: Duration::from_millis(1),
        check_timeout: Duration::from_millis(200),
    }
}

fn router_over(adapter: MockAdapter, policy: PollPolicy) -> Arc<GatewayRouter> {
    let (cancel_tx, _) = broadcast::channel(1);
    Arc::new(GatewayRouter::new(vec![Arc::new(adapter)], policy, cancel_tx))
}

// ---- Confirmation Monitoring ----

#[tokio::test]
async fn test_monitor_confirms_on_third_poll_with_exactly_three_checks() {
    let mut adapter = MockAdapter::new();
    adapter.expect_network().return_const(NetworkId::Tezos);

    let checks = Arc::new(AtomicU32::new(0));
    let checks_ref = Arc::clone(&checks);
    adapter
        .expect_is_confirmed()
        .times(3)
        .returning(move |_| {
            let attempt = checks_ref.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(attempt >= 3)
        });

    let router = router_over(adapter, fast_policy());

    let outcome = router
        .monitor_transaction(NetworkId::Tezos, &TransactionRef::new("opHash"))
        .await
        .unwrap();

    assert_eq!(outcome.status, TransactionStatus::Confirmed);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(checks.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_monitor_exhausts_attempts_into_timed_out() {
    let mut adapter = MockAdapter::new();
    adapter.expect_network().return_const(NetworkId::Cardano);
    adapter.expect_is_confirmed().times(10).returning(|_| Ok(false));

    let router = router_over(adapter, fast_policy());

    let outcome = router
        .monitor_transaction(NetworkId::Cardano, &TransactionRef::new("txhash"))
        .await
        .unwrap();

    assert_eq!(outcome.status, TransactionStatus::TimedOut);
    assert_eq!(outcome.attempts, 10);
}

#[tokio::test]
async fn test_monitor_hard_node_error_is_failed_not_timed_out() {
    let mut adapter = MockAdapter::new();
    adapter.expect_network().return_const(NetworkId::Ripple);
    adapter.expect_is_confirmed().times(1).returning(|_| {
        Err(GatewayError::network_error(NetworkId::Ripple, "node exploded"))
    });

    let router = router_over(adapter, fast_policy());

    let outcome = router
        .monitor_transaction(NetworkId::Ripple, &TransactionRef::new("deadbeef"))
        .await
        .unwrap();

    assert_eq!(outcome.status, TransactionStatus::Failed);
    assert_eq!(outcome.attempts, 1);
}

// ---- Routing ----

#[tokio::test]
async fn test_unconfigured_network_is_unsupported_operation() {
    let mut adapter = MockAdapter::new();
    adapter.expect_network().return_const(NetworkId::Solana);

    let router = router_over(adapter, fast_policy());

    let err = router
        .balance(NetworkId::Polkadot, &"15oF4u...".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "unsupported_operation");
    assert_eq!(err.network(), NetworkId::Polkadot);
}

#[tokio::test]
async fn test_contract_call_on_non_programmable_chain_never_hits_the_node() {
    let mut adapter = MockAdapter::new();
    adapter.expect_network().return_const(NetworkId::Litecoin);
    adapter.expect_supports_contracts().return_const(false);
    // Rejection must happen before any node traffic.
    adapter.expect_call_contract().times(0);

    let router = router_over(adapter, fast_policy());

    let call = ContractCall {
        contract: "ltc1q...".to_string(),
        method: Some("transfer".to_string()),
        params: serde_json::json!({}),
        credential: None,
    };
    let err = router
        .call_contract(NetworkId::Litecoin, &call)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "unsupported_operation");
}

// ---- Batch Submission ----

#[tokio::test]
async fn test_batch_short_circuits_after_middle_item_fails() {
    let mut adapter = MockAdapter::new();
    adapter.expect_network().return_const(NetworkId::Tron);

    // Only the first two items reach the node under fail-fast.
    adapter.expect_send().times(2).returning(|transfer| {
        if transfer.to == "poisoned" {
            return Err(GatewayError::insufficient_balance(
                NetworkId::Tron,
                "account balance is not sufficient",
            ));
        }
        Ok(TransactionRef::new(format!("txid_{}", transfer.to)))
    });

    let router = router_over(adapter, fast_policy());
    let orchestrator =
        BatchOrchestrator::new(router, BatchPolicy { stop_on_first_error: true });

    let items = vec![
        BatchItem { to: "alice".into(), amount: dec!(1) },
        BatchItem { to: "poisoned".into(), amount: dec!(2) },
        BatchItem { to: "carol".into(), amount: dec!(3) },
    ];
    let report = orchestrator
        .submit(NetworkId::Tron, &"sender".to_string(), &Credential::new("pk"), &items)
        .await
        .unwrap();

    assert_eq!(report.failed_index, Some(1));
    assert!(matches!(report.outcomes[0], ItemOutcome::Sent(_)));
    assert!(matches!(report.outcomes[1], ItemOutcome::Failed(_)));
    assert!(matches!(report.outcomes[2], ItemOutcome::Skipped));
}

// ---- Per-Sender Ordering ----

/// Adapter that records how many sends overlap in time.
struct OverlapProbe {
    in_flight: AtomicI32,
    max_in_flight: AtomicI32,
    sends: AtomicU32,
}

#[async_trait]
impl ChainAdapter for OverlapProbe {
    fn network(&self) -> NetworkId {
        NetworkId::Cosmos
    }

    fn supports_contracts(&self) -> bool {
        true
    }

    async fn balance(&self, _address: &Address) -> GatewayResult<Amount> {
        unimplemented!("not exercised")
    }

    async fn send(&self, _transfer: &TransferRequest) -> GatewayResult<TransactionRef> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let n = self.sends.fetch_add(1, Ordering::SeqCst);
        Ok(TransactionRef::new(format!("hash_{n}")))
    }

    async fn is_confirmed(&self, _txref: &TransactionRef) -> GatewayResult<bool> {
        Ok(true)
    }

    async fn transaction_details(
        &self,
        _txref: &TransactionRef,
    ) -> GatewayResult<serde_json::Value> {
        unimplemented!("not exercised")
    }

    async fn call_contract(&self, _call: &ContractCall) -> GatewayResult<TransactionRef> {
        unimplemented!("not exercised")
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn test_concurrent_sends_from_one_sender_never_overlap() {
    let probe = Arc::new(OverlapProbe {
        in_flight: AtomicI32::new(0),
        max_in_flight: AtomicI32::new(0),
        sends: AtomicU32::new(0),
    });
    let (cancel_tx, _) = broadcast::channel(1);
    let router = Arc::new(GatewayRouter::new(
        vec![Arc::clone(&probe) as Arc<dyn ChainAdapter>],
        fast_policy(),
        cancel_tx,
    ));

    let mut handles = Vec::new();
    for i in 0..4 {
        let router = Arc::clone(&router);
        handles.push(tokio::spawn(async move {
            let transfer = TransferRequest {
                from: "cosmos1sender".to_string(),
                to: format!("cosmos1dest{i}"),
                amount: dec!(0.5),
                credential: Credential::new("mnemonic words"),
            };
            router.send(NetworkId::Cosmos, &transfer).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(probe.sends.load(Ordering::SeqCst), 4);
    assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sends_from_different_senders_may_overlap() {
    let probe = Arc::new(OverlapProbe {
        in_flight: AtomicI32::new(0),
        max_in_flight: AtomicI32::new(0),
        sends: AtomicU32::new(0),
    });
    let (cancel_tx, _) = broadcast::channel(1);
    let router = Arc::new(GatewayRouter::new(
        vec![Arc::clone(&probe) as Arc<dyn ChainAdapter>],
        fast_policy(),
        cancel_tx,
    ));

    let mut handles = Vec::new();
    for i in 0..4 {
        let router = Arc::clone(&router);
        handles.push(tokio::spawn(async move {
            let transfer = TransferRequest {
                from: format!("cosmos1sender{i}"),
                to: "cosmos1dest".to_string(),
                amount: dec!(0.5),
                credential: Credential::new("mnemonic words"),
            };
            router.send(NetworkId::Cosmos, &transfer).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(probe.sends.load(Ordering::SeqCst), 4);
    // Distinct senders hold distinct locks; overlap is allowed (and with
    // a 10ms hold, effectively guaranteed on a multithreaded runtime).
    assert!(probe.max_in_flight.load(Ordering::SeqCst) >= 1);
}
