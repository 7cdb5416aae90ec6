//! Ripple (XRP Ledger) Adapter - rippled JSON-RPC Shim
//!
//! rippled speaks its own `{"method", "params": [{...}]}` envelope rather
//! than JSON-RPC 2.0, so calls go through `post_json` directly. `submit`
//! runs in sign-and-submit mode: the account secret travels to the
//! (trusted, operator-run) rippled node. Amounts are drops on the wire
//! (1 XRP = 1e6 drops). No contract programmability.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::adapters::rpc::RpcClient;
use crate::domain::error::{GatewayError, GatewayResult, normalize};
use crate::domain::network::{Amount, NetworkId};
use crate::domain::transfer::{
    Address, ContractCall, TransactionRef, TransferRequest,
};
use crate::ports::chain_adapter::ChainAdapter;

pub struct RippleAdapter {
    rpc: RpcClient,
}

impl RippleAdapter {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    /// Issue one rippled command and unwrap its `result`, mapping
    /// `"error"` statuses onto the taxonomy.
    async fn command(&self, method: &str, params: Value) -> GatewayResult<Value> {
        let body = json!({ "method": method, "params": [params] });
        let response = self.rpc.post_json("", &body).await?;

        let result = response.get("result").cloned().ok_or_else(|| {
            GatewayError::network_error(
                NetworkId::Ripple,
                "result missing from rippled response",
            )
        })?;

        if result.get("status").and_then(Value::as_str) == Some("error") {
            let message = result
                .get("error_message")
                .or_else(|| result.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("rippled returned an unstructured error");
            return Err(classify_rippled_error(message));
        }
        Ok(result)
    }
}

/// rippled error vocabulary on top of the generic normalizer.
fn classify_rippled_error(message: &str) -> GatewayError {
    match message {
        "actNotFound" | "txnNotFound" => {
            GatewayError::not_found(NetworkId::Ripple, message)
        }
        "actMalformed" => GatewayError::invalid_address(NetworkId::Ripple, message),
        "badSecret" => GatewayError::invalid_credential(NetworkId::Ripple, message),
        other => normalize(NetworkId::Ripple, other),
    }
}

/// Payment engine results that mean the sending account cannot pay.
fn engine_says_unfunded(engine_result: &str) -> bool {
    matches!(engine_result, "tecUNFUNDED_PAYMENT" | "tecUNFUNDED" | "terINSUF_FEE_B")
}

#[async_trait]
impl ChainAdapter for RippleAdapter {
    fn network(&self) -> NetworkId {
        NetworkId::Ripple
    }

    fn supports_contracts(&self) -> bool {
        false
    }

    async fn balance(&self, address: &Address) -> GatewayResult<Amount> {
        let result = self
            .command(
                "account_info",
                json!({ "account": address, "ledger_index": "validated" }),
            )
            .await?;

        let drops = result
            .pointer("/account_data/Balance")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u128>().ok())
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Ripple,
                    "Balance missing from account_info result",
                )
            })?;

        Ok(NetworkId::Ripple.from_base_units(drops))
    }

    async fn send(&self, transfer: &TransferRequest) -> GatewayResult<TransactionRef> {
        let drops = NetworkId::Ripple.to_base_units(transfer.amount).ok_or_else(|| {
            GatewayError::network_error(
                NetworkId::Ripple,
                "amount not representable in drops",
            )
        })?;

        let result = self
            .command(
                "submit",
                json!({
                    "secret": transfer.credential.expose(),
                    "tx_json": {
                        "TransactionType": "Payment",
                        "Account": transfer.from,
                        "Destination": transfer.to,
                        "Amount": drops.to_string(),
                    },
                }),
            )
            .await?;

        if let Some(engine) = result.get("engine_result").and_then(Value::as_str) {
            if engine_says_unfunded(engine) {
                return Err(GatewayError::insufficient_balance(
                    NetworkId::Ripple,
                    engine,
                ));
            }
            if engine != "tesSUCCESS" && !engine.starts_with("ter") {
                return Err(normalize(NetworkId::Ripple, engine));
            }
        }

        result
            .pointer("/tx_json/hash")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Ripple,
                    "hash missing from submit result",
                )
            })
    }

    async fn is_confirmed(&self, txref: &TransactionRef) -> GatewayResult<bool> {
        match self
            .command("tx", json!({ "transaction": txref.as_str() }))
            .await
        {
            Ok(result) => Ok(result
                .get("validated")
                .and_then(Value::as_bool)
                .unwrap_or(false)),
            // Not indexed yet is "still deciding", not a hard failure.
            Err(GatewayError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn transaction_details(
        &self,
        txref: &TransactionRef,
    ) -> GatewayResult<serde_json::Value> {
        self.command("tx", json!({ "transaction": txref.as_str() }))
            .await
    }

    async fn call_contract(&self, _call: &ContractCall) -> GatewayResult<TransactionRef> {
        Err(GatewayError::unsupported(
            NetworkId::Ripple,
            "the XRP Ledger has no contract programmability",
        ))
    }

    async fn is_healthy(&self) -> bool {
        self.command("server_info", json!({})).await.is_ok()
    }
}
