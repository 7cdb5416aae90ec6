//! Solana Adapter - JSON-RPC Shim
//!
//! Reads go straight to a Solana RPC node (`getBalance`,
//! `getSignatureStatuses`, `getTransaction`). Transfers require
//! client-side Ed25519 signing, so `send` posts to the configured signing
//! sidecar's `/v1/transfer`; contract invocations arrive as pre-signed
//! base64 transactions and are broadcast via `sendTransaction`. Amounts
//! are Lamports on the wire (1 SOL = 1e9 Lamports).

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::adapters::rpc::RpcClient;
use crate::domain::error::{GatewayError, GatewayResult};
use crate::domain::network::{Amount, NetworkId};
use crate::domain::transfer::{
    Address, ContractCall, TransactionRef, TransferRequest,
};
use crate::ports::chain_adapter::ChainAdapter;

pub struct SolanaAdapter {
    rpc: RpcClient,
}

impl SolanaAdapter {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

/// Confirmation predicate over a `getSignatureStatuses` result.
fn signature_finalized(result: &Value) -> bool {
    result
        .pointer("/value/0/confirmationStatus")
        .and_then(Value::as_str)
        .is_some_and(|s| s == "finalized")
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
    fn network(&self) -> NetworkId {
        NetworkId::Solana
    }

    fn supports_contracts(&self) -> bool {
        true
    }

    async fn balance(&self, address: &Address) -> GatewayResult<Amount> {
        let result = self.rpc.json_rpc("getBalance", json!([address])).await?;

        let lamports = result
            .get("value")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Solana,
                    "value missing from getBalance result",
                )
            })?;

        Ok(NetworkId::Solana.from_base_units(u128::from(lamports)))
    }

    async fn send(&self, transfer: &TransferRequest) -> GatewayResult<TransactionRef> {
        let lamports =
            NetworkId::Solana.to_base_units(transfer.amount).ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Solana,
                    "amount not representable in Lamports",
                )
            })?;

        let body = json!({
            "from": transfer.from,
            "to": transfer.to,
            "lamports": u64::try_from(lamports).map_err(|_| {
                GatewayError::network_error(NetworkId::Solana, "amount exceeds Lamport range")
            })?,
            "secret_key": transfer.credential.expose(),
        });

        let response = self.rpc.post_json("/v1/transfer", &body).await?;

        response
            .get("signature")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Solana,
                    "signature missing from transfer response",
                )
            })
    }

    async fn is_confirmed(&self, txref: &TransactionRef) -> GatewayResult<bool> {
        let result = self
            .rpc
            .json_rpc(
                "getSignatureStatuses",
                json!([[txref.as_str()], { "searchTransactionHistory": true }]),
            )
            .await?;
        Ok(signature_finalized(&result))
    }

    async fn transaction_details(
        &self,
        txref: &TransactionRef,
    ) -> GatewayResult<serde_json::Value> {
        let result = self
            .rpc
            .json_rpc(
                "getTransaction",
                json!([txref.as_str(), { "encoding": "json" }]),
            )
            .await?;

        if result.is_null() {
            return Err(GatewayError::not_found(
                NetworkId::Solana,
                format!("no ledger record for {txref}"),
            ));
        }
        Ok(result)
    }

    async fn call_contract(&self, call: &ContractCall) -> GatewayResult<TransactionRef> {
        // Program invocations arrive as a pre-signed base64 transaction.
        let transaction = call
            .params
            .get("transaction")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Solana,
                    "contract params must carry a base64 signed transaction",
                )
            })?;

        let result = self
            .rpc
            .json_rpc(
                "sendTransaction",
                json!([transaction, { "encoding": "base64" }]),
            )
            .await?;

        result.as_str().map(TransactionRef::new).ok_or_else(|| {
            GatewayError::network_error(
                NetworkId::Solana,
                "signature missing from sendTransaction result",
            )
        })
    }

    async fn is_healthy(&self) -> bool {
        self.rpc.json_rpc("getHealth", json!([])).await.is_ok()
    }
}
