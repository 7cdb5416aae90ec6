//! Tezos Adapter - Node RPC Shim
//!
//! Reads go to the Tezos node's chain RPC (`/chains/<chain>/...`); the
//! chain selector comes from config (`main` by default). Transfers and
//! contract invocations require client-side signing, so both post to the
//! configured signing sidecar which forges, signs with the supplied
//! secret key, and injects. Amounts are mutez on the wire
//! (1 XTZ = 1e6 mutez). Confirmation is the applied operation status.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::adapters::rpc::RpcClient;
use crate::domain::error::{GatewayError, GatewayResult};
use crate::domain::network::{Amount, NetworkId};
use crate::domain::transfer::{
    Address, ContractCall, TransactionRef, TransferRequest,
};
use crate::ports::chain_adapter::ChainAdapter;

pub struct TezosAdapter {
    rpc: RpcClient,
    /// Chain selector in node paths (`main`, `test`, ...).
    chain: String,
}

impl TezosAdapter {
    pub fn new(rpc: RpcClient, chain: Option<String>) -> Self {
        Self {
            rpc,
            chain: chain.unwrap_or_else(|| "main".to_string()),
        }
    }

    fn chain_path(&self, rest: &str) -> String {
        format!("/chains/{}{rest}", self.chain)
    }

    fn mutez(&self, amount: Amount) -> GatewayResult<u64> {
        let base = NetworkId::Tezos.to_base_units(amount).ok_or_else(|| {
            GatewayError::network_error(
                NetworkId::Tezos,
                "amount not representable in mutez",
            )
        })?;
        u64::try_from(base).map_err(|_| {
            GatewayError::network_error(NetworkId::Tezos, "amount exceeds mutez range")
        })
    }
}

/// An operation is confirmed once every appearance in the lookup reports
/// the `applied` status.
fn operation_applied(op: &Value) -> bool {
    op.pointer("/status")
        .and_then(Value::as_str)
        .is_some_and(|s| s == "applied")
}

#[async_trait]
impl ChainAdapter for TezosAdapter {
    fn network(&self) -> NetworkId {
        NetworkId::Tezos
    }

    fn supports_contracts(&self) -> bool {
        true
    }

    async fn balance(&self, address: &Address) -> GatewayResult<Amount> {
        let path = self.chain_path(&format!(
            "/blocks/head/context/contracts/{address}/balance"
        ));
        let result = self.rpc.get_json(&path).await?;

        let mutez = result
            .as_str()
            .and_then(|s| s.parse::<u128>().ok())
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Tezos,
                    "balance response was not a mutez string",
                )
            })?;

        Ok(NetworkId::Tezos.from_base_units(mutez))
    }

    async fn send(&self, transfer: &TransferRequest) -> GatewayResult<TransactionRef> {
        let body = json!({
            "source": transfer.from,
            "destination": transfer.to,
            "amount_mutez": self.mutez(transfer.amount)?,
            "secret_key": transfer.credential.expose(),
        });

        let response = self.rpc.post_json("/injection/transfer", &body).await?;

        response
            .get("operation_hash")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Tezos,
                    "operation_hash missing from injection response",
                )
            })
    }

    async fn is_confirmed(&self, txref: &TransactionRef) -> GatewayResult<bool> {
        let path = self.chain_path(&format!("/operations/{}", txref.as_str()));
        match self.rpc.get_json(&path).await {
            Ok(op) => Ok(operation_applied(&op)),
            // Not yet baked into a block.
            Err(GatewayError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn transaction_details(
        &self,
        txref: &TransactionRef,
    ) -> GatewayResult<serde_json::Value> {
        let path = self.chain_path(&format!("/operations/{}", txref.as_str()));
        self.rpc.get_json(&path).await
    }

    async fn call_contract(&self, call: &ContractCall) -> GatewayResult<TransactionRef> {
        let credential = call.credential.as_ref().ok_or_else(|| {
            GatewayError::invalid_credential(
                NetworkId::Tezos,
                "contract invocation requires a signing credential",
            )
        })?;

        let body = json!({
            "destination": call.contract,
            "entrypoint": call.method.as_deref().unwrap_or("default"),
            "parameters": call.params,
            "secret_key": credential.expose(),
        });

        let response = self.rpc.post_json("/injection/contract-call", &body).await?;

        response
            .get("operation_hash")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Tezos,
                    "operation_hash missing from contract-call response",
                )
            })
    }

    async fn is_healthy(&self) -> bool {
        self.rpc
            .probe(&self.chain_path("/blocks/head/header"))
            .await
    }
}
