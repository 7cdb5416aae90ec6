//! Polkadot Adapter - Substrate Sidecar REST Shim
//!
//! Talks to a Substrate API Sidecar extended with a signing module:
//! balances come from `/accounts/{addr}/balance-info`, transfers post to
//! the signer with the account's SURI (secret URI), and transaction
//! lookups hit the sidecar's indexer. Contract calls target
//! pallet-contracts. Amounts are Plancks on the wire
//! (1 DOT = 1e10 Planck). Confirmation is GRANDPA finality.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::adapters::rpc::RpcClient;
use crate::domain::error::{GatewayError, GatewayResult};
use crate::domain::network::{Amount, NetworkId};
use crate::domain::transfer::{
    Address, ContractCall, TransactionRef, TransferRequest,
};
use crate::ports::chain_adapter::ChainAdapter;

pub struct PolkadotAdapter {
    rpc: RpcClient,
}

impl PolkadotAdapter {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

/// Confirmation predicate over a transaction lookup.
fn extrinsic_finalized(tx: &Value) -> bool {
    tx.get("finalized").and_then(Value::as_bool).unwrap_or(false)
}

#[async_trait]
impl ChainAdapter for PolkadotAdapter {
    fn network(&self) -> NetworkId {
        NetworkId::Polkadot
    }

    fn supports_contracts(&self) -> bool {
        true
    }

    async fn balance(&self, address: &Address) -> GatewayResult<Amount> {
        let info = self
            .rpc
            .get_json(&format!("/accounts/{address}/balance-info"))
            .await?;

        let plancks = info
            .get("free")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u128>().ok())
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Polkadot,
                    "free balance missing from balance-info",
                )
            })?;

        Ok(NetworkId::Polkadot.from_base_units(plancks))
    }

    async fn send(&self, transfer: &TransferRequest) -> GatewayResult<TransactionRef> {
        let plancks =
            NetworkId::Polkadot.to_base_units(transfer.amount).ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Polkadot,
                    "amount not representable in Plancks",
                )
            })?;

        let body = json!({
            "to": transfer.to,
            "value": plancks.to_string(),
            "suri": transfer.credential.expose(),
        });

        let response = self
            .rpc
            .post_json(&format!("/accounts/{}/transfers", transfer.from), &body)
            .await?;

        response
            .get("hash")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Polkadot,
                    "hash missing from transfer response",
                )
            })
    }

    async fn is_confirmed(&self, txref: &TransactionRef) -> GatewayResult<bool> {
        match self
            .rpc
            .get_json(&format!("/transactions/{}", txref.as_str()))
            .await
        {
            Ok(tx) => Ok(extrinsic_finalized(&tx)),
            // Indexer lag: the extrinsic is in flight but unindexed.
            Err(GatewayError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn transaction_details(
        &self,
        txref: &TransactionRef,
    ) -> GatewayResult<serde_json::Value> {
        self.rpc
            .get_json(&format!("/transactions/{}", txref.as_str()))
            .await
    }

    async fn call_contract(&self, call: &ContractCall) -> GatewayResult<TransactionRef> {
        let credential = call.credential.as_ref().ok_or_else(|| {
            GatewayError::invalid_credential(
                NetworkId::Polkadot,
                "contract invocation requires a signing credential",
            )
        })?;

        let body = json!({
            "address": call.contract,
            "message": call.method,
            "args": call.params,
            "suri": credential.expose(),
        });

        let response = self.rpc.post_json("/pallets/contracts/call", &body).await?;

        response
            .get("hash")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Polkadot,
                    "hash missing from contract call response",
                )
            })
    }

    async fn is_healthy(&self) -> bool {
        self.rpc.probe("/node/version").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalized_predicate() {
        assert!(extrinsic_finalized(&json!({ "finalized": true })));
        assert!(!extrinsic_finalized(&json!({ "finalized": false })));
        assert!(!extrinsic_finalized(&json!({})));
    }
}
