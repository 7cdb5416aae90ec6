//! Cardano Adapter - Blockfrost-Compatible REST Shim
//!
//! Reads go to a Blockfrost-compatible API (`/addresses/...`, `/txs/...`)
//! with the project token as bearer auth. Transfers require client-side
//! signing, so `send` posts to the signing sidecar; contract (Plutus)
//! payloads arrive as pre-signed CBOR and go through `/tx/submit`.
//! Amounts are Lovelace on the wire (1 ADA = 1e6 Lovelace). Confirmation
//! is the transaction appearing inside a block.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::adapters::rpc::RpcClient;
use crate::domain::error::{GatewayError, GatewayResult};
use crate::domain::network::{Amount, NetworkId};
use crate::domain::transfer::{
    Address, ContractCall, TransactionRef, TransferRequest,
};
use crate::ports::chain_adapter::ChainAdapter;

pub struct CardanoAdapter {
    rpc: RpcClient,
}

impl CardanoAdapter {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

/// Lovelace entry inside an address info `amount` array.
fn lovelace_quantity(address_info: &Value) -> Option<u128> {
    address_info
        .get("amount")?
        .as_array()?
        .iter()
        .find(|entry| entry.get("unit").and_then(Value::as_str) == Some("lovelace"))?
        .get("quantity")?
        .as_str()?
        .parse()
        .ok()
}

/// Confirmation predicate: the transaction landed in a block.
fn in_block(tx: &Value) -> bool {
    tx.get("block").and_then(Value::as_str).is_some()
}

#[async_trait]
impl ChainAdapter for CardanoAdapter {
    fn network(&self) -> NetworkId {
        NetworkId::Cardano
    }

    fn supports_contracts(&self) -> bool {
        true
    }

    async fn balance(&self, address: &Address) -> GatewayResult<Amount> {
        let info = self.rpc.get_json(&format!("/addresses/{address}")).await?;

        let lovelace = lovelace_quantity(&info).ok_or_else(|| {
            GatewayError::network_error(
                NetworkId::Cardano,
                "lovelace quantity missing from address info",
            )
        })?;

        Ok(NetworkId::Cardano.from_base_units(lovelace))
    }

    async fn send(&self, transfer: &TransferRequest) -> GatewayResult<TransactionRef> {
        let lovelace =
            NetworkId::Cardano.to_base_units(transfer.amount).ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Cardano,
                    "amount not representable in Lovelace",
                )
            })?;

        let body = json!({
            "from_address": transfer.from,
            "to_address": transfer.to,
            "lovelace": lovelace.to_string(),
            "signing_key": transfer.credential.expose(),
        });

        let response = self.rpc.post_json("/tx/transfer", &body).await?;

        response
            .get("tx_hash")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Cardano,
                    "tx_hash missing from transfer response",
                )
            })
    }

    async fn is_confirmed(&self, txref: &TransactionRef) -> GatewayResult<bool> {
        match self.rpc.get_json(&format!("/txs/{}", txref.as_str())).await {
            Ok(tx) => Ok(in_block(&tx)),
            // Not yet on chain; the mempool is invisible to the API.
            Err(GatewayError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn transaction_details(
        &self,
        txref: &TransactionRef,
    ) -> GatewayResult<serde_json::Value> {
        self.rpc.get_json(&format!("/txs/{}", txref.as_str())).await
    }

    async fn call_contract(&self, call: &ContractCall) -> GatewayResult<TransactionRef> {
        // Plutus interactions arrive as a fully built, signed CBOR blob.
        let cbor = call
            .params
            .get("cbor")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Cardano,
                    "contract params must carry a signed transaction CBOR",
                )
            })?;

        let response = self
            .rpc
            .post_json("/tx/submit", &json!({ "cbor": cbor }))
            .await?;

        response
            .as_str()
            .or_else(|| response.get("tx_hash").and_then(Value::as_str))
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Cardano,
                    "tx_hash missing from submit response",
                )
            })
    }

    async fn is_healthy(&self) -> bool {
        self.rpc.probe("/health").await
    }
}
