//! Avalanche X-Chain Adapter - AVM JSON-RPC Shim
//!
//! Talks to an AvalancheGo node: the AVM endpoint under `/ext/bc/X` for
//! transfers and the C-Chain RPC under `/ext/bc/C/rpc` for contract
//! payloads. Transfers use the node keystore API, so the credential is a
//! keystore `username:password` pair. Amounts are nAVAX on the wire
//! (1 AVAX = 1e9 nAVAX).

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::adapters::rpc::RpcClient;
use crate::domain::error::{GatewayError, GatewayResult};
use crate::domain::network::{Amount, NetworkId};
use crate::domain::transfer::{
    Address, ContractCall, TransactionRef, TransferRequest,
};
use crate::ports::chain_adapter::ChainAdapter;

const AVM_PATH: &str = "/ext/bc/X";
const EVM_PATH: &str = "/ext/bc/C/rpc";

pub struct AvalancheAdapter {
    rpc: RpcClient,
}

impl AvalancheAdapter {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    /// Split a keystore credential of the form `username:password`.
    fn keystore_credential(raw: &str) -> GatewayResult<(&str, &str)> {
        raw.split_once(':').ok_or_else(|| {
            GatewayError::invalid_credential(
                NetworkId::Avalanche,
                "expected keystore credential as username:password",
            )
        })
    }

    fn base_units(&self, amount: Amount) -> GatewayResult<u64> {
        let base = NetworkId::Avalanche.to_base_units(amount).ok_or_else(|| {
            GatewayError::network_error(
                NetworkId::Avalanche,
                "amount not representable in nAVAX",
            )
        })?;
        u64::try_from(base).map_err(|_| {
            GatewayError::network_error(NetworkId::Avalanche, "amount exceeds nAVAX range")
        })
    }
}

/// Pull the `Accepted` flag out of an `avm.getTxStatus` result.
fn status_is_accepted(result: &Value) -> bool {
    result
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s == "Accepted")
}

#[async_trait]
impl ChainAdapter for AvalancheAdapter {
    fn network(&self) -> NetworkId {
        NetworkId::Avalanche
    }

    fn supports_contracts(&self) -> bool {
        true
    }

    async fn balance(&self, address: &Address) -> GatewayResult<Amount> {
        let result = self
            .rpc
            .json_rpc_at(
                AVM_PATH,
                "avm.getBalance",
                json!({ "address": address, "assetID": "AVAX" }),
            )
            .await?;

        let navax = result
            .get("balance")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u128>().ok())
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Avalanche,
                    "balance missing from avm.getBalance result",
                )
            })?;

        Ok(NetworkId::Avalanche.from_base_units(navax))
    }

    async fn send(&self, transfer: &TransferRequest) -> GatewayResult<TransactionRef> {
        let (username, password) =
            Self::keystore_credential(transfer.credential.expose())?;
        let amount = self.base_units(transfer.amount)?;

        let result = self
            .rpc
            .json_rpc_at(
                AVM_PATH,
                "avm.send",
                json!({
                    "username": username,
                    "password": password,
                    "assetID": "AVAX",
                    "amount": amount,
                    "from": [transfer.from],
                    "to": transfer.to,
                }),
            )
            .await?;

        result
            .get("txID")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Avalanche,
                    "txID missing from avm.send result",
                )
            })
    }

    async fn is_confirmed(&self, txref: &TransactionRef) -> GatewayResult<bool> {
        let result = self
            .rpc
            .json_rpc_at(
                AVM_PATH,
                "avm.getTxStatus",
                json!({ "txID": txref.as_str() }),
            )
            .await?;
        Ok(status_is_accepted(&result))
    }

    async fn transaction_details(
        &self,
        txref: &TransactionRef,
    ) -> GatewayResult<serde_json::Value> {
        let result = self
            .rpc
            .json_rpc_at(
                AVM_PATH,
                "avm.getTx",
                json!({ "txID": txref.as_str(), "encoding": "json" }),
            )
            .await?;
        result.get("tx").cloned().ok_or_else(|| {
            GatewayError::not_found(
                NetworkId::Avalanche,
                format!("no ledger record for {txref}"),
            )
        })
    }

    async fn call_contract(&self, call: &ContractCall) -> GatewayResult<TransactionRef> {
        // C-Chain contract payloads arrive pre-signed; the adapter only
        // broadcasts. `params.raw` carries the 0x-prefixed raw transaction.
        let raw = call
            .params
            .get("raw")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Avalanche,
                    "contract params must carry a raw signed transaction",
                )
            })?;

        let result = self
            .rpc
            .json_rpc_at(EVM_PATH, "eth_sendRawTransaction", json!([raw]))
            .await?;

        result
            .as_str()
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Avalanche,
                    "transaction hash missing from eth_sendRawTransaction result",
                )
            })
    }

    async fn is_healthy(&self) -> bool {
        self.rpc.probe("/ext/health").await
    }
}
