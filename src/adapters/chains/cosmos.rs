//! Cosmos Hub Adapter - LCD REST Shim
//!
//! Reads go to the LCD (`/cosmos/bank/...`, `/cosmos/tx/...`). Transfers
//! and CosmWasm executions require client-side secp256k1 signing, so the
//! configured endpoint is expected to front a signing sidecar alongside
//! the LCD. Amounts are uatom on the wire (1 ATOM = 1e6 uatom).
//! Confirmation: transaction indexed with `code == 0` at a height.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::adapters::rpc::RpcClient;
use crate::domain::error::{GatewayError, GatewayResult, normalize};
use crate::domain::network::{Amount, NetworkId};
use crate::domain::transfer::{
    Address, ContractCall, TransactionRef, TransferRequest,
};
use crate::ports::chain_adapter::ChainAdapter;

const DENOM: &str = "uatom";

pub struct CosmosAdapter {
    rpc: RpcClient,
}

impl CosmosAdapter {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

/// Confirmation predicate over a `GetTx` response.
fn tx_executed(response: &Value) -> bool {
    let code = response
        .pointer("/tx_response/code")
        .and_then(Value::as_u64)
        .unwrap_or(u64::MAX);
    let height = response
        .pointer("/tx_response/height")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);
    code == 0 && height > 0
}

#[async_trait]
impl ChainAdapter for CosmosAdapter {
    fn network(&self) -> NetworkId {
        NetworkId::Cosmos
    }

    fn supports_contracts(&self) -> bool {
        true
    }

    async fn balance(&self, address: &Address) -> GatewayResult<Amount> {
        let path =
            format!("/cosmos/bank/v1beta1/balances/{address}/by_denom?denom={DENOM}");
        let response = self.rpc.get_json(&path).await?;

        let uatom = response
            .pointer("/balance/amount")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u128>().ok())
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Cosmos,
                    "amount missing from bank balance response",
                )
            })?;

        Ok(NetworkId::Cosmos.from_base_units(uatom))
    }

    async fn send(&self, transfer: &TransferRequest) -> GatewayResult<TransactionRef> {
        let uatom = NetworkId::Cosmos.to_base_units(transfer.amount).ok_or_else(|| {
            GatewayError::network_error(
                NetworkId::Cosmos,
                "amount not representable in uatom",
            )
        })?;

        let body = json!({
            "from_address": transfer.from,
            "to_address": transfer.to,
            "amount": [{ "denom": DENOM, "amount": uatom.to_string() }],
            "mnemonic": transfer.credential.expose(),
        });

        let response = self.rpc.post_json("/signer/v1/bank/send", &body).await?;

        if let Some(raw) = response.get("raw_log").and_then(Value::as_str) {
            let code = response.get("code").and_then(Value::as_u64).unwrap_or(0);
            if code != 0 {
                return Err(normalize(NetworkId::Cosmos, raw));
            }
        }

        response
            .get("txhash")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Cosmos,
                    "txhash missing from broadcast response",
                )
            })
    }

    async fn is_confirmed(&self, txref: &TransactionRef) -> GatewayResult<bool> {
        let path = format!("/cosmos/tx/v1beta1/txs/{}", txref.as_str());
        match self.rpc.get_json(&path).await {
            Ok(response) => Ok(tx_executed(&response)),
            // The LCD answers 404 until the transaction is indexed.
            Err(GatewayError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn transaction_details(
        &self,
        txref: &TransactionRef,
    ) -> GatewayResult<serde_json::Value> {
        let path = format!("/cosmos/tx/v1beta1/txs/{}", txref.as_str());
        self.rpc.get_json(&path).await
    }

    async fn call_contract(&self, call: &ContractCall) -> GatewayResult<TransactionRef> {
        let credential = call.credential.as_ref().ok_or_else(|| {
            GatewayError::invalid_credential(
                NetworkId::Cosmos,
                "contract execution requires a signing credential",
            )
        })?;

        let body = json!({
            "contract": call.contract,
            "msg": { call.method.as_deref().unwrap_or("execute"): call.params },
            "mnemonic": credential.expose(),
        });

        let response = self.rpc.post_json("/signer/v1/wasm/execute", &body).await?;

        response
            .get("txhash")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Cosmos,
                    "txhash missing from wasm execute response",
                )
            })
    }

    async fn is_healthy(&self) -> bool {
        self.rpc
            .probe("/cosmos/base/tendermint/v1beta1/syncing")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_executed_predicate() {
        let confirmed = json!({ "tx_response": { "code": 0, "height": "1234" } });
        assert!(tx_executed(&confirmed));

        let failed = json!({ "tx_response": { "code": 5, "height": "1234" } });
        assert!(!tx_executed(&failed));

        let pending = json!({ "tx_response": { "code": 0, "height": "0" } });
        assert!(!tx_executed(&pending));

        assert!(!tx_executed(&json!({})));
    }
}
