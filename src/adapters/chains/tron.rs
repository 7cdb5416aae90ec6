//! Tron Adapter - Full-Node HTTP API Shim
//!
//! Talks the TronGrid-compatible wallet HTTP API. Transfers use
//! `easytransferbyprivate` (the node signs with the supplied private
//! key); contract calls go through `triggersmartcontract` on a node run
//! in signing mode. Amounts are SUN on the wire (1 TRX = 1e6 SUN).
//! Confirmation is the executed transaction's `contractRet == "SUCCESS"`.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::adapters::rpc::RpcClient;
use crate::domain::error::{GatewayError, GatewayResult, normalize};
use crate::domain::network::{Amount, NetworkId};
use crate::domain::transfer::{
    Address, ContractCall, TransactionRef, TransferRequest,
};
use crate::ports::chain_adapter::ChainAdapter;

pub struct TronAdapter {
    rpc: RpcClient,
}

impl TronAdapter {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    fn sun(&self, amount: Amount) -> GatewayResult<u64> {
        let base = NetworkId::Tron.to_base_units(amount).ok_or_else(|| {
            GatewayError::network_error(NetworkId::Tron, "amount not representable in SUN")
        })?;
        u64::try_from(base).map_err(|_| {
            GatewayError::network_error(NetworkId::Tron, "amount exceeds SUN range")
        })
    }
}

/// Confirmation predicate over a `gettransactionbyid` result.
fn contract_ret_success(tx: &Value) -> bool {
    tx.pointer("/ret/0/contractRet")
        .and_then(Value::as_str)
        .is_some_and(|s| s == "SUCCESS")
}

#[async_trait]
impl ChainAdapter for TronAdapter {
    fn network(&self) -> NetworkId {
        NetworkId::Tron
    }

    fn supports_contracts(&self) -> bool {
        true
    }

    async fn balance(&self, address: &Address) -> GatewayResult<Amount> {
        let body = json!({ "address": address, "visible": true });
        let account = self.rpc.post_json("/wallet/getaccount", &body).await?;

        if account.get("Error").is_some() {
            let raw = account["Error"].as_str().unwrap_or("node rejected getaccount");
            return Err(normalize(NetworkId::Tron, raw));
        }

        // Absent balance field means a never-funded (but valid) account.
        let sun = account.get("balance").and_then(Value::as_u64).unwrap_or(0);
        Ok(NetworkId::Tron.from_base_units(u128::from(sun)))
    }

    async fn send(&self, transfer: &TransferRequest) -> GatewayResult<TransactionRef> {
        let body = json!({
            "privateKey": transfer.credential.expose(),
            "toAddress": transfer.to,
            "amount": self.sun(transfer.amount)?,
        });

        let response = self.rpc.post_json("/wallet/easytransferbyprivate", &body).await?;

        let ok = response
            .pointer("/result/result")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !ok {
            let raw = response
                .pointer("/result/message")
                .and_then(Value::as_str)
                .unwrap_or("transfer rejected by node");
            return Err(normalize(NetworkId::Tron, raw));
        }

        response
            .pointer("/transaction/txID")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Tron,
                    "txID missing from transfer response",
                )
            })
    }

    async fn is_confirmed(&self, txref: &TransactionRef) -> GatewayResult<bool> {
        let body = json!({ "value": txref.as_str() });
        let tx = self.rpc.post_json("/wallet/gettransactionbyid", &body).await?;

        // The node answers `{}` while the transaction is unknown.
        Ok(contract_ret_success(&tx))
    }

    async fn transaction_details(
        &self,
        txref: &TransactionRef,
    ) -> GatewayResult<serde_json::Value> {
        let body = json!({ "value": txref.as_str() });
        let tx = self.rpc.post_json("/wallet/gettransactionbyid", &body).await?;

        if tx.as_object().is_some_and(serde_json::Map::is_empty) {
            return Err(GatewayError::not_found(
                NetworkId::Tron,
                format!("no ledger record for {txref}"),
            ));
        }
        Ok(tx)
    }

    async fn call_contract(&self, call: &ContractCall) -> GatewayResult<TransactionRef> {
        let body = json!({
            "contract_address": call.contract,
            "function_selector": call.method,
            "parameter": call.params,
            "visible": true,
        });

        let response = self
            .rpc
            .post_json("/wallet/triggersmartcontract", &body)
            .await?;

        let ok = response
            .pointer("/result/result")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !ok {
            let raw = response
                .pointer("/result/message")
                .and_then(Value::as_str)
                .unwrap_or("contract trigger rejected by node");
            return Err(normalize(NetworkId::Tron, raw));
        }

        response
            .pointer("/transaction/txID")
            .and_then(Value::as_str)
            .map(TransactionRef::new)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Tron,
                    "txID missing from triggersmartcontract response",
                )
            })
    }

    async fn is_healthy(&self) -> bool {
        self.rpc
            .post_json("/wallet/getnowblock", &json!({}))
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_ret_predicate() {
        let success = json!({ "ret": [{ "contractRet": "SUCCESS" }] });
        assert!(contract_ret_success(&success));

        let reverted = json!({ "ret": [{ "contractRet": "REVERT" }] });
        assert!(!contract_ret_success(&reverted));

        // Unknown transaction: node answers an empty object.
        assert!(!contract_ret_success(&json!({})));
    }
}
