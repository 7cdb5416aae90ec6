//! Litecoin Adapter - Wallet RPC Shim
//!
//! Talks bitcoind-style JSON-RPC (basic auth) against a litecoind with
//! `addressindex=1`. Sends unlock the node wallet with the credential as
//! the wallet passphrase, then `sendtoaddress`. The wire unit for address
//! balances is litoshi (1 LTC = 1e8 litoshi); `sendtoaddress` amounts go
//! out as strings snapped to litoshi precision (the node accepts
//! numeric-or-string amounts). No contract programmability.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::adapters::rpc::RpcClient;
use crate::domain::error::{GatewayError, GatewayResult};
use crate::domain::network::{Amount, NetworkId};
use crate::domain::transfer::{
    Address, ContractCall, TransactionRef, TransferRequest,
};
use crate::ports::chain_adapter::ChainAdapter;

/// Seconds the wallet stays unlocked around one send.
const UNLOCK_WINDOW_SECS: u32 = 10;

pub struct LitecoinAdapter {
    rpc: RpcClient,
}

impl LitecoinAdapter {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

/// LTC wire amount for `sendtoaddress`: snapped to litoshi through the
/// base-unit conversion, rendered as a string so no float ever touches
/// the value. `None` for non-positive or overflowing amounts.
fn wire_amount(amount: Amount) -> Option<String> {
    let litoshi = NetworkId::Litecoin.to_base_units(amount)?;
    Some(NetworkId::Litecoin.from_base_units(litoshi).to_string())
}

/// Confirmation predicate over a `gettransaction` result.
fn has_confirmations(result: &Value) -> bool {
    result
        .get("confirmations")
        .and_then(Value::as_i64)
        .is_some_and(|n| n > 0)
}

#[async_trait]
impl ChainAdapter for LitecoinAdapter {
    fn network(&self) -> NetworkId {
        NetworkId::Litecoin
    }

    fn supports_contracts(&self) -> bool {
        false
    }

    async fn balance(&self, address: &Address) -> GatewayResult<Amount> {
        let result = self
            .rpc
            .json_rpc("getaddressbalance", json!([{ "addresses": [address] }]))
            .await?;

        let litoshi = result
            .get("balance")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                GatewayError::network_error(
                    NetworkId::Litecoin,
                    "balance missing from getaddressbalance result",
                )
            })?;

        Ok(NetworkId::Litecoin.from_base_units(u128::from(litoshi)))
    }

    async fn send(&self, transfer: &TransferRequest) -> GatewayResult<TransactionRef> {
        // Unlock briefly; a bad passphrase surfaces here as
        // InvalidCredential via the node's "incorrect password" error.
        self.rpc
            .json_rpc(
                "walletpassphrase",
                json!([transfer.credential.expose(), UNLOCK_WINDOW_SECS]),
            )
            .await?;

        let ltc = wire_amount(transfer.amount).ok_or_else(|| {
            GatewayError::network_error(
                NetworkId::Litecoin,
                "amount not representable for sendtoaddress",
            )
        })?;

        let result = self
            .rpc
            .json_rpc("sendtoaddress", json!([transfer.to, ltc]))
            .await?;

        result.as_str().map(TransactionRef::new).ok_or_else(|| {
            GatewayError::network_error(
                NetworkId::Litecoin,
                "txid missing from sendtoaddress result",
            )
        })
    }

    async fn is_confirmed(&self, txref: &TransactionRef) -> GatewayResult<bool> {
        match self
            .rpc
            .json_rpc("gettransaction", json!([txref.as_str()]))
            .await
        {
            Ok(result) => Ok(has_confirmations(&result)),
            // Mempool-only transactions can be invisible to the wallet
            // for a beat after broadcast.
            Err(GatewayError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn transaction_details(
        &self,
        txref: &TransactionRef,
    ) -> GatewayResult<serde_json::Value> {
        self.rpc
            .json_rpc("gettransaction", json!([txref.as_str()]))
            .await
    }

    async fn call_contract(&self, _call: &ContractCall) -> GatewayResult<TransactionRef> {
        Err(GatewayError::unsupported(
            NetworkId::Litecoin,
            "litecoin has no contract programmability",
        ))
    }

    async fn is_healthy(&self) -> bool {
        self.rpc.json_rpc("getblockcount", json!([])).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_wire_amount_is_exact_to_litoshi() {
        // 16 significant digits survive; f64 would drop the tail here.
        assert_eq!(
            wire_amount(dec!(1234567.87654321)).unwrap(),
            "1234567.87654321"
        );
        assert_eq!(wire_amount(dec!(0.00000001)).unwrap(), "0.00000001");
        // Sub-litoshi digits truncate, never round up.
        assert_eq!(wire_amount(dec!(0.000000019)).unwrap(), "0.00000001");
        assert_eq!(wire_amount(dec!(0)), None);
    }

    #[test]
    fn test_confirmation_predicate() {
        assert!(has_confirmations(&json!({ "confirmations": 3 })));
        assert!(!has_confirmations(&json!({ "confirmations": 0 })));
        // Conflicted transactions report negative confirmations.
        assert!(!has_confirmations(&json!({ "confirmations": -1 })));
        assert!(!has_confirmations(&json!({})));
    }
}
