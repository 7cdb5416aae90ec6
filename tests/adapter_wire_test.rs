//! Wire Tests - Chain Shims Against a Stub Node
//!
//! Spins a local HTTP listener that speaks just enough bitcoind-style
//! JSON-RPC to drive the Litecoin adapter end-to-end: real reqwest
//! transport, real error normalization, no mocks at the port seam.

use axum::routing::post;
use axum::{Json, Router};
use rust_decimal_macros::dec;
use serde_json::{Value, json};

use multichain_gateway::adapters::chains::litecoin::LitecoinAdapter;
use multichain_gateway::adapters::rpc::{RpcClient, RpcClientConfig};
use multichain_gateway::domain::network::NetworkId;
use multichain_gateway::domain::transfer::{Credential, TransferRequest};
use multichain_gateway::ports::chain_adapter::ChainAdapter;

/// Bind the stub on an ephemeral port and return its base URL.
async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn adapter_for(endpoint: String) -> LitecoinAdapter {
    let rpc = RpcClient::new(
        NetworkId::Litecoin,
        RpcClientConfig { endpoint, max_retries: 0, ..Default::default() },
    )
    .unwrap();
    LitecoinAdapter::new(rpc)
}

fn rpc_result(result: Value) -> Json<Value> {
    Json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

#[tokio::test]
async fn test_balance_malformed_address_maps_to_invalid_address() {
    let app = Router::new().route(
        "/",
        post(|Json(request): Json<Value>| async move {
            assert_eq!(request["method"], "getaddressbalance");
            Json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": null,
                "error": { "code": -5, "message": "Invalid address: checksum mismatch" },
            }))
        }),
    );
    let adapter = adapter_for(spawn_stub(app).await);

    let err = adapter
        .balance(&"not-a-litecoin-address".to_string())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "invalid_address");
    assert_eq!(err.network(), NetworkId::Litecoin);
}

#[tokio::test]
async fn test_balance_well_formed_address_converts_litoshi() {
    let app = Router::new().route(
        "/",
        post(|Json(_): Json<Value>| async move {
            rpc_result(json!({ "balance": 150_000_000u64 }))
        }),
    );
    let adapter = adapter_for(spawn_stub(app).await);

    let balance = adapter
        .balance(&"ltc1qw508d6qejxtdg4y5r3zarvary0c5xw7k".to_string())
        .await
        .unwrap();

    assert_eq!(balance, dec!(1.5));
}

#[tokio::test]
async fn test_send_carries_exact_amount_string_on_the_wire() {
    // The stub echoes the sendtoaddress amount back as the txid, so the
    // assertion sees exactly what crossed the wire.
    let app = Router::new().route(
        "/",
        post(|Json(request): Json<Value>| async move {
            let result = match request["method"].as_str().unwrap_or_default() {
                "walletpassphrase" => Value::Null,
                "sendtoaddress" => request["params"][1].clone(),
                _ => Value::Null,
            };
            rpc_result(result)
        }),
    );
    let adapter = adapter_for(spawn_stub(app).await);

    let transfer = TransferRequest {
        from: "ltc1qsender".to_string(),
        to: "ltc1qreceiver".to_string(),
        amount: dec!(1234567.87654321),
        credential: Credential::new("wallet passphrase"),
    };
    let txref = adapter.send(&transfer).await.unwrap();

    assert_eq!(txref.as_str(), "1234567.87654321");
}
