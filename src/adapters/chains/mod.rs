//! Chain Adapter Shims - One Module Per Served Network
//!
//! Each shim wraps the shared [`RpcClient`](crate::adapters::rpc::RpcClient)
//! with that network's request shapes, unit conversion, and confirmation
//! predicate. Everything chain-flavored stops at this boundary; the
//! use-case layer only sees the `ChainAdapter` port.

pub mod avalanche;
pub mod cardano;
pub mod cosmos;
pub mod litecoin;
pub mod polkadot;
pub mod ripple;
pub mod solana;
pub mod tezos;
pub mod tron;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::rpc::RpcClient;
use crate::config::AppConfig;
use crate::domain::network::NetworkId;
use crate::ports::chain_adapter::ChainAdapter;

/// Build one adapter per enabled network in the configuration.
///
/// This is the composition root for the adapter set: node clients and
/// their connection pools are constructed exactly once here, then owned
/// by the router for the process lifetime.
pub fn build_adapters(config: &AppConfig) -> Result<Vec<Arc<dyn ChainAdapter>>> {
  let mut adapters: Vec<Arc<dyn ChainAdapter>> = Vec::new();

  for (&network, node) in &config.networks {
    if !node.enabled {
      info!(%network, "network disabled in config, skipping");
      continue;
    }

    let rpc = RpcClient::new(network, node.rpc_config())
      .with_context(|| format!("Failed to build node client for {network}"))?;

    let adapter: Arc<dyn ChainAdapter> = match network {
      NetworkId::Avalanche => Arc::new(avalanche::AvalancheAdapter::new(rpc)),
      NetworkId::Cardano => Arc::new(cardano::CardanoAdapter::new(rpc)),
      NetworkId::Cosmos => Arc::new(cosmos::CosmosAdapter::new(rpc)),
      NetworkId::Litecoin => Arc::new(litecoin::LitecoinAdapter::new(rpc)),
      NetworkId::Polkadot => Arc::new(polkadot::PolkadotAdapter::new(rpc)),
      NetworkId::Ripple => Arc::new(ripple::RippleAdapter::new(rpc)),
      NetworkId::Solana => Arc::new(solana::SolanaAdapter::new(rpc)),
      NetworkId::Tezos => {
        Arc::new(tezos::TezosAdapter::new(rpc, node.chain.clone()))
      }
      NetworkId::Tron => Arc::new(tron::TronAdapter::new(rpc)),
    };

    info!(
      %network,
      endpoint = %node.endpoint,
      contracts = adapter.supports_contracts(),
      "chain adapter built"
    );
    adapters.push(adapter);
  }

  Ok(adapters)
}
