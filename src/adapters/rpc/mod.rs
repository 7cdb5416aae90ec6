//! Shared node RPC transport.

pub mod client;

pub use client::{RpcAuth, RpcClient, RpcClientConfig};
