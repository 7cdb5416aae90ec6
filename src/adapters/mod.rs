//! Adapters Layer - The Outside World
//!
//! Everything that touches a socket lives here: the per-chain node
//! shims, the shared node RPC client, the HTTP request surface, and the
//! metrics/health exporters. Inner layers depend only on the port
//! traits these adapters implement.

pub mod chains;
pub mod http;
pub mod metrics;
pub mod rpc;
