//! Domain layer - Core gateway types.
//!
//! Pure vocabulary of the gateway: networks and unit scales, transfer and
//! batch types, confirmation status, and the closed error taxonomy.
//! No I/O here (hexagonal architecture inner ring); everything is
//! serializable and testable in isolation.

pub mod error;
pub mod network;
pub mod transfer;

// Re-export core types for convenience
pub use error::{GatewayError, GatewayResult};
pub use network::{Amount, NetworkId};
pub use transfer::{
    Address, BatchItem, BatchReport, ContractCall, Credential, ItemOutcome,
    TransactionRef, TransactionStatus, TransferRequest,
};
