//! Use Cases Layer - Gateway Orchestration
//!
//! Orchestrates the adapter port into the gateway's core workflows.
//! Each use case is a self-contained operation over the `ChainAdapter`
//! seam — nothing here knows any network's wire format.
//!
//! Use cases:
//! - `GatewayRouter`: network → adapter dispatch, uniform operations
//! - `ConfirmationPoller`: bounded-retry confirmation state machine
//! - `BatchOrchestrator`: ordered batch replay with explicit failure policy
//! - `AddressSequencer`: per-sender send ordering

pub mod batch;
pub mod gateway;
pub mod poller;
pub mod sequencer;

pub use batch::{BatchOrchestrator, BatchPolicy};
pub use gateway::GatewayRouter;
pub use poller::{ConfirmationPoller, PollPolicy};
pub use sequencer::AddressSequencer;
