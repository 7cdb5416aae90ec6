//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires from
//! the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ChainAdapter`: the uniform capability set every network implements

pub mod chain_adapter;

pub use chain_adapter::ChainAdapter;
