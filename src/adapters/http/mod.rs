//! HTTP Transport Adapter
//!
//! The gateway's axum 0.7 surface: route table, wire DTOs, and the
//! taxonomy-to-status mapping. Nothing below this module knows about
//! HTTP.

pub mod error;
pub mod routes;
pub mod types;

pub use error::ApiError;
pub use routes::{AppState, router};
