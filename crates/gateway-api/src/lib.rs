//! Marqo Gateway REST API
//!
//! This crate provides the Axum-based HTTP surface of the gateway: the
//! forwarding mount under `/proxy`, the Prometheus exposition endpoint,
//! and the cluster scan endpoint.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
