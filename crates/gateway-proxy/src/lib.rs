//! Marqo Gateway Upstream Client
//!
//! This crate provides the client for communicating with the upstream
//! search engine: transparent request forwarding for the proxy surface
//! and the typed stats endpoints used by the metrics collector.

pub mod client;
pub mod error;
pub mod stats;

pub use client::{UpstreamClient, UpstreamTarget, DEFAULT_TIMEOUT};
pub use error::ProxyError;
pub use stats::{CudaDevice, IndexStats, MetricValue, ModelInfo};
