//! Marqo Gateway Core
//!
//! This crate provides the shared runtime pieces of the gateway: the
//! cluster topology description, the explicitly constructed gauge
//! registry, and the background metrics collector.

pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;

pub use collector::{spawn_stats_collector, StatsSource};
pub use config::{ClusterTopologySpec, NodeCounts, NodeTypeSpec};
pub use error::CoreError;
pub use metrics::GaugeRegistry;
