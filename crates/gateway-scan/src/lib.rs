//! Marqo Gateway Cluster Scanner
//!
//! This crate discovers which statically-addressed cluster members are
//! network-reachable by resolving their StatefulSet DNS names.

pub mod resolver;
pub mod scanner;

pub use resolver::{HostResolver, SystemResolver};
pub use scanner::{ClusterScanner, NodeProbeResult, ProbeStatus};
