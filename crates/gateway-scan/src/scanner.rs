//! Cluster reachability scanner
//!
//! Probes every replica of every node type by DNS lookup. Lookups within
//! a node type fan out concurrently and are joined before the node type's
//! result is finalized; a failed lookup becomes an `unreachable` entry,
//! never an error to the caller. Each scan is a fresh snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::debug;

use gateway_core::{ClusterTopologySpec, NodeTypeSpec};

use crate::resolver::HostResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Alive,
    Unreachable,
}

/// Outcome of probing one replica. Created fresh per scan, never merged
/// across scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeProbeResult {
    pub hostname: String,
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub index: usize,
}

/// DNS scanner over a fixed cluster topology.
pub struct ClusterScanner {
    spec: ClusterTopologySpec,
    resolver: Arc<dyn HostResolver>,
}

impl ClusterScanner {
    pub fn new(spec: ClusterTopologySpec, resolver: Arc<dyn HostResolver>) -> Self {
        Self { spec, resolver }
    }

    /// Probe the whole cluster, returning per-node-type results ordered
    /// by ordinal.
    pub async fn scan(&self) -> BTreeMap<String, Vec<NodeProbeResult>> {
        let mut results = BTreeMap::new();
        for node_type in &self.spec.node_types {
            let nodes = self.scan_node_type(node_type).await;
            results.insert(node_type.tag.clone(), nodes);
        }
        results
    }

    async fn scan_node_type(&self, node_type: &NodeTypeSpec) -> Vec<NodeProbeResult> {
        debug!(
            "Scanning node type '{}' ({} replicas)",
            node_type.tag, node_type.replicas
        );

        let probes = (0..node_type.replicas).map(|ordinal| {
            let hostname = node_type.hostname(ordinal);
            async move {
                match self.resolver.resolve(&hostname).await {
                    Ok(()) => NodeProbeResult {
                        hostname,
                        status: ProbeStatus::Alive,
                        error: None,
                        index: ordinal,
                    },
                    Err(code) => NodeProbeResult {
                        hostname,
                        status: ProbeStatus::Unreachable,
                        error: Some(code),
                        index: ordinal,
                    },
                }
            }
        });

        let mut nodes = join_all(probes).await;
        nodes.sort_by_key(|node| node.index);
        nodes
    }
}
