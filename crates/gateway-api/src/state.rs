//! Application state

use gateway_core::GaugeRegistry;
use gateway_proxy::UpstreamClient;
use gateway_scan::ClusterScanner;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Forwarding client; `None` while no upstream address is configured.
    pub upstream: Option<Arc<UpstreamClient>>,
    pub registry: Arc<GaugeRegistry>,
    pub scanner: Arc<ClusterScanner>,
}

impl AppState {
    pub fn new(
        upstream: Option<Arc<UpstreamClient>>,
        registry: Arc<GaugeRegistry>,
        scanner: Arc<ClusterScanner>,
    ) -> Self {
        Self {
            upstream,
            registry,
            scanner,
        }
    }
}
