//! Background metrics collector
//!
//! Polls the upstream stats endpoints on a fixed interval and overwrites
//! the gauges in the shared registry. Every failure is caught and logged:
//! a failed fetch leaves the previous value in place and the loop keeps
//! running. The exposition handler reads the registry independently and
//! is never blocked by a tick.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use gateway_proxy::{CudaDevice, IndexStats, ModelInfo, ProxyError, UpstreamClient};

use crate::metrics::GaugeRegistry;

/// Source of upstream capacity statistics.
///
/// The collector is written against this trait so ticks can be exercised
/// without a network; the production implementation is [`UpstreamClient`].
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn index_names(&self) -> Result<Vec<String>, ProxyError>;
    async fn index_stats(&self, index_name: &str) -> Result<IndexStats, ProxyError>;
    async fn active_models(&self) -> Result<Vec<ModelInfo>, ProxyError>;
    async fn cuda_devices(&self) -> Result<Vec<CudaDevice>, ProxyError>;
}

#[async_trait]
impl StatsSource for UpstreamClient {
    async fn index_names(&self) -> Result<Vec<String>, ProxyError> {
        self.list_indexes().await
    }

    async fn index_stats(&self, index_name: &str) -> Result<IndexStats, ProxyError> {
        self.fetch_index_stats(index_name).await
    }

    async fn active_models(&self) -> Result<Vec<ModelInfo>, ProxyError> {
        self.list_models().await
    }

    async fn cuda_devices(&self) -> Result<Vec<CudaDevice>, ProxyError> {
        self.list_cuda_devices().await
    }
}

/// Spawn the collector loop.
///
/// The first tick completes immediately so gauges are populated right
/// after startup. The returned handle is aborted on shutdown; gauge
/// writes are atomic full overwrites, so abandoning a tick mid-flight
/// cannot corrupt the registry.
pub fn spawn_stats_collector(
    source: Arc<dyn StatsSource>,
    registry: Arc<GaugeRegistry>,
    interval: Duration,
) -> JoinHandle<()> {
    info!(
        "Starting background stats collector (interval: {}s)",
        interval.as_secs()
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            collect_tick(source.as_ref(), &registry).await;
        }
    })
}

/// Run one collection pass. Never returns an error: failures are logged
/// per item and the rest of the pass proceeds.
async fn collect_tick(source: &dyn StatsSource, registry: &GaugeRegistry) {
    let index_names = match source.index_names().await {
        Ok(names) => names,
        Err(e) => {
            warn!("Failed to list indexes for stats collection: {}", e);
            return;
        }
    };

    debug!("Collecting stats for {} indexes", index_names.len());

    let fetches = index_names.iter().map(|name| async move {
        match source.index_stats(name).await {
            Ok(stats) => {
                registry
                    .index_documents
                    .with_label_values(&[name.as_str()])
                    .set(stats.number_of_documents as f64);
                registry
                    .index_vectors
                    .with_label_values(&[name.as_str()])
                    .set(stats.number_of_vectors as f64);
            }
            Err(e) => warn!(index = %name, "Failed to fetch index stats: {}", e),
        }
    });
    join_all(fetches).await;

    // Only probe the device endpoint when some model actually runs on an
    // accelerator; CPU-only deployments would answer with errors.
    let cuda_active = match source.active_models().await {
        Ok(models) => models.iter().any(|m| m.on_cuda()),
        Err(e) => {
            debug!("Model listing unavailable, skipping device probe: {}", e);
            false
        }
    };
    if !cuda_active {
        return;
    }

    let devices = match source.cuda_devices().await {
        Ok(devices) => devices,
        Err(e) => {
            warn!("Failed to fetch CUDA device stats: {}", e);
            return;
        }
    };

    for device in devices {
        let device_id = device.device_id.to_string();
        let labels = [device_id.as_str(), device.device_name.as_str()];
        match (
            device.utilization.as_f64(),
            device.memory_used.as_f64(),
            device.total_memory.as_f64(),
        ) {
            (Some(utilization), Some(memory_used), Some(total_memory)) => {
                registry
                    .cuda_utilization
                    .with_label_values(&labels)
                    .set(utilization);
                registry
                    .cuda_memory_used
                    .with_label_values(&labels)
                    .set(memory_used);
                registry
                    .cuda_memory_total
                    .with_label_values(&labels)
                    .set(total_memory);
            }
            _ => warn!(device = %device_id, "Skipping device with unparsable readings"),
        }
    }
}
