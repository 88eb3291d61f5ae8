//! Gauge registry
//!
//! One registry object is constructed in `main` and shared by reference
//! with the collector (writes) and the exposition handler (reads). Every
//! write is a full overwrite of the (name, label set) cell, so concurrent
//! ticks can only race on most-recent-write-wins.

use prometheus::{Encoder, GaugeVec, IntCounter, Opts, Registry, TextEncoder};

use crate::error::CoreError;

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Explicitly constructed metric registry for the gateway.
pub struct GaugeRegistry {
    registry: Registry,
    pub index_documents: GaugeVec,
    pub index_vectors: GaugeVec,
    pub cuda_utilization: GaugeVec,
    pub cuda_memory_used: GaugeVec,
    pub cuda_memory_total: GaugeVec,
    pub health_checks: IntCounter,
}

impl GaugeRegistry {
    pub fn new() -> Result<Self, CoreError> {
        let registry = Registry::new();

        let index_documents = GaugeVec::new(
            Opts::new(
                "index_number_of_documents",
                "Number of documents in the index",
            ),
            &["indexName"],
        )?;
        let index_vectors = GaugeVec::new(
            Opts::new("index_number_of_vectors", "Number of vectors in the index"),
            &["indexName"],
        )?;
        let cuda_utilization = GaugeVec::new(
            Opts::new("cuda_utilization", "CUDA device utilization"),
            &["device", "device_name"],
        )?;
        let cuda_memory_used = GaugeVec::new(
            Opts::new("cuda_memory_used", "CUDA device memory used"),
            &["device", "device_name"],
        )?;
        let cuda_memory_total = GaugeVec::new(
            Opts::new("cuda_memory_total", "CUDA device total memory"),
            &["device", "device_name"],
        )?;
        let health_checks = IntCounter::new(
            "gateway_health_checks_total",
            "Number of health check requests served",
        )?;

        registry.register(Box::new(index_documents.clone()))?;
        registry.register(Box::new(index_vectors.clone()))?;
        registry.register(Box::new(cuda_utilization.clone()))?;
        registry.register(Box::new(cuda_memory_used.clone()))?;
        registry.register(Box::new(cuda_memory_total.clone()))?;
        registry.register(Box::new(health_checks.clone()))?;

        // Process-level CPU/memory/start-time gauges for the scraper.
        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            index_documents,
            index_vectors,
            cuda_utilization,
            cuda_memory_used,
            cuda_memory_total,
            health_checks,
        })
    }

    /// Serialize the full current registry in the text exposition format.
    pub fn render(&self) -> Result<String, CoreError> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
