//! Marqo Gateway - operational sidecar for a Marqo search cluster

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use gateway_api::{AppState, create_router};
use gateway_core::{ClusterTopologySpec, GaugeRegistry, StatsSource, spawn_stats_collector};
use gateway_proxy::{UpstreamClient, UpstreamTarget};
use gateway_scan::{ClusterScanner, SystemResolver};

/// Marqo Gateway - proxy, metrics and cluster scans for a Marqo deployment
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "GATEWAY_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "GATEWAY_PORT")]
    port: Option<u16>,

    /// Upstream search-engine base URL
    #[arg(long, env = "MARQO_API_URL")]
    upstream_url: Option<String>,

    /// Kubernetes namespace used in cluster hostname templates
    #[arg(long, env = "K8S_NAMESPACE")]
    namespace: Option<String>,

    /// Stats collection interval in seconds
    #[arg(long, env = "COLLECT_INTERVAL_SECS")]
    collect_interval: Option<u64>,

    /// Config server replica count
    #[arg(long, env = "CONFIGSERVER_NODE_COUNT")]
    configserver_nodes: Option<usize>,

    /// Admin server replica count
    #[arg(long, env = "ADMIN_NODE_COUNT")]
    admin_nodes: Option<usize>,

    /// Query server replica count
    #[arg(long, env = "QUERY_NODE_COUNT")]
    query_nodes: Option<usize>,

    /// Content server replica count
    #[arg(long, env = "CONTENT_NODE_COUNT")]
    content_nodes: Option<usize>,

    /// Engine replica count
    #[arg(long, env = "MARQO_NODE_COUNT")]
    marqo_nodes: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration and apply CLI/env overrides
    let mut config = Config::load(&args.config)?;
    apply_overrides(&mut config, &args);

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting Marqo Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Explicit registry, created once and shared with the collector and
    // the exposition handler
    let registry = Arc::new(GaugeRegistry::new()?);

    // Upstream client; without a configured URL the proxy path reports a
    // configuration error but metrics and scans keep working
    let upstream = match &config.upstream.url {
        Some(url) => {
            let target = UpstreamTarget::parse(url)
                .with_context(|| format!("Invalid upstream URL: {}", url))?;
            info!("Upstream: {}", target.as_str());
            Some(Arc::new(UpstreamClient::new(target)?))
        }
        None => {
            warn!("MARQO_API_URL is not set; proxying is disabled until an upstream is configured");
            None
        }
    };

    // Cluster scanner over the configured topology
    let topology =
        ClusterTopologySpec::vespa_defaults(&config.cluster.namespace, &config.cluster.node_counts());
    let resolver = Arc::new(
        SystemResolver::from_system_conf().context("Failed to initialize DNS resolver")?,
    );
    let scanner = Arc::new(ClusterScanner::new(topology, resolver));

    // Background stats collection
    let collector_handle = upstream.as_ref().map(|client| {
        let source: Arc<dyn StatsSource> = client.clone();
        spawn_stats_collector(
            source,
            registry.clone(),
            Duration::from_secs(config.collector.interval_secs),
        )
    });

    // Create application state and router
    let state = AppState::new(upstream, registry, scanner);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Stop the interval timer; in-flight fetches are abandoned safely
    // since every gauge write is an atomic full overwrite
    if let Some(handle) = collector_handle {
        handle.abort();
    }

    info!("Server stopped");
    Ok(())
}

/// Fold CLI/env overrides into the file configuration
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(bind) = &args.bind {
        config.server.bind_address = bind.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = &args.upstream_url {
        config.upstream.url = Some(url.clone());
    }
    if let Some(namespace) = &args.namespace {
        config.cluster.namespace = namespace.clone();
    }
    if let Some(interval) = args.collect_interval {
        config.collector.interval_secs = interval;
    }
    if let Some(n) = args.configserver_nodes {
        config.cluster.configserver_nodes = n;
    }
    if let Some(n) = args.admin_nodes {
        config.cluster.admin_nodes = n;
    }
    if let Some(n) = args.query_nodes {
        config.cluster.query_nodes = n;
    }
    if let Some(n) = args.content_nodes {
        config.cluster.content_nodes = n;
    }
    if let Some(n) = args.marqo_nodes {
        config.cluster.marqo_nodes = n;
    }
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
