//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use gateway_core::NodeCounts;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Upstream search-engine configuration
///
/// The URL is deliberately optional with no implicit default: without it
/// the gateway still serves metrics and cluster scans, and the proxy
/// path answers with a configuration error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamConfig {
    pub url: Option<String>,
}

/// Metrics collector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

/// Search cluster topology configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_configserver_nodes")]
    pub configserver_nodes: usize,
    #[serde(default = "default_admin_nodes")]
    pub admin_nodes: usize,
    #[serde(default = "default_query_nodes")]
    pub query_nodes: usize,
    #[serde(default = "default_content_nodes")]
    pub content_nodes: usize,
    #[serde(default = "default_marqo_nodes")]
    pub marqo_nodes: usize,
}

impl ClusterConfig {
    pub fn node_counts(&self) -> NodeCounts {
        NodeCounts {
            configserver: self.configserver_nodes,
            admin: self.admin_nodes,
            query: self.query_nodes,
            content: self.content_nodes,
            marqo: self.marqo_nodes,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            configserver_nodes: default_configserver_nodes(),
            admin_nodes: default_admin_nodes(),
            query_nodes: default_query_nodes(),
            content_nodes: default_content_nodes(),
            marqo_nodes: default_marqo_nodes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: "pretty".to_string(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9882
}

fn default_interval_secs() -> u64 {
    30
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_configserver_nodes() -> usize {
    3
}

fn default_admin_nodes() -> usize {
    1
}

fn default_query_nodes() -> usize {
    1
}

fn default_content_nodes() -> usize {
    3
}

fn default_marqo_nodes() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            collector: CollectorConfig::default(),
            cluster: ClusterConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
