//! Upstream search-engine client

use std::time::Duration;

use http::header::HeaderMap;
use http::Method;
use reqwest::{Client, redirect};
use tracing::{debug, info};
use url::Url;

use crate::error::{classify, ProxyError};
use crate::stats::{
    CudaDevice, CudaInfoResponse, IndexListResponse, IndexStats, ModelInfo, ModelListResponse,
};

/// Bound on the whole outbound request, connection establishment included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Headers that are meaningful only for a single hop and must not be
/// relayed in either direction. `host` rides along because the outbound
/// request carries the upstream authority, not the gateway's.
const HOP_BY_HOP_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

/// Remove hop-by-hop headers from a header map in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

/// Immutable upstream base address, validated once at startup.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    base: Url,
}

impl UpstreamTarget {
    /// Parse and validate an upstream base URL.
    pub fn parse(raw: &str) -> Result<Self, ProxyError> {
        let base = Url::parse(raw.trim())
            .map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", raw, e)))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(ProxyError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                raw,
                base.scheme()
            )));
        }
        if base.host_str().is_none() {
            return Err(ProxyError::InvalidUrl(format!("{}: missing host", raw)));
        }

        Ok(Self { base })
    }

    /// Append a path-and-query (starting with `/`) to the base address.
    pub fn join(&self, path_and_query: &str) -> String {
        let base = self.base.as_str().trim_end_matches('/');
        if path_and_query.starts_with('/') {
            format!("{}{}", base, path_and_query)
        } else {
            format!("{}/{}", base, path_and_query)
        }
    }

    pub fn as_str(&self) -> &str {
        self.base.as_str()
    }
}

/// Client for the upstream search engine.
///
/// A single instance serves both the proxy surface (via [`forward`]) and
/// the metrics collector (via the typed stats fetchers). Redirects are
/// never followed so the proxy can relay them verbatim.
///
/// [`forward`]: UpstreamClient::forward
pub struct UpstreamClient {
    target: UpstreamTarget,
    client: Client,
}

impl UpstreamClient {
    /// Create a new upstream client.
    pub fn new(target: UpstreamTarget) -> Result<Self, ProxyError> {
        Self::with_timeout(target, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(target: UpstreamTarget, timeout: Duration) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(classify)?;

        info!("Created upstream client for {}", target.as_str());

        Ok(Self { target, client })
    }

    pub fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    // ==================== Request Forwarding ====================

    /// Forward a single request to the upstream, exactly once.
    ///
    /// The caller hands over the inbound method, headers, and a streaming
    /// body; the upstream response is returned still streaming so the
    /// HTTP layer can relay status, headers, and body verbatim.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        mut headers: HeaderMap,
        body: reqwest::Body,
    ) -> Result<reqwest::Response, ProxyError> {
        let url = self.target.join(path_and_query);
        strip_hop_by_hop(&mut headers);

        debug!(%method, %url, "forwarding request upstream");

        let response = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        debug!(status = %response.status(), %url, "upstream response headers received");

        Ok(response)
    }

    // ==================== Stats Endpoints ====================

    /// List the names of all indexes known to the upstream.
    pub async fn list_indexes(&self) -> Result<Vec<String>, ProxyError> {
        let payload: IndexListResponse = self.get_json("/indexes").await?;
        Ok(payload.results.into_iter().map(|e| e.index_name).collect())
    }

    /// Fetch document/vector counts for a single index.
    pub async fn fetch_index_stats(&self, index_name: &str) -> Result<IndexStats, ProxyError> {
        self.get_json(&format!("/indexes/{}/stats", index_name)).await
    }

    /// List the models currently loaded by the upstream.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ProxyError> {
        let payload: ModelListResponse = self.get_json("/models").await?;
        Ok(payload.models)
    }

    /// Fetch accelerator device statistics.
    pub async fn list_cuda_devices(&self) -> Result<Vec<CudaDevice>, ProxyError> {
        let payload: CudaInfoResponse = self.get_json("/device/cuda").await?;
        Ok(payload.cuda_devices)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ProxyError> {
        let url = self.target.join(path);

        debug!("Fetching upstream stats: {}", url);

        let response = self.client.get(&url).send().await.map_err(classify)?;
        let status = response.status();

        if !status.is_success() {
            return Err(ProxyError::UpstreamStatus {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        response.json().await.map_err(classify)
    }
}
