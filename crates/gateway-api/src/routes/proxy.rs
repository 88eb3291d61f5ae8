//! Forwarding surface
//!
//! Everything under `/proxy` is relayed to the upstream search engine:
//! method, headers, and body are preserved, bodies stream in both
//! directions, and the upstream's status/headers/body come back verbatim
//! (redirects included). Exactly one forwarding attempt per request.

use std::net::{IpAddr, SocketAddr};

use axum::Router;
use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, Uri};
use axum::http::header::HeaderValue;
use axum::response::Response;
use axum::routing::any;
use tracing::{debug, error, info};

use gateway_proxy::client::strip_hop_by_hop;

use crate::error::ApiError;
use crate::state::AppState;

/// Mount prefix of the forwarding surface; stripped before forwarding.
const MOUNT_PREFIX: &str = "/proxy";

/// Create proxy routes: any method under the mount prefix.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/proxy", any(forward))
        .route("/proxy/", any(forward))
        .route("/proxy/{*path}", any(forward))
}

async fn forward(State(state): State<AppState>, req: Request) -> Result<Response, ApiError> {
    let client = state.upstream.clone().ok_or(ApiError::UpstreamNotConfigured)?;

    let method = req.method().clone();
    let path_and_query = upstream_path(req.uri());

    info!(%method, path = %path_and_query, "Proxying request to {}", client.target().as_str());

    let client_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let mut headers = req.headers().clone();
    append_forwarded_for(&mut headers, client_ip);

    let body = reqwest::Body::wrap_stream(req.into_body().into_data_stream());

    let upstream = match client.forward(method, &path_and_query, headers, body).await {
        Ok(response) => response,
        Err(e) => {
            error!(path = %path_and_query, "Proxy request failed: {}", e);
            return Err(e.into());
        }
    };

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    strip_hop_by_hop(&mut response_headers);

    debug!(%status, path = %path_and_query, "Relaying upstream response");

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;

    Ok(response)
}

/// Drop the mount prefix and keep the rest of the path plus the query
/// string, exactly as it will be appended to the upstream base URL.
fn upstream_path(uri: &Uri) -> String {
    let path = uri.path().strip_prefix(MOUNT_PREFIX).unwrap_or(uri.path());
    let path = if path.is_empty() { "/" } else { path };
    match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    }
}

/// Record the calling client in `x-forwarded-for`, appending to any
/// chain a fronting proxy already started.
fn append_forwarded_for(headers: &mut HeaderMap, client_ip: Option<IpAddr>) {
    let Some(ip) = client_ip else {
        return;
    };

    let chain = match headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        Some(existing) => format!("{}, {}", existing, ip),
        None => ip.to_string(),
    };

    if let Ok(value) = HeaderValue::from_str(&chain) {
        headers.insert("x-forwarded-for", value);
    }
}
