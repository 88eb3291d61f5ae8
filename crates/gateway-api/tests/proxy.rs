//! End-to-end tests for the gateway router: forwarding transparency,
//! failure classification, scan and metrics endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{Body, Bytes, to_bytes};
use axum::extract::Query;
use axum::http::{Request, StatusCode, header};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceExt;

use gateway_api::{AppState, create_router};
use gateway_core::{ClusterTopologySpec, GaugeRegistry, NodeTypeSpec};
use gateway_proxy::{UpstreamClient, UpstreamTarget};
use gateway_scan::{ClusterScanner, HostResolver};

/// Resolver where only `query-server-1` is missing from DNS.
struct PartialResolver;

#[async_trait]
impl HostResolver for PartialResolver {
    async fn resolve(&self, hostname: &str) -> Result<(), String> {
        if hostname.starts_with("query-server-1.") {
            Err("NXDomain".to_string())
        } else {
            Ok(())
        }
    }
}

fn test_state(upstream: Option<Arc<UpstreamClient>>) -> AppState {
    let spec = ClusterTopologySpec {
        node_types: vec![NodeTypeSpec::new(
            "query",
            "query-server-{i}.cluster.test".to_string(),
            3,
        )],
    };
    AppState::new(
        upstream,
        Arc::new(GaugeRegistry::new().unwrap()),
        Arc::new(ClusterScanner::new(spec, Arc::new(PartialResolver))),
    )
}

/// Start a real upstream on a loopback port.
async fn spawn_upstream() -> SocketAddr {
    #[derive(serde::Deserialize)]
    struct SearchParams {
        q: String,
    }

    let app = Router::new()
        .route(
            "/status",
            get(|| async {
                (
                    StatusCode::IM_A_TEAPOT,
                    [("x-upstream-header", "teapot")],
                    "short and stout",
                )
            }),
        )
        .route("/echo", post(|body: Bytes| async move { body }))
        .route(
            "/search",
            get(|Query(params): Query<SearchParams>| async move { params.q }),
        )
        .route(
            "/redirect",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/status")], "") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> Arc<UpstreamClient> {
    let target = UpstreamTarget::parse(&format!("http://{}", addr)).unwrap();
    Arc::new(UpstreamClient::new(target).unwrap())
}

/// A loopback port with nothing listening on it.
fn refused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

#[tokio::test]
async fn test_proxy_relays_status_headers_and_body() {
    let upstream = spawn_upstream().await;
    let app = create_router(test_state(Some(client_for(upstream))));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/proxy/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(response.headers().get("x-upstream-header").unwrap(), "teapot");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"short and stout");
}

#[tokio::test]
async fn test_proxy_streams_request_body() {
    let upstream = spawn_upstream().await;
    let app = create_router(test_state(Some(client_for(upstream))));

    let payload = vec![0xabu8; 64 * 1024];
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/proxy/echo")
                .body(Body::from(payload.clone()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], &payload[..]);
}

#[tokio::test]
async fn test_proxy_preserves_query_string() {
    let upstream = spawn_upstream().await;
    let app = create_router(test_state(Some(client_for(upstream))));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/proxy/search?q=vector%20databases")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"vector databases");
}

#[tokio::test]
async fn test_proxy_passes_redirects_through_unfollowed() {
    let upstream = spawn_upstream().await;
    let app = create_router(test_state(Some(client_for(upstream))));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/proxy/redirect")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/status");
}

#[tokio::test]
async fn test_connection_refused_maps_to_502() {
    let app = create_router(test_state(Some(client_for(refused_addr()))));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/proxy/indexes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["error"]["code"], "UPSTREAM_UNAVAILABLE");
}

#[tokio::test]
async fn test_unconfigured_upstream_maps_to_500() {
    let app = create_router(test_state(None));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/proxy/indexes/my-index/documents")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["error"]["code"], "CONFIGURATION_ERROR");
}

#[tokio::test]
async fn test_cluster_scan_endpoint_shape() {
    let app = create_router(test_state(None));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cluster-scan")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let query = value["query"].as_array().unwrap();
    assert_eq!(query.len(), 3);
    assert_eq!(query[0]["status"], "alive");
    assert_eq!(query[1]["status"], "unreachable");
    assert_eq!(query[1]["error"], "NXDomain");
    assert_eq!(query[2]["status"], "alive");
    assert_eq!(query[2]["index"], 2);
}

#[tokio::test]
async fn test_metrics_endpoint_serves_exposition() {
    let state = test_state(None);
    state
        .registry
        .index_documents
        .with_label_values(&["movies"])
        .set(321.0);
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("index_number_of_documents{indexName=\"movies\"} 321"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = test_state(None);
    let app = create_router(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.registry.health_checks.get(), 1);
}
