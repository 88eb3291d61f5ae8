//! API error types
//!
//! The proxy path is the only surface that reports failures to callers;
//! the mapping from error variant to HTTP status lives here and nowhere
//! else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use gateway_proxy::ProxyError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("upstream API address is not configured")]
    UpstreamNotConfigured,

    #[error("proxy error: {0}")]
    Proxy(#[from] ProxyError),

    #[error("metrics error: {0}")]
    Metrics(#[from] gateway_core::CoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::UpstreamNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                "Upstream API address is not configured. Set MARQO_API_URL and restart."
                    .to_string(),
            ),
            ApiError::Proxy(e) => match e {
                ProxyError::Unavailable(_) => (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_UNAVAILABLE",
                    "Cannot connect to the upstream search engine. Check that it is running and reachable."
                        .to_string(),
                ),
                ProxyError::Timeout(_) => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "UPSTREAM_TIMEOUT",
                    "The request to the upstream search engine timed out. The service might be overloaded."
                        .to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROXY_ERROR",
                    e.to_string(),
                ),
            },
            ApiError::Metrics(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                e.to_string(),
            ),
        };

        let body = axum::Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_code(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, value["error"]["code"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_not_configured_maps_to_500() {
        let (status, code) = body_code(ApiError::UpstreamNotConfigured.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "CONFIGURATION_ERROR");
    }

    #[tokio::test]
    async fn test_invalid_response_maps_to_500() {
        let err = ApiError::Proxy(ProxyError::InvalidResponse("bad json".to_string()));
        let (status, code) = body_code(err.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "PROXY_ERROR");
    }

    #[tokio::test]
    async fn test_upstream_status_maps_to_500() {
        let err = ApiError::Proxy(ProxyError::UpstreamStatus {
            status: 503,
            message: "overloaded".to_string(),
        });
        let (status, _) = body_code(err.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
