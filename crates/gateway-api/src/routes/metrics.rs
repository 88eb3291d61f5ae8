//! Prometheus metrics endpoint

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};

use gateway_core::metrics::EXPOSITION_CONTENT_TYPE;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /metrics - Prometheus metrics endpoint
///
/// Serializes the current registry on every scrape; reads are decoupled
/// from the collector loop and never wait on it.
async fn get_metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state.registry.render()?;
    Ok(([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body).into_response())
}

/// Create metrics routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(get_metrics))
}
