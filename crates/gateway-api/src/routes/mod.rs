//! API routes

mod health;
pub mod metrics;
mod proxy;
mod scan;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Liveness
        .merge(health::routes())
        // Prometheus exposition
        .merge(metrics::routes())
        // Cluster reachability scan
        .merge(scan::routes())
        // Forwarding surface, mounted under /proxy
        .merge(proxy::routes())
        .with_state(state)
        // The operator frontend is served from another origin
        .layer(CorsLayer::permissive())
}
