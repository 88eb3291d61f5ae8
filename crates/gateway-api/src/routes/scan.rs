//! Cluster scan endpoint

use std::collections::BTreeMap;

use axum::extract::State;
use axum::{Json, Router, routing::get};
use tracing::debug;

use gateway_scan::NodeProbeResult;

use crate::state::AppState;

/// GET /cluster-scan - probe every configured cluster member via DNS
///
/// Always answers 200: unreachable members are entries in the result,
/// not errors. Every call is a fresh snapshot.
async fn cluster_scan(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, Vec<NodeProbeResult>>> {
    debug!("Running cluster scan");
    Json(state.scanner.scan().await)
}

/// Create scan routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/cluster-scan", get(cluster_scan))
}
