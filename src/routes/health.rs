//! Liveness and version endpoints

use hyper::StatusCode;
use hyper::Response;
use serde_json::json;
use std::sync::Arc;

use crate::routes::{full_body, BoxBody};
use crate::server::AppState;

/// GET /health — liveness probe
pub fn health_check(state: Arc<AppState>) -> Response<BoxBody> {
    let body = json!({
        "status": "ok",
        "node_id": state.args.node_id,
        "streamConnections": state.hub.connection_count(),
    });

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(full_body(body.to_string()))
        .unwrap()
}

/// GET /version — deployment verification
pub fn version_info() -> Response<BoxBody> {
    let body = json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    });

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(full_body(body.to_string()))
        .unwrap()
}
