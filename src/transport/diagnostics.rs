//! Diagnostics surface, served on its own listener
//!
//! - `GET /health`: `{"ok": true, "publisher": "<backend>"}`
//! - `GET /metrics`: Prometheus text exposition

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::metrics::PrometheusMetrics;

const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

#[derive(Clone)]
struct DiagnosticsState {
    metrics: Arc<PrometheusMetrics>,
    publisher: String,
}

/// Build the diagnostics router
pub fn router(metrics: Arc<PrometheusMetrics>, publisher: &str) -> Router {
    let state = DiagnosticsState {
        metrics,
        publisher: publisher.to_string(),
    };
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<DiagnosticsState>) -> impl IntoResponse {
    Json(json!({ "ok": true, "publisher": state.publisher }))
}

async fn metrics_handler(State(state): State<DiagnosticsState>) -> Response {
    match state.metrics.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
