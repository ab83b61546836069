//! HTTP transport for the push endpoint
//!
//! ## Routes
//!
//! - `POST /push`: body `{"name": "...", "payload": {...}, "userId": 7}`.
//!   `200` with `{"partition","offset"}` on success, `500` with
//!   `{"partition","offset","error"}` when the push fails, `400` with the
//!   same shape when the body cannot be decoded. Decode failures never
//!   reach the endpoint.
//!
//! A `traceparent` header, when present and valid, becomes the parent of
//! the request's span.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use super::TRACEPARENT;
use crate::context::{Context, SpanContext};
use crate::endpoint::Endpoint;
use crate::error::PushError;
use crate::types::{Placement, PushRequest, PushResponse};

/// Build the axum `Router` serving the given endpoint
pub fn router(endpoint: Arc<dyn Endpoint>) -> Router {
    Router::new()
        .route("/push", post(push_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(endpoint)
}

async fn push_handler(
    State(endpoint): State<Arc<dyn Endpoint>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: PushRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let err = PushError::Decode(e.to_string());
            tracing::debug!(error = %err, "Rejected push request");
            let resp = PushResponse::failed(Placement::default(), &err);
            return (StatusCode::BAD_REQUEST, Json(resp)).into_response();
        }
    };

    match endpoint.call(context_from_headers(&headers), request).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(e.response)).into_response(),
    }
}

/// Extract the caller's trace position, if any
fn context_from_headers(headers: &HeaderMap) -> Context {
    headers
        .get(TRACEPARENT)
        .and_then(|v| v.to_str().ok())
        .and_then(SpanContext::from_traceparent)
        .map(Context::with_span)
        .unwrap_or_default()
}
