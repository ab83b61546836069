//! Transport-neutral endpoint
//!
//! `PushEndpoint` turns an `Operation` into a request/response call that
//! any transport can serve. `PushClient` goes the other way, turning an
//! `Endpoint` (local or remote) back into an `Operation`.

use crate::context::Context;
use crate::error::{PushError, Result};
use crate::service::Operation;
use crate::types::{Event, Placement, PushRequest, PushResponse};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// A failed endpoint call
///
/// Carries both the response the transport should send (partial
/// placement plus a non-empty error string) and the error itself.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct EndpointError {
    pub response: PushResponse,
    pub error: PushError,
}

impl EndpointError {
    pub fn new(placement: Placement, error: PushError) -> Self {
        Self {
            response: PushResponse::failed(placement, &error),
            error,
        }
    }
}

impl From<PushError> for EndpointError {
    fn from(error: PushError) -> Self {
        Self::new(Placement::default(), error)
    }
}

/// Request/response form of the push operation
#[async_trait]
pub trait Endpoint: Send + Sync {
    async fn call(
        &self,
        ctx: Context,
        request: PushRequest,
    ) -> std::result::Result<PushResponse, EndpointError>;
}

#[async_trait]
impl<T: Endpoint + ?Sized> Endpoint for Arc<T> {
    async fn call(
        &self,
        ctx: Context,
        request: PushRequest,
    ) -> std::result::Result<PushResponse, EndpointError> {
        (**self).call(ctx, request).await
    }
}

/// Serves an operation as an endpoint
pub struct PushEndpoint<O> {
    operation: O,
}

impl<O: Operation> PushEndpoint<O> {
    pub fn new(operation: O) -> Self {
        Self { operation }
    }
}

#[async_trait]
impl<O: Operation> Endpoint for PushEndpoint<O> {
    async fn call(
        &self,
        ctx: Context,
        request: PushRequest,
    ) -> std::result::Result<PushResponse, EndpointError> {
        match self.operation.push(ctx, request.into_event()).await {
            Ok(placement) => Ok(PushResponse::ok(placement)),
            Err(e) => Err(EndpointError::new(Placement::default(), e)),
        }
    }
}

/// Client stub: exposes an endpoint as an operation
pub struct PushClient<E> {
    endpoint: E,
}

impl<E: Endpoint> PushClient<E> {
    pub fn new(endpoint: E) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl<E: Endpoint> Operation for PushClient<E> {
    async fn push(&self, ctx: Context, event: Event) -> Result<Placement> {
        match self.endpoint.call(ctx, PushRequest::from(event)).await {
            Ok(response) => response.into_result(),
            Err(e) => Err(e.error),
        }
    }
}
