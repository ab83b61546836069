//! Span decorator

use crate::context::Context;
use crate::error::{PushError, Result};
use crate::service::Operation;
use crate::trace::{Span, Tracer};
use crate::types::{Event, Placement};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::Instrument;

/// Opens a span before the inner call and finishes it after, on success,
/// on failure and when the call is dropped. The span's trace position
/// replaces the one in the context handed to the inner operation.
pub struct TracedOperation<O> {
    inner: O,
    tracer: Arc<dyn Tracer>,
    span_name: &'static str,
}

impl<O: Operation> TracedOperation<O> {
    pub fn new(inner: O, tracer: Arc<dyn Tracer>, span_name: &'static str) -> Self {
        Self {
            inner,
            tracer,
            span_name,
        }
    }
}

#[async_trait]
impl<O: Operation> Operation for TracedOperation<O> {
    async fn push(&self, ctx: Context, event: Event) -> Result<Placement> {
        let span = self.tracer.start_span(&ctx, self.span_name);
        let ctx = match span.context() {
            Some(sc) => Context::with_span(sc.clone()),
            None => ctx,
        };
        let instrumented = span.tracing_span();
        let guard = SpanGuard(Some(span));

        let result = self.inner.push(ctx, event).instrument(instrumented).await;

        guard.finish(result.as_ref().err());
        result
    }
}

/// Finishes the span exactly once, as cancelled if never finished explicitly
struct SpanGuard(Option<Box<dyn Span>>);

impl SpanGuard {
    fn finish(mut self, error: Option<&PushError>) {
        if let Some(span) = self.0.take() {
            span.finish(error);
        }
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if let Some(span) = self.0.take() {
            span.finish(Some(&PushError::Cancelled));
        }
    }
}
