//! Tracing collaborators
//!
//! `SpanTracer` records spans through the `tracing` crate so they land in
//! whatever subscriber the process installed. `NoopTracer` keeps the chain
//! shape identical when tracing is switched off.

use crate::context::{Context, SpanContext};
use crate::error::PushError;
use std::time::Instant;

/// Starts spans, continuing the trace found in the parent context
pub trait Tracer: Send + Sync {
    fn start_span(&self, parent: &Context, operation: &str) -> Box<dyn Span>;
}

/// A started span; finished exactly once
pub trait Span: Send {
    /// Trace position to hand to inner calls. `None` leaves the context as is.
    fn context(&self) -> Option<&SpanContext>;

    /// `tracing` span to instrument inner work with
    fn tracing_span(&self) -> tracing::Span {
        tracing::Span::none()
    }

    fn finish(self: Box<Self>, error: Option<&PushError>);
}

/// Tracer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

struct NoopSpan;

impl Tracer for NoopTracer {
    fn start_span(&self, _parent: &Context, _operation: &str) -> Box<dyn Span> {
        Box::new(NoopSpan)
    }
}

impl Span for NoopSpan {
    fn context(&self) -> Option<&SpanContext> {
        None
    }

    fn finish(self: Box<Self>, _error: Option<&PushError>) {}
}

/// Tracer backed by `tracing` spans
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanTracer;

struct RecordedSpan {
    context: SpanContext,
    span: tracing::Span,
    started: Instant,
}

impl Tracer for SpanTracer {
    fn start_span(&self, parent: &Context, operation: &str) -> Box<dyn Span> {
        let context = match parent.span() {
            Some(p) => p.child(),
            None => SpanContext::root(),
        };
        let span = tracing::info_span!(
            "span",
            operation = %operation,
            trace_id = %context.trace_id,
            span_id = %context.span_id,
            parent_span_id = ?parent.span().map(|p| p.span_id.as_str()),
        );
        Box::new(RecordedSpan {
            context,
            span,
            started: Instant::now(),
        })
    }
}

impl Span for RecordedSpan {
    fn context(&self) -> Option<&SpanContext> {
        Some(&self.context)
    }

    fn tracing_span(&self) -> tracing::Span {
        self.span.clone()
    }

    fn finish(self: Box<Self>, error: Option<&PushError>) {
        let elapsed_us = self.started.elapsed().as_micros() as u64;
        match error {
            Some(e) => tracing::debug!(parent: &self.span, elapsed_us, error = %e, "span finished"),
            None => tracing::debug!(parent: &self.span, elapsed_us, "span finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_span_leaves_context() {
        let span = NoopTracer.start_span(&Context::new(), "push");
        assert!(span.context().is_none());
        span.finish(None);
    }

    #[test]
    fn test_span_tracer_starts_root_trace() {
        let span = SpanTracer.start_span(&Context::new(), "push");
        let ctx = span.context().unwrap().clone();
        assert_eq!(ctx.trace_id.len(), 32);
        span.finish(None);
    }

    #[test]
    fn test_span_tracer_continues_parent_trace() {
        let parent = SpanContext::root();
        let span = SpanTracer.start_span(&Context::with_span(parent.clone()), "push");
        let ctx = span.context().unwrap();
        assert_eq!(ctx.trace_id, parent.trace_id);
        assert_ne!(ctx.span_id, parent.span_id);
        span.finish(Some(&PushError::Broker("x".to_string())));
    }
}
