//! Attempt-counting decorator
//!
//! The counter goes up once per call before the inner operation runs, so
//! it counts attempts rather than successes, including calls that are
//! cancelled mid-flight. Success rates come from the duration
//! histogram's `success` label.

use crate::context::Context;
use crate::error::Result;
use crate::metrics::RequestCounter;
use crate::service::Operation;
use crate::types::{Event, Placement};
use async_trait::async_trait;
use std::sync::Arc;

pub struct CountingOperation<O> {
    inner: O,
    counter: Arc<dyn RequestCounter>,
    operation: &'static str,
}

impl<O: Operation> CountingOperation<O> {
    pub fn new(inner: O, counter: Arc<dyn RequestCounter>, operation: &'static str) -> Self {
        Self {
            inner,
            counter,
            operation,
        }
    }
}

#[async_trait]
impl<O: Operation> Operation for CountingOperation<O> {
    async fn push(&self, ctx: Context, event: Event) -> Result<Placement> {
        self.counter.increment(self.operation);
        self.inner.push(ctx, event).await
    }
}
