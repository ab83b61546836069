//! Request duration decorator

use crate::context::Context;
use crate::error::Result;
use crate::metrics::LatencyRecorder;
use crate::service::Operation;
use crate::types::{Event, Placement};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Records one observation per call, labeled with the outcome. A call
/// dropped before it returns is recorded as unsuccessful.
pub struct TimedOperation<O> {
    inner: O,
    recorder: Arc<dyn LatencyRecorder>,
    method: &'static str,
}

impl<O: Operation> TimedOperation<O> {
    pub fn new(inner: O, recorder: Arc<dyn LatencyRecorder>, method: &'static str) -> Self {
        Self {
            inner,
            recorder,
            method,
        }
    }
}

#[async_trait]
impl<O: Operation> Operation for TimedOperation<O> {
    async fn push(&self, ctx: Context, event: Event) -> Result<Placement> {
        let mut observation = Observation {
            recorder: self.recorder.as_ref(),
            method: self.method,
            started: Instant::now(),
            recorded: false,
        };
        let result = self.inner.push(ctx, event).await;
        observation.record(result.is_ok());
        result
    }
}

struct Observation<'a> {
    recorder: &'a dyn LatencyRecorder,
    method: &'static str,
    started: Instant,
    recorded: bool,
}

impl Observation<'_> {
    fn record(&mut self, success: bool) {
        if !self.recorded {
            self.recorded = true;
            self.recorder
                .observe(self.method, success, self.started.elapsed());
        }
    }
}

impl Drop for Observation<'_> {
    fn drop(&mut self) {
        self.record(false);
    }
}
