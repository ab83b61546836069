//! The push operation and the capability trait every decorator shares

use crate::codec;
use crate::context::Context;
use crate::error::Result;
use crate::publisher::Publisher;
use crate::types::{Event, Placement};
use async_trait::async_trait;
use std::sync::Arc;

/// Single-method capability implemented by the business operation and by
/// every decorator wrapped around it.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Push one event, returning where the broker placed it
    async fn push(&self, ctx: Context, event: Event) -> Result<Placement>;
}

#[async_trait]
impl<T: Operation + ?Sized> Operation for Arc<T> {
    async fn push(&self, ctx: Context, event: Event) -> Result<Placement> {
        (**self).push(ctx, event).await
    }
}

/// Business operation: encode the event and publish it to a fixed topic
///
/// No validation beyond the codec, no retries. Exactly one publish per
/// call; the publisher's result is returned as-is.
pub struct PushService {
    publisher: Arc<dyn Publisher>,
    topic: String,
}

impl PushService {
    pub fn new(publisher: Arc<dyn Publisher>, topic: impl Into<String>) -> Self {
        Self {
            publisher,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl Operation for PushService {
    async fn push(&self, _ctx: Context, event: Event) -> Result<Placement> {
        let message = codec::encode_message(&event, &self.topic);
        self.publisher.publish(message).await
    }
}
