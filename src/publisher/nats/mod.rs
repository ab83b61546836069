//! NATS JetStream publisher
//!
//! A topic with `P` partitions is stored as `P` JetStream streams, one
//! subject each. Stream sequences start at 1, so the offset reported for
//! a message is its sequence minus one.

mod client;
mod config;

pub use client::NatsClient;
pub use config::{NatsConfig, StorageType};

use crate::error::{PushError, Result};
use crate::publisher::{Publisher, RandomPartitioner};
use crate::types::{EncodedMessage, Placement};
use async_trait::async_trait;

/// JetStream-backed publisher for a single topic
pub struct NatsPublisher {
    client: NatsClient,
    topic: String,
    partitions: i32,
    partitioner: RandomPartitioner,
}

impl NatsPublisher {
    /// Connect to NATS and provision the topic's partition streams
    pub async fn connect(config: NatsConfig, topic: &str, partitions: i32) -> Result<Self> {
        let client = NatsClient::connect(config).await?;
        client.ensure_topic(topic, partitions).await?;
        Ok(Self {
            client,
            topic: topic.to_string(),
            partitions,
            partitioner: RandomPartitioner,
        })
    }

    /// Get the underlying NATS client for advanced usage
    pub fn client(&self) -> &NatsClient {
        &self.client
    }
}

#[async_trait]
impl Publisher for NatsPublisher {
    async fn publish(&self, message: EncodedMessage) -> Result<Placement> {
        if message.topic != self.topic {
            return Err(PushError::Publish {
                topic: message.topic,
                reason: format!("topic not provisioned (serving '{}')", self.topic),
            });
        }

        let partition =
            self.partitioner
                .resolve(&message.topic, message.partition, self.partitions)?;
        let sequence = self
            .client
            .publish(&message.topic, partition, message.payload)
            .await?;

        Ok(Placement::new(partition, sequence.saturating_sub(1) as i64))
    }

    async fn close(&self) -> Result<()> {
        self.client.flush().await?;
        tracing::info!(topic = %self.topic, "NATS publisher closed");
        Ok(())
    }

    fn name(&self) -> &str {
        "nats"
    }
}
