//! Publisher trait: the contract with the message broker
//!
//! A publisher sends one message per call and waits until the broker has
//! durably accepted it, returning the partition and offset it was placed
//! at. Publishers never retry; a failed publish is reported once and the
//! caller decides what to do.
//!
//! Partitioning: when a message carries no partition hint the publisher
//! picks a partition uniformly at random. This spreads load across the
//! topic but gives up per-key ordering. Callers that need per-user FIFO
//! must set an explicit partition.

use crate::error::{PushError, Result};
use crate::types::{EncodedMessage, Placement};
use async_trait::async_trait;
use rand::Rng;

pub mod memory;
pub mod nats;

/// Core trait for broker backends
///
/// Implementations must tolerate concurrent `publish` calls from many
/// tasks; the pipeline adds no locking of its own around them.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish one message and wait for the broker acknowledgement
    async fn publish(&self, message: EncodedMessage) -> Result<Placement>;

    /// Flush and release the broker connection
    ///
    /// Default implementation has nothing to release.
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Backend name (e.g., "nats", "memory")
    fn name(&self) -> &str;
}

/// Uniformly random partitioner
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPartitioner;

impl RandomPartitioner {
    /// Resolve the partition for a message on a topic with `partitions`
    /// partitions, honouring an explicit hint when it is in range.
    pub fn resolve(&self, topic: &str, hint: Option<i32>, partitions: i32) -> Result<i32> {
        if partitions < 1 {
            return Err(PushError::Publish {
                topic: topic.to_string(),
                reason: format!("topic has no partitions ({})", partitions),
            });
        }
        match hint {
            Some(p) if (0..partitions).contains(&p) => Ok(p),
            Some(p) => Err(PushError::Publish {
                topic: topic.to_string(),
                reason: format!("partition {} out of range 0..{}", p, partitions),
            }),
            None => Ok(rand::thread_rng().gen_range(0..partitions)),
        }
    }
}
