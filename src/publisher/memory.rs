//! In-memory publisher for development and testing
//!
//! Keeps one append-only log per (topic, partition). Offsets are
//! partition-local and start at 0, like a log-structured broker.

use super::{Publisher, RandomPartitioner};
use crate::error::{PushError, Result};
use crate::types::{EncodedMessage, Placement};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory publisher configuration
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Partitions per topic
    pub partitions: i32,

    /// Artificial delay before each acknowledgement
    pub latency: Option<Duration>,

    /// When set, every publish fails with this broker error
    pub fail_with: Option<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            partitions: 1,
            latency: None,
            fail_with: None,
        }
    }
}

/// In-process broker
#[derive(Clone)]
pub struct MemoryPublisher {
    logs: Arc<RwLock<HashMap<String, Vec<Vec<Bytes>>>>>,
    publish_calls: Arc<AtomicUsize>,
    partitioner: RandomPartitioner,
    config: MemoryConfig,
}

impl MemoryPublisher {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            logs: Arc::new(RwLock::new(HashMap::new())),
            publish_calls: Arc::new(AtomicUsize::new(0)),
            partitioner: RandomPartitioner,
            config,
        }
    }

    /// Publisher with `partitions` partitions per topic
    pub fn with_partitions(partitions: i32) -> Self {
        Self::new(MemoryConfig {
            partitions,
            ..Default::default()
        })
    }

    /// Publisher whose every publish fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(MemoryConfig {
            fail_with: Some(reason.into()),
            ..Default::default()
        })
    }

    /// Number of `publish` calls received, including failed ones
    pub fn publish_calls(&self) -> usize {
        self.publish_calls.load(Ordering::SeqCst)
    }

    /// Messages stored on a partition, in offset order
    pub async fn messages(&self, topic: &str, partition: i32) -> Vec<Bytes> {
        let logs = self.logs.read().await;
        logs.get(topic)
            .and_then(|parts| parts.get(partition as usize))
            .cloned()
            .unwrap_or_default()
    }

    /// Total messages stored on a topic
    pub async fn message_count(&self, topic: &str) -> usize {
        let logs = self.logs.read().await;
        logs.get(topic)
            .map(|parts| parts.iter().map(Vec::len).sum())
            .unwrap_or(0)
    }
}

impl Default for MemoryPublisher {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, message: EncodedMessage) -> Result<Placement> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.config.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(ref reason) = self.config.fail_with {
            return Err(PushError::Broker(reason.clone()));
        }

        let partition =
            self.partitioner
                .resolve(&message.topic, message.partition, self.config.partitions)?;

        let offset = {
            let mut logs = self.logs.write().await;
            let parts = logs
                .entry(message.topic.clone())
                .or_insert_with(|| vec![Vec::new(); self.config.partitions as usize]);
            let log = &mut parts[partition as usize];
            log.push(message.payload);
            (log.len() - 1) as i64
        };

        tracing::debug!(
            topic = %message.topic,
            partition,
            offset,
            "Message stored"
        );

        Ok(Placement::new(partition, offset))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(topic: &str, partition: Option<i32>, body: &'static str) -> EncodedMessage {
        EncodedMessage {
            topic: topic.to_string(),
            partition,
            payload: Bytes::from_static(body.as_bytes()),
        }
    }

    #[tokio::test]
    async fn test_offsets_are_partition_local() {
        let publisher = MemoryPublisher::with_partitions(2);

        let a = publisher.publish(message("t", Some(0), "a")).await.unwrap();
        let b = publisher.publish(message("t", Some(1), "b")).await.unwrap();
        let c = publisher.publish(message("t", Some(0), "c")).await.unwrap();

        assert_eq!(a, Placement::new(0, 0));
        assert_eq!(b, Placement::new(1, 0));
        assert_eq!(c, Placement::new(0, 1));
        assert_eq!(
            publisher.messages("t", 0).await,
            vec![Bytes::from_static(b"a"), Bytes::from_static(b"c")]
        );
        assert_eq!(publisher.message_count("t").await, 3);
    }

    #[tokio::test]
    async fn test_topics_are_independent() {
        let publisher = MemoryPublisher::default();
        publisher.publish(message("a", None, "1")).await.unwrap();
        let p = publisher.publish(message("b", None, "2")).await.unwrap();
        assert_eq!(p, Placement::new(0, 0));
    }

    #[tokio::test]
    async fn test_failing_publisher_returns_broker_error() {
        let publisher = MemoryPublisher::failing("broker unavailable");
        let err = publisher.publish(message("t", None, "x")).await.unwrap_err();
        assert_eq!(err.to_string(), "broker unavailable");
        assert_eq!(publisher.publish_calls(), 1);
        assert_eq!(publisher.message_count("t").await, 0);
    }

    #[tokio::test]
    async fn test_bad_hint_is_publish_error() {
        let publisher = MemoryPublisher::with_partitions(2);
        let err = publisher.publish(message("t", Some(5), "x")).await.unwrap_err();
        assert!(matches!(err, PushError::Publish { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_publishes_get_distinct_offsets() {
        let publisher = MemoryPublisher::default();
        let mut handles = Vec::new();
        for _ in 0..50 {
            let p = publisher.clone();
            handles.push(tokio::spawn(async move {
                p.publish(message("t", None, "x")).await.unwrap().offset
            }));
        }
        let mut offsets = Vec::new();
        for h in handles {
            offsets.push(h.await.unwrap());
        }
        offsets.sort();
        assert_eq!(offsets, (0..50).collect::<Vec<i64>>());
    }

    #[test]
    fn test_latency_delays_ack() {
        let publisher = MemoryPublisher::new(MemoryConfig {
            latency: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let started = std::time::Instant::now();
        let placement =
            tokio_test::block_on(publisher.publish(message("t", None, "x"))).unwrap();
        assert_eq!(placement, Placement::new(0, 0));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
