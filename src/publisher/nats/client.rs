//! NATS JetStream client: connect, provision partition streams, publish

use super::config::{NatsConfig, StorageType};
use crate::error::{PushError, Result};
use async_nats::jetstream;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// NATS JetStream client
///
/// Owns the broker connection shared by every publish. The underlying
/// `async_nats::Client` multiplexes concurrent requests over a single
/// connection, so no extra locking is needed here.
pub struct NatsClient {
    /// NATS client connection
    client: async_nats::Client,

    /// JetStream context
    jetstream: jetstream::Context,

    /// Configuration
    config: Arc<NatsConfig>,
}

impl NatsClient {
    /// Connect to the configured brokers
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        let addrs = parse_addrs(&config.urls)?;
        let connect_opts = build_connect_options(&config);

        let client = connect_opts
            .connect(addrs.join(","))
            .await
            .map_err(|e| PushError::Connection(format!("{}: {}", config.urls.join(","), e)))?;

        tracing::info!(urls = ?config.urls, "Connected to NATS");

        let jetstream = jetstream::new(client.clone());

        Ok(Self {
            client,
            jetstream,
            config: Arc::new(config),
        })
    }

    /// Ensure one stream per partition of `topic` exists
    pub async fn ensure_topic(&self, topic: &str, partitions: i32) -> Result<()> {
        for partition in 0..partitions {
            ensure_stream(&self.jetstream, &self.config, topic, partition).await?;
        }

        tracing::info!(
            topic,
            partitions,
            replicas = self.config.replicas,
            "JetStream topic ready"
        );

        Ok(())
    }

    /// Publish a payload to one partition, returning the stream sequence
    ///
    /// Waits for the JetStream ack, which is only sent once the stream's
    /// replicas have committed the write.
    pub async fn publish(&self, topic: &str, partition: i32, payload: Bytes) -> Result<u64> {
        let subject = self.config.partition_subject(topic, partition);

        let ack_fut = self
            .jetstream
            .publish(subject.clone(), payload)
            .await
            .map_err(|e| PushError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            })?;

        let ack = if let Some(timeout_secs) = self.config.ack_timeout_secs {
            tokio::time::timeout(Duration::from_secs(timeout_secs), ack_fut)
                .await
                .map_err(|_| PushError::Publish {
                    topic: topic.to_string(),
                    reason: format!("ack timed out after {}s", timeout_secs),
                })?
        } else {
            ack_fut.await
        }
        .map_err(|e| PushError::Publish {
            topic: topic.to_string(),
            reason: format!("ack failed: {}", e),
        })?;

        tracing::debug!(
            subject = %subject,
            stream = %ack.stream,
            sequence = ack.sequence,
            "Message acknowledged"
        );

        Ok(ack.sequence)
    }

    /// Read back the payload stored at `offset` on one partition
    pub async fn read(&self, topic: &str, partition: i32, offset: i64) -> Result<Bytes> {
        let name = self.config.stream_name(topic, partition);
        let sequence = u64::try_from(offset).map_err(|_| PushError::Publish {
            topic: topic.to_string(),
            reason: format!("invalid offset {}", offset),
        })? + 1;

        let stream = self
            .jetstream
            .get_stream(&name)
            .await
            .map_err(|e| PushError::Connection(format!("Failed to get stream '{}': {}", name, e)))?;

        let message = stream
            .get_raw_message(sequence)
            .await
            .map_err(|e| PushError::Broker(format!("stream '{}' seq {}: {}", name, sequence, e)))?;

        Ok(message.payload)
    }

    /// Flush buffered writes before shutdown
    pub async fn flush(&self) -> Result<()> {
        self.client
            .flush()
            .await
            .map_err(|e| PushError::Connection(format!("flush failed: {}", e)))
    }

    /// Get the configuration
    pub fn config(&self) -> &NatsConfig {
        &self.config
    }
}

/// Validate the configured urls, returning them trimmed
fn parse_addrs(urls: &[String]) -> Result<Vec<String>> {
    if urls.is_empty() {
        return Err(PushError::Config("no NATS urls configured".to_string()));
    }
    urls.iter()
        .map(|url| {
            let url = url.trim();
            url.parse::<async_nats::ServerAddr>()
                .map(|_| url.to_string())
                .map_err(|e| PushError::Config(format!("invalid NATS url '{}': {}", url, e)))
        })
        .collect()
}

/// Build NATS connect options from config
fn build_connect_options(config: &NatsConfig) -> async_nats::ConnectOptions {
    let mut opts = async_nats::ConnectOptions::new()
        .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
        .request_timeout(Some(Duration::from_secs(config.request_timeout_secs)));

    if let Some(ref token) = config.token {
        opts = opts.token(token.clone());
    }

    opts
}

/// Ensure the stream backing one partition exists
async fn ensure_stream(
    js: &jetstream::Context,
    config: &NatsConfig,
    topic: &str,
    partition: i32,
) -> Result<jetstream::stream::Stream> {
    let storage = match config.storage {
        StorageType::File => jetstream::stream::StorageType::File,
        StorageType::Memory => jetstream::stream::StorageType::Memory,
    };

    let name = config.stream_name(topic, partition);
    let stream_config = jetstream::stream::Config {
        name: name.clone(),
        subjects: vec![config.partition_subject(topic, partition)],
        storage,
        num_replicas: config.replicas,
        max_age: Duration::from_secs(config.max_age_secs),
        max_bytes: config.max_bytes,
        retention: jetstream::stream::RetentionPolicy::Limits,
        ..Default::default()
    };

    js.get_or_create_stream(stream_config)
        .await
        .map_err(|e| {
            PushError::Connection(format!("Failed to create/get stream '{}': {}", name, e))
        })
}
