//! NATS JetStream publisher configuration

use serde::{Deserialize, Serialize};

/// JetStream storage backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    File,
    Memory,
}

/// Connection and stream settings for the JetStream publisher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsConfig {
    /// Broker addresses (e.g., `["nats://10.0.0.1:4222", "nats://10.0.0.2:4222"]`)
    #[serde(default = "default_urls")]
    pub urls: Vec<String>,

    /// Prefix for per-partition stream names
    #[serde(default = "default_stream_prefix")]
    pub stream_prefix: String,

    /// Replicas per partition stream. Acks wait for the replica quorum.
    #[serde(default = "default_replicas")]
    pub replicas: usize,

    #[serde(default)]
    pub storage: StorageType,

    /// Maximum message age in seconds (0 = unlimited)
    #[serde(default)]
    pub max_age_secs: u64,

    /// Maximum bytes per partition stream (-1 = unlimited)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: i64,

    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on waiting for a publish ack
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_timeout_secs: Option<u64>,

    /// Authentication token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_urls() -> Vec<String> {
    vec!["nats://127.0.0.1:4222".to_string()]
}

fn default_stream_prefix() -> String {
    "PUSH".to_string()
}

fn default_replicas() -> usize {
    1
}

fn default_max_bytes() -> i64 {
    -1
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            urls: default_urls(),
            stream_prefix: default_stream_prefix(),
            replicas: default_replicas(),
            storage: StorageType::default(),
            max_age_secs: 0,
            max_bytes: default_max_bytes(),
            connect_timeout_secs: default_timeout_secs(),
            request_timeout_secs: default_timeout_secs(),
            ack_timeout_secs: None,
            token: None,
        }
    }
}

impl NatsConfig {
    /// Stream holding one partition of a topic
    ///
    /// Stream names may not contain `.`, so the topic is flattened.
    pub fn stream_name(&self, topic: &str, partition: i32) -> String {
        let flat: String = topic
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{}_{}_{}", self.stream_prefix, flat, partition)
    }

    /// Subject captured by a partition stream
    pub fn partition_subject(&self, topic: &str, partition: i32) -> String {
        format!("{}.{}", topic, partition)
    }
}
