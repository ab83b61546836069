//! Gateway configuration, loaded from a TOML file

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PushError, Result};
use crate::publisher::nats::NatsConfig;

/// Broker backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BrokerBackend {
    #[default]
    Nats,
    Memory,
}

/// Listener address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl ListenConfig {
    /// Returns the bind address string (e.g., "127.0.0.1:8080").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_http_port(),
        }
    }
}

/// Broker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default)]
    pub backend: BrokerBackend,

    /// Topic every event is published to
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Partitions of the topic
    #[serde(default = "default_partitions")]
    pub partitions: i32,

    #[serde(default)]
    pub nats: NatsConfig,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            backend: BrokerBackend::default(),
            topic: default_topic(),
            partitions: default_partitions(),
            nats: NatsConfig::default(),
        }
    }
}

/// Span settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// When false, a no-op tracer is installed
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Top-level gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Push endpoint listener
    #[serde(default)]
    pub http: ListenConfig,

    /// Diagnostics listener (health, metrics)
    #[serde(default = "default_debug")]
    pub debug: ListenConfig,

    #[serde(default)]
    pub broker: BrokerConfig,

    #[serde(default)]
    pub tracing: TraceConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_debug() -> ListenConfig {
    ListenConfig {
        host: default_host(),
        port: 8081,
    }
}

fn default_topic() -> String {
    "events".to_string()
}

fn default_partitions() -> i32 {
    3
}

fn default_true() -> bool {
    true
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            http: ListenConfig::default(),
            debug: default_debug(),
            broker: BrokerConfig::default(),
            tracing: TraceConfig::default(),
        }
    }
}

impl PushConfig {
    /// Load configuration from `path`, or defaults when no path is given.
    ///
    /// The result is not validated; call [`PushConfig::validate`] once any
    /// overrides have been applied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    PushError::Config(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::parse(&content)?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PushError::Config(e.to_string()))
    }

    /// Reject settings the gateway cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.broker.topic.is_empty() {
            return Err(PushError::Config("broker.topic must not be empty".to_string()));
        }
        if self.broker.partitions < 1 {
            return Err(PushError::Config(format!(
                "broker.partitions must be at least 1, got {}",
                self.broker.partitions
            )));
        }
        if self.broker.backend == BrokerBackend::Nats {
            if self.broker.nats.urls.is_empty() {
                return Err(PushError::Config("broker.nats.urls must not be empty".to_string()));
            }
            if self.broker.nats.replicas < 1 {
                return Err(PushError::Config(
                    "broker.nats.replicas must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}
