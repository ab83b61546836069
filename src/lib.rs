//! # a3s-push
//!
//! Event push gateway for the A3S ecosystem.
//!
//! ## Overview
//!
//! `a3s-push` accepts "push an event" requests, runs them through a fixed
//! stack of logging, metrics and tracing decorators, and publishes the
//! event to a partitioned broker topic. The caller gets back the
//! partition and offset the broker acknowledged.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use a3s_push::{build_chain, Context, Event, Instruments, Operation, PrometheusMetrics};
//! use a3s_push::publisher::memory::MemoryPublisher;
//!
//! # async fn example() -> a3s_push::Result<()> {
//! let metrics = Arc::new(PrometheusMetrics::new());
//! let instruments = Instruments::new(metrics, true);
//! let chain = build_chain(Arc::new(MemoryPublisher::default()), "events", &instruments);
//!
//! let placement = chain
//!     .push(
//!         Context::new(),
//!         Event::new("party.created", serde_json::json!({"id": 42}), 7),
//!     )
//!     .await?;
//!
//! println!("partition={} offset={}", placement.partition, placement.offset);
//! # Ok(())
//! # }
//! ```
//!
//! ## Publishers
//!
//! - **nats**: NATS JetStream, one replicated stream per partition
//! - **memory**: in-process broker for testing and single-node use
//!
//! ## Architecture
//!
//! - **Operation** trait: the push capability shared by the business
//!   operation and every decorator
//! - **PushService**: encodes the event and publishes it once
//! - **middleware**: logging, counting, timing and tracing decorators
//! - **Endpoint**: transport-neutral request/response form, served over
//!   HTTP by `transport::http` and called remotely via `transport::client`

pub mod cli;
pub mod codec;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod publisher;
pub mod server;
pub mod service;
pub mod trace;
pub mod transport;
pub mod types;

// Re-export core types
pub use config::{BrokerBackend, BrokerConfig, PushConfig};
pub use context::{Context, SpanContext};
pub use endpoint::{Endpoint, EndpointError, PushClient, PushEndpoint};
pub use error::{PushError, Result};
pub use metrics::{LatencyRecorder, PrometheusMetrics, RequestCounter};
pub use middleware::{build_chain, wrap_endpoint, wrap_service, Instruments, Logger, PushChain};
pub use publisher::{Publisher, RandomPartitioner};
pub use service::{Operation, PushService};
pub use trace::{NoopTracer, Span, SpanTracer, Tracer};
pub use types::{EncodedMessage, Event, Placement, PushRequest, PushResponse};

// Re-export publishers for convenience
pub use publisher::memory::{MemoryConfig, MemoryPublisher};
pub use publisher::nats::{NatsConfig, NatsPublisher, StorageType};
