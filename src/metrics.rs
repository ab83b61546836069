//! Metrics collaborators and their Prometheus implementation
//!
//! Decorators only see the two narrow traits below; the Prometheus
//! registry stays behind `PrometheusMetrics` and is exposed as text by the
//! diagnostics router.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use std::time::Duration;

/// Monotonic, increment-only counter labeled by operation
pub trait RequestCounter: Send + Sync {
    fn increment(&self, operation: &str);
}

/// Duration histogram labeled by method and outcome
pub trait LatencyRecorder: Send + Sync {
    fn observe(&self, method: &str, success: bool, elapsed: Duration);
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct OperationLabels {
    operation: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct DurationLabels {
    method: String,
    success: String,
}

fn duration_histogram() -> Histogram {
    // 1ms .. ~32s
    Histogram::new(exponential_buckets(0.001, 2.0, 16))
}

/// Prometheus-backed request counter and latency histogram
pub struct PrometheusMetrics {
    registry: Registry,
    requests: Family<OperationLabels, Counter>,
    durations: Family<DurationLabels, Histogram>,
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let requests = Family::<OperationLabels, Counter>::default();
        registry.register(
            "push_requests",
            "Push attempts received, successful or not",
            requests.clone(),
        );

        let durations =
            Family::<DurationLabels, Histogram>::new_with_constructor(duration_histogram);
        registry.register(
            "push_request_duration_seconds",
            "Time spent serving push requests",
            durations.clone(),
        );

        Self {
            registry,
            requests,
            durations,
        }
    }

    /// Current attempt count for an operation, without registering a series
    pub fn request_count(&self, operation: &str) -> u64 {
        self.requests
            .get(&OperationLabels {
                operation: operation.to_string(),
            })
            .map(|counter| counter.get())
            .unwrap_or(0)
    }

    /// Render the registry in the Prometheus text exposition format
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();
        encode(&mut buf, &self.registry)?;
        Ok(buf)
    }
}

impl Default for PrometheusMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestCounter for PrometheusMetrics {
    fn increment(&self, operation: &str) {
        self.requests
            .get_or_create(&OperationLabels {
                operation: operation.to_string(),
            })
            .inc();
    }
}

impl LatencyRecorder for PrometheusMetrics {
    fn observe(&self, method: &str, success: bool, elapsed: Duration) {
        self.durations
            .get_or_create(&DurationLabels {
                method: method.to_string(),
                success: success.to_string(),
            })
            .observe(elapsed.as_secs_f64());
    }
}
