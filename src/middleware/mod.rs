//! Decorators around the push operation
//!
//! Every decorator implements `Operation`, holds exactly one inner
//! operation plus one collaborator, and calls the inner operation exactly
//! once per invocation. Errors pass through untouched.
//!
//! The stack is fixed at construction, outermost first:
//!
//! ```text
//! Traced -> Logging(endpoint) -> Timed      (endpoint layer)
//!        -> Logging(service)  -> Counting   (service layer)
//!        -> PushService
//! ```

mod counting;
mod logging;
mod timing;
mod traced;

pub use counting::CountingOperation;
pub use logging::{Logger, LoggingOperation, TracingLogger};
pub use timing::TimedOperation;
pub use traced::TracedOperation;

use crate::metrics::{LatencyRecorder, PrometheusMetrics, RequestCounter};
use crate::publisher::Publisher;
use crate::service::{Operation, PushService};
use crate::trace::{NoopTracer, SpanTracer, Tracer};
use std::sync::Arc;

/// Method name used in log records, metric labels and span names
pub const METHOD: &str = "push";

/// Collaborators shared by the decorators
#[derive(Clone)]
pub struct Instruments {
    pub logger: Arc<dyn Logger>,
    pub counter: Arc<dyn RequestCounter>,
    pub latency: Arc<dyn LatencyRecorder>,
    pub tracer: Arc<dyn Tracer>,
}

impl Instruments {
    /// Production collaborators: `tracing` logs, Prometheus metrics and,
    /// when enabled, `tracing`-backed spans.
    pub fn new(metrics: Arc<PrometheusMetrics>, tracing_enabled: bool) -> Self {
        let tracer: Arc<dyn Tracer> = if tracing_enabled {
            Arc::new(SpanTracer)
        } else {
            Arc::new(NoopTracer)
        };
        Self {
            logger: Arc::new(TracingLogger),
            counter: metrics.clone(),
            latency: metrics,
            tracer,
        }
    }
}

/// Service layer around the business operation
pub type ServiceStack<O> = LoggingOperation<CountingOperation<O>>;

/// Endpoint layer around the service layer
pub type EndpointStack<O> = TracedOperation<LoggingOperation<TimedOperation<O>>>;

/// Full chain as served to the transport
pub type PushChain = EndpointStack<ServiceStack<PushService>>;

/// Wrap an operation in the service-level decorators
pub fn wrap_service<O: Operation>(inner: O, instruments: &Instruments) -> ServiceStack<O> {
    let counted = CountingOperation::new(inner, instruments.counter.clone(), METHOD);
    LoggingOperation::new(counted, instruments.logger.clone(), "service")
}

/// Wrap an operation in the endpoint-level decorators
pub fn wrap_endpoint<O: Operation>(inner: O, instruments: &Instruments) -> EndpointStack<O> {
    let timed = TimedOperation::new(inner, instruments.latency.clone(), METHOD);
    let logged = LoggingOperation::new(timed, instruments.logger.clone(), "endpoint");
    TracedOperation::new(logged, instruments.tracer.clone(), METHOD)
}

/// Build the complete chain over a publisher
pub fn build_chain(
    publisher: Arc<dyn Publisher>,
    topic: &str,
    instruments: &Instruments,
) -> PushChain {
    let service = PushService::new(publisher, topic);
    wrap_endpoint(wrap_service(service, instruments), instruments)
}
