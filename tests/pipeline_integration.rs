//! Pipeline integration tests
//!
//! Drive the full decorator chain through the endpoint adapter with
//! recording collaborators and fake publishers. Covers the success and
//! failure scenarios, call ordering across layers, one-publish-per-call
//! and concurrent use of a single chain.

use a3s_push::{
    build_chain, codec, Context, EncodedMessage, Endpoint, Instruments, LatencyRecorder, Logger,
    MemoryConfig, MemoryPublisher, NoopTracer, Placement, Publisher, PushEndpoint, PushError,
    PushRequest, PushResponse, RequestCounter, Span, SpanContext, Tracer,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ─── Fakes ───────────────────────────────────────────────────────

/// Publisher returning a fixed outcome and counting calls
struct FixedPublisher {
    outcome: Result<Placement, &'static str>,
    calls: AtomicUsize,
}

impl FixedPublisher {
    fn ok(partition: i32, offset: i64) -> Self {
        Self {
            outcome: Ok(Placement::new(partition, offset)),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(reason: &'static str) -> Self {
        Self {
            outcome: Err(reason),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Publisher for FixedPublisher {
    async fn publish(&self, _message: EncodedMessage) -> a3s_push::Result<Placement> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.map_err(|r| PushError::Broker(r.to_string()))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Publisher that sleeps, then places each event at offset = user id
struct EchoPublisher;

#[async_trait]
impl Publisher for EchoPublisher {
    async fn publish(&self, message: EncodedMessage) -> a3s_push::Result<Placement> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let event = codec::decode(&message.payload)?;
        Ok(Placement::new((event.user_id % 4) as i32, event.user_id))
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// Shared recorder for logs, counts, observations and span events
#[derive(Default)]
struct Recorder {
    timeline: Mutex<Vec<String>>,
    counts: Mutex<Vec<String>>,
    observations: Mutex<Vec<(String, bool)>>,
}

impl Logger for Recorder {
    fn log(&self, fields: &[(&'static str, String)]) {
        let layer = fields
            .iter()
            .find(|(k, _)| *k == "layer")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        self.timeline.lock().unwrap().push(format!("log.{}", layer));
    }
}

impl RequestCounter for Recorder {
    fn increment(&self, operation: &str) {
        self.counts.lock().unwrap().push(operation.to_string());
    }
}

impl LatencyRecorder for Recorder {
    fn observe(&self, method: &str, success: bool, _elapsed: Duration) {
        self.observations
            .lock()
            .unwrap()
            .push((method.to_string(), success));
    }
}

struct RecordingTracer(Arc<Recorder>);

struct RecordingSpan {
    context: SpanContext,
    recorder: Arc<Recorder>,
}

impl Tracer for RecordingTracer {
    fn start_span(&self, _parent: &Context, operation: &str) -> Box<dyn Span> {
        self.0
            .timeline
            .lock()
            .unwrap()
            .push(format!("span.start.{}", operation));
        Box::new(RecordingSpan {
            context: SpanContext::root(),
            recorder: self.0.clone(),
        })
    }
}

impl Span for RecordingSpan {
    fn context(&self) -> Option<&SpanContext> {
        Some(&self.context)
    }

    fn finish(self: Box<Self>, error: Option<&PushError>) {
        let entry = match error {
            Some(PushError::Cancelled) => "span.cancelled",
            _ => "span.finish",
        };
        self.recorder
            .timeline
            .lock()
            .unwrap()
            .push(entry.to_string());
    }
}

fn instruments(recorder: &Arc<Recorder>) -> Instruments {
    Instruments {
        logger: recorder.clone(),
        counter: recorder.clone(),
        latency: recorder.clone(),
        tracer: Arc::new(RecordingTracer(recorder.clone())),
    }
}

fn party_created() -> PushRequest {
    PushRequest {
        name: "party.created".to_string(),
        payload: serde_json::json!({"id": 42}),
        user_id: 7,
    }
}

// ─── Scenarios ───────────────────────────────────────────────────

#[tokio::test]
async fn test_push_success_scenario() {
    let recorder = Arc::new(Recorder::default());
    let publisher = Arc::new(FixedPublisher::ok(2, 99));
    let endpoint = PushEndpoint::new(build_chain(
        publisher.clone(),
        "events",
        &instruments(&recorder),
    ));

    let resp = endpoint.call(Context::new(), party_created()).await.unwrap();

    assert_eq!(resp, PushResponse::ok(Placement::new(2, 99)));
    assert_eq!(
        serde_json::to_string(&resp).unwrap(),
        r#"{"partition":2,"offset":99}"#
    );
    assert_eq!(publisher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*recorder.counts.lock().unwrap(), vec!["push".to_string()]);
    assert_eq!(
        *recorder.observations.lock().unwrap(),
        vec![("push".to_string(), true)]
    );
}

#[tokio::test]
async fn test_push_failure_scenario() {
    let recorder = Arc::new(Recorder::default());
    let publisher = Arc::new(FixedPublisher::failing("broker unavailable"));
    let endpoint = PushEndpoint::new(build_chain(
        publisher.clone(),
        "events",
        &instruments(&recorder),
    ));

    let err = endpoint
        .call(Context::new(), party_created())
        .await
        .unwrap_err();

    assert_eq!(err.error.to_string(), "broker unavailable");
    assert_eq!(
        err.response,
        PushResponse {
            partition: 0,
            offset: 0,
            error: Some("broker unavailable".to_string()),
        }
    );
    assert_eq!(publisher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.counts.lock().unwrap().len(), 1);
    assert_eq!(
        *recorder.observations.lock().unwrap(),
        vec![("push".to_string(), false)]
    );
}

#[tokio::test]
async fn test_counter_and_histogram_once_per_call_mixed_outcomes() {
    let recorder = Arc::new(Recorder::default());
    let good = PushEndpoint::new(build_chain(
        Arc::new(FixedPublisher::ok(0, 1)),
        "events",
        &instruments(&recorder),
    ));
    let bad = PushEndpoint::new(build_chain(
        Arc::new(FixedPublisher::failing("nak")),
        "events",
        &instruments(&recorder),
    ));

    for _ in 0..3 {
        good.call(Context::new(), party_created()).await.unwrap();
        bad.call(Context::new(), party_created()).await.unwrap_err();
    }

    assert_eq!(recorder.counts.lock().unwrap().len(), 6);
    let obs = recorder.observations.lock().unwrap();
    assert_eq!(obs.len(), 6);
    assert_eq!(obs.iter().filter(|(_, ok)| *ok).count(), 3);
}

// ─── Ordering ────────────────────────────────────────────────────

#[tokio::test]
async fn test_span_wraps_service_log_line() {
    for publisher in [FixedPublisher::ok(1, 1), FixedPublisher::failing("down")] {
        let recorder = Arc::new(Recorder::default());
        let endpoint = PushEndpoint::new(build_chain(
            Arc::new(publisher),
            "events",
            &instruments(&recorder),
        ));

        let _ = endpoint.call(Context::new(), party_created()).await;

        let timeline = recorder.timeline.lock().unwrap();
        assert_eq!(
            *timeline,
            vec![
                "span.start.push".to_string(),
                "log.service".to_string(),
                "log.endpoint".to_string(),
                "span.finish".to_string(),
            ]
        );
    }
}

#[tokio::test]
async fn test_cancelled_push_is_counted_and_span_closed() {
    let recorder = Arc::new(Recorder::default());
    let publisher = Arc::new(MemoryPublisher::new(MemoryConfig {
        latency: Some(Duration::from_secs(5)),
        ..Default::default()
    }));
    let endpoint = PushEndpoint::new(build_chain(
        publisher.clone(),
        "events",
        &instruments(&recorder),
    ));

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        endpoint.call(Context::new(), party_created()),
    )
    .await;
    assert!(outcome.is_err());

    assert_eq!(publisher.publish_calls(), 1);
    assert_eq!(publisher.message_count("events").await, 0);
    assert_eq!(*recorder.counts.lock().unwrap(), vec!["push".to_string()]);
    assert_eq!(
        *recorder.observations.lock().unwrap(),
        vec![("push".to_string(), false)]
    );
    assert_eq!(
        *recorder.timeline.lock().unwrap(),
        vec!["span.start.push".to_string(), "span.cancelled".to_string()]
    );
}

// ─── Publish contract ────────────────────────────────────────────

#[tokio::test]
async fn test_one_publish_per_call() {
    let recorder = Arc::new(Recorder::default());
    let publisher = Arc::new(FixedPublisher::ok(0, 0));
    let endpoint = PushEndpoint::new(build_chain(
        publisher.clone(),
        "events",
        &instruments(&recorder),
    ));

    for _ in 0..10 {
        endpoint.call(Context::new(), party_created()).await.unwrap();
    }
    assert_eq!(publisher.calls.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn test_noop_tracer_keeps_chain_working() {
    let recorder = Arc::new(Recorder::default());
    let mut inst = instruments(&recorder);
    inst.tracer = Arc::new(NoopTracer);
    let endpoint = PushEndpoint::new(build_chain(
        Arc::new(FixedPublisher::ok(2, 99)),
        "events",
        &inst,
    ));

    let resp = endpoint.call(Context::new(), party_created()).await.unwrap();
    assert_eq!(resp.placement(), Placement::new(2, 99));
    assert_eq!(
        *recorder.timeline.lock().unwrap(),
        vec!["log.service".to_string(), "log.endpoint".to_string()]
    );
}

// ─── Concurrency ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pushes_have_independent_results() {
    let recorder = Arc::new(Recorder::default());
    let endpoint = Arc::new(PushEndpoint::new(build_chain(
        Arc::new(EchoPublisher),
        "events",
        &instruments(&recorder),
    )));

    let calls = (0..64i64).map(|user_id| {
        let endpoint = endpoint.clone();
        tokio::spawn(async move {
            let req = PushRequest {
                name: format!("user.{}", user_id),
                payload: serde_json::json!({"n": user_id}),
                user_id,
            };
            (user_id, endpoint.call(Context::new(), req).await.unwrap())
        })
    });

    let results = futures::future::join_all(calls).await;
    for result in results {
        let (user_id, resp) = result.unwrap();
        assert_eq!(resp.offset, user_id);
        assert_eq!(resp.partition, (user_id % 4) as i32);
        assert!(resp.error.is_none());
    }

    assert_eq!(recorder.counts.lock().unwrap().len(), 64);
    assert_eq!(recorder.observations.lock().unwrap().len(), 64);
}
