//! Logging decorator and the logger collaborator

use crate::context::Context;
use crate::error::Result;
use crate::service::Operation;
use crate::types::{Event, Placement};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Accepts one record as ordered key/value pairs
pub trait Logger: Send + Sync {
    fn log(&self, fields: &[(&'static str, String)]);
}

/// Logger that emits each record as a single `tracing` event with
/// structured fields
///
/// Records carrying an `err` field are logged at `warn`, the rest at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, fields: &[(&'static str, String)]) {
        let field = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
                .unwrap_or_default()
        };
        let (layer, method, name) = (field("layer"), field("method"), field("name"));
        let (partition, offset, took) = (field("partition"), field("offset"), field("took"));

        if fields.iter().any(|(k, _)| *k == "err") {
            tracing::warn!(
                target: "a3s_push::access",
                layer,
                method,
                name,
                partition,
                offset,
                took,
                err = field("err"),
                "push failed"
            );
        } else {
            tracing::info!(
                target: "a3s_push::access",
                layer,
                method,
                name,
                partition,
                offset,
                took,
                "push served"
            );
        }
    }
}

/// Writes one record per call after the inner operation returns
pub struct LoggingOperation<O> {
    inner: O,
    logger: Arc<dyn Logger>,
    layer: &'static str,
}

impl<O: Operation> LoggingOperation<O> {
    pub fn new(inner: O, logger: Arc<dyn Logger>, layer: &'static str) -> Self {
        Self {
            inner,
            logger,
            layer,
        }
    }
}

#[async_trait]
impl<O: Operation> Operation for LoggingOperation<O> {
    async fn push(&self, ctx: Context, event: Event) -> Result<Placement> {
        let name = event.name.clone();
        let started = Instant::now();

        let result = self.inner.push(ctx, event).await;

        let placement = result.as_ref().copied().unwrap_or_default();
        let mut fields = vec![
            ("layer", self.layer.to_string()),
            ("method", super::METHOD.to_string()),
            ("name", name),
            ("partition", placement.partition.to_string()),
            ("offset", placement.offset.to_string()),
            ("took", format!("{:?}", started.elapsed())),
        ];
        if let Err(ref e) = result {
            fields.push(("err", e.to_string()));
        }
        self.logger.log(&fields);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
    use tracing_subscriber::Layer;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(tracing::Level, Vec<&'static str>)>>>);

    impl<S: tracing::Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
            let names = event.metadata().fields().iter().map(|f| f.name()).collect();
            self.0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), names));
        }
    }

    fn record(fields: &[(&'static str, String)]) -> (tracing::Level, Vec<&'static str>) {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(captured.clone());
        tracing::subscriber::with_default(subscriber, || TracingLogger.log(fields));
        let mut events = captured.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        events.remove(0)
    }

    fn base_fields() -> Vec<(&'static str, String)> {
        vec![
            ("layer", "service".to_string()),
            ("method", "push".to_string()),
            ("name", "party.created".to_string()),
            ("partition", "2".to_string()),
            ("offset", "99".to_string()),
            ("took", "1ms".to_string()),
        ]
    }

    #[test]
    fn test_tracing_logger_emits_structured_fields() {
        let (level, names) = record(&base_fields());
        assert_eq!(level, tracing::Level::INFO);
        for key in ["layer", "method", "name", "partition", "offset", "took"] {
            assert!(names.contains(&key), "missing field {}", key);
        }
        assert!(!names.contains(&"err"));
    }

    #[test]
    fn test_tracing_logger_warns_on_error() {
        let mut fields = base_fields();
        fields.push(("err", "broker unavailable".to_string()));
        let (level, names) = record(&fields);
        assert_eq!(level, tracing::Level::WARN);
        assert!(names.contains(&"err"));
    }
}
