//! Per-call context threaded through the operation chain
//!
//! Carries the active trace position so spans started further down the
//! chain (or on the far side of a transport) join the same trace.

/// Trace position of the current call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    /// 32 lowercase hex characters
    pub trace_id: String,

    /// 16 lowercase hex characters
    pub span_id: String,
}

impl SpanContext {
    /// Start a new trace
    pub fn root() -> Self {
        let trace = uuid::Uuid::new_v4().simple().to_string();
        Self {
            trace_id: trace,
            span_id: new_span_id(),
        }
    }

    /// A new span within this trace
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: new_span_id(),
        }
    }

    /// Render as a W3C `traceparent` header value
    pub fn to_traceparent(&self) -> String {
        format!("00-{}-{}-01", self.trace_id, self.span_id)
    }

    /// Parse a W3C `traceparent` header value
    pub fn from_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let flags = parts.next()?;
        if parts.next().is_some() || version != "00" || flags.len() != 2 {
            return None;
        }
        if !is_hex_id(trace_id, 32) || !is_hex_id(span_id, 16) {
            return None;
        }
        Some(Self {
            trace_id: trace_id.to_string(),
            span_id: span_id.to_string(),
        })
    }
}

/// Ambient context passed to every operation in the chain
#[derive(Debug, Clone, Default)]
pub struct Context {
    span: Option<SpanContext>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context continuing an existing trace
    pub fn with_span(span: SpanContext) -> Self {
        Self { span: Some(span) }
    }

    pub fn span(&self) -> Option<&SpanContext> {
        self.span.as_ref()
    }
}

fn new_span_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}

// All-zero ids are invalid per the W3C spec
fn is_hex_id(s: &str, len: usize) -> bool {
    s.len() == len
        && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        && s.bytes().any(|b| b != b'0')
}
