//! Event codec: the broker wire format
//!
//! Events are written as compact JSON objects:
//! `{"name":"party.created","payload":{...},"userId":7}`.
//! Object keys inside the payload come out in sorted order, so encoding
//! the same event twice yields identical bytes.

use bytes::Bytes;

use crate::error::Result;
use crate::types::{EncodedMessage, Event};

/// Serialize an event into its broker payload.
///
/// # Panics
///
/// Panics if the event cannot be represented as JSON. A `serde_json::Value`
/// payload is always representable, so this indicates a broken caller
/// contract rather than a runtime condition. Nothing is published when it
/// happens.
pub fn encode(event: &Event) -> Bytes {
    match serde_json::to_vec(event) {
        Ok(buf) => Bytes::from(buf),
        Err(e) => panic!("event '{}' is not representable as JSON: {}", event.name, e),
    }
}

/// Encode an event for `topic`, leaving partition choice to the publisher
pub fn encode_message(event: &Event, topic: &str) -> EncodedMessage {
    EncodedMessage {
        topic: topic.to_string(),
        partition: None,
        payload: encode(event),
    }
}

/// Parse a broker payload back into an event
pub fn decode(payload: &[u8]) -> Result<Event> {
    Ok(serde_json::from_slice(payload)?)
}
