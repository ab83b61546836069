//! Core types for the push pipeline
//!
//! Wire types use camelCase JSON serialization, matching the rest of the
//! A3S services. `userID` is accepted as an alias for `userId`.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::PushError;

/// A named event pushed by a caller
///
/// The payload is an arbitrary JSON value. It is never typed further
/// inside the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event name (e.g., "party.created")
    pub name: String,

    /// Opaque caller-supplied payload
    pub payload: serde_json::Value,

    /// Identifier of the user the event belongs to
    pub user_id: i64,
}

impl Event {
    /// Create a new event
    pub fn new(name: impl Into<String>, payload: serde_json::Value, user_id: i64) -> Self {
        Self {
            name: name.into(),
            payload,
            user_id,
        }
    }
}

/// Where the broker durably placed a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Partition the message was appended to
    pub partition: i32,

    /// Partition-local offset of the message
    pub offset: i64,
}

impl Placement {
    pub fn new(partition: i32, offset: i64) -> Self {
        Self { partition, offset }
    }
}

/// A serialized event ready to hand to a publisher
#[derive(Debug, Clone)]
pub struct EncodedMessage {
    /// Destination topic
    pub topic: String,

    /// Partition hint; `None` lets the publisher's partitioner decide
    pub partition: Option<i32>,

    /// Wire payload
    pub payload: Bytes,
}

/// Inbound "push an event" request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    pub name: String,

    #[serde(default)]
    pub payload: serde_json::Value,

    #[serde(alias = "userID")]
    pub user_id: i64,
}

impl PushRequest {
    pub fn into_event(self) -> Event {
        Event::new(self.name, self.payload, self.user_id)
    }
}

impl From<Event> for PushRequest {
    fn from(event: Event) -> Self {
        Self {
            name: event.name,
            payload: event.payload,
            user_id: event.user_id,
        }
    }
}

/// Outbound response to a push request
///
/// `error` is absent on success and always non-empty when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushResponse {
    pub partition: i32,

    pub offset: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PushResponse {
    /// Successful response carrying the broker placement
    pub fn ok(placement: Placement) -> Self {
        Self {
            partition: placement.partition,
            offset: placement.offset,
            error: None,
        }
    }

    /// Failed response carrying the partial placement and the error message
    pub fn failed(placement: Placement, err: &PushError) -> Self {
        let mut message = err.to_string();
        if message.is_empty() {
            message = "unknown error".to_string();
        }
        Self {
            partition: placement.partition,
            offset: placement.offset,
            error: Some(message),
        }
    }

    pub fn placement(&self) -> Placement {
        Placement::new(self.partition, self.offset)
    }

    /// Interpret the response, rebuilding the error from its message
    pub fn into_result(self) -> crate::error::Result<Placement> {
        let placement = self.placement();
        match self.error.as_deref().and_then(PushError::from_wire) {
            Some(err) => Err(err),
            None => Ok(placement),
        }
    }
}
