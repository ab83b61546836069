//! Error types for a3s-push

use thiserror::Error;

/// Errors that can occur in the push pipeline
#[derive(Debug, Error)]
pub enum PushError {
    /// Broker connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Publish failure (send or acknowledgement)
    #[error("publish error on topic '{topic}': {reason}")]
    Publish {
        topic: String,
        reason: String,
    },

    /// Failure reported by a broker client, carried verbatim
    #[error("{0}")]
    Broker(String),

    /// Inbound request could not be decoded by the transport
    #[error("decode error: {0}")]
    Decode(String),

    /// Outbound request failed before a response was received
    #[error("transport error: {0}")]
    Transport(String),

    /// Error reconstructed from a wire response
    #[error("{0}")]
    Remote(String),

    /// The call was dropped before the inner operation returned
    #[error("request cancelled")]
    Cancelled,

    /// HTTP server failure
    #[error("Server error: {0}")]
    Server(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PushError {
    /// Rebuild an error from the wire error string.
    ///
    /// An empty string means "no error"; anything else becomes a
    /// `Remote` error whose message is exactly the wire string.
    pub fn from_wire(message: &str) -> Option<Self> {
        if message.is_empty() {
            None
        } else {
            Some(Self::Remote(message.to_string()))
        }
    }
}

/// Result type alias for push operations
pub type Result<T> = std::result::Result<T, PushError>;
