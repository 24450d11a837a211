//! Error types for envelope encoding and decoding.
//!
//! Inbound parsing is deliberately forgiving (missing fields get
//! defaults, unknown types are tolerated), so most decode paths never
//! produce an error at all. `ProtocolError` covers the cases that do:
//! non-JSON input, structurally unusable envelopes, and the (rare)
//! outbound serialization failure.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from envelope encoding/decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Input text is not valid JSON.
    #[error("not a JSON envelope: {0}")]
    NotJson(String),

    /// Input parsed as JSON but is not an envelope object.
    #[error("not an envelope object")]
    NotAnObject,

    /// Envelope object carries no `type` field.
    #[error("envelope has no type field")]
    MissingType,

    /// Outbound envelope could not be serialized.
    #[error("envelope serialization failed: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}
