//! Wire envelope type.
//!
//! Every frame on the wire is one flat JSON object:
//!
//! ```json
//! {"type": "content", "payload": {...}, "timestamp": 1700000000}
//! ```
//!
//! Inbound parsing is defensive: a missing `payload` falls back to the
//! envelope object itself (older servers inline payload fields at the
//! top level), a missing `timestamp` becomes 0, and the `type` string
//! is matched case-insensitively. The envelope timestamp is
//! informational only; surfaced messages carry a locally generated
//! clock stamp instead.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::errors::{ProtocolError, Result};

/// Recognized envelope categories.
///
/// `technical`/`auth_response` and `informational`/`info` are wire
/// aliases. Unrecognized values are preserved in `Unknown` so callers
/// can log them before discarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// Protocol-internal frames (auth request/response).
    Technical,
    /// Presence notices (user joined/left).
    Informational,
    /// Chat text from users.
    Content,
    /// Server errors and notices.
    System,
    /// Tolerated but unhandled type value (original casing preserved).
    Unknown(String),
}

/// One wire frame: `{type, payload, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Raw `type` string as it appeared on the wire.
    #[serde(rename = "type")]
    pub kind: String,

    /// Type-dependent payload object.
    pub payload: Value,

    /// Seconds since the Unix epoch, as claimed by the sender.
    pub timestamp: u64,
}

impl Envelope {
    /// Parse an inbound text frame.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::NotJson`] if the text is not JSON (callers
    ///   apply the plain-text heuristic instead)
    /// - [`ProtocolError::NotAnObject`] for JSON that is not an object
    /// - [`ProtocolError::MissingType`] when no usable `type` field is
    ///   present (logged and discarded upstream)
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::NotJson(e.to_string()))?;

        let Value::Object(map) = value else {
            return Err(ProtocolError::NotAnObject);
        };

        let kind = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?
            .to_string();

        // Servers predating the envelope format put payload fields at
        // the top level; fall back to the whole object in that case.
        let payload = match map.get("payload") {
            Some(payload @ Value::Object(_)) => payload.clone(),
            _ => Value::Object(map.clone()),
        };

        let timestamp = map.get("timestamp").and_then(Value::as_u64).unwrap_or(0);

        Ok(Self { kind, payload, timestamp })
    }

    /// Envelope category, matched case-insensitively.
    pub fn kind_enum(&self) -> EnvelopeKind {
        match self.kind.to_lowercase().as_str() {
            "technical" | "auth_response" => EnvelopeKind::Technical,
            "informational" | "info" => EnvelopeKind::Informational,
            "content" => EnvelopeKind::Content,
            "system" => EnvelopeKind::System,
            _ => EnvelopeKind::Unknown(self.kind.clone()),
        }
    }

    /// Canonical auth request sent right after the transport opens.
    ///
    /// The `password` field is omitted entirely when empty, matching
    /// server expectations for open rooms.
    pub fn auth_request(name: &str, password: Option<&str>, timestamp: u64) -> Self {
        let mut payload = Map::new();
        payload.insert("name".to_string(), Value::String(name.to_string()));
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            payload.insert("password".to_string(), Value::String(password.to_string()));
        }

        Self { kind: "technical".to_string(), payload: Value::Object(payload), timestamp }
    }

    /// Canonical content envelope; `content` may be ciphertext.
    pub fn content(sender_name: &str, content: &str, timestamp: u64) -> Self {
        Self {
            kind: "content".to_string(),
            payload: json!({ "sender_name": sender_name, "content": content }),
            timestamp,
        }
    }

    /// Synthesized informational notice (e.g. the connected banner).
    pub fn informational(content: &str, timestamp: u64) -> Self {
        Self {
            kind: "informational".to_string(),
            payload: json!({ "content": content }),
            timestamp,
        }
    }

    /// Synthesized system/error notice.
    pub fn system(content: &str, timestamp: u64) -> Self {
        Self { kind: "system".to_string(), payload: json!({ "content": content }), timestamp }
    }

    /// Serialize for the wire.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Serialize`] if JSON serialization fails, which
    /// cannot happen for envelopes built by the constructors above but
    /// is propagated rather than asserted away.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// String field from the payload, with fallback keys applied in
    /// order. `None` when no key holds a string.
    pub fn payload_str<'a>(&'a self, keys: &[&str]) -> Option<&'a str> {
        keys.iter().find_map(|key| self.payload.get(key).and_then(Value::as_str))
    }
}
