//! Typed views over envelope payloads.
//!
//! The wire payload is free-form JSON; these views apply the fallback
//! keys and defaults each category tolerates, so downstream code never
//! touches `serde_json::Value` directly. All accessors are total —
//! malformed payloads degrade to defaults, never errors.

use crate::{
    envelope::Envelope,
    message::{DEFAULT_USER, UNKNOWN_SENDER},
};

/// Substrings accepted as an authentication success signal when the
/// server omits the explicit `success` boolean. Matched
/// case-insensitively against `payload.message`; the Russian form is
/// kept for servers that localize their handshake replies.
const SUCCESS_KEYWORDS: [&str; 3] = ["success", "authenticated", "успешно"];

/// Fallback reason when an auth failure carries no `error` field.
const DEFAULT_AUTH_FAILURE: &str = "authentication rejected by server";

/// Result of evaluating a technical (auth response) payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Handshake accepted.
    Success,
    /// Handshake rejected.
    Failure {
        /// Server-provided reason, or a default.
        reason: String,
    },
}

/// View over a `technical` / `auth_response` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnicalPayload {
    /// Explicit success flag, when the server sends one.
    pub success: Option<bool>,
    /// Free-text status message.
    pub message: String,
    /// Failure reason, when provided.
    pub error: Option<String>,
}

impl TechnicalPayload {
    /// Extract the technical view from an envelope.
    pub fn from_envelope(envelope: &Envelope) -> Self {
        Self {
            success: envelope.payload.get("success").and_then(serde_json::Value::as_bool),
            message: envelope.payload_str(&["message"]).unwrap_or_default().to_string(),
            error: envelope.payload_str(&["error"]).map(str::to_string),
        }
    }

    /// Evaluate the handshake result.
    ///
    /// An explicit `success` boolean always wins; the keyword heuristic
    /// on `message` applies only when the field is absent. Absence of
    /// both the flag and any success keyword fails closed.
    pub fn outcome(&self) -> AuthOutcome {
        let accepted = match self.success {
            Some(explicit) => explicit,
            None => {
                let message = self.message.to_lowercase();
                SUCCESS_KEYWORDS.iter().any(|keyword| message.contains(keyword))
            },
        };

        if accepted {
            AuthOutcome::Success
        } else {
            AuthOutcome::Failure {
                reason: self
                    .error
                    .clone()
                    .unwrap_or_else(|| DEFAULT_AUTH_FAILURE.to_string()),
            }
        }
    }
}

/// View over an `informational` payload (presence events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoPayload {
    /// Event tag: `joined`, `left`, or anything else.
    pub event: String,
    /// Display name of the affected user.
    pub user_name: String,
    /// Pre-rendered notice text, when the server provides one.
    pub content: Option<String>,
}

impl InfoPayload {
    /// Extract the informational view from an envelope.
    pub fn from_envelope(envelope: &Envelope) -> Self {
        Self {
            event: envelope.payload_str(&["event"]).unwrap_or_default().to_string(),
            user_name: envelope
                .payload_str(&["user_name", "username"])
                .unwrap_or(DEFAULT_USER)
                .to_string(),
            content: envelope
                .payload_str(&["content"])
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }

    /// Human-readable notice text.
    ///
    /// `joined` and `left` always render the synthesized presence
    /// line; for any other event a server-provided `content` is
    /// surfaced, with a generic line as the fallback.
    pub fn notice(&self) -> String {
        match self.event.as_str() {
            "joined" => format!("User {} joined the chat", self.user_name),
            "left" => format!("User {} left the chat", self.user_name),
            event => match &self.content {
                Some(content) => content.clone(),
                None => format!("User {} {event}", self.user_name),
            },
        }
    }
}

/// View over a `content` payload (user chat text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPayload {
    /// Display name of the sender.
    pub sender_name: String,
    /// Message body; ciphertext until the session cipher is applied.
    pub content: String,
}

impl ContentPayload {
    /// Extract the content view from an envelope.
    pub fn from_envelope(envelope: &Envelope) -> Self {
        Self {
            sender_name: envelope
                .payload_str(&["sender_name", "user_name"])
                .unwrap_or(UNKNOWN_SENDER)
                .to_string(),
            content: envelope.payload_str(&["content", "message"]).unwrap_or_default().to_string(),
        }
    }
}
