//! Inbound frame classification.
//!
//! Pure transform from a raw text frame to either a handshake input, a
//! renderable [`ChatMessage`], or an explicit discard. Never panics and
//! never errors: anything unparseable degrades to a plain-text message,
//! anything unroutable to a discard with a reason.

use crate::{
    envelope::{Envelope, EnvelopeKind},
    errors::ProtocolError,
    message::ChatMessage,
    payloads::{ContentPayload, InfoPayload, TechnicalPayload},
};

/// Outcome of classifying one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Handshake input; consumed by the connection state machine and
    /// never surfaced as chat.
    Technical(TechnicalPayload),

    /// A renderable message. For `Content` entries the body may still
    /// be ciphertext; decryption is the session's concern.
    Message(ChatMessage),

    /// Frame is tolerated but not surfaced.
    Discard(DiscardReason),
}

/// Why a frame was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// JSON object without a `type` field.
    MissingType,
    /// Unrecognized `type` value (original casing preserved).
    UnknownType(String),
}

impl std::fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingType => write!(f, "envelope without type field"),
            Self::UnknownType(kind) => write!(f, "unknown envelope type {kind:?}"),
        }
    }
}

/// Classify one received text frame.
///
/// `local_time` is the wall-clock `HH:mm` stamp attached to any
/// surfaced message; the envelope's own timestamp is ignored for
/// display.
pub fn classify(text: &str, local_time: &str) -> Classified {
    let envelope = match Envelope::parse(text) {
        Ok(envelope) => envelope,
        Err(ProtocolError::MissingType) => return Classified::Discard(DiscardReason::MissingType),
        Err(_) => return plain_text(text, local_time),
    };

    match envelope.kind_enum() {
        EnvelopeKind::Technical => {
            Classified::Technical(TechnicalPayload::from_envelope(&envelope))
        },
        EnvelopeKind::Informational => {
            let payload = InfoPayload::from_envelope(&envelope);
            Classified::Message(ChatMessage::info(payload.notice(), local_time))
        },
        EnvelopeKind::Content => {
            let payload = ContentPayload::from_envelope(&envelope);
            Classified::Message(ChatMessage::content(
                payload.sender_name,
                payload.content,
                local_time,
            ))
        },
        EnvelopeKind::System => {
            let content = envelope.payload_str(&["content"]).unwrap_or_default();
            Classified::Message(ChatMessage::system(content, local_time))
        },
        EnvelopeKind::Unknown(kind) => Classified::Discard(DiscardReason::UnknownType(kind)),
    }
}

/// Heuristic for non-JSON frames.
///
/// `[name] content` splits into sender and body; anything else is
/// surfaced whole as a system message.
fn plain_text(text: &str, local_time: &str) -> Classified {
    if let Some(rest) = text.strip_prefix('[')
        && let Some((sender, content)) = rest.split_once(']')
    {
        return Classified::Message(ChatMessage::content(
            sender,
            content.trim_start(),
            local_time,
        ));
    }

    Classified::Message(ChatMessage::system(text, local_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageCategory, SYSTEM_SENDER, UNKNOWN_SENDER};

    const T: &str = "12:30";

    fn expect_message(text: &str) -> ChatMessage {
        match classify(text, T) {
            Classified::Message(message) => message,
            other => panic!("expected message for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn technical_frames_route_to_handshake() {
        let classified = classify(r#"{"type":"technical","payload":{"success":true}}"#, T);
        assert!(matches!(classified, Classified::Technical(_)));
    }

    #[test]
    fn informational_becomes_full_width_info() {
        let message = expect_message(
            r#"{"type":"informational","payload":{"event":"joined","user_name":"Alice"}}"#,
        );
        assert_eq!(message.category, MessageCategory::Info);
        assert!(message.is_full_width);
        assert_eq!(message.content, "User Alice joined the chat");
        assert_eq!(message.timestamp, T);
    }

    #[test]
    fn presence_notice_is_synthesized_even_with_content() {
        let message = expect_message(
            r#"{"type":"informational","payload":{"event":"joined","user_name":"Alice","content":"Alice is here"}}"#,
        );
        assert_eq!(message.content, "User Alice joined the chat");
    }

    #[test]
    fn content_keeps_sender_and_body() {
        let message = expect_message(
            r#"{"type":"content","payload":{"sender_name":"Bob","content":"hello"}}"#,
        );
        assert_eq!(message.category, MessageCategory::Content);
        assert!(!message.is_full_width);
        assert_eq!(message.sender, "Bob");
        assert_eq!(message.content, "hello");
    }

    #[test]
    fn content_without_sender_defaults() {
        let message = expect_message(r#"{"type":"content","payload":{"content":"hi"}}"#);
        assert_eq!(message.sender, UNKNOWN_SENDER);
    }

    #[test]
    fn system_surfaces_payload_content() {
        let message = expect_message(r#"{"type":"system","payload":{"content":"server restart"}}"#);
        assert_eq!(message.category, MessageCategory::System);
        assert_eq!(message.sender, SYSTEM_SENDER);
        assert_eq!(message.content, "server restart");
    }

    #[test]
    fn system_without_content_surfaces_empty_body() {
        let message = expect_message(r#"{"type":"system","payload":{"code":503}}"#);
        assert_eq!(message.category, MessageCategory::System);
        assert_eq!(message.content, "");
    }

    #[test]
    fn missing_type_is_discarded() {
        assert_eq!(
            classify(r#"{"payload":{"content":"x"}}"#, T),
            Classified::Discard(DiscardReason::MissingType)
        );
    }

    #[test]
    fn unknown_type_is_discarded_with_reason() {
        match classify(r#"{"type":"telemetry","payload":{}}"#, T) {
            Classified::Discard(DiscardReason::UnknownType(kind)) => assert_eq!(kind, "telemetry"),
            other => panic!("expected discard, got {other:?}"),
        }
    }

    #[test]
    fn bracket_pattern_splits_sender() {
        let message = expect_message("[alice] good morning");
        assert_eq!(message.category, MessageCategory::Content);
        assert_eq!(message.sender, "alice");
        assert_eq!(message.content, "good morning");
    }

    #[test]
    fn plain_text_becomes_system() {
        let message = expect_message("server going down");
        assert_eq!(message.category, MessageCategory::System);
        assert_eq!(message.content, "server going down");
    }

    #[test]
    fn unterminated_bracket_is_plain_text() {
        let message = expect_message("[no closing bracket");
        assert_eq!(message.category, MessageCategory::System);
        assert_eq!(message.content, "[no closing bracket");
    }
}
