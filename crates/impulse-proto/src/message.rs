//! Chat history entries derived from inbound envelopes.

/// Rendering category of a surfaced message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    /// Presence notices; rendered full-width without a sender bubble.
    Info,
    /// User chat text.
    Content,
    /// Errors and server notices.
    System,
    /// Protocol-internal; never rendered in the chat history.
    Technical,
}

/// Default sender for content frames that carry no sender field.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Sender label for system notices.
pub const SYSTEM_SENDER: &str = "System";

/// Default user name for presence notices missing one.
pub const DEFAULT_USER: &str = "User";

/// One entry in the chat history.
///
/// Immutable once created. `timestamp` is the local `HH:mm` wall-clock
/// stamp at classification time, never the envelope's claimed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Display name of the sender; empty for full-width notices.
    pub sender: String,
    /// Message body (already decrypted where applicable).
    pub content: String,
    /// Local `HH:mm` stamp.
    pub timestamp: String,
    /// Sent by the local user.
    pub is_own: bool,
    /// Rendered across the full chat width, without a sender bubble.
    pub is_full_width: bool,
    /// Rendering category.
    pub category: MessageCategory,
}

impl ChatMessage {
    /// Full-width informational notice.
    pub fn info(content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            sender: String::new(),
            content: content.into(),
            timestamp: timestamp.into(),
            is_own: false,
            is_full_width: true,
            category: MessageCategory::Info,
        }
    }

    /// Chat text from a remote user.
    pub fn content(
        sender: impl Into<String>,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            timestamp: timestamp.into(),
            is_own: false,
            is_full_width: false,
            category: MessageCategory::Content,
        }
    }

    /// System notice (errors, server messages).
    pub fn system(content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            sender: SYSTEM_SENDER.to_string(),
            content: content.into(),
            timestamp: timestamp.into(),
            is_own: false,
            is_full_width: false,
            category: MessageCategory::System,
        }
    }

    /// Locally echoed copy of a message the user just sent.
    pub fn own(
        sender: impl Into<String>,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self { is_own: true, ..Self::content(sender, content, timestamp) }
    }
}
