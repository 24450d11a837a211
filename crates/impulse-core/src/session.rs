//! Per-connection session parameters.

/// Everything one connection attempt needs, supplied whole.
///
/// A context is bound to a single [`crate::Connection`] at construction
/// and never merged with previous attempts: reconnecting with different
/// credentials means building a fresh context and a fresh machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// WebSocket endpoint, e.g. `ws://host:port/chat`.
    pub url: String,
    /// Display name sent in the auth request and echoed on own messages.
    pub display_name: String,
    /// Room password; `None` (or empty) for open rooms.
    pub password: Option<String>,
    /// Shared cipher passphrase; `None` (or empty) disables encryption.
    pub encryption_key: Option<String>,
}

impl SessionContext {
    /// Context for an open, unencrypted room.
    pub fn new(url: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            display_name: display_name.into(),
            password: None,
            encryption_key: None,
        }
    }

    /// Sets the room password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the cipher passphrase.
    #[must_use]
    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = Some(key.into());
        self
    }
}
