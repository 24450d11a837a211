//! Session layer state machine.
//!
//! Manages connection lifecycle, the auth handshake, and inbound frame
//! routing. Uses the action pattern: methods take the current wall-clock
//! stamp as input and return actions for the driver to execute. This
//! keeps the state machine pure (no I/O) and makes testing
//! straightforward.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐ begin_connect ┌────────────┐ transport_opened ┌───────────┐
//! │ Disconnected │──────────────>│ Connecting │─────────────────>│ Connected │
//! └──────────────┘               └────────────┘                  └───────────┘
//!        ↑                              │                              │ auth
//!        │ transport_closed /           │ transport_error              ↓
//!        │ disconnect_requested         ↓                     ┌───────────────┐
//!        │                         ┌─────────┐    auth failure│ Authenticated │
//!        └─────────────────────────│  Error  │<───────────────└───────────────┘
//!                                  └─────────┘
//! ```

use impulse_crypto::MessageCipher;
use impulse_proto::{AuthOutcome, ChatMessage, Classified, Envelope, TechnicalPayload, classify};

use crate::{error::ConnectionError, session::SessionContext, stamp::Stamp};

/// WebSocket close code sent on a user-requested disconnect.
pub const NORMAL_CLOSE_CODE: u16 = 1000;

/// Fallback banner when the server's auth reply carries no message.
const CONNECTED_BANNER: &str = "Connected to chat";

/// Actions returned by the connection state machine.
///
/// The driver (test harness or production transport task) executes
/// these in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionAction {
    /// Send this text frame to the peer
    SendText(String),

    /// Surface this message to subscribers
    Deliver(ChatMessage),

    /// Close the underlying transport with this code
    CloseTransport {
        /// WebSocket close code
        code: u16,
    },

    /// Append this line to the diagnostic log sink
    Log(String),
}

/// Connection state
///
/// The single source of lifecycle truth; authentication is a state, not
/// a separate flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport; initial and post-close state
    Disconnected,
    /// Transport dial in progress
    Connecting,
    /// Transport open, auth request sent, awaiting the server's verdict
    Connected,
    /// Handshake accepted; messages flow
    Authenticated,
    /// Transport failure or rejected handshake
    Error,
}

/// Connection state machine
///
/// Manages lifecycle and the auth handshake for a single connection
/// attempt. One machine per attempt: reconnecting means constructing a
/// fresh machine with a fresh [`SessionContext`], which makes
/// re-entrant connects supersede by construction.
///
/// This is a pure state machine - no I/O, no clock. Time is passed as
/// a [`Stamp`] to methods that need it.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Current state
    state: ConnectionState,
    /// Connect parameters, bound at construction
    context: SessionContext,
    /// Message cipher derived from the context's passphrase
    cipher: MessageCipher,
}

impl Connection {
    /// Create a new machine in [`ConnectionState::Disconnected`] state.
    pub fn new(context: SessionContext) -> Self {
        let cipher = MessageCipher::new(context.encryption_key.as_deref().unwrap_or_default());
        Self { state: ConnectionState::Disconnected, context, cipher }
    }

    /// Current connection state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Connect parameters this machine was built with
    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Start a connection attempt (driver dials the transport).
    ///
    /// # Errors
    ///
    /// - `ConnectionError::InvalidState` unless in Disconnected or
    ///   Error state
    pub fn begin_connect(&mut self) -> Result<Vec<ConnectionAction>, ConnectionError> {
        if !matches!(self.state, ConnectionState::Disconnected | ConnectionState::Error) {
            return Err(ConnectionError::InvalidState {
                state: self.state,
                operation: "begin_connect".to_string(),
            });
        }

        self.state = ConnectionState::Connecting;
        tracing::debug!(url = %self.context.url, "connecting");

        Ok(vec![ConnectionAction::Log(format!("connecting to {}", self.context.url))])
    }

    /// Transport dial succeeded; sends the auth request.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::InvalidState` if not in Connecting state
    /// - `ConnectionError::Protocol` if the auth envelope fails to
    ///   encode
    pub fn transport_opened(
        &mut self,
        stamp: &Stamp,
    ) -> Result<Vec<ConnectionAction>, ConnectionError> {
        if self.state != ConnectionState::Connecting {
            return Err(ConnectionError::InvalidState {
                state: self.state,
                operation: "transport_opened".to_string(),
            });
        }

        self.state = ConnectionState::Connected;

        let auth = Envelope::auth_request(
            &self.context.display_name,
            self.context.password.as_deref(),
            stamp.unix,
        );

        Ok(vec![
            ConnectionAction::SendText(auth.encode()?),
            ConnectionAction::Log("transport open, auth request sent".to_string()),
        ])
    }

    /// Process one inbound text frame.
    ///
    /// Total: malformed frames degrade to plain-text messages, unknown
    /// frames to log entries. Technical frames drive the handshake;
    /// content bodies are decrypted through the session cipher before
    /// delivery.
    pub fn handle_text(&mut self, text: &str, stamp: &Stamp) -> Vec<ConnectionAction> {
        match classify(text, &stamp.clock) {
            Classified::Technical(payload) => self.handle_technical(&payload, stamp),
            Classified::Message(mut message) => {
                let mut actions = Vec::new();

                if message.category == impulse_proto::MessageCategory::Content {
                    match self.cipher.try_decrypt(&message.content) {
                        Ok(plaintext) => message.content = plaintext,
                        Err(err) => {
                            // Unencrypted peer or wrong key: surface the
                            // raw body rather than dropping the message.
                            actions.push(ConnectionAction::Log(format!(
                                "decrypt failed ({err}), showing raw body"
                            )));
                        },
                    }
                }

                actions.push(ConnectionAction::Deliver(message));
                actions
            },
            Classified::Discard(reason) => {
                tracing::debug!(%reason, "discarding inbound frame");
                vec![ConnectionAction::Log(format!("discarded frame: {reason}"))]
            },
        }
    }

    /// Compose and queue an outbound chat message.
    ///
    /// The body is encrypted when a key is configured; the `Deliver`
    /// action echoes the plaintext locally as an own-message.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::NotAuthenticated` unless the handshake
    ///   completed
    /// - `ConnectionError::EmptyMessage` for whitespace-only text
    /// - `ConnectionError::Protocol` if the envelope fails to encode
    pub fn compose_message(
        &mut self,
        text: &str,
        stamp: &Stamp,
    ) -> Result<Vec<ConnectionAction>, ConnectionError> {
        if self.state != ConnectionState::Authenticated {
            return Err(ConnectionError::NotAuthenticated { state: self.state });
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(ConnectionError::EmptyMessage);
        }

        let body = self.cipher.encrypt(text);
        let envelope = Envelope::content(&self.context.display_name, &body, stamp.unix);

        Ok(vec![
            ConnectionAction::SendText(envelope.encode()?),
            ConnectionAction::Deliver(ChatMessage::own(
                self.context.display_name.clone(),
                text,
                stamp.clock.clone(),
            )),
        ])
    }

    /// Transport failed; surfaces the failure as a system message.
    pub fn transport_error(&mut self, reason: &str, stamp: &Stamp) -> Vec<ConnectionAction> {
        tracing::warn!(%reason, "transport error");
        self.state = ConnectionState::Error;

        vec![
            ConnectionAction::Deliver(ChatMessage::system(
                format!("Connection error: {reason}"),
                stamp.clock.clone(),
            )),
            ConnectionAction::Log(format!("transport error: {reason}")),
        ]
    }

    /// Transport closed (peer close or after a requested disconnect).
    pub fn transport_closed(&mut self) -> Vec<ConnectionAction> {
        self.state = ConnectionState::Disconnected;
        vec![ConnectionAction::Log("transport closed".to_string())]
    }

    /// User-requested disconnect; allowed from any state.
    pub fn disconnect_requested(&mut self) -> Vec<ConnectionAction> {
        self.state = ConnectionState::Disconnected;

        vec![
            ConnectionAction::CloseTransport { code: NORMAL_CLOSE_CODE },
            ConnectionAction::Log("disconnect requested".to_string()),
        ]
    }

    /// Swap the cipher passphrase at runtime.
    ///
    /// Affects all subsequent encryption and decryption; an empty key
    /// disables the cipher.
    pub fn update_encryption_key(&mut self, key: &str) -> Vec<ConnectionAction> {
        self.cipher = MessageCipher::new(key);
        self.context.encryption_key = (!key.is_empty()).then(|| key.to_string());

        let entry = if self.cipher.is_enabled() {
            "encryption key updated"
        } else {
            "encryption disabled"
        };
        vec![ConnectionAction::Log(entry.to_string())]
    }

    /// Auth handshake and post-auth technical frame handling.
    fn handle_technical(
        &mut self,
        payload: &TechnicalPayload,
        stamp: &Stamp,
    ) -> Vec<ConnectionAction> {
        match self.state {
            ConnectionState::Connected => match payload.outcome() {
                AuthOutcome::Success => {
                    self.state = ConnectionState::Authenticated;
                    tracing::info!("authenticated");

                    let banner = if payload.message.is_empty() {
                        CONNECTED_BANNER.to_string()
                    } else {
                        payload.message.clone()
                    };

                    vec![
                        ConnectionAction::Deliver(ChatMessage::info(banner, stamp.clock.clone())),
                        ConnectionAction::Log("authentication accepted".to_string()),
                    ]
                },
                AuthOutcome::Failure { reason } => {
                    self.state = ConnectionState::Error;
                    tracing::warn!(%reason, "authentication rejected");

                    vec![
                        ConnectionAction::Deliver(ChatMessage::system(
                            format!("Authentication failed: {reason}"),
                            stamp.clock.clone(),
                        )),
                        ConnectionAction::Log(format!("authentication rejected: {reason}")),
                    ]
                },
            },
            // Post-handshake technical frames are protocol-internal
            // and never surface as chat.
            _ => vec![ConnectionAction::Log(
                "ignoring technical frame outside handshake".to_string(),
            )],
        }
    }
}
