//! WebSocket transport driver.
//!
//! Provides [`connect`] which dials the server, spawns a driver task
//! that owns the socket and the Sans-IO [`Connection`] machine, and
//! returns a [`ChatSession`] handle. The driver is a thin layer: it
//! bridges socket frames and session commands into machine calls and
//! executes the returned actions; protocol logic stays in the machine.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use impulse_core::{
    Connection, ConnectionAction, ConnectionState, LogSink, SessionContext, Stamp,
};
use impulse_proto::ChatMessage;
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot, watch},
    time::timeout,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        Message,
        protocol::{CloseFrame, frame::coding::CloseCode},
    },
};

/// Time allowed for the WebSocket dial to complete.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivery channel capacity; senders await when subscribers lag.
const MESSAGE_BUFFER: usize = 64;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Dial did not complete within the configured timeout.
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Timeout for the WebSocket dial.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { connect_timeout: DEFAULT_CONNECT_TIMEOUT }
    }
}

/// Commands from the session handle to the driver task.
enum Command {
    /// Compose and send a chat message; replies whether the transport
    /// accepted the frame for queueing.
    Send {
        text: String,
        reply: oneshot::Sender<bool>,
    },
    /// Swap the cipher passphrase.
    UpdateKey(String),
    /// Close the transport with a normal close code.
    Disconnect,
}

/// Handle to a connected chat session.
///
/// Each [`connect`] call produces an independent session: its own
/// machine, its own channels, its own driver task. Dropping the handle
/// aborts the driver.
pub struct ChatSession {
    commands: mpsc::Sender<Command>,
    messages: Option<mpsc::Receiver<ChatMessage>>,
    state: watch::Receiver<ConnectionState>,
    logs: LogSink,
    abort_handle: tokio::task::AbortHandle,
}

impl ChatSession {
    /// Next surfaced message, or `None` once the driver has stopped
    /// (or after [`Self::take_messages`]).
    ///
    /// Messages accumulate in a bounded buffer while no one is
    /// receiving; a slow consumer backpressures the driver rather than
    /// losing entries.
    pub async fn next_message(&mut self) -> Option<ChatMessage> {
        match self.messages.as_mut() {
            Some(messages) => messages.recv().await,
            None => None,
        }
    }

    /// Detach the message stream for independent consumption, e.g. a
    /// dedicated render loop. `None` if already taken.
    pub fn take_messages(&mut self) -> Option<mpsc::Receiver<ChatMessage>> {
        self.messages.take()
    }

    /// Watch handle over the connection state; safe for any number of
    /// observers.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Current connection state.
    #[must_use]
    pub fn current_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Send a chat message.
    ///
    /// Returns `true` when the transport accepted the frame for
    /// queueing (not delivery). `false` before authentication, for
    /// empty text, or once the session is down; there is no local
    /// buffering and no retry.
    pub async fn send_message(&self, text: impl Into<String>) -> bool {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = Command::Send { text: text.into(), reply: reply_tx };
        if self.commands.send(command).await.is_err() {
            return false;
        }
        reply_rx.await.unwrap_or(false)
    }

    /// Swap the cipher passphrase for all subsequent traffic.
    pub async fn update_encryption_key(&self, key: impl Into<String>) {
        let _ = self.commands.send(Command::UpdateKey(key.into())).await;
    }

    /// Close the session with a normal (1000) close code.
    ///
    /// Close errors are swallowed; the state always ends at
    /// [`ConnectionState::Disconnected`].
    pub async fn disconnect(&self) {
        let _ = self.commands.send(Command::Disconnect).await;
    }

    /// Diagnostic log entries collected by this session.
    pub fn logs(&self) -> &LogSink {
        &self.logs
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Connect to a chat server and spawn the session driver.
///
/// # Errors
///
/// - [`TransportError::Timeout`] when the dial exceeds the configured
///   timeout
/// - [`TransportError::Connection`] for dial and upgrade failures
/// - [`TransportError::Protocol`] if the machine rejects the attempt
pub async fn connect(
    context: SessionContext,
    config: TransportConfig,
) -> Result<ChatSession, TransportError> {
    let logs = LogSink::new();
    let mut machine = Connection::new(context.clone());

    for action in machine
        .begin_connect()
        .map_err(|e| TransportError::Protocol(e.to_string()))?
    {
        if let ConnectionAction::Log(entry) = action {
            logs.add(&entry);
        }
    }

    let ws = match timeout(config.connect_timeout, connect_async(context.url.as_str())).await {
        Ok(Ok((ws, _response))) => ws,
        Ok(Err(e)) => {
            logs.add(&format!("connect failed: {e}"));
            return Err(TransportError::Connection(e.to_string()));
        },
        Err(_) => {
            logs.add("connect timed out");
            return Err(TransportError::Timeout(config.connect_timeout));
        },
    };

    tracing::debug!(url = %context.url, "websocket connected");

    let (command_tx, command_rx) = mpsc::channel(16);
    let (message_tx, message_rx) = mpsc::channel(MESSAGE_BUFFER);
    let (state_tx, state_rx) = watch::channel(machine.state());

    let driver = SessionDriver {
        machine,
        messages: message_tx,
        state: state_tx,
        logs: logs.clone(),
    };
    let handle = tokio::spawn(driver.run(ws, command_rx));

    Ok(ChatSession {
        commands: command_tx,
        messages: Some(message_rx),
        state: state_rx,
        logs,
        abort_handle: handle.abort_handle(),
    })
}

/// Owns the socket and the machine for one session.
struct SessionDriver {
    machine: Connection,
    messages: mpsc::Sender<ChatMessage>,
    state: watch::Sender<ConnectionState>,
    logs: LogSink,
}

impl SessionDriver {
    async fn run(mut self, ws: WsStream, mut commands: mpsc::Receiver<Command>) {
        let (mut sink, mut stream) = ws.split();

        // Transport is open: the machine emits the auth request.
        match self.machine.transport_opened(&Stamp::now()) {
            Ok(actions) => {
                if let Err(e) = self.execute(actions, &mut sink).await {
                    self.fail(&e.to_string(), &mut sink).await;
                    return;
                }
            },
            Err(e) => {
                self.fail(&e.to_string(), &mut sink).await;
                return;
            },
        }
        self.publish_state();

        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        let actions = self.machine.handle_text(text.as_str(), &Stamp::now());
                        if let Err(e) = self.execute(actions, &mut sink).await {
                            self.fail(&e.to_string(), &mut sink).await;
                            break;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        let actions = self.machine.transport_closed();
                        let _ = self.execute(actions, &mut sink).await;
                        break;
                    },
                    // Control frames are answered by tungstenite;
                    // binary frames are not part of this protocol.
                    Some(Ok(_)) => {},
                    Some(Err(e)) => {
                        self.fail(&e.to_string(), &mut sink).await;
                        break;
                    },
                },
                command = commands.recv() => match command {
                    Some(Command::Send { text, reply }) => {
                        let accepted = self.send(&text, &mut sink).await;
                        let _ = reply.send(accepted);
                    },
                    Some(Command::UpdateKey(key)) => {
                        let actions = self.machine.update_encryption_key(&key);
                        let _ = self.execute(actions, &mut sink).await;
                    },
                    // All handle clones dropped counts as a disconnect.
                    Some(Command::Disconnect) | None => {
                        let actions = self.machine.disconnect_requested();
                        let _ = self.execute(actions, &mut sink).await;
                        break;
                    },
                },
            }
            self.publish_state();
        }

        self.publish_state();
    }

    /// Compose and transmit one outbound message.
    async fn send(&mut self, text: &str, sink: &mut WsSink) -> bool {
        match self.machine.compose_message(text, &Stamp::now()) {
            Ok(actions) => match self.execute(actions, sink).await {
                Ok(()) => true,
                Err(e) => {
                    self.fail(&e.to_string(), sink).await;
                    false
                },
            },
            Err(e) => {
                tracing::debug!(error = %e, "message rejected");
                self.logs.add(&format!("send rejected: {e}"));
                false
            },
        }
    }

    /// Execute machine actions in order; errors are wire failures.
    async fn execute(
        &mut self,
        actions: Vec<ConnectionAction>,
        sink: &mut WsSink,
    ) -> Result<(), tokio_tungstenite::tungstenite::Error> {
        for action in actions {
            match action {
                ConnectionAction::SendText(text) => {
                    sink.send(Message::text(text)).await?;
                },
                ConnectionAction::Deliver(message) => {
                    // A dropped receiver just means no one is listening.
                    let _ = self.messages.send(message).await;
                },
                ConnectionAction::CloseTransport { code } => {
                    let frame = CloseFrame { code: CloseCode::from(code), reason: "".into() };
                    let _ = sink.send(Message::Close(Some(frame))).await;
                },
                ConnectionAction::Log(entry) => {
                    tracing::debug!("{entry}");
                    self.logs.add(&entry);
                },
            }
        }
        Ok(())
    }

    /// Route a transport failure through the machine and surface it.
    async fn fail(&mut self, reason: &str, sink: &mut WsSink) {
        let actions = self.machine.transport_error(reason, &Stamp::now());
        // Only delivery and log actions remain at this point; the wire
        // is already gone.
        let _ = self.execute(actions, sink).await;
        self.publish_state();
    }

    fn publish_state(&self) {
        let next = self.machine.state();
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
