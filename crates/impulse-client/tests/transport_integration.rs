//! Integration tests for the WebSocket transport.
//!
//! Each test runs an in-process tungstenite server with a scripted
//! handshake and verifies the driver end to end: dial, auth, message
//! flow, disconnect.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use impulse_client::{TransportConfig, connect};
use impulse_core::{ConnectionState, SessionContext};
use impulse_crypto::MessageCipher;
use impulse_proto::MessageCategory;
use tokio::{net::TcpListener, time::timeout};
use tokio_tungstenite::tungstenite::Message;

const AUTH_OK: &str = r#"{"type":"technical","payload":{"success":true}}"#;
const AUTH_REJECTED: &str =
    r#"{"type":"technical","payload":{"success":false,"error":"bad password"}}"#;

/// Server that replies to the auth request with `reply`, then echoes
/// every text frame back. Returns the ws:// URL.
async fn scripted_server(reply: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        // First frame is the client's auth request.
        let auth = ws.next().await.unwrap().unwrap();
        assert!(auth.to_text().unwrap().contains(r#""type":"technical""#));

        ws.send(Message::text(reply)).await.unwrap();

        while let Some(Ok(frame)) = ws.next().await {
            if frame.is_close() {
                break;
            }
            if frame.is_text() && ws.send(frame).await.is_err() {
                break;
            }
        }
    });

    format!("ws://{addr}")
}

async fn wait_for_state(
    session: &impulse_client::ChatSession,
    wanted: ConnectionState,
) -> ConnectionState {
    let mut state = session.state();
    timeout(Duration::from_secs(5), state.wait_for(|s| *s == wanted))
        .await
        .unwrap()
        .map(|s| *s)
        .unwrap()
}

#[tokio::test]
async fn client_connects_and_authenticates() {
    let url = scripted_server(AUTH_OK).await;
    let context = SessionContext::new(url, "Alice");

    let mut session = connect(context, TransportConfig::default()).await.unwrap();
    wait_for_state(&session, ConnectionState::Authenticated).await;

    // The success banner surfaces as a full-width info message.
    let banner = timeout(Duration::from_secs(5), session.next_message()).await.unwrap().unwrap();
    assert_eq!(banner.category, MessageCategory::Info);
    assert!(banner.is_full_width);
}

#[tokio::test]
async fn client_connect_fails_for_unreachable_server() {
    let config = TransportConfig { connect_timeout: Duration::from_millis(500) };
    let context = SessionContext::new("ws://127.0.0.1:1", "Alice");

    let result = connect(context, config).await;
    assert!(result.is_err(), "should fail to connect with no server listening");
}

#[tokio::test]
async fn auth_rejection_surfaces_reason_and_error_state() {
    let url = scripted_server(AUTH_REJECTED).await;
    let context = SessionContext::new(url, "Alice").with_password("wrong");

    let mut session = connect(context, TransportConfig::default()).await.unwrap();
    wait_for_state(&session, ConnectionState::Error).await;

    let notice = timeout(Duration::from_secs(5), session.next_message()).await.unwrap().unwrap();
    assert_eq!(notice.category, MessageCategory::System);
    assert!(notice.content.contains("bad password"));
}

#[tokio::test]
async fn send_message_echoes_locally_and_round_trips() {
    let url = scripted_server(AUTH_OK).await;
    let context = SessionContext::new(url, "Alice");

    let mut session = connect(context, TransportConfig::default()).await.unwrap();
    wait_for_state(&session, ConnectionState::Authenticated).await;
    let _banner = session.next_message().await.unwrap();

    assert!(session.send_message("hello room").await);

    // Local own-message echo first, then the server's echo of the
    // content frame.
    let own = timeout(Duration::from_secs(5), session.next_message()).await.unwrap().unwrap();
    assert!(own.is_own);
    assert_eq!(own.content, "hello room");

    let echoed = timeout(Duration::from_secs(5), session.next_message()).await.unwrap().unwrap();
    assert!(!echoed.is_own);
    assert_eq!(echoed.sender, "Alice");
    assert_eq!(echoed.content, "hello room");
}

#[tokio::test]
async fn encrypted_session_round_trips_plaintext() {
    let url = scripted_server(AUTH_OK).await;
    let context = SessionContext::new(url, "Alice").with_encryption_key("room-secret");

    let mut session = connect(context, TransportConfig::default()).await.unwrap();
    wait_for_state(&session, ConnectionState::Authenticated).await;
    let _banner = session.next_message().await.unwrap();

    assert!(session.send_message("covert hello").await);
    let _own = session.next_message().await.unwrap();

    // The server echoed ciphertext; the session decrypts it back.
    let echoed = timeout(Duration::from_secs(5), session.next_message()).await.unwrap().unwrap();
    assert_eq!(echoed.content, "covert hello");

    // Sanity: the cipher is not the identity for this key.
    assert_ne!(MessageCipher::new("room-secret").encrypt("covert hello"), "covert hello");
}

#[tokio::test]
async fn send_before_authentication_is_refused() {
    // Server that never answers the auth request.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(frame)) = ws.next().await {
            if frame.is_close() {
                break;
            }
        }
    });

    let context = SessionContext::new(format!("ws://{addr}"), "Alice");
    let session = connect(context, TransportConfig::default()).await.unwrap();

    assert!(!session.send_message("too early").await);
    assert_eq!(session.current_state(), ConnectionState::Connected);
}

#[tokio::test]
async fn disconnect_reaches_disconnected_state() {
    let url = scripted_server(AUTH_OK).await;
    let context = SessionContext::new(url, "Alice");

    let session = connect(context, TransportConfig::default()).await.unwrap();
    wait_for_state(&session, ConnectionState::Authenticated).await;

    session.disconnect().await;
    wait_for_state(&session, ConnectionState::Disconnected).await;
}

#[tokio::test]
async fn session_logs_collect_lifecycle_entries() {
    let url = scripted_server(AUTH_OK).await;
    let context = SessionContext::new(url, "Alice");

    let session = connect(context, TransportConfig::default()).await.unwrap();
    wait_for_state(&session, ConnectionState::Authenticated).await;

    let entries = session.logs().snapshot();
    assert!(entries.iter().any(|e| e.contains("connecting to")));
    assert!(entries.iter().any(|e| e.contains("authentication accepted")));
}
