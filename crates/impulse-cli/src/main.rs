//! Impulse line-oriented chat client.
//!
//! # Usage
//!
//! ```bash
//! # Open room
//! impulse --url ws://localhost:8080/chat --name alice
//!
//! # Password-protected room with end-to-end message encryption
//! impulse --url ws://host/chat --name alice --password hunter2 --key room-secret
//! ```
//!
//! Typed lines are sent as chat messages. `/key <passphrase>` swaps the
//! cipher key, `/quit` leaves.

// stdout is the chat surface of this binary.
#![allow(clippy::print_stdout)]

use clap::Parser;
use impulse_client::{TransportConfig, connect};
use impulse_core::SessionContext;
use impulse_proto::{ChatMessage, MessageCategory};
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Impulse chat client
#[derive(Parser, Debug)]
#[command(name = "impulse")]
#[command(about = "Line-oriented client for the Impulse chat protocol")]
#[command(version)]
struct Args {
    /// WebSocket URL of the chat server
    #[arg(short, long, default_value = "ws://127.0.0.1:8080/chat")]
    url: String,

    /// Display name; a random guest name is generated if omitted
    #[arg(short, long)]
    name: Option<String>,

    /// Room password
    #[arg(short, long)]
    password: Option<String>,

    /// Message encryption passphrase
    #[arg(short, long)]
    key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let name = args
        .name
        .unwrap_or_else(|| format!("guest-{}", rand::rng().random_range(1000..=9999)));

    let mut context = SessionContext::new(args.url, name.clone());
    if let Some(password) = args.password {
        context = context.with_password(password);
    }
    if let Some(key) = args.key {
        context = context.with_encryption_key(key);
    }

    let url = context.url.clone();
    let mut session = connect(context, TransportConfig::default()).await?;
    tracing::debug!(%url, %name, "session started");
    println!("connecting to {url} as {name}");

    let Some(mut messages) = session.take_messages() else {
        return Ok(());
    };
    let mut state = session.state();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            message = messages.recv() => match message {
                Some(message) => println!("{}", render(&message)),
                None => break,
            },
            changed = state.changed() => match changed {
                Ok(()) => println!("-- {:?}", *state.borrow_and_update()),
                Err(_) => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    let line = line.trim();
                    if line == "/quit" {
                        session.disconnect().await;
                        break;
                    }
                    if let Some(key) = line.strip_prefix("/key ") {
                        session.update_encryption_key(key).await;
                        continue;
                    }
                    if !line.is_empty() && !session.send_message(line).await {
                        println!("-- message not sent");
                    }
                },
                None => {
                    session.disconnect().await;
                    break;
                },
            },
        }
    }

    Ok(())
}

/// One rendered chat line.
fn render(message: &ChatMessage) -> String {
    match message.category {
        MessageCategory::Info => format!("[{}] * {}", message.timestamp, message.content),
        MessageCategory::System | MessageCategory::Technical => {
            format!("[{}] ! {}", message.timestamp, message.content)
        },
        MessageCategory::Content => {
            let sender = if message.is_own { "you" } else { message.sender.as_str() };
            format!("[{}] <{}> {}", message.timestamp, sender, message.content)
        },
    }
}
