//! Tokio WebSocket driver for the Impulse chat client.
//!
//! [`connect`] dials the server and returns a [`ChatSession`]: messages
//! arrive over a bounded channel, lifecycle state over a watch channel,
//! and sends go through an async command seam. All protocol decisions
//! live in `impulse-core`; this crate only moves frames.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod transport;

pub use transport::{
    ChatSession, DEFAULT_CONNECT_TIMEOUT, TransportConfig, TransportError, connect,
};
