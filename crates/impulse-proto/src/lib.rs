//! Wire protocol for the Impulse chat client.
//!
//! Everything on the wire is a text frame holding one JSON envelope
//! `{type, payload, timestamp}`. This crate is the pure, stateless
//! layer: envelope encode/decode, typed payload views with defensive
//! defaults, and classification of inbound frames into chat history
//! entries. Connection state and ciphering live elsewhere; nothing
//! here does I/O.
//!
//! # Components
//!
//! - [`Envelope`]: the wire unit, with canonical outbound constructors
//! - [`classify`]: raw text frame → [`Classified`] (handshake input,
//!   [`ChatMessage`], or discard)
//! - [`payloads`]: typed views applying per-category fallback keys

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod classify;
mod envelope;
pub mod errors;
mod message;
pub mod payloads;

pub use classify::{Classified, DiscardReason, classify};
pub use envelope::{Envelope, EnvelopeKind};
pub use errors::ProtocolError;
pub use message::{
    ChatMessage, DEFAULT_USER, MessageCategory, SYSTEM_SENDER, UNKNOWN_SENDER,
};
pub use payloads::{AuthOutcome, ContentPayload, InfoPayload, TechnicalPayload};
