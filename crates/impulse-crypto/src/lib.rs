//! Symmetric message encryption for the chat wire protocol.
//!
//! Provides [`MessageCipher`], a passphrase-derived AES-128-ECB
//! cipher with base64 framing. Deliberately deterministic so both
//! ends can derive the same key from a shared passphrase with no key
//! exchange; not suitable for data that needs semantic security.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cipher;
mod error;

pub use cipher::MessageCipher;
pub use error::CipherError;
