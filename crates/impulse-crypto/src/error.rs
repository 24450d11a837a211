//! Cipher error type.

use thiserror::Error;

/// Why a decryption attempt failed.
///
/// The public [`crate::MessageCipher::decrypt`] swallows these and
/// returns the input unchanged; [`crate::MessageCipher::try_decrypt`]
/// exposes them for callers that need tamper evidence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Ciphertext is not valid base64.
    #[error("ciphertext is not valid base64: {0}")]
    Encoding(String),

    /// Block decryption failed: wrong key, truncated data, or invalid
    /// padding.
    #[error("decryption failed (wrong key or corrupted ciphertext)")]
    Decryption,

    /// Decrypted bytes are not valid UTF-8.
    #[error("decrypted bytes are not valid UTF-8")]
    NotUtf8,
}
