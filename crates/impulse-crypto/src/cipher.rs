//! Deterministic symmetric message cipher.
//!
//! Wire format: AES-128-ECB with PKCS#7 padding, base64-encoded
//! without line wrapping. The key is the first 16 bytes of the
//! SHA-256 digest of a shared passphrase. There is no IV: equal
//! plaintexts encrypt to equal ciphertexts, which the peer protocol
//! relies on for idempotent re-delivery.

use aes::Aes128;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::error::CipherError;

type Aes128EcbEnc = ecb::Encryptor<Aes128>;
type Aes128EcbDec = ecb::Decryptor<Aes128>;

/// AES-128 key length in bytes.
const KEY_LEN: usize = 16;

/// Symmetric cipher over chat message text.
///
/// Constructed from a passphrase; an empty passphrase disables the
/// cipher entirely and both directions become the identity function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCipher {
    key: Option<[u8; KEY_LEN]>,
}

impl MessageCipher {
    /// Creates a cipher from a shared passphrase.
    ///
    /// An empty passphrase yields a disabled cipher that passes text
    /// through unchanged in both directions.
    pub fn new(passphrase: &str) -> Self {
        if passphrase.is_empty() {
            return Self::disabled();
        }
        Self { key: Some(derive_key(passphrase)) }
    }

    /// Creates a cipher that passes text through unchanged.
    pub fn disabled() -> Self {
        Self { key: None }
    }

    /// Whether encryption is active.
    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Encrypts `plaintext` to base64 ciphertext.
    ///
    /// Identity when the cipher is disabled. Deterministic: the same
    /// plaintext and key always produce the same ciphertext.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let Some(key) = &self.key else {
            return plaintext.to_owned();
        };
        let ciphertext = Aes128EcbEnc::new(key.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        STANDARD.encode(ciphertext)
    }

    /// Decrypts base64 ciphertext, falling back to the input on any
    /// failure.
    ///
    /// The fallback keeps unencrypted peers readable: plain text that
    /// never round-tripped through [`Self::encrypt`] surfaces as-is
    /// instead of being dropped.
    pub fn decrypt(&self, text: &str) -> String {
        match self.try_decrypt(text) {
            Ok(plaintext) => plaintext,
            Err(_) => text.to_owned(),
        }
    }

    /// Decrypts base64 ciphertext, reporting why it failed.
    pub fn try_decrypt(&self, text: &str) -> Result<String, CipherError> {
        let Some(key) = &self.key else {
            return Ok(text.to_owned());
        };
        let ciphertext = STANDARD
            .decode(text)
            .map_err(|e| CipherError::Encoding(e.to_string()))?;
        let plaintext = Aes128EcbDec::new(key.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CipherError::Decryption)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::NotUtf8)
    }
}

/// Derives an AES-128 key as the first 16 bytes of SHA-256(passphrase).
fn derive_key(passphrase: &str) -> [u8; KEY_LEN] {
    let digest = Sha256::digest(passphrase.as_bytes());
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&digest[..KEY_LEN]);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let cipher = MessageCipher::new("shared-secret");
        let ciphertext = cipher.encrypt("hello world");
        assert_ne!(ciphertext, "hello world");
        assert_eq!(cipher.decrypt(&ciphertext), "hello world");
    }

    #[test]
    fn deterministic_ciphertext() {
        let cipher = MessageCipher::new("shared-secret");
        assert_eq!(cipher.encrypt("same text"), cipher.encrypt("same text"));
    }

    #[test]
    fn empty_passphrase_is_identity() {
        let cipher = MessageCipher::new("");
        assert!(!cipher.is_enabled());
        assert_eq!(cipher.encrypt("plain"), "plain");
        assert_eq!(cipher.decrypt("plain"), "plain");
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let cipher = MessageCipher::new("k");
        let ciphertext = cipher.encrypt("");
        assert!(!ciphertext.is_empty());
        assert_eq!(cipher.decrypt(&ciphertext), "");
    }

    #[test]
    fn decrypt_falls_back_on_plain_text() {
        let cipher = MessageCipher::new("shared-secret");
        assert_eq!(cipher.decrypt("not base64 at all!"), "not base64 at all!");
    }

    #[test]
    fn decrypt_falls_back_on_wrong_key() {
        let alice = MessageCipher::new("alice");
        let bob = MessageCipher::new("bob");
        let ciphertext = alice.encrypt("for alice only");
        // Wrong key either fails padding validation or yields garbage
        // that the caller sees verbatim; it never panics.
        let _ = bob.decrypt(&ciphertext);
    }

    #[test]
    fn try_decrypt_reports_bad_encoding() {
        let cipher = MessageCipher::new("k");
        assert!(matches!(
            cipher.try_decrypt("%%%"),
            Err(CipherError::Encoding(_))
        ));
    }

    #[test]
    fn try_decrypt_reports_truncated_ciphertext() {
        let cipher = MessageCipher::new("k");
        // Valid base64 but not a whole number of AES blocks.
        let truncated = STANDARD.encode([1u8, 2, 3]);
        assert_eq!(
            cipher.try_decrypt(&truncated),
            Err(CipherError::Decryption)
        );
    }

    #[test]
    fn key_derivation_matches_sha256_prefix() {
        let digest = Sha256::digest(b"passphrase");
        assert_eq!(derive_key("passphrase"), digest[..16]);
    }
}
