//! Field-level encryption using ChaCha20-Poly1305
//!
//! A [`PiiKey`] encrypts a single field (a participant's email address) into
//! a self-describing envelope. Decryption authenticates the whole envelope
//! and never returns unauthenticated bytes.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};

/// Size of ChaCha20-Poly1305 nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of ChaCha20-Poly1305 key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;
/// Size of the Poly1305 authentication tag in bytes
pub const TAG_SIZE: usize = 16;
/// Size of a blind index digest in bytes
pub const BLIND_INDEX_SIZE: usize = 32;

const BLIND_INDEX_CONTEXT: &str = "santa 2024-11-30 participant email blind index";

/// Errors raised while loading a key
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid key size, expected {expected}, got {found}")]
    InvalidLength { expected: usize, found: usize },
    #[error("key is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to generate key: {0}")]
    Rng(getrandom::Error),
}

/// Errors raised while encrypting
#[derive(Debug, thiserror::Error)]
pub enum EncryptError {
    #[error("failed to generate nonce: {0}")]
    Nonce(getrandom::Error),
    #[error("encrypt error")]
    Aead,
}

/// Errors raised while decrypting an envelope
///
/// Every variant means the envelope must not be trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecryptError {
    #[error("envelope too short: {0} bytes")]
    Truncated(usize),
    #[error("envelope failed authentication")]
    Authentication,
    #[error("decrypted value is not valid utf-8")]
    InvalidUtf8,
}

/// A 256-bit process-wide key for participant PII
///
/// Loaded once at startup and shared read-only. The key bytes never appear
/// in `Debug` output.
///
/// # Examples
///
/// ```ignore
/// let key = PiiKey::from_base64(&std::env::var("SANTA_PII_KEY")?)?;
///
/// let envelope = key.encrypt(b"alice@example.com")?;
/// let email = key.decrypt_string(&envelope)?;
/// assert_eq!(email, "alice@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PiiKey([u8; KEY_SIZE]);

impl fmt::Debug for PiiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PiiKey(<redacted>)")
    }
}

impl From<[u8; KEY_SIZE]> for PiiKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        PiiKey(bytes)
    }
}

impl PiiKey {
    /// Generate a new random key using the system RNG
    pub fn generate() -> Result<Self, KeyError> {
        let mut buff = [0; KEY_SIZE];
        getrandom::getrandom(&mut buff).map_err(KeyError::Rng)?;
        Ok(Self(buff))
    }

    /// Create a key from a byte slice of exactly `KEY_SIZE` bytes
    pub fn from_slice(data: &[u8]) -> Result<Self, KeyError> {
        if data.len() != KEY_SIZE {
            return Err(KeyError::InvalidLength {
                expected: KEY_SIZE,
                found: data.len(),
            });
        }
        let mut buff = [0; KEY_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Decode a key from standard base64
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        Self::from_slice(&bytes)
    }

    /// Encode the key as standard base64
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.0))
    }

    /// Encrypt a value into `nonce || ciphertext || tag`
    ///
    /// A random nonce is generated for every call.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes).map_err(EncryptError::Nonce)?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(nonce, plaintext)
            .map_err(|_| EncryptError::Aead)?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(nonce.as_ref());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt an envelope produced by [`PiiKey::encrypt`]
    ///
    /// # Errors
    ///
    /// - [`DecryptError::Truncated`] if the envelope cannot hold a nonce and tag
    /// - [`DecryptError::Authentication`] on tampering or a key mismatch
    pub fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>, DecryptError> {
        if envelope.len() < NONCE_SIZE + TAG_SIZE {
            return Err(DecryptError::Truncated(envelope.len()));
        }

        let (nonce, ciphertext) = envelope.split_at(NONCE_SIZE);
        self.cipher()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| DecryptError::Authentication)
    }

    /// Decrypt an envelope holding UTF-8 text
    pub fn decrypt_string(&self, envelope: &[u8]) -> Result<String, DecryptError> {
        let plaintext = self.decrypt(envelope)?;
        String::from_utf8(plaintext).map_err(|_| DecryptError::InvalidUtf8)
    }

    /// Keyed digest of a normalized email address
    ///
    /// Deterministic for a given key, so the join flow can store it next to
    /// the ciphertext and let the database reject a second enrollment of the
    /// same address in one room.
    pub fn blind_index(&self, email: &str) -> [u8; BLIND_INDEX_SIZE] {
        let index_key = blake3::derive_key(BLIND_INDEX_CONTEXT, &self.0);
        let normalized = email.trim().to_lowercase();
        *blake3::keyed_hash(&index_key, normalized.as_bytes()).as_bytes()
    }
}
