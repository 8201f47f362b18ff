//! Cryptographic primitives for participant PII
//!
//! Participant contact addresses are the only protected asset in a room.
//! They are encrypted once, at write time, by the join flow and only ever
//! decrypted transiently by the draw engine:
//!
//! - **Encryption**: ChaCha20-Poly1305 under a single process-wide [`PiiKey`],
//!   with a fresh random nonce drawn internally for every message
//! - **Envelope**: `nonce (12 bytes) || ciphertext || tag (16 bytes)`
//! - **Blind index**: a keyed BLAKE3 digest of the normalized address so the
//!   store can enforce per-room uniqueness without seeing plaintext
//!
//! Nothing in this module accepts a nonce from the caller.

mod pii_key;

pub use pii_key::{
    DecryptError, EncryptError, KeyError, PiiKey, BLIND_INDEX_SIZE, KEY_SIZE, NONCE_SIZE,
    TAG_SIZE,
};
