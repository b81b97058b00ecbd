//! passcrypt - passphrase-based encryption of text and files
//!
//! A passphrase is stretched with PBKDF2 into an AES-256 key, the payload is
//! sealed with AES-256-GCM under a fresh random nonce, and the nonce travels
//! with the ciphertext in a single self-contained blob:
//!
//! ```text
//! nonce length (4 bytes, big-endian) | nonce (12 bytes) | ciphertext | tag (16 bytes)
//! ```
//!
//! Text payloads use the same blob encoded as one standard base64 token.
//!
//! ```
//! let blob = passcrypt::encrypt_text("hello world", "correct horse").unwrap();
//! let text = passcrypt::decrypt_text(&blob, "correct horse").unwrap();
//! assert_eq!(text, "hello world");
//! ```

#![forbid(unsafe_code)]

pub mod armor;
pub mod cipher;
pub mod error;
pub mod file_ops;
pub mod framing;
pub mod kdf;
pub mod passphrase;
pub mod service;

pub use error::{CryptError, ErrorCategory, ErrorKind, Result};
pub use kdf::{KdfParams, Prf};
pub use service::Crypter;

/// Encrypt text under the default key derivation parameters.
pub fn encrypt_text(plaintext: &str, passphrase: &str) -> Result<String> {
    Crypter::default().encrypt_text(plaintext, passphrase)
}

/// Decrypt a text blob produced by [`encrypt_text`].
pub fn decrypt_text(ciphertext: &str, passphrase: &str) -> Result<String> {
    Crypter::default().decrypt_text(ciphertext, passphrase)
}

/// Encrypt bytes under the default key derivation parameters.
pub fn encrypt_bytes(plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    Crypter::default().encrypt_bytes(plaintext, passphrase)
}

/// Decrypt a binary blob produced by [`encrypt_bytes`].
pub fn decrypt_bytes(blob: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    Crypter::default().decrypt_bytes(blob, passphrase)
}
