//! AES-256-GCM authenticated encryption
//!
//! 96-bit nonces drawn from the OS random source for every call and a
//! 128-bit tag appended to the ciphertext. Nonces are never accepted from
//! the caller on the encrypt side.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use tracing::trace;

use crate::error::{CryptError, ErrorCategory, ErrorKind, Result};
use crate::kdf::DerivedKey;

/// Length of the GCM nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag in bytes
pub const TAG_LEN: usize = 16;

/// Output of a single encryption call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the tag appended; always `plaintext.len() + TAG_LEN` bytes.
    pub ciphertext: Vec<u8>,
}

/// Encrypt plaintext under a fresh random nonce.
pub fn encrypt(key: &DerivedKey, plaintext: &[u8]) -> Result<Sealed> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher.encrypt(&nonce, plaintext).map_err(|_| {
        CryptError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::EncryptionFailure,
            "AES-GCM refused to encrypt the payload",
        )
    })?;
    trace!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "sealed payload"
    );

    Ok(Sealed {
        nonce: nonce.into(),
        ciphertext,
    })
}

/// Decrypt and verify `ciphertext` (tag included).
///
/// Shape problems (nonce not 12 bytes, input shorter than a tag) are
/// `MalformedBlob`. Anything that reaches the primitive and fails is
/// `AuthenticationFailure` with a single uniform message.
pub fn decrypt(key: &DerivedKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN {
        return Err(CryptError::malformed(format!(
            "unsupported nonce length {} (expected {})",
            nonce.len(),
            NONCE_LEN
        )));
    }
    if ciphertext.len() < TAG_LEN {
        return Err(CryptError::malformed(
            "truncated or corrupt input; ciphertext shorter than authentication tag",
        ));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| {
            CryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::AuthenticationFailure,
                "corrupt input, tampered-with data, or bad passphrase",
            )
        })?;
    trace!(plaintext_len = plaintext.len(), "opened payload");

    Ok(plaintext)
}
