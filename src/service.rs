//! Passphrase encryption of text and byte payloads
//!
//! Composes key derivation, AES-GCM and framing. Every call derives its
//! own key, so a [`Crypter`] holds nothing but parameters and can be
//! shared freely between threads.

use tracing::debug;

use crate::armor;
use crate::cipher;
use crate::error::{CryptError, ErrorCategory, ErrorKind, Result};
use crate::framing;
use crate::kdf::{self, KdfParams};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Crypter {
    params: KdfParams,
}

impl Crypter {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Encrypt UTF-8 text, returning the base64 text blob.
    pub fn encrypt_text(&self, plaintext: &str, passphrase: &str) -> Result<String> {
        let blob = self.encrypt_bytes(plaintext.as_bytes(), passphrase)?;
        Ok(armor::wrap(&blob))
    }

    /// Decrypt a text blob produced by [`Crypter::encrypt_text`].
    pub fn decrypt_text(&self, ciphertext: &str, passphrase: &str) -> Result<String> {
        let blob = armor::unwrap(ciphertext)?;
        let plaintext = self.decrypt_bytes(&blob, passphrase)?;
        String::from_utf8(plaintext).map_err(|e| {
            CryptError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::DecodingFailure,
                "decrypted data is not valid UTF-8 text",
                e.utf8_error(),
            )
        })
    }

    /// Encrypt bytes, returning the binary blob.
    pub fn encrypt_bytes(&self, plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>> {
        debug!(plaintext_len = plaintext.len(), "encrypting");
        let key = kdf::derive_key(passphrase.as_bytes(), &self.params);
        let sealed = cipher::encrypt(&key, plaintext)?;
        Ok(framing::encode(&sealed.nonce, &sealed.ciphertext))
    }

    /// Decrypt a binary blob produced by [`Crypter::encrypt_bytes`].
    ///
    /// The blob is parsed before the key is derived, so malformed input
    /// fails fast without paying for PBKDF2.
    pub fn decrypt_bytes(&self, blob: &[u8], passphrase: &str) -> Result<Vec<u8>> {
        debug!(blob_len = blob.len(), "decrypting");
        let framed = framing::decode(blob)?;
        let key = kdf::derive_key(passphrase.as_bytes(), &self.params);
        cipher::decrypt(&key, framed.nonce, framed.ciphertext)
    }
}
