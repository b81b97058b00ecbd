//! Passphrase to key derivation using PBKDF2
//!
//! The salt is a configuration value rather than per-message randomness: the
//! same passphrase and parameters always derive the same key, so a blob only
//! needs to carry its nonce. The price is that a fixed salt shared by every
//! installation gives no protection against precomputed dictionaries. Use a
//! per-deployment salt via [`KdfParams::new`] where that matters.

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{CryptError, ErrorCategory, ErrorKind, Result};

/// Length of the derived key in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Salt used by [`KdfParams::default`].
pub const DEFAULT_SALT: &[u8] = b"RandomSalt";

/// PBKDF2 iteration count used by [`KdfParams::default`].
pub const DEFAULT_ITERATIONS: u32 = 65_536;

/// Pseudorandom function driving PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Prf {
    /// HMAC-SHA-1, compatible with blobs produced by earlier versions of the tool.
    #[default]
    HmacSha1,
    HmacSha256,
}

impl Prf {
    pub fn name(self) -> &'static str {
        match self {
            Prf::HmacSha1 => "hmac-sha1",
            Prf::HmacSha256 => "hmac-sha256",
        }
    }
}

/// Parameters for PBKDF2 key derivation.
///
/// None of these values are stored in the blob. Decryption must use the
/// parameters that were used to encrypt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfParams {
    salt: Vec<u8>,
    iterations: u32,
    prf: Prf,
}

impl KdfParams {
    /// Create parameters with an explicit salt, iteration count and PRF.
    ///
    /// An empty salt is accepted. Zero iterations is not.
    pub fn new(salt: impl Into<Vec<u8>>, iterations: u32, prf: Prf) -> Result<Self> {
        if iterations == 0 {
            return Err(CryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidParameters,
                "PBKDF2 iteration count must be at least 1",
            ));
        }
        Ok(Self {
            salt: salt.into(),
            iterations,
            prf,
        })
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn prf(&self) -> Prf {
        self.prf
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            salt: DEFAULT_SALT.to_vec(),
            iterations: DEFAULT_ITERATIONS,
            prf: Prf::HmacSha1,
        }
    }
}

/// A 256-bit key owned by a single encrypt or decrypt call.
///
/// Wiped on drop. `Debug` never prints the key bytes.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a 32-byte key from a passphrase.
///
/// Deterministic for a given passphrase and parameter set. An empty
/// passphrase derives a (weak) key rather than failing.
pub fn derive_key(passphrase: &[u8], params: &KdfParams) -> DerivedKey {
    debug!(
        prf = params.prf.name(),
        iterations = params.iterations,
        "deriving key"
    );

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    match params.prf {
        Prf::HmacSha1 => {
            pbkdf2_hmac::<Sha1>(passphrase, &params.salt, params.iterations, &mut key[..])
        }
        Prf::HmacSha256 => {
            pbkdf2_hmac::<Sha256>(passphrase, &params.salt, params.iterations, &mut key[..])
        }
    }
    DerivedKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params(prf: Prf) -> KdfParams {
        KdfParams::new(DEFAULT_SALT, 2, prf).unwrap()
    }

    #[test]
    fn test_default_params() {
        let params = KdfParams::default();
        assert_eq!(params.salt(), b"RandomSalt");
        assert_eq!(params.iterations(), 65_536);
        assert_eq!(params.prf(), Prf::HmacSha1);
    }

    #[test]
    fn test_rfc6070_vector() {
        // RFC 6070, PBKDF2-HMAC-SHA1, c = 2, dkLen truncated to the first 20 bytes.
        let params = KdfParams::new(b"salt".to_vec(), 2, Prf::HmacSha1).unwrap();
        let key = derive_key(b"password", &params);

        #[rustfmt::skip]
        let expected: [u8; 20] = [
            0xea, 0x6c, 0x01, 0x4d, 0xc7, 0x2d, 0x6f, 0x8c, 0xcd, 0x1e,
            0xd9, 0x2a, 0xce, 0x1d, 0x41, 0xf0, 0xd8, 0xde, 0x89, 0x57,
        ];
        assert_eq!(&key.as_bytes()[..20], &expected);
    }

    #[test]
    fn test_deterministic() {
        let params = fast_params(Prf::HmacSha1);
        let k1 = derive_key(b"correct horse", &params);
        let k2 = derive_key(b"correct horse", &params);
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_different_passphrase_different_key() {
        let params = fast_params(Prf::HmacSha1);
        let k1 = derive_key(b"correct horse", &params);
        let k2 = derive_key(b"wrong password", &params);
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_salt_changes_key() {
        let a = KdfParams::new(b"salt-a".to_vec(), 2, Prf::HmacSha1).unwrap();
        let b = KdfParams::new(b"salt-b".to_vec(), 2, Prf::HmacSha1).unwrap();
        assert_ne!(
            derive_key(b"pw", &a).as_bytes(),
            derive_key(b"pw", &b).as_bytes()
        );
    }

    #[test]
    fn test_prf_changes_key() {
        let k1 = derive_key(b"pw", &fast_params(Prf::HmacSha1));
        let k2 = derive_key(b"pw", &fast_params(Prf::HmacSha256));
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_empty_passphrase_accepted() {
        let key = derive_key(b"", &fast_params(Prf::HmacSha1));
        assert_ne!(key.as_bytes(), &[0u8; KEY_LEN]);
    }

    #[test]
    fn test_empty_salt_accepted() {
        assert!(KdfParams::new(Vec::new(), 1, Prf::HmacSha256).is_ok());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let err = KdfParams::new(DEFAULT_SALT, 0, Prf::HmacSha1).expect_err("expected rejection");
        assert_eq!(err.kind, Some(ErrorKind::InvalidParameters));
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = derive_key(b"pw", &fast_params(Prf::HmacSha1));
        assert_eq!(format!("{:?}", key), "DerivedKey([REDACTED])");
    }
}
