//! Binary blob framing
//!
//! The blob is self-contained given the passphrase and parameters:
//! - nonce length: 4 bytes (big-endian signed int32)
//! - nonce: variable length (12 bytes for every blob we produce)
//! - ciphertext: the remainder, tag included

use std::mem::size_of;

use crate::error::{CryptError, Result};

/// Length of the nonce length prefix in bytes
pub const LENGTH_PREFIX_LEN: usize = size_of::<i32>();

/// A parsed blob borrowing from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framed<'a> {
    pub nonce: &'a [u8],
    pub ciphertext: &'a [u8],
}

/// Pack a nonce and ciphertext into a blob.
pub fn encode(nonce: &[u8], ciphertext: &[u8]) -> Vec<u8> {
    // Nonces are a handful of bytes; anything else is a bug in the caller.
    debug_assert!(nonce.len() <= i32::MAX as usize);
    let nonce_len = nonce.len() as i32;

    let mut output = Vec::with_capacity(LENGTH_PREFIX_LEN + nonce.len() + ciphertext.len());
    output.extend_from_slice(&nonce_len.to_be_bytes());
    output.extend_from_slice(nonce);
    output.extend_from_slice(ciphertext);
    output
}

/// Split a blob into nonce and ciphertext.
///
/// Only structure is checked here. Whether the nonce has a usable length
/// and whether the ciphertext authenticates is up to the cipher.
pub fn decode(blob: &[u8]) -> Result<Framed<'_>> {
    let Some((prefix, rest)) = blob.split_first_chunk::<LENGTH_PREFIX_LEN>() else {
        return Err(CryptError::malformed(
            "input likely truncated while reading nonce length",
        ));
    };

    let nonce_len = i32::from_be_bytes(*prefix);
    if nonce_len < 0 {
        return Err(CryptError::malformed(
            "negative nonce length (when interpreted as a big-endian i32)",
        ));
    }
    let nonce_len = nonce_len as usize;

    if nonce_len > rest.len() {
        return Err(CryptError::malformed(
            "truncated or corrupt input; claimed nonce length greater than available input",
        ));
    }

    let (nonce, ciphertext) = rest.split_at(nonce_len);
    if ciphertext.is_empty() {
        return Err(CryptError::malformed(
            "truncated or corrupt input; no ciphertext after nonce",
        ));
    }

    Ok(Framed { nonce, ciphertext })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_layout() {
        let blob = encode(&[0xAA; 12], &[0x01, 0x02, 0x03]);

        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x00, 0x00, 0x00, 0x0c,
            0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa,
            0x01, 0x02, 0x03,
        ];
        assert_eq!(blob, expected);

        let framed = decode(&blob).unwrap();
        assert_eq!(framed.nonce, &[0xAA; 12]);
        assert_eq!(framed.ciphertext, &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_zero_length_nonce_is_structurally_valid() {
        let blob = encode(&[], &[0x01]);
        let framed = decode(&blob).unwrap();
        assert!(framed.nonce.is_empty());
        assert_eq!(framed.ciphertext, &[0x01]);
    }

    #[test]
    fn test_truncated_prefix() {
        for len in 0..LENGTH_PREFIX_LEN {
            let err = decode(&vec![0u8; len]).expect_err("expected malformed blob");
            assert_eq!(err.kind, Some(ErrorKind::MalformedBlob));
            assert!(err.to_string().contains("while reading nonce length"));
        }
    }

    #[test]
    fn test_negative_length() {
        let mut blob = vec![0u8; 32];
        blob[..4].copy_from_slice(&(-1i32).to_be_bytes());

        let err = decode(&blob).expect_err("expected malformed blob");
        assert_eq!(err.kind, Some(ErrorKind::MalformedBlob));
        assert!(err.to_string().contains("negative nonce length"));
    }

    #[test]
    fn test_length_exceeds_available() {
        let mut blob = encode(&[0u8; 12], &[0u8; 20]);
        blob[..4].copy_from_slice(&1_000_000i32.to_be_bytes());

        let err = decode(&blob).expect_err("expected malformed blob");
        assert_eq!(err.kind, Some(ErrorKind::MalformedBlob));
        assert!(err.to_string().contains("claimed nonce length greater"));
    }

    #[test]
    fn test_max_length_does_not_overflow() {
        let mut blob = vec![0u8; 8];
        blob[..4].copy_from_slice(&i32::MAX.to_be_bytes());

        let err = decode(&blob).expect_err("expected malformed blob");
        assert_eq!(err.kind, Some(ErrorKind::MalformedBlob));
    }

    #[test]
    fn test_empty_remainder() {
        let blob = encode(&[0u8; 12], &[]);
        let err = decode(&blob).expect_err("expected malformed blob");
        assert_eq!(err.kind, Some(ErrorKind::MalformedBlob));
        assert!(err.to_string().contains("no ciphertext after nonce"));
    }
}
