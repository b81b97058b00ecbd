//! Text armoring for binary blobs
//!
//! A text blob is the binary blob encoded as a single standard base64
//! token (RFC 4648 alphabet, with padding). There is no separator and
//! no second encoding; anything else is rejected.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{CryptError, ErrorCategory, ErrorKind, Result};

/// Wrap a binary blob as printable text.
pub fn wrap(blob: &[u8]) -> String {
    STANDARD.encode(blob)
}

/// Unwrap printable text back into the binary blob.
///
/// Surrounding whitespace (such as a trailing newline) is ignored.
/// Whitespace inside the token is not.
pub fn unwrap(armored: &str) -> Result<Vec<u8>> {
    let token = armored.trim_ascii();
    if token.is_empty() {
        return Err(CryptError::malformed("input is empty; nothing to decrypt"));
    }

    STANDARD.decode(token).map_err(|e| {
        CryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::MalformedBlob,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })
}
