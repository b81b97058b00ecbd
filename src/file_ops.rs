//! File encryption/decryption operations
//!
//! Files are encrypted as binary blobs, not base64 text. Output files are
//! created with mode 0o600 (read/write for owner only) on Unix systems.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{CryptError, ErrorCategory, ErrorKind, Result};
use crate::passphrase::{self, PassphraseReader};
use crate::service::Crypter;

/// Extension appended to encrypted files.
pub const ENCRYPTED_EXTENSION: &str = "enc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Output path used when the caller does not name one.
///
/// Encrypting appends `.enc`. Decrypting strips a trailing `.enc`; an
/// input without that suffix has no safe default and is refused rather
/// than overwritten.
pub fn default_output_path(input: &Path, direction: Direction) -> Result<PathBuf> {
    match direction {
        Direction::Encrypt => {
            let mut name = input.as_os_str().to_owned();
            name.push(".");
            name.push(ENCRYPTED_EXTENSION);
            Ok(PathBuf::from(name))
        }
        Direction::Decrypt => {
            if input.extension().is_some_and(|ext| ext == ENCRYPTED_EXTENSION) {
                Ok(input.with_extension(""))
            } else {
                Err(CryptError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!(
                        "{} does not end in .{}; an output path is required",
                        input.display(),
                        ENCRYPTED_EXTENSION
                    ),
                ))
            }
        }
    }
}

/// Encrypt the contents of `input_path` into a blob at `output_path`.
pub fn encrypt_file(
    crypter: &Crypter,
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let passphrase = passphrase_reader.read_passphrase()?;
    let blob = crypter
        .encrypt_bytes(&plaintext, passphrase::as_utf8(&passphrase)?)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_secure(output_path, &blob)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    info!(output = %output_path.display(), "encrypted file");
    Ok(())
}

/// Decrypt the blob at `input_path` and write the plaintext to `output_path`.
///
/// Nothing is written unless authentication succeeds.
pub fn decrypt_file(
    crypter: &Crypter,
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let blob = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let passphrase = passphrase_reader.read_passphrase()?;
    let plaintext = crypter
        .decrypt_bytes(&blob, passphrase::as_utf8(&passphrase)?)
        .map_err(|e| e.with_context("failed to decrypt"))?;
    write_file_secure(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    info!(output = %output_path.display(), "decrypted file");
    Ok(())
}

/// Replace an encrypted file with new plaintext under the same passphrase
///
/// The existing blob at `crypt_path` is decrypted first (and the plaintext
/// discarded) so a mistyped passphrase cannot silently re-key the file.
/// The new blob is written to a tempfile in the same directory, fsynced
/// and renamed over the original: either the old or the new file exists,
/// never a partial one.
pub fn update_file(
    crypter: &Crypter,
    plain_path: &Path,
    crypt_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let existing = fs::read(crypt_path).map_err(|e| read_error(crypt_path, e))?;
    let passphrase = passphrase_reader.read_passphrase()?;
    let passphrase = passphrase::as_utf8(&passphrase)?;

    crypter
        .decrypt_bytes(&existing, passphrase)
        .map_err(|e| e.with_context("failed to decrypt existing file"))?;

    let new_plaintext = fs::read(plain_path).map_err(|e| read_error(plain_path, e))?;
    let new_blob = crypter
        .encrypt_bytes(&new_plaintext, passphrase)
        .map_err(|e| e.with_context("failed to encrypt"))?;

    let crypt_dir = match crypt_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(crypt_dir)
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to create tempfile", e))?;

    temp_file
        .write_all(&new_blob)
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to write to tempfile", e))?;
    temp_file
        .flush()
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to flush tempfile", e))?;
    temp_file.as_file().sync_all().map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    // NamedTempFile is already created 0o600 on Unix.
    temp_file.persist(crypt_path).map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            format!("failed to rename to target file {}", crypt_path.display()),
            e.error,
        )
    })?;

    info!(output = %crypt_path.display(), "updated encrypted file");
    Ok(())
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| {
        io_error(
            ErrorCategory::User,
            format!("failed to open {}", path.display()),
            e,
        )
    })?;
    file.write_all(contents).map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            format!("failed to write {}", path.display()),
            e,
        )
    })
}

fn io_error(category: ErrorCategory, msg: impl Into<String>, err: io::Error) -> CryptError {
    CryptError::with_kind_and_source(category, ErrorKind::Io, msg, err)
}

fn read_error(path: &Path, err: io::Error) -> CryptError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    io_error(category, format!("failed to read from {}", path.display()), err)
}
