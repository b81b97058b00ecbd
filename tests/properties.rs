//! Property tests over the public encrypt/decrypt surface.
//!
//! Reduced PBKDF2 iteration counts keep each case cheap; the properties do
//! not depend on the work factor.

use proptest::prelude::*;

use passcrypt::error::ErrorKind;
use passcrypt::kdf::{KdfParams, Prf};
use passcrypt::{Crypter, framing};

fn crypter() -> Crypter {
    Crypter::new(KdfParams::new(b"proptest-salt".to_vec(), 8, Prf::HmacSha1).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn bytes_roundtrip(plaintext in prop::collection::vec(any::<u8>(), 0..512), passphrase in ".{0,24}") {
        let crypter = crypter();
        let blob = crypter.encrypt_bytes(&plaintext, &passphrase).unwrap();
        prop_assert_eq!(crypter.decrypt_bytes(&blob, &passphrase).unwrap(), plaintext);
    }

    #[test]
    fn text_roundtrip(plaintext in ".{0,128}", passphrase in ".{0,24}") {
        let crypter = crypter();
        let blob = crypter.encrypt_text(&plaintext, &passphrase).unwrap();
        prop_assert_eq!(crypter.decrypt_text(&blob, &passphrase).unwrap(), plaintext);
    }

    #[test]
    fn other_passphrase_fails_authentication(
        plaintext in prop::collection::vec(any::<u8>(), 0..128),
        k1 in "[a-z]{1,12}",
        k2 in "[A-Z0-9]{1,12}",
    ) {
        let crypter = crypter();
        let blob = crypter.encrypt_bytes(&plaintext, &k1).unwrap();
        let err = crypter.decrypt_bytes(&blob, &k2).unwrap_err();
        prop_assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailure));
    }

    #[test]
    fn tampered_body_fails_authentication(
        plaintext in prop::collection::vec(any::<u8>(), 0..128),
        position in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let crypter = crypter();
        let mut blob = crypter.encrypt_bytes(&plaintext, "k").unwrap();
        // Everything after the length prefix: nonce, ciphertext and tag.
        let body = framing::LENGTH_PREFIX_LEN..blob.len();
        let i = body.start + position.index(body.len());
        blob[i] ^= flip;

        let err = crypter.decrypt_bytes(&blob, "k").unwrap_err();
        prop_assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailure));
    }

    #[test]
    fn arbitrary_input_is_rejected_without_panic(blob in prop::collection::vec(any::<u8>(), 0..64)) {
        let result = crypter().decrypt_bytes(&blob, "k");
        // 2^-128 chance of a random tag verifying; treat success as a failure anyway.
        let err = result.unwrap_err();
        prop_assert!(matches!(
            err.kind,
            Some(ErrorKind::MalformedBlob) | Some(ErrorKind::AuthenticationFailure)
        ));
    }

    #[test]
    fn arbitrary_text_is_rejected_without_panic(text in "\\PC{0,64}") {
        let err = crypter().decrypt_text(&text, "k").unwrap_err();
        prop_assert!(matches!(
            err.kind,
            Some(ErrorKind::MalformedBlob) | Some(ErrorKind::AuthenticationFailure)
        ));
    }

    #[test]
    fn encryption_is_randomized(plaintext in prop::collection::vec(any::<u8>(), 0..64)) {
        let crypter = crypter();
        let a = crypter.encrypt_bytes(&plaintext, "k").unwrap();
        let b = crypter.encrypt_bytes(&plaintext, "k").unwrap();
        prop_assert_ne!(a, b);
    }
}
