// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for credential encryption.

use latchkey_core::{EncryptedCredential, LatchkeyError};
use latchkey_vault::CredentialVault;
use proptest::prelude::*;
use secrecy::{ExposeSecret, SecretString};

fn vault() -> CredentialVault {
    CredentialVault::with_iterations(64).expect("non-zero rounds")
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn decrypt_inverts_encrypt(plaintext in ".{0,200}", passphrase in ".{1,40}") {
        let v = vault();
        let blob = v.encrypt(&secret(&plaintext), &secret(&passphrase)).unwrap();
        let recovered = v.decrypt(&blob, &secret(&passphrase)).unwrap();
        prop_assert_eq!(recovered.expose_secret(), plaintext.as_str());
    }

    #[test]
    fn other_passphrase_never_yields_plaintext(
        plaintext in ".{0,64}",
        right in "[a-z]{1,16}",
        wrong in "[A-Z]{1,16}",
    ) {
        let v = vault();
        let blob = v.encrypt(&secret(&plaintext), &secret(&right)).unwrap();
        prop_assert!(matches!(v.decrypt(&blob, &secret(&wrong)), Err(LatchkeyError::Integrity)));
    }
}

#[test]
fn flipping_any_byte_breaks_decryption() {
    let v = vault();
    let blob = v
        .encrypt(&secret("cookie_token=abc123"), &secret("pw1"))
        .unwrap();
    let bytes = blob.decode().unwrap();

    for i in 0..bytes.len() {
        let mut tampered = bytes.clone();
        tampered[i] ^= 0x01;
        let result = v.decrypt(&EncryptedCredential::from_bytes(&tampered), &secret("pw1"));
        assert!(
            matches!(result, Err(LatchkeyError::Integrity)),
            "byte {i} flip was not detected"
        );
    }
}

#[test]
fn truncation_below_minimum_is_validation() {
    let v = vault();
    let blob = v.encrypt(&secret("x"), &secret("pw")).unwrap();
    let bytes = blob.decode().unwrap();

    let truncated = EncryptedCredential::from_bytes(&bytes[..40]);
    assert!(matches!(
        v.decrypt(&truncated, &secret("pw")),
        Err(LatchkeyError::Validation(_))
    ));

    let trimmed_tag = EncryptedCredential::from_bytes(&bytes[..bytes.len() - 1]);
    assert!(matches!(
        v.decrypt(&trimmed_tag, &secret("pw")),
        Err(LatchkeyError::Integrity)
    ));
}

#[test]
fn blob_is_readable_by_vault_with_same_rounds_only() {
    let writer = vault();
    let blob = writer.encrypt(&secret("s"), &secret("pw")).unwrap();

    let same = CredentialVault::with_iterations(64).unwrap();
    assert!(same.decrypt(&blob, &secret("pw")).is_ok());

    let different = CredentialVault::with_iterations(65).unwrap();
    assert!(matches!(
        different.decrypt(&blob, &secret("pw")),
        Err(LatchkeyError::Integrity)
    ));
}
