// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-based credential encryption.
//!
//! Blob layout, base64-encoded (standard alphabet, padded):
//!
//! ```text
//! salt (16) || nonce (12) || ciphertext (n) || tag (16)
//! ```
//!
//! The salt feeds PBKDF2-HMAC-SHA256 to derive the AES-256-GCM key. Nothing
//! in the blob records the iteration count, so every vault that must read a
//! blob has to be built with the iteration count that wrote it.

use std::num::NonZeroU32;

use latchkey_config::VaultConfig;
use latchkey_config::model::MIN_KDF_ITERATIONS;
use latchkey_core::{EncryptedCredential, LatchkeyError};
use ring::rand::SystemRandom;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::{self, NONCE_LEN, TAG_LEN};
use crate::kdf::{self, SALT_LEN};

/// Smallest decoded blob that can possibly be valid: an empty credential.
pub const MIN_BLOB_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Encrypts and decrypts credentials with a passphrase-derived key.
///
/// Stateless apart from its KDF cost; cheap to clone and safe to share.
/// [`encrypt`](Self::encrypt) and [`decrypt`](Self::decrypt) block for the
/// duration of the key derivation. Async callers should use the `_async`
/// variants, which run on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct CredentialVault {
    iterations: NonZeroU32,
    rng: SystemRandom,
}

impl CredentialVault {
    /// A vault using the default 150,000 PBKDF2 rounds.
    pub fn new() -> Self {
        Self {
            iterations: NonZeroU32::new(MIN_KDF_ITERATIONS).unwrap_or(NonZeroU32::MIN),
            rng: SystemRandom::new(),
        }
    }

    /// Build a vault from validated configuration.
    pub fn from_config(config: &VaultConfig) -> Result<Self, LatchkeyError> {
        if config.kdf_iterations < MIN_KDF_ITERATIONS {
            return Err(LatchkeyError::Config(format!(
                "vault.kdf_iterations must be at least {MIN_KDF_ITERATIONS}"
            )));
        }
        Self::with_iterations(config.kdf_iterations)
    }

    /// A vault with an arbitrary non-zero round count.
    ///
    /// Unlike [`from_config`](Self::from_config) this accepts counts below
    /// the production floor, which keeps tests fast.
    pub fn with_iterations(iterations: u32) -> Result<Self, LatchkeyError> {
        let iterations = NonZeroU32::new(iterations).ok_or_else(|| {
            LatchkeyError::Config("KDF iteration count must be non-zero".to_string())
        })?;
        Ok(Self {
            iterations,
            rng: SystemRandom::new(),
        })
    }

    /// PBKDF2 rounds used for every key this vault derives.
    pub fn iterations(&self) -> u32 {
        self.iterations.get()
    }

    /// Encrypt `plaintext` under `passphrase` with a fresh salt and nonce.
    pub fn encrypt(
        &self,
        plaintext: &SecretString,
        passphrase: &SecretString,
    ) -> Result<EncryptedCredential, LatchkeyError> {
        let salt = kdf::generate_salt(&self.rng)?;
        let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, self.iterations);
        let (nonce, sealed) =
            crypto::seal(&self.rng, &key, plaintext.expose_secret().as_bytes())?;

        let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + sealed.len());
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);
        debug!(iterations = self.iterations.get(), bytes = blob.len(), "credential sealed");
        Ok(EncryptedCredential::from_bytes(&blob))
    }

    /// Decrypt `blob` with `passphrase`.
    ///
    /// A blob that decodes to fewer than [`MIN_BLOB_LEN`] bytes is rejected
    /// with [`LatchkeyError::Validation`] before any key derivation. A wrong
    /// passphrase, a tampered blob, undecodable base64 and a non-UTF-8
    /// plaintext all yield [`LatchkeyError::Integrity`].
    pub fn decrypt(
        &self,
        blob: &EncryptedCredential,
        passphrase: &SecretString,
    ) -> Result<SecretString, LatchkeyError> {
        let mut bytes =
            Zeroizing::new(blob.decode().map_err(|_| LatchkeyError::Integrity)?);
        if bytes.len() < MIN_BLOB_LEN {
            return Err(LatchkeyError::Validation(format!(
                "encrypted credential shorter than {MIN_BLOB_LEN} bytes"
            )));
        }

        let (header, sealed) = bytes.split_at_mut(SALT_LEN + NONCE_LEN);
        let (salt, nonce) = header.split_at(SALT_LEN);
        let salt: &[u8; SALT_LEN] = salt.try_into().map_err(|_| LatchkeyError::Integrity)?;
        let nonce: &[u8; NONCE_LEN] = nonce.try_into().map_err(|_| LatchkeyError::Integrity)?;

        let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), salt, self.iterations);
        let plaintext = crypto::open(&key, nonce, sealed)?;
        let text = std::str::from_utf8(plaintext).map_err(|_| LatchkeyError::Integrity)?;
        Ok(SecretString::from(text.to_owned()))
    }

    /// [`encrypt`](Self::encrypt) on the blocking thread pool.
    pub async fn encrypt_async(
        &self,
        plaintext: SecretString,
        passphrase: SecretString,
    ) -> Result<EncryptedCredential, LatchkeyError> {
        let vault = self.clone();
        tokio::task::spawn_blocking(move || vault.encrypt(&plaintext, &passphrase))
            .await
            .map_err(|e| LatchkeyError::Internal(format!("encryption task failed: {e}")))?
    }

    /// [`decrypt`](Self::decrypt) on the blocking thread pool.
    pub async fn decrypt_async(
        &self,
        blob: EncryptedCredential,
        passphrase: SecretString,
    ) -> Result<SecretString, LatchkeyError> {
        let vault = self.clone();
        tokio::task::spawn_blocking(move || vault.decrypt(&blob, &passphrase))
            .await
            .map_err(|e| LatchkeyError::Internal(format!("decryption task failed: {e}")))?
    }
}

impl Default for CredentialVault {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> CredentialVault {
        CredentialVault::with_iterations(1_000).unwrap()
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn default_vault_uses_production_rounds() {
        assert_eq!(CredentialVault::new().iterations(), 150_000);
    }

    #[test]
    fn from_config_rejects_weak_rounds() {
        let weak = VaultConfig {
            kdf_iterations: 10_000,
        };
        assert!(matches!(
            CredentialVault::from_config(&weak),
            Err(LatchkeyError::Config(_))
        ));
        assert!(CredentialVault::with_iterations(0).is_err());
    }

    #[test]
    fn roundtrip() {
        let v = vault();
        let blob = v.encrypt(&secret("ltuid=1;ltoken=xyz"), &secret("pw")).unwrap();
        let plain = v.decrypt(&blob, &secret("pw")).unwrap();
        assert_eq!(plain.expose_secret(), "ltuid=1;ltoken=xyz");
    }

    #[test]
    fn blob_layout_length() {
        let blob = vault().encrypt(&secret("abcd"), &secret("pw")).unwrap();
        assert_eq!(blob.decode().unwrap().len(), MIN_BLOB_LEN + 4);
    }

    #[test]
    fn empty_credential_roundtrips_at_minimum_length() {
        let v = vault();
        let blob = v.encrypt(&secret(""), &secret("pw")).unwrap();
        assert_eq!(blob.decode().unwrap().len(), MIN_BLOB_LEN);
        assert_eq!(v.decrypt(&blob, &secret("pw")).unwrap().expose_secret(), "");
    }

    #[test]
    fn two_encryptions_differ() {
        let v = vault();
        let a = v.encrypt(&secret("same"), &secret("pw")).unwrap();
        let b = v.encrypt(&secret("same"), &secret("pw")).unwrap();
        assert_ne!(a, b);
        let (a, b) = (a.decode().unwrap(), b.decode().unwrap());
        assert_ne!(a[..SALT_LEN], b[..SALT_LEN]);
        assert_ne!(a[SALT_LEN..SALT_LEN + NONCE_LEN], b[SALT_LEN..SALT_LEN + NONCE_LEN]);
    }

    #[test]
    fn wrong_passphrase_is_integrity_error() {
        let v = vault();
        let blob = v.encrypt(&secret("p"), &secret("correct")).unwrap();
        assert!(matches!(
            v.decrypt(&blob, &secret("wrong")),
            Err(LatchkeyError::Integrity)
        ));
    }

    #[test]
    fn short_blob_is_validation_error() {
        let short = EncryptedCredential::from_bytes(&[0u8; MIN_BLOB_LEN - 1]);
        assert!(matches!(
            vault().decrypt(&short, &secret("pw")),
            Err(LatchkeyError::Validation(_))
        ));
    }

    #[test]
    fn minimum_length_garbage_is_integrity_error() {
        let zeros = EncryptedCredential::from_bytes(&[0u8; MIN_BLOB_LEN]);
        assert!(matches!(
            vault().decrypt(&zeros, &secret("pw")),
            Err(LatchkeyError::Integrity)
        ));
    }

    #[test]
    fn undecodable_base64_is_integrity_error() {
        let junk = EncryptedCredential::new("***not base64***");
        assert!(matches!(
            vault().decrypt(&junk, &secret("pw")),
            Err(LatchkeyError::Integrity)
        ));
    }

    #[test]
    fn non_utf8_plaintext_is_integrity_error() {
        let v = vault();
        let salt = [4u8; SALT_LEN];
        let key = kdf::derive_key(b"pw", &salt, v.iterations);
        let (nonce, sealed) = crypto::seal(&v.rng, &key, &[0xff, 0xfe]).unwrap();
        let blob = EncryptedCredential::from_bytes(&[&salt[..], &nonce[..], &sealed[..]].concat());
        assert!(matches!(
            v.decrypt(&blob, &secret("pw")),
            Err(LatchkeyError::Integrity)
        ));
    }

    #[tokio::test]
    async fn async_variants_roundtrip() {
        let v = vault();
        let blob = v.encrypt_async(secret("async"), secret("pw")).await.unwrap();
        let plain = v.decrypt_async(blob, secret("pw")).await.unwrap();
        assert_eq!(plain.expose_secret(), "async");
    }
}
