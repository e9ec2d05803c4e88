// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] draws a fresh 96-bit nonce from the system CSPRNG.

use latchkey_core::LatchkeyError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

use crate::kdf::KEY_LEN;

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, LatchkeyError> {
    UnboundKey::new(&AES_256_GCM, key)
        .map(LessSafeKey::new)
        .map_err(|_| LatchkeyError::Internal("failed to create AES-256-GCM key".to_string()))
}

/// Encrypt `plaintext` under `key` with a random nonce.
///
/// Returns `(nonce, ciphertext || tag)`.
pub fn seal(
    rng: &SystemRandom,
    key: &[u8; KEY_LEN],
    plaintext: &[u8],
) -> Result<([u8; NONCE_LEN], Vec<u8>), LatchkeyError> {
    let key = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| LatchkeyError::Internal("failed to generate random nonce".to_string()))?;

    let mut in_out = Vec::with_capacity(plaintext.len() + TAG_LEN);
    in_out.extend_from_slice(plaintext);
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| LatchkeyError::Internal("AES-256-GCM encryption failed".to_string()))?;

    Ok((nonce_bytes, in_out))
}

/// Decrypt `ciphertext || tag` in place and return the plaintext prefix.
///
/// Any authentication failure is reported as [`LatchkeyError::Integrity`].
pub fn open<'a>(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    in_out: &'a mut [u8],
) -> Result<&'a [u8], LatchkeyError> {
    let key = aead_key(key)?;
    key.open_in_place(Nonce::assume_unique_for_key(*nonce), Aad::empty(), in_out)
        .map(|plaintext| &*plaintext)
        .map_err(|_| LatchkeyError::Integrity)
}
