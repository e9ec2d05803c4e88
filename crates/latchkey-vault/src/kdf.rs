// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from a passphrase.

use std::num::NonZeroU32;

use latchkey_core::LatchkeyError;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Derive a 32-byte key from `passphrase` and `salt`.
///
/// The returned key is wrapped in [`Zeroizing`] so it is wiped on drop.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    iterations: NonZeroU32,
) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        passphrase,
        key.as_mut(),
    );
    key
}

/// Fresh random salt from the system CSPRNG.
pub fn generate_salt(rng: &SystemRandom) -> Result<[u8; SALT_LEN], LatchkeyError> {
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| LatchkeyError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}
