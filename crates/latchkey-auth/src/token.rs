// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correlation token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use latchkey_core::{LatchkeyError, RequestToken};
use ring::rand::{SecureRandom, SystemRandom};

/// Random bytes per token (128 bits).
pub const TOKEN_BYTES: usize = 16;

/// Draw a fresh URL-safe token from the system CSPRNG.
pub fn generate_token(rng: &SystemRandom) -> Result<RequestToken, LatchkeyError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    rng.fill(&mut bytes)
        .map_err(|_| LatchkeyError::Internal("failed to generate request token".to_string()))?;
    Ok(RequestToken::new(URL_SAFE_NO_PAD.encode(bytes)))
}
