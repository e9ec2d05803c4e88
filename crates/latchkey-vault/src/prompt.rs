// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition via TTY prompt or the `LATCHKEY_PASSPHRASE` environment variable.

use std::io::IsTerminal;

use latchkey_core::LatchkeyError;
use secrecy::{ExposeSecret, SecretString};

/// Environment variable consulted before prompting.
pub const PASSPHRASE_ENV_VAR: &str = "LATCHKEY_PASSPHRASE";

/// Read a passphrase from the environment or an interactive prompt.
///
/// With `confirm` set, an interactive prompt asks twice and fails if the
/// entries differ. The environment variable is taken as-is.
pub fn read_passphrase(confirm: bool) -> Result<SecretString, LatchkeyError> {
    if let Ok(value) = std::env::var(PASSPHRASE_ENV_VAR)
        && !value.is_empty()
    {
        return Ok(SecretString::from(value));
    }

    if !std::io::stdin().is_terminal() {
        return Err(LatchkeyError::Validation(format!(
            "no passphrase provided; set {PASSPHRASE_ENV_VAR} or run interactively"
        )));
    }

    let first = prompt("Passphrase: ")?;
    if confirm {
        let second = prompt("Confirm passphrase: ")?;
        if first.expose_secret() != second.expose_secret() {
            return Err(LatchkeyError::Validation(
                "passphrases do not match".to_string(),
            ));
        }
    }
    Ok(first)
}

fn prompt(label: &str) -> Result<SecretString, LatchkeyError> {
    let entered = rpassword::prompt_password(label)
        .map_err(|e| LatchkeyError::Internal(format!("failed to read passphrase: {e}")))?;
    if entered.is_empty() {
        return Err(LatchkeyError::Validation(
            "empty passphrase not allowed".to_string(),
        ));
    }
    Ok(SecretString::from(entered))
}
