// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `latchkey encrypt`: turn a credential on stdin into a stored blob.

use std::io::Read;

use latchkey_config::LatchkeyConfig;
use latchkey_core::{SecondaryId, StoredCredential};
use latchkey_vault::{CredentialVault, read_passphrase};
use secrecy::SecretString;
use tracing::info;
use zeroize::Zeroizing;

pub async fn run(config: &LatchkeyConfig, secondary_id: Option<u64>) -> Result<(), String> {
    let vault = CredentialVault::from_config(&config.vault).map_err(|e| e.to_string())?;
    let credential = read_credential(std::io::stdin().lock())?;
    let passphrase = read_passphrase(true).map_err(|e| e.to_string())?;

    let blob = vault
        .encrypt_async(credential, passphrase)
        .await
        .map_err(|e| e.to_string())?;
    info!(iterations = vault.iterations(), "credential encrypted");

    match secondary_id {
        Some(id) => {
            let record = StoredCredential {
                secondary_id: SecondaryId(id),
                blob,
            };
            let json = serde_json::to_string(&record)
                .map_err(|e| format!("failed to render record: {e}"))?;
            println!("{json}");
        }
        None => println!("{blob}"),
    }
    Ok(())
}

/// Read the whole of `input` as the credential, dropping one trailing newline.
fn read_credential(mut input: impl Read) -> Result<SecretString, String> {
    let mut raw = Zeroizing::new(String::new());
    input
        .read_to_string(&mut raw)
        .map_err(|e| format!("failed to read credential from stdin: {e}"))?;

    let trimmed = raw
        .strip_suffix('\n')
        .map(|s| s.strip_suffix('\r').unwrap_or(s))
        .unwrap_or(raw.as_str());
    if trimmed.is_empty() {
        return Err("no credential on stdin".to_string());
    }
    Ok(SecretString::from(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn trailing_newline_is_dropped() {
        let secret = read_credential("ltoken=abc\r\n".as_bytes()).unwrap();
        assert_eq!(secret.expose_secret(), "ltoken=abc");
    }

    #[test]
    fn inner_whitespace_is_kept() {
        let secret = read_credential("a b\n\n".as_bytes()).unwrap();
        assert_eq!(secret.expose_secret(), "a b\n");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(read_credential("\n".as_bytes()).is_err());
    }
}
