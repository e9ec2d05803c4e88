// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `latchkey verify`: check a blob against a passphrase.

use latchkey_config::LatchkeyConfig;
use latchkey_core::{EncryptedCredential, mask_secret};
use latchkey_vault::{CredentialVault, read_passphrase};
use secrecy::ExposeSecret;
use tracing::warn;

pub async fn run(config: &LatchkeyConfig, blob: String) -> Result<(), String> {
    let vault = CredentialVault::from_config(&config.vault).map_err(|e| e.to_string())?;
    let passphrase = read_passphrase(false).map_err(|e| e.to_string())?;

    match vault
        .decrypt_async(EncryptedCredential::new(blob), passphrase)
        .await
    {
        Ok(plaintext) => {
            println!("ok: {}", mask_secret(plaintext.expose_secret()));
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "blob did not verify");
            Err(e.public_message().to_string())
        }
    }
}
