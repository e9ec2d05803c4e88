// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers for handling secret strings without leaking them.

use secrecy::{ExposeSecret, SecretString};

/// Mask a secret value for display: "sess-abc...wxyz" becomes "sess...wxyz".
///
/// Shows prefix (up to 4 chars) and suffix (up to 4 chars) with "..." in between.
/// Short values (< 10 chars) are fully masked as "****".
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}

/// Make an independent copy of a secret. Both copies zeroize on drop.
pub fn duplicate_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_secret_long_value() {
        assert_eq!(mask_secret("ltoken_v2=abcdefghijklmnop"), "ltok...mnop");
    }

    #[test]
    fn mask_secret_short_value() {
        assert_eq!(mask_secret("short"), "****");
    }

    #[test]
    fn mask_secret_exact_boundary() {
        assert_eq!(mask_secret("1234567890"), "1234...7890");
    }

    #[test]
    fn mask_secret_multibyte_does_not_split_chars() {
        assert_eq!(mask_secret("世界世界世界世界世界"), "世界世界...世界世界");
    }

    #[test]
    fn duplicate_secret_is_equal_and_independent() {
        let original = SecretString::from("sess-abc".to_string());
        let copy = duplicate_secret(&original);
        drop(original);
        assert_eq!(copy.expose_secret(), "sess-abc");
    }
}
