// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase and secret acquisition via TTY prompt, environment, or stdin.

use std::io::{BufRead, IsTerminal};

use secrecy::SecretString;
use vaultguard_core::VaultError;
use zeroize::Zeroizing;

/// The environment variable name for providing the vault passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "VAULTGUARD_PASSPHRASE";

/// Get the vault passphrase.
///
/// Priority:
/// 1. `VAULTGUARD_PASSPHRASE` environment variable (for scripts and services)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_passphrase() -> Result<SecretString, VaultError> {
    if let Ok(value) = std::env::var(PASSPHRASE_ENV_VAR) {
        if !value.is_empty() {
            return Ok(SecretString::from(value));
        }
    }

    if std::io::stdin().is_terminal() {
        let passphrase = Zeroizing::new(
            rpassword::prompt_password("Vault passphrase: ")
                .map_err(|e| VaultError::Config(format!("failed to read passphrase: {e}")))?,
        );
        if passphrase.is_empty() {
            return Err(VaultError::Config("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(passphrase.to_string()));
    }

    Err(VaultError::Config(format!(
        "no passphrase provided; set {PASSPHRASE_ENV_VAR} or run interactively"
    )))
}

/// Read a secret to store.
///
/// On a TTY the secret is prompted for twice without echo. Otherwise one line
/// is read from stdin, without its trailing newline.
pub fn read_secret(prompt: &str) -> Result<SecretString, VaultError> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        let first = Zeroizing::new(
            rpassword::prompt_password(format!("{prompt}: "))
                .map_err(|e| VaultError::InvalidInput(format!("failed to read secret: {e}")))?,
        );
        let second = Zeroizing::new(
            rpassword::prompt_password(format!("Confirm {}: ", prompt.to_lowercase()))
                .map_err(|e| VaultError::InvalidInput(format!("failed to read secret: {e}")))?,
        );
        if *first != *second {
            return Err(VaultError::InvalidInput("secrets do not match".to_string()));
        }
        return non_empty(&first);
    }

    read_secret_line(&mut stdin.lock())
}

/// Read one line from `reader` as a secret.
pub fn read_secret_line(reader: &mut impl BufRead) -> Result<SecretString, VaultError> {
    let mut line = Zeroizing::new(String::new());
    reader
        .read_line(&mut line)
        .map_err(|e| VaultError::InvalidInput(format!("failed to read secret: {e}")))?;
    non_empty(line.trim_end_matches(['\r', '\n']))
}

fn non_empty(secret: &str) -> Result<SecretString, VaultError> {
    if secret.is_empty() {
        return Err(VaultError::InvalidInput("empty secret not allowed".to_string()));
    }
    Ok(SecretString::from(secret.to_string()))
}
