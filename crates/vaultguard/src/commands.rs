// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault subcommands.
//!
//! Secrets and listings go to `out`; progress goes to the log on stderr.

use std::io::Write;

use secrecy::{ExposeSecret, SecretString};
use tracing::info;
use vaultguard_core::VaultError;
use vaultguard_vault::{Reconciliation, VaultOrchestrator};

fn emit(out: &mut impl Write, line: impl std::fmt::Display) -> Result<(), VaultError> {
    writeln!(out, "{line}")
        .map_err(|e| VaultError::Internal(format!("failed to write output: {e}")))
}

pub fn generate(out: &mut impl Write, length: usize) -> Result<(), VaultError> {
    let password = vaultguard_vault::generate(length)?;
    emit(out, &password)?;
    eprintln!("strength: {}", vaultguard_vault::strength(length));
    Ok(())
}

/// The secret for `store`/`replace`: generated, or read from the terminal
/// or one line of stdin.
pub fn obtain_secret(
    vault: &VaultOrchestrator,
    label: &str,
    generate: bool,
    length: Option<usize>,
) -> Result<SecretString, VaultError> {
    if generate {
        return vault.generate_password(length).map(SecretString::from);
    }
    vaultguard_vault::read_secret(&format!("Secret for {label}"))
}

pub async fn store(
    out: &mut impl Write,
    vault: &VaultOrchestrator,
    label: &str,
    secret: &SecretString,
    show_secret: bool,
) -> Result<(), VaultError> {
    let content_id = vault.store(label, secret).await?;
    info!(label = %label, content_id = %content_id, "stored");
    if show_secret {
        emit(out, secret.expose_secret())?;
    }
    Ok(())
}

pub async fn replace(
    out: &mut impl Write,
    vault: &VaultOrchestrator,
    label: &str,
    secret: &SecretString,
    show_secret: bool,
) -> Result<(), VaultError> {
    let content_id = vault.replace(label, secret).await?;
    info!(label = %label, content_id = %content_id, "replaced");
    if show_secret {
        emit(out, secret.expose_secret())?;
    }
    Ok(())
}

pub async fn retrieve(
    out: &mut impl Write,
    vault: &VaultOrchestrator,
    label: &str,
) -> Result<(), VaultError> {
    let secret = vault.retrieve(label).await?;
    emit(out, secret.expose_secret())
}

pub async fn latest(out: &mut impl Write, vault: &VaultOrchestrator) -> Result<(), VaultError> {
    let (label, secret) = vault.retrieve_latest().await?;
    emit(out, format_args!("{label}\t{}", secret.expose_secret()))
}

pub async fn delete(
    out: &mut impl Write,
    vault: &VaultOrchestrator,
    label: &str,
) -> Result<(), VaultError> {
    let removed = vault.delete(label).await?;
    emit(
        out,
        format_args!(
            "deleted {} (record {} stays published)",
            removed.label, removed.content_id
        ),
    )
}

pub async fn list(out: &mut impl Write, vault: &VaultOrchestrator) -> Result<(), VaultError> {
    for entry in vault.list().await? {
        emit(
            out,
            format_args!("{}\t{}\t{}", entry.label, entry.content_id, entry.created_at),
        )?;
    }
    Ok(())
}

pub async fn sync(out: &mut impl Write, vault: &VaultOrchestrator) -> Result<(), VaultError> {
    let line = match vault.rehydrate().await? {
        Reconciliation::EmptySlot => "registry slot is empty".to_string(),
        Reconciliation::AlreadyKnown(cid) => format!("up to date ({cid})"),
        Reconciliation::Added(entry) => format!("added {} ({})", entry.label, entry.content_id),
        Reconciliation::Replaced { previous, current } => format!(
            "updated {} ({} -> {})",
            current.label, previous.content_id, current.content_id
        ),
    };
    emit(out, line)
}
