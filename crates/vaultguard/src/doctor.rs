// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vaultguard doctor` command implementation.
//!
//! Runs diagnostic checks against the configured index, blob store and
//! registry without touching any credential.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use vaultguard_config::VaultGuardConfig;
use vaultguard_core::{HealthStatus, PluginAdapter, VaultError};
use vaultguard_storage::SqliteIndex;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }

    fn from_health(name: &str, health: Result<HealthStatus, VaultError>, start: Instant) -> Self {
        match health {
            Ok(HealthStatus::Healthy) => Self::new(name, CheckStatus::Pass, "healthy", start),
            Ok(HealthStatus::Degraded(reason)) => Self::new(name, CheckStatus::Warn, reason, start),
            Ok(HealthStatus::Unhealthy(reason)) => Self::new(name, CheckStatus::Fail, reason, start),
            Err(e) => Self::new(name, CheckStatus::Fail, e.to_string(), start),
        }
    }
}

/// Run the `vaultguard doctor` command and print a report to stdout.
pub async fn run_doctor(config: &VaultGuardConfig) -> Result<(), VaultError> {
    let use_color = std::io::stdout().is_terminal();
    let results = vec![
        check_config(config),
        check_index(&config.storage.database_path).await,
        check_blob_store(config).await,
        check_registry(config).await,
    ];

    println!();
    println!("  vaultguard doctor");
    println!("  {}", "-".repeat(50));

    for result in &results {
        println!("{}", render_line(result, use_color));
    }

    println!();
    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if !use_color {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        return format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }

    use colored::Colorize;
    let (symbol, message) = match result.status {
        CheckStatus::Pass => ("✓".green(), result.message.normal()),
        CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
        CheckStatus::Fail => ("✗".red(), result.message.red()),
    };
    format!(
        "    {symbol} {:<20} {message} ({duration_ms}ms)",
        result.name
    )
}

fn check_config(config: &VaultGuardConfig) -> CheckResult {
    let start = Instant::now();
    match crate::bootstrap::identity(config) {
        Ok(identity) => CheckResult::new(
            "Configuration",
            CheckStatus::Pass,
            format!("identity {identity}"),
            start,
        ),
        Err(e) => CheckResult::new("Configuration", CheckStatus::Warn, e.to_string(), start),
    }
}

async fn check_index(db_path: &str) -> CheckResult {
    let start = Instant::now();
    if !std::path::Path::new(db_path).exists() {
        return CheckResult::new(
            "Index database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first store)"),
            start,
        );
    }

    match SqliteIndex::open(db_path).await {
        Ok(index) => CheckResult::from_health("Index database", index.health_check().await, start),
        Err(e) => CheckResult::new(
            "Index database",
            CheckStatus::Fail,
            format!("open failed: {e}"),
            start,
        ),
    }
}

async fn check_blob_store(config: &VaultGuardConfig) -> CheckResult {
    let start = Instant::now();
    match vaultguard_blobstore::from_config(&config.blob_store) {
        Ok(store) => CheckResult::from_health("Blob store", store.health_check().await, start),
        Err(e) => CheckResult::new("Blob store", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_registry(config: &VaultGuardConfig) -> CheckResult {
    let start = Instant::now();
    if config.registry.contract_address.is_none() {
        return CheckResult::new(
            "Registry",
            CheckStatus::Warn,
            "registry.contract_address is not set",
            start,
        );
    }
    let identity = match crate::bootstrap::identity(config) {
        Ok(identity) => identity,
        Err(_) => {
            return CheckResult::new(
                "Registry",
                CheckStatus::Warn,
                "skipped (no identity)",
                start,
            );
        }
    };

    match vaultguard_registry::from_config(&config.registry, identity) {
        Ok(registry) => CheckResult::from_health("Registry", registry.health_check().await, start),
        Err(e) => CheckResult::new("Registry", CheckStatus::Fail, e.to_string(), start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(extra: &str) -> VaultGuardConfig {
        vaultguard_config::load_and_validate_str(extra).unwrap()
    }

    #[test]
    fn missing_identity_warns() {
        let result = check_config(&config(""));
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("vault.identity"));
    }

    #[test]
    fn plain_rendering_uses_tags() {
        let result = CheckResult {
            name: "Registry".to_string(),
            status: CheckStatus::Fail,
            message: "unreachable".to_string(),
            duration: Duration::from_millis(7),
        };
        let line = render_line(&result, false);
        assert!(line.contains("[FAIL]"));
        assert!(line.contains("unreachable (7ms)"));
    }

    #[test]
    fn health_maps_to_status() {
        let start = Instant::now();
        assert_eq!(
            CheckResult::from_health("x", Ok(HealthStatus::Healthy), start).status,
            CheckStatus::Pass
        );
        assert_eq!(
            CheckResult::from_health("x", Ok(HealthStatus::Degraded("slow".into())), start).status,
            CheckStatus::Warn
        );
        assert_eq!(
            CheckResult::from_health("x", Err(VaultError::Internal("boom".into())), start).status,
            CheckStatus::Fail
        );
    }

    #[tokio::test]
    async fn missing_index_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let result = check_index(path.to_str().unwrap()).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("not found"));
    }

    #[tokio::test]
    async fn existing_index_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");
        drop(SqliteIndex::open(&path).await.unwrap());
        let result = check_index(path.to_str().unwrap()).await;
        assert_eq!(result.status, CheckStatus::Pass, "{}", result.message);
    }

    #[tokio::test]
    async fn registry_without_contract_warns() {
        let result = check_registry(&config("")).await;
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn filesystem_blob_store_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            "[blob_store]\nbackend = \"filesystem\"\ndata_dir = \"{}\"\n",
            dir.path().display()
        );
        let result = check_blob_store(&config(&toml)).await;
        assert_eq!(result.status, CheckStatus::Pass, "{}", result.message);
    }
}
