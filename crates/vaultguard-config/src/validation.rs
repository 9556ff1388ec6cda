// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde attributes cannot express: URL schemes, account
//! address shape, Argon2id floors, and positive timeouts.

use crate::diagnostic::ConfigError;
use crate::model::{BlobBackend, VaultGuardConfig};

/// Argon2id floors. Lower values are rejected outright.
pub const MIN_KDF_MEMORY_COST: u32 = 32768;
pub const MIN_KDF_ITERATIONS: u32 = 2;
pub const MIN_KDF_PARALLELISM: u32 = 1;

/// Shortest generated password that still fits one of each character class.
pub const MIN_GENERATOR_LENGTH: usize = 4;

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &VaultGuardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(identity) = &config.vault.identity {
        if identity.trim().is_empty() {
            errors.push(ConfigError::validation(
                "vault",
                "identity",
                "must not be empty when set",
            ));
        }
    }

    let kdf = &config.kdf;
    if kdf.memory_cost < MIN_KDF_MEMORY_COST {
        errors.push(ConfigError::validation(
            "kdf",
            "memory_cost",
            format!(
                "must be at least {MIN_KDF_MEMORY_COST} (32 MiB), got {}",
                kdf.memory_cost
            ),
        ));
    }
    if kdf.iterations < MIN_KDF_ITERATIONS {
        errors.push(ConfigError::validation(
            "kdf",
            "iterations",
            format!(
                "must be at least {MIN_KDF_ITERATIONS}, got {}",
                kdf.iterations
            ),
        ));
    }
    if kdf.parallelism < MIN_KDF_PARALLELISM {
        errors.push(ConfigError::validation(
            "kdf",
            "parallelism",
            format!(
                "must be at least {MIN_KDF_PARALLELISM}, got {}",
                kdf.parallelism
            ),
        ));
    }

    if config.generator.default_length < MIN_GENERATOR_LENGTH {
        errors.push(ConfigError::validation(
            "generator",
            "default_length",
            format!(
                "must be at least {MIN_GENERATOR_LENGTH}, got {}",
                config.generator.default_length
            ),
        ));
    }

    let blobs = &config.blob_store;
    match blobs.backend {
        BlobBackend::Ipfs => {
            if let Err(msg) = check_http_url(&blobs.api_url) {
                errors.push(ConfigError::validation("blob_store", "api_url", msg));
            }
        }
        BlobBackend::Filesystem => {
            if blobs.data_dir.trim().is_empty() {
                errors.push(ConfigError::validation(
                    "blob_store",
                    "data_dir",
                    "must not be empty",
                ));
            }
        }
    }
    if blobs.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "blob_store",
            "timeout_secs",
            "must be greater than zero",
        ));
    }

    let registry = &config.registry;
    if let Err(msg) = check_http_url(&registry.rpc_url) {
        errors.push(ConfigError::validation("registry", "rpc_url", msg));
    }
    if let Some(address) = &registry.contract_address {
        if !is_account_address(address) {
            errors.push(ConfigError::validation(
                "registry",
                "contract_address",
                format!("`{address}` is not a 0x-prefixed 20-byte hex address"),
            ));
        }
    }
    if registry.receipt_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "registry",
            "receipt_timeout_secs",
            "must be greater than zero",
        ));
    }
    if registry.poll_interval_ms == 0 {
        errors.push(ConfigError::validation(
            "registry",
            "poll_interval_ms",
            "must be greater than zero",
        ));
    }
    if registry.gas_limit == Some(0) {
        errors.push(ConfigError::validation(
            "registry",
            "gas_limit",
            "must be greater than zero when set",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage",
            "database_path",
            "must not be empty",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `0x` followed by exactly 40 hex digits.
pub fn is_account_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn check_http_url(url: &str) -> Result<(), String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err("must not be empty".to_string());
    }
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| format!("`{trimmed}` must start with http:// or https://"))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(format!("`{trimmed}` has no host"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VaultGuardConfig;

    fn messages(config: &VaultGuardConfig) -> Vec<String> {
        match validate_config(config) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&VaultGuardConfig::default()).is_ok());
    }

    #[test]
    fn weak_kdf_params_are_all_reported() {
        let mut config = VaultGuardConfig::default();
        config.kdf.memory_cost = 1024;
        config.kdf.iterations = 1;
        config.kdf.parallelism = 0;

        let msgs = messages(&config);
        assert_eq!(msgs.len(), 3, "{msgs:?}");
        assert!(msgs[0].starts_with("kdf.memory_cost"));
        assert!(msgs[1].starts_with("kdf.iterations"));
        assert!(msgs[2].starts_with("kdf.parallelism"));
    }

    #[test]
    fn generator_length_below_class_count_rejected() {
        let mut config = VaultGuardConfig::default();
        config.generator.default_length = 3;
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("generator.default_length"));
    }

    #[test]
    fn non_http_rpc_url_rejected() {
        let mut config = VaultGuardConfig::default();
        config.registry.rpc_url = "ws://localhost:8546".into();
        let msgs = messages(&config);
        assert!(msgs[0].contains("registry.rpc_url"));
        assert!(msgs[0].contains("http://"));
    }

    #[test]
    fn ipfs_url_only_checked_for_ipfs_backend() {
        let mut config = VaultGuardConfig::default();
        config.blob_store.api_url = String::new();
        assert_eq!(messages(&config).len(), 1);

        config.blob_store.backend = BlobBackend::Filesystem;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn contract_address_shape() {
        assert!(is_account_address(
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        ));
        assert!(!is_account_address("5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert!(!is_account_address("0x5FbDB2315678afecb367f032d93F642f64180aa"));
        assert!(!is_account_address(
            "0xZZbDB2315678afecb367f032d93F642f64180aa3"
        ));
    }

    #[test]
    fn zero_timeouts_rejected() {
        let mut config = VaultGuardConfig::default();
        config.blob_store.timeout_secs = 0;
        config.registry.receipt_timeout_secs = 0;
        config.registry.poll_interval_ms = 0;
        assert_eq!(messages(&config).len(), 3);
    }

    #[test]
    fn blank_identity_rejected() {
        let mut config = VaultGuardConfig::default();
        config.vault.identity = Some("  ".into());
        let msgs = messages(&config);
        assert_eq!(msgs, vec!["vault.identity: must not be empty when set"]);
    }

    #[test]
    fn url_without_host_rejected() {
        assert!(check_http_url("http://").is_err());
        assert!(check_http_url("https:///path").is_err());
        assert!(check_http_url("https://node.example:8545").is_ok());
    }
}
