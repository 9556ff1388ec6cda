// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vaultguard.toml` > `~/.config/vaultguard/vaultguard.toml`
//! > `/etc/vaultguard/vaultguard.toml` with environment variable overrides via
//! the `VAULTGUARD_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::VaultGuardConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/vaultguard/vaultguard.toml";

/// Local configuration file, relative to the working directory.
pub const LOCAL_CONFIG_FILE: &str = "vaultguard.toml";

/// Path of the per-user configuration file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vaultguard").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vaultguard/vaultguard.toml` (system-wide)
/// 3. `~/.config/vaultguard/vaultguard.toml` (user XDG config)
/// 4. `./vaultguard.toml` (local directory)
/// 5. `VAULTGUARD_*` environment variables
pub fn load_config() -> Result<VaultGuardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<VaultGuardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VaultGuardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VaultGuardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VaultGuardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(VaultGuardConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because section and key
/// names contain underscores: `VAULTGUARD_BLOB_STORE_API_URL` must map to
/// `blob_store.api_url`, not `blob.store.api.url`. The passphrase variable is
/// not configuration and is filtered out.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("VAULTGUARD_")
        .filter(|key| key.as_str().to_ascii_lowercase() != "passphrase")
        .map(|key| {
            // Example: VAULTGUARD_REGISTRY_RPC_URL -> "registry_rpc_url" -> "registry.rpc_url"
            let key_str = key.as_str().to_ascii_lowercase();
            for section in ENV_SECTIONS {
                if let Some(rest) = key_str
                    .strip_prefix(section)
                    .and_then(|r| r.strip_prefix('_'))
                {
                    return format!("{section}.{rest}").into();
                }
            }
            key_str.into()
        })
}

/// Top-level sections addressable from the environment, longest prefix first.
const ENV_SECTIONS: &[&str] = &[
    "blob_store",
    "generator",
    "registry",
    "storage",
    "vault",
    "kdf",
];
