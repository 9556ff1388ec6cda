// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for VaultGuard.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level VaultGuard configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultGuardConfig {
    /// Identity and write-confirmation settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Argon2id parameters for passphrase key derivation.
    #[serde(default)]
    pub kdf: KdfConfig,

    /// Password generator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Content-addressed blob store settings.
    #[serde(default)]
    pub blob_store: BlobStoreConfig,

    /// On-chain pointer registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Local index database settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Identity and pipeline behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Registry account the vault writes as. Required for store and retrieve.
    #[serde(default)]
    pub identity: Option<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Re-read the registry slot after each write and warn when a concurrent
    /// writer superseded it.
    #[serde(default)]
    pub confirm_writes: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            identity: None,
            log_level: default_log_level(),
            confirm_writes: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Argon2id key derivation configuration.
///
/// Controls the parameters used to derive record keys from the passphrase.
/// Defaults follow OWASP recommendations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KdfConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub parallelism: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            memory_cost: default_kdf_memory_cost(),
            iterations: default_kdf_iterations(),
            parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_kdf_memory_cost() -> u32 {
    65536 // 64 MiB per OWASP recommendation
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

/// Password generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Length used when `--length` is not given.
    #[serde(default = "default_password_length")]
    pub default_length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_length: default_password_length(),
        }
    }
}

fn default_password_length() -> usize {
    12
}

/// Which blob store backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    /// An IPFS node reached through the Kubo RPC API.
    #[default]
    Ipfs,
    /// A local directory of files named by content id.
    Filesystem,
}

/// Blob store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BlobStoreConfig {
    #[serde(default)]
    pub backend: BlobBackend,

    /// Base URL of the Kubo RPC API.
    #[serde(default = "default_ipfs_api_url")]
    pub api_url: String,

    /// Root directory for the filesystem backend.
    #[serde(default = "default_blob_dir")]
    pub data_dir: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_blob_timeout_secs")]
    pub timeout_secs: u64,

    /// Check ids returned by the node against a local computation, and
    /// re-hash fetched payloads.
    #[serde(default = "default_true")]
    pub verify_content_id: bool,

    /// Pin published records on the IPFS node.
    #[serde(default = "default_true")]
    pub pin: bool,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::default(),
            api_url: default_ipfs_api_url(),
            data_dir: default_blob_dir(),
            timeout_secs: default_blob_timeout_secs(),
            verify_content_id: true,
            pin: true,
        }
    }
}

fn default_ipfs_api_url() -> String {
    "http://127.0.0.1:5001".to_string()
}

fn default_blob_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("vaultguard").join("blobs"))
        .unwrap_or_else(|| std::path::PathBuf::from("blobs"))
        .to_string_lossy()
        .into_owned()
}

fn default_blob_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Pointer registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Chain node JSON-RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Address of the deployed PointerRegistry contract.
    #[serde(default)]
    pub contract_address: Option<String>,

    /// How long to wait for a transaction receipt.
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,

    /// Interval between receipt polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Explicit gas limit for `setPointer`; the node estimates when unset.
    #[serde(default)]
    pub gas_limit: Option<u64>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            contract_address: None,
            receipt_timeout_secs: default_receipt_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            gas_limit: None,
        }
    }
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_receipt_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    500
}

/// Local index database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file holding the label index.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("vaultguard").join("index.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("index.db"))
        .to_string_lossy()
        .into_owned()
}
