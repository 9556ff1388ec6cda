// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configured adapters into a [`VaultOrchestrator`].

use std::sync::Arc;

use tracing::debug;
use vaultguard_config::VaultGuardConfig;
use vaultguard_core::{Identity, IndexStore, PluginAdapter, VaultError};
use vaultguard_storage::SqliteIndex;
use vaultguard_vault::{KdfParams, KeyRing, OrchestratorOptions, VaultOrchestrator};

/// The identity the registry writes as; required for every vault command.
pub fn identity(config: &VaultGuardConfig) -> Result<Identity, VaultError> {
    let value = config.vault.identity.as_deref().ok_or_else(|| {
        VaultError::Config(
            "vault.identity is not set (config file or VAULTGUARD_VAULT_IDENTITY)".to_string(),
        )
    })?;
    Identity::new(value)
}

/// Build the vault. The passphrase is asked for last, once everything else
/// is known to be configured.
pub async fn build_vault(config: &VaultGuardConfig) -> Result<VaultOrchestrator, VaultError> {
    let identity = identity(config)?;
    let blobs = vaultguard_blobstore::from_config(&config.blob_store)?;
    let registry = vaultguard_registry::from_config(&config.registry, identity)?;
    let index: Arc<dyn IndexStore> = Arc::new(SqliteIndex::from_config(&config.storage).await?);

    let passphrase = vaultguard_vault::get_passphrase()?;
    let keys = Arc::new(KeyRing::new(passphrase, KdfParams::from(&config.kdf))?);

    let options = OrchestratorOptions {
        default_length: config.generator.default_length,
        confirm_writes: config.vault.confirm_writes,
    };
    debug!(
        blob_store = blobs.name(),
        registry = registry.name(),
        "vault assembled"
    );
    Ok(VaultOrchestrator::new(blobs, registry, index, keys, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_required() {
        let config = vaultguard_config::load_and_validate_str("").unwrap();
        assert!(matches!(identity(&config), Err(VaultError::Config(_))));
    }

    #[test]
    fn identity_read_from_config() {
        let config = vaultguard_config::load_and_validate_str(
            "[vault]\nidentity = \"0x00000000000000000000000000000000000a11ce\"\n",
        )
        .unwrap();
        assert_eq!(
            identity(&config).unwrap().as_str(),
            "0x00000000000000000000000000000000000a11ce"
        );
    }

    #[tokio::test]
    async fn missing_contract_fails_before_passphrase() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            "[vault]\nidentity = \"0x00000000000000000000000000000000000a11ce\"\n\
             [blob_store]\nbackend = \"filesystem\"\ndata_dir = \"{}\"\n\
             [storage]\ndatabase_path = \"{}\"\n",
            dir.path().join("blobs").display(),
            dir.path().join("index.db").display(),
        );
        let config = vaultguard_config::load_and_validate_str(&toml).unwrap();
        assert!(matches!(
            build_vault(&config).await,
            Err(VaultError::Config(_))
        ));
    }
}
