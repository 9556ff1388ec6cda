// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process registry client for development and tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;
use vaultguard_core::{
    AdapterType, ContentId, HealthStatus, Identity, PluginAdapter, RegistryClient,
    RegistryReceipt, VaultError,
};

use crate::contract::PointerRegistry;

/// A [`PointerRegistry`] shared between clients.
pub type SharedRegistry = Arc<Mutex<PointerRegistry>>;

/// A [`RegistryClient`] that writes as one identity to a shared in-process registry.
///
/// Every successful write gets the next block number.
#[derive(Debug, Clone)]
pub struct LocalRegistry {
    registry: SharedRegistry,
    identity: Identity,
    blocks: Arc<AtomicU64>,
}

impl LocalRegistry {
    /// A client over its own fresh registry.
    pub fn new(identity: Identity) -> Self {
        Self::shared(identity, Arc::new(Mutex::new(PointerRegistry::new())))
    }

    /// A client over an existing registry, e.g. to model two writers.
    pub fn shared(identity: Identity, registry: SharedRegistry) -> Self {
        Self {
            registry,
            identity,
            blocks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A client for `identity` over the same registry.
    pub fn as_identity(&self, identity: Identity) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            identity,
            blocks: Arc::clone(&self.blocks),
        }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    fn lock(&self) -> Result<MutexGuard<'_, PointerRegistry>, VaultError> {
        self.registry
            .lock()
            .map_err(|_| VaultError::Internal("registry lock poisoned".to_string()))
    }
}

#[async_trait]
impl PluginAdapter for LocalRegistry {
    fn name(&self) -> &str {
        "local-registry"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Registry
    }

    async fn health_check(&self) -> Result<HealthStatus, VaultError> {
        self.lock()?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl RegistryClient for LocalRegistry {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    async fn set_pointer(&self, content_id: &ContentId) -> Result<RegistryReceipt, VaultError> {
        let event = self.lock()?.set_pointer(&self.identity, content_id.as_str())?;
        let block = self.blocks.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(identity = %self.identity, content_id = %content_id, block, "local pointer set");
        Ok(RegistryReceipt {
            tx_hash: format!("local-{block}"),
            block_number: Some(block),
            event,
        })
    }

    async fn get_pointer(&self, identity: &Identity) -> Result<Option<ContentId>, VaultError> {
        let registry = self.lock()?;
        match registry.get_pointer(identity) {
            "" => Ok(None),
            value => ContentId::new(value).map(Some),
        }
    }
}
