// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry client over an in-process contract with call counting,
//! failure injection and a scripted concurrent writer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use vaultguard_core::{
    AdapterType, ContentId, HealthStatus, Identity, PluginAdapter, PointerChanged,
    RegistryClient, RegistryReceipt, VaultError,
};
use vaultguard_registry::{LocalRegistry, SharedRegistry};

/// Wraps a [`LocalRegistry`] so tests can observe and disturb it.
pub struct MockRegistry {
    inner: LocalRegistry,
    set_failures: Mutex<VecDeque<VaultError>>,
    interloper: Mutex<Option<ContentId>>,
    sets: AtomicUsize,
    gets: AtomicUsize,
    hang: AtomicBool,
}

impl MockRegistry {
    pub fn new(identity: Identity) -> Self {
        Self::over(LocalRegistry::new(identity))
    }

    /// A mock writing as `identity` into the same contract as `self`.
    pub fn sibling(&self, identity: Identity) -> Self {
        Self::over(self.inner.as_identity(identity))
    }

    fn over(inner: LocalRegistry) -> Self {
        Self {
            inner,
            set_failures: Mutex::new(VecDeque::new()),
            interloper: Mutex::new(None),
            sets: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            hang: AtomicBool::new(false),
        }
    }

    /// Make the next `set_pointer` fail with `error` without touching the slot.
    pub async fn fail_next_set(&self, error: VaultError) {
        self.set_failures.lock().await.push_back(error);
    }

    /// After the next successful write, overwrite the same slot with
    /// `content_id`, as a concurrent writer would.
    pub async fn race_next_write_with(&self, content_id: ContentId) {
        *self.interloper.lock().await = Some(content_id);
    }

    pub fn hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    pub fn contract(&self) -> &SharedRegistry {
        self.inner.registry()
    }

    /// Events emitted by the contract so far.
    pub fn events(&self) -> Vec<PointerChanged> {
        self.contract()
            .lock()
            .map(|registry| registry.events().to_vec())
            .unwrap_or_default()
    }

    pub fn set_calls(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    async fn maybe_hang(&self) {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl PluginAdapter for MockRegistry {
    fn name(&self) -> &str {
        "mock-registry"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Registry
    }

    async fn health_check(&self) -> Result<HealthStatus, VaultError> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    fn identity(&self) -> &Identity {
        self.inner.identity()
    }

    async fn set_pointer(&self, content_id: &ContentId) -> Result<RegistryReceipt, VaultError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.maybe_hang().await;
        if let Some(error) = self.set_failures.lock().await.pop_front() {
            return Err(error);
        }
        let receipt = self.inner.set_pointer(content_id).await?;
        if let Some(other) = self.interloper.lock().await.take() {
            self.inner.set_pointer(&other).await?;
        }
        Ok(receipt)
    }

    async fn get_pointer(&self, identity: &Identity) -> Result<Option<ContentId>, VaultError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.maybe_hang().await;
        self.inner.get_pointer(identity).await
    }
}
