// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`IndexStore`] with the same semantics as the SQLite index.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use vaultguard_core::{
    AdapterType, ContentId, HealthStatus, IndexEntry, IndexStore, PluginAdapter, VaultError,
};

#[derive(Default)]
struct State {
    entries: BTreeMap<String, IndexEntry>,
    tombstones: HashSet<ContentId>,
}

/// Label index held in a `BTreeMap`, so `list` is ordered by label.
#[derive(Default)]
pub struct MemoryIndex {
    state: Mutex<State>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn tombstones(&self) -> usize {
        self.state.lock().await.tombstones.len()
    }
}

#[async_trait]
impl PluginAdapter for MemoryIndex {
    fn name(&self) -> &str {
        "memory-index"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Index
    }

    async fn health_check(&self) -> Result<HealthStatus, VaultError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl IndexStore for MemoryIndex {
    async fn get(&self, label: &str) -> Result<Option<IndexEntry>, VaultError> {
        Ok(self.state.lock().await.entries.get(label).cloned())
    }

    async fn list(&self) -> Result<Vec<IndexEntry>, VaultError> {
        Ok(self.state.lock().await.entries.values().cloned().collect())
    }

    async fn insert(&self, entry: &IndexEntry) -> Result<(), VaultError> {
        let mut state = self.state.lock().await;
        if state.entries.contains_key(&entry.label) {
            return Err(VaultError::LabelExists(entry.label.clone()));
        }
        state.entries.insert(entry.label.clone(), entry.clone());
        Ok(())
    }

    async fn replace(&self, entry: &IndexEntry) -> Result<Option<IndexEntry>, VaultError> {
        Ok(self
            .state
            .lock()
            .await
            .entries
            .insert(entry.label.clone(), entry.clone()))
    }

    async fn remove(&self, label: &str) -> Result<Option<IndexEntry>, VaultError> {
        let mut state = self.state.lock().await;
        let removed = state.entries.remove(label);
        if let Some(entry) = &removed {
            state.tombstones.insert(entry.content_id.clone());
        }
        Ok(removed)
    }

    async fn is_known(&self, content_id: &ContentId) -> Result<bool, VaultError> {
        let state = self.state.lock().await;
        Ok(state.tombstones.contains(content_id)
            || state.entries.values().any(|e| &e.content_id == content_id))
    }
}
