// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory blob store with call counting and failure injection.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use vaultguard_blobstore::compute_content_id;
use vaultguard_core::{
    AdapterType, BlobStore, ContentId, HealthStatus, PluginAdapter, VaultError,
};

/// A blob store that keeps blobs in a map keyed by their real content id.
///
/// Queued failures are returned by the next calls, oldest first. A hung
/// store never completes `put` or `get`, for cancellation tests.
#[derive(Default)]
pub struct MockBlobStore {
    blobs: Mutex<HashMap<ContentId, Vec<u8>>>,
    put_failures: Mutex<VecDeque<VaultError>>,
    get_failures: Mutex<VecDeque<VaultError>>,
    puts: AtomicUsize,
    gets: AtomicUsize,
    hang: AtomicBool,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `put` fail with `error`.
    pub async fn fail_next_put(&self, error: VaultError) {
        self.put_failures.lock().await.push_back(error);
    }

    /// Make the next `get` fail with `error`.
    pub async fn fail_next_get(&self, error: VaultError) {
        self.get_failures.lock().await.push_back(error);
    }

    /// Block every subsequent call until the future is dropped.
    pub fn hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    /// Overwrite the stored bytes for `id` without changing the id.
    pub async fn tamper(&self, id: &ContentId, bytes: Vec<u8>) {
        self.blobs.lock().await.insert(id.clone(), bytes);
    }

    pub async fn contains(&self, id: &ContentId) -> bool {
        self.blobs.lock().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
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
impl PluginAdapter for MockBlobStore {
    fn name(&self) -> &str {
        "mock-blob-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::BlobStore
    }

    async fn health_check(&self) -> Result<HealthStatus, VaultError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn put(&self, bytes: &[u8]) -> Result<ContentId, VaultError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.maybe_hang().await;
        if let Some(error) = self.put_failures.lock().await.pop_front() {
            return Err(error);
        }
        let id = compute_content_id(bytes)?;
        self.blobs.lock().await.insert(id.clone(), bytes.to_vec());
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, VaultError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.maybe_hang().await;
        if let Some(error) = self.get_failures.lock().await.pop_front() {
            return Err(error);
        }
        self.blobs
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(format!("blob {id}")))
    }
}
