// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-addressed blob store trait.

use async_trait::async_trait;

use crate::error::VaultError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ContentId;

/// A content-addressed, append-only byte store (IPFS, a local directory).
///
/// Stores are append-only: there is no delete operation.
#[async_trait]
pub trait BlobStore: PluginAdapter {
    /// Publishes `bytes` and returns their content id.
    ///
    /// Idempotent: identical bytes always yield the same id and are stored once.
    async fn put(&self, bytes: &[u8]) -> Result<ContentId, VaultError>;

    /// Fetches the payload stored under `content_id`.
    ///
    /// Fails with [`VaultError::NotFound`] when the id is unknown or not yet
    /// propagated.
    async fn get(&self, content_id: &ContentId) -> Result<Vec<u8>, VaultError>;
}
