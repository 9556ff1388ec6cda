// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local label index trait.

use async_trait::async_trait;

use crate::error::VaultError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ContentId, IndexEntry};

/// Persistence for the label -> ContentId projection.
///
/// Each method is atomic with respect to the others.
#[async_trait]
pub trait IndexStore: PluginAdapter {
    /// Looks up the entry for `label`.
    async fn get(&self, label: &str) -> Result<Option<IndexEntry>, VaultError>;

    /// All live entries ordered by label.
    async fn list(&self) -> Result<Vec<IndexEntry>, VaultError>;

    /// Adds a new entry; fails with [`VaultError::LabelExists`] on a duplicate label.
    async fn insert(&self, entry: &IndexEntry) -> Result<(), VaultError>;

    /// Deletes any entry for `entry.label` and creates `entry` in one step.
    ///
    /// Returns the entry that was replaced, if any.
    async fn replace(&self, entry: &IndexEntry) -> Result<Option<IndexEntry>, VaultError>;

    /// Removes the entry for `label`, tombstoning its content id.
    async fn remove(&self, label: &str) -> Result<Option<IndexEntry>, VaultError>;

    /// True when `content_id` belongs to a live entry or a tombstone.
    async fn is_known(&self, content_id: &ContentId) -> Result<bool, VaultError>;
}
