// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client trait for the single-slot-per-identity pointer registry.

use async_trait::async_trait;

use crate::error::VaultError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ContentId, Identity, RegistryReceipt};

/// A client bound to one sender identity.
///
/// The registry keys writes by the transaction sender, never by an argument,
/// so `set_pointer` can only ever touch [`RegistryClient::identity`]'s slot.
#[async_trait]
pub trait RegistryClient: PluginAdapter {
    /// The identity this client writes as.
    fn identity(&self) -> &Identity;

    /// Overwrites the sender's slot with `content_id` and waits for the write
    /// to be committed.
    ///
    /// Never retried internally: an ambiguous failure is surfaced as-is.
    async fn set_pointer(&self, content_id: &ContentId) -> Result<RegistryReceipt, VaultError>;

    /// Reads the current pointer for `identity`; `None` when the slot is empty.
    async fn get_pointer(&self, identity: &Identity) -> Result<Option<ContentId>, VaultError>;
}
