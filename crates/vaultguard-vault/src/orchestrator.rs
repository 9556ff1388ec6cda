// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store and retrieve workflows over the blob store, the registry, and the
//! local index.
//!
//! `store` = seal → publish → register → index. The index write is always the
//! last step, so any earlier failure (or cancellation) leaves it untouched.
//! Index-changing operations take one writer lock per vault, so two
//! concurrent writes never leave the registry head on an unindexed record.
//! The index is a projection of registry plus store; [`VaultOrchestrator::rehydrate`]
//! rebuilds it from the registry head.

use std::future::Future;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vaultguard_core::{
    BlobStore, ContentId, Identity, IndexEntry, IndexStore, PluginAdapter, RegistryClient,
    VaultError,
};

use crate::generator;
use crate::keys::KeyRing;
use crate::record::{EncryptedRecord, SealedCredential};

/// Tunables read from `[vault]` and `[generator]`.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    pub default_length: usize,
    /// Re-read the registry slot after each write.
    pub confirm_writes: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            default_length: generator::DEFAULT_LENGTH,
            confirm_writes: false,
        }
    }
}

/// Outcome of [`VaultOrchestrator::rehydrate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The identity has never written a pointer.
    EmptySlot,
    /// The registry head is already a live entry or a tombstone.
    AlreadyKnown(ContentId),
    /// The head named a label the index did not have.
    Added(IndexEntry),
    /// The head superseded the indexed entry for the same label.
    Replaced {
        previous: IndexEntry,
        current: IndexEntry,
    },
}

/// Composes the key ring and the three collaborators into the credential pipeline.
///
/// Cheap to clone; clones share collaborators, the cancellation token, and
/// the writer lock that serialises index-changing operations.
#[derive(Clone)]
pub struct VaultOrchestrator {
    blobs: Arc<dyn BlobStore>,
    registry: Arc<dyn RegistryClient>,
    index: Arc<dyn IndexStore>,
    keys: Arc<KeyRing>,
    options: OrchestratorOptions,
    cancel: CancellationToken,
    writer: Arc<Mutex<()>>,
}

impl std::fmt::Debug for VaultOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultOrchestrator")
            .field("identity", self.registry.identity())
            .field("blobs", &self.blobs.name())
            .field("registry", &self.registry.name())
            .field("index", &self.index.name())
            .field("options", &self.options)
            .finish()
    }
}

impl VaultOrchestrator {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        registry: Arc<dyn RegistryClient>,
        index: Arc<dyn IndexStore>,
        keys: Arc<KeyRing>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            blobs,
            registry,
            index,
            keys,
            options,
            cancel: CancellationToken::new(),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// A handle whose network steps race `token` instead of the shared one.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancel: token,
            ..self.clone()
        }
    }

    /// Token that cancels pending network steps of this handle.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn identity(&self) -> &Identity {
        self.registry.identity()
    }

    /// Generate a password, using the configured default length when `length` is `None`.
    pub fn generate_password(&self, length: Option<usize>) -> Result<String, VaultError> {
        generator::generate(length.unwrap_or(self.options.default_length))
    }

    /// Encrypt, publish, and register `plaintext` under a new `label`.
    ///
    /// Fails with [`VaultError::LabelExists`] before any network call when the
    /// label is already indexed.
    pub async fn store(
        &self,
        label: &str,
        plaintext: &SecretString,
    ) -> Result<ContentId, VaultError> {
        validate_label(label)?;
        let _writer = self.lock_writer().await?;
        if self.index.get(label).await?.is_some() {
            return Err(VaultError::LabelExists(label.to_string()));
        }

        let entry = self.publish(label, plaintext).await?;
        self.index.insert(&entry).await?;
        info!(label = %label, content_id = %entry.content_id, "credential stored");
        Ok(entry.content_id)
    }

    /// Run the store pipeline for an existing `label` and swap its index entry.
    pub async fn replace(
        &self,
        label: &str,
        plaintext: &SecretString,
    ) -> Result<ContentId, VaultError> {
        validate_label(label)?;
        let _writer = self.lock_writer().await?;
        if self.index.get(label).await?.is_none() {
            return Err(VaultError::UnknownLabel(label.to_string()));
        }

        let entry = self.publish(label, plaintext).await?;
        let previous = self.index.replace(&entry).await?;
        info!(
            label = %label,
            content_id = %entry.content_id,
            previous = ?previous.map(|p| p.content_id),
            "credential replaced"
        );
        Ok(entry.content_id)
    }

    /// Decrypt the credential indexed under `label`.
    ///
    /// Fails with [`VaultError::UnknownLabel`] without any network call when
    /// the label is not indexed.
    pub async fn retrieve(&self, label: &str) -> Result<SecretString, VaultError> {
        let entry = self
            .index
            .get(label)
            .await?
            .ok_or_else(|| VaultError::UnknownLabel(label.to_string()))?;

        let sealed = self.fetch(&entry.content_id).await?;
        if sealed.label() != label {
            return Err(VaultError::InvalidInput(format!(
                "record {} is sealed for label `{}`, not `{label}`",
                entry.content_id,
                sealed.label()
            )));
        }
        debug!(label = %label, content_id = %entry.content_id, "credential retrieved");
        Ok(sealed.secret())
    }

    /// Decrypt the record the identity's registry slot points at.
    ///
    /// Returns the label sealed inside it with the secret.
    pub async fn retrieve_latest(&self) -> Result<(String, SecretString), VaultError> {
        let content_id = self.head().await?.ok_or_else(|| {
            VaultError::NotFound(format!("registry slot for {} is empty", self.identity()))
        })?;
        let sealed = self.fetch(&content_id).await?;
        Ok((sealed.label().to_string(), sealed.secret()))
    }

    /// Forget `label` locally.
    ///
    /// The blob and the registry slot are untouched; the content id is
    /// tombstoned so [`Self::rehydrate`] will not bring the entry back.
    pub async fn delete(&self, label: &str) -> Result<IndexEntry, VaultError> {
        let removed = self
            .index
            .remove(label)
            .await?
            .ok_or_else(|| VaultError::UnknownLabel(label.to_string()))?;
        info!(label = %label, content_id = %removed.content_id, "index entry deleted");
        Ok(removed)
    }

    /// All index entries ordered by label.
    pub async fn list(&self) -> Result<Vec<IndexEntry>, VaultError> {
        self.index.list().await
    }

    /// Reconcile the index with the registry head.
    pub async fn rehydrate(&self) -> Result<Reconciliation, VaultError> {
        let _writer = self.lock_writer().await?;
        let Some(content_id) = self.head().await? else {
            debug!(identity = %self.identity(), "registry slot empty; nothing to reconcile");
            return Ok(Reconciliation::EmptySlot);
        };
        if self.index.is_known(&content_id).await? {
            return Ok(Reconciliation::AlreadyKnown(content_id));
        }

        let sealed = self.fetch(&content_id).await?;
        validate_label(sealed.label())?;
        let entry = IndexEntry {
            label: sealed.label().to_string(),
            content_id,
            created_at: sealed.created_at().to_string(),
        };
        let outcome = match self.index.replace(&entry).await? {
            None => Reconciliation::Added(entry),
            Some(previous) => Reconciliation::Replaced {
                previous,
                current: entry,
            },
        };
        info!(outcome = ?outcome, "index rehydrated from registry");
        Ok(outcome)
    }

    /// Seal, publish, and register; returns the entry to index.
    async fn publish(
        &self,
        label: &str,
        plaintext: &SecretString,
    ) -> Result<IndexEntry, VaultError> {
        let created_at = chrono::Utc::now().to_rfc3339();
        let credential =
            SealedCredential::new(label, plaintext.expose_secret(), created_at.clone());
        let bytes = self.keys.seal(&credential).await?.to_bytes()?;

        let content_id = self.guarded("blob put", self.blobs.put(&bytes)).await?;
        debug!(label = %label, content_id = %content_id, "record published");

        let receipt = self
            .guarded("set pointer", self.registry.set_pointer(&content_id))
            .await
            .inspect_err(|e| {
                warn!(
                    label = %label,
                    content_id = %content_id,
                    error = %e,
                    "record published but not registered; index left unchanged"
                );
            })?;
        debug!(tx_hash = %receipt.tx_hash, block = ?receipt.block_number, "pointer registered");

        if self.options.confirm_writes {
            self.confirm_head(&content_id).await?;
        }

        Ok(IndexEntry {
            label: label.to_string(),
            content_id,
            created_at,
        })
    }

    /// Warn when a concurrent writer superseded our pointer. The entry is kept.
    async fn confirm_head(&self, written: &ContentId) -> Result<(), VaultError> {
        match self.head().await? {
            Some(head) if head == *written => Ok(()),
            head => {
                warn!(
                    written = %written,
                    head = ?head,
                    "registry slot no longer points at this write; a concurrent writer won"
                );
                Ok(())
            }
        }
    }

    /// Held from the label check to the index write, so the registry head
    /// always names a record the index knows about.
    async fn lock_writer(&self) -> Result<MutexGuard<'_, ()>, VaultError> {
        self.guarded("writer lock", async { Ok(self.writer.lock().await) })
            .await
    }

    async fn head(&self) -> Result<Option<ContentId>, VaultError> {
        let identity = self.registry.identity();
        self.guarded("get pointer", self.registry.get_pointer(identity))
            .await
    }

    async fn fetch(&self, content_id: &ContentId) -> Result<SealedCredential, VaultError> {
        let bytes = self.guarded("blob get", self.blobs.get(content_id)).await?;
        let record = EncryptedRecord::from_bytes(&bytes)?;
        self.keys.open(&record).await
    }

    /// Race a network step against cancellation.
    async fn guarded<T>(
        &self,
        step: &'static str,
        fut: impl Future<Output = Result<T, VaultError>>,
    ) -> Result<T, VaultError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(step, "cancelled");
                Err(VaultError::Cancelled)
            }
            result = fut => result,
        }
    }
}

fn validate_label(label: &str) -> Result<(), VaultError> {
    if label.trim().is_empty() {
        return Err(VaultError::InvalidInput("label must not be empty".to_string()));
    }
    if label.trim() != label || label.chars().any(char::is_control) {
        return Err(VaultError::InvalidInput(format!(
            "label `{}` has surrounding whitespace or control characters",
            label.escape_debug()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_rules() {
        assert!(validate_label("site.com").is_ok());
        assert!(validate_label("my bank").is_ok());
        assert!(validate_label("").is_err());
        assert!(validate_label("   ").is_err());
        assert!(validate_label(" site.com").is_err());
        assert!(validate_label("site\n.com").is_err());
    }

    #[test]
    fn default_options() {
        let options = OrchestratorOptions::default();
        assert_eq!(options.default_length, 12);
        assert!(!options.confirm_writes);
    }
}
