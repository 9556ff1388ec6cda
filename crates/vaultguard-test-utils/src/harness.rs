// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a [`VaultOrchestrator`] over mock collaborators
//! with cheap KDF parameters, and keeps handles to every mock for assertions.

use std::sync::Arc;

use secrecy::SecretString;
use vaultguard_core::{Identity, VaultError};
use vaultguard_vault::{KdfParams, KeyRing, OrchestratorOptions, VaultOrchestrator};

use crate::memory_index::MemoryIndex;
use crate::mock_blob_store::MockBlobStore;
use crate::mock_registry::MockRegistry;

/// Argon2id parameters small enough for tests.
pub const FAST_KDF: KdfParams = KdfParams {
    memory_cost: 8192,
    iterations: 1,
    parallelism: 1,
};

/// Passphrase used unless the builder overrides it.
pub const TEST_PASSPHRASE: &str = "correct horse battery staple";

/// Identity used unless the builder overrides it.
pub const TEST_IDENTITY: &str = "0x00000000000000000000000000000000000a11ce";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    identity: String,
    passphrase: String,
    options: OrchestratorOptions,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            identity: TEST_IDENTITY.to_string(),
            passphrase: TEST_PASSPHRASE.to_string(),
            options: OrchestratorOptions::default(),
        }
    }

    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = identity.to_string();
        self
    }

    pub fn with_passphrase(mut self, passphrase: &str) -> Self {
        self.passphrase = passphrase.to_string();
        self
    }

    /// Re-read the registry slot after every write.
    pub fn with_confirm_writes(mut self, confirm: bool) -> Self {
        self.options.confirm_writes = confirm;
        self
    }

    pub fn with_default_length(mut self, length: usize) -> Self {
        self.options.default_length = length;
        self
    }

    pub fn build(self) -> Result<TestHarness, VaultError> {
        let identity = Identity::new(self.identity)?;
        let blobs = Arc::new(MockBlobStore::new());
        let registry = Arc::new(MockRegistry::new(identity));
        TestHarness::assemble(blobs, registry, &self.passphrase, self.options)
    }
}

/// A vault over mock collaborators.
pub struct TestHarness {
    pub vault: VaultOrchestrator,
    pub blobs: Arc<MockBlobStore>,
    pub registry: Arc<MockRegistry>,
    pub index: Arc<MemoryIndex>,
    passphrase: String,
    options: OrchestratorOptions,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    fn assemble(
        blobs: Arc<MockBlobStore>,
        registry: Arc<MockRegistry>,
        passphrase: &str,
        options: OrchestratorOptions,
    ) -> Result<Self, VaultError> {
        let index = Arc::new(MemoryIndex::new());
        let keys = Arc::new(KeyRing::new(
            SecretString::from(passphrase.to_string()),
            FAST_KDF,
        )?);
        let vault = VaultOrchestrator::new(
            blobs.clone(),
            registry.clone(),
            index.clone(),
            keys,
            options.clone(),
        );
        Ok(Self {
            vault,
            blobs,
            registry,
            index,
            passphrase: passphrase.to_string(),
            options,
        })
    }

    /// Another client of the same identity: shared blob store and contract,
    /// fresh index and key ring.
    pub fn second_device(&self) -> Result<Self, VaultError> {
        self.second_device_with_passphrase(&self.passphrase)
    }

    pub fn second_device_with_passphrase(&self, passphrase: &str) -> Result<Self, VaultError> {
        let registry = Arc::new(self.registry.sibling(self.vault.identity().clone()));
        Self::assemble(
            self.blobs.clone(),
            registry,
            passphrase,
            self.options.clone(),
        )
    }

    /// Wrap a plain string as a secret.
    pub fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }
}
