// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over the real local adapters.
//!
//! Each device gets a SQLite index in a temp dir; devices share a filesystem
//! blob store and an in-process pointer registry.

use std::path::Path;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use vaultguard_blobstore::FsBlobStore;
use vaultguard_core::{BlobStore, Identity, IndexStore, RegistryClient, VaultError};
use vaultguard_registry::LocalRegistry;
use vaultguard_storage::SqliteIndex;
use vaultguard_test_utils::{FAST_KDF, TEST_IDENTITY, TEST_PASSPHRASE};
use vaultguard_vault::{KeyRing, OrchestratorOptions, Reconciliation, VaultOrchestrator};

async fn device(dir: &Path, index_name: &str, registry: &LocalRegistry) -> VaultOrchestrator {
    let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.join("blobs")));
    let registry: Arc<dyn RegistryClient> = Arc::new(registry.clone());
    let index: Arc<dyn IndexStore> = Arc::new(SqliteIndex::open(dir.join(index_name)).await.unwrap());
    let keys = Arc::new(KeyRing::new(SecretString::from(TEST_PASSPHRASE.to_string()), FAST_KDF).unwrap());
    VaultOrchestrator::new(blobs, registry, index, keys, OrchestratorOptions::default())
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn identity() -> Identity {
    Identity::new(TEST_IDENTITY).unwrap()
}

#[tokio::test]
async fn store_and_retrieve_through_real_adapters() {
    let dir = tempfile::tempdir().unwrap();
    let registry = LocalRegistry::new(identity());
    let vault = device(dir.path(), "index.db", &registry).await;

    let cid = vault.store("mail", &secret("hunter2")).await.unwrap();
    assert!(dir.path().join("blobs").join(cid.as_str()).is_file());

    let record = std::fs::read(dir.path().join("blobs").join(cid.as_str())).unwrap();
    assert!(!String::from_utf8_lossy(&record).contains("hunter2"));

    assert_eq!(
        vault.retrieve("mail").await.unwrap().expose_secret(),
        "hunter2"
    );
    assert_eq!(registry.get_pointer(&identity()).await.unwrap(), Some(cid));
}

#[tokio::test]
async fn index_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let registry = LocalRegistry::new(identity());

    {
        let vault = device(dir.path(), "index.db", &registry).await;
        vault.store("a", &secret("one")).await.unwrap();
        vault.store("b", &secret("two")).await.unwrap();
        vault.delete("a").await.unwrap();
    }

    let vault = device(dir.path(), "index.db", &registry).await;
    let labels: Vec<String> = vault
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.label)
        .collect();
    assert_eq!(labels, vec!["b".to_string()]);
    assert_eq!(vault.retrieve("b").await.unwrap().expose_secret(), "two");
    assert!(matches!(
        vault.retrieve("a").await,
        Err(VaultError::UnknownLabel(_))
    ));
}

#[tokio::test]
async fn second_device_rehydrates_from_registry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = LocalRegistry::new(identity());
    let laptop = device(dir.path(), "laptop.db", &registry).await;
    let phone = device(dir.path(), "phone.db", &registry).await;

    assert_eq!(phone.rehydrate().await.unwrap(), Reconciliation::EmptySlot);

    laptop.store("bank", &secret("first")).await.unwrap();
    match phone.rehydrate().await.unwrap() {
        Reconciliation::Added(entry) => assert_eq!(entry.label, "bank"),
        other => panic!("expected Added, got {other:?}"),
    }
    assert_eq!(phone.retrieve("bank").await.unwrap().expose_secret(), "first");

    let cid = laptop.replace("bank", &secret("second")).await.unwrap();
    match phone.rehydrate().await.unwrap() {
        Reconciliation::Replaced { current, .. } => assert_eq!(current.content_id, cid),
        other => panic!("expected Replaced, got {other:?}"),
    }
    assert_eq!(
        phone.retrieve("bank").await.unwrap().expose_secret(),
        "second"
    );
    assert_eq!(
        phone.rehydrate().await.unwrap(),
        Reconciliation::AlreadyKnown(cid)
    );
}

#[tokio::test]
async fn deleted_head_is_not_resurrected_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let registry = LocalRegistry::new(identity());

    {
        let vault = device(dir.path(), "index.db", &registry).await;
        vault.store("old", &secret("pw")).await.unwrap();
        vault.delete("old").await.unwrap();
    }

    let vault = device(dir.path(), "index.db", &registry).await;
    assert!(matches!(
        vault.rehydrate().await.unwrap(),
        Reconciliation::AlreadyKnown(_)
    ));
    assert!(vault.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn latest_follows_registry_head() {
    let dir = tempfile::tempdir().unwrap();
    let registry = LocalRegistry::new(identity());
    let vault = device(dir.path(), "index.db", &registry).await;

    vault.store("first", &secret("1")).await.unwrap();
    vault.store("second", &secret("2")).await.unwrap();

    let (label, value) = vault.retrieve_latest().await.unwrap();
    assert_eq!(label, "second");
    assert_eq!(value.expose_secret(), "2");
}

#[tokio::test]
async fn tampered_blob_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let registry = LocalRegistry::new(identity());
    let vault = device(dir.path(), "index.db", &registry).await;

    let cid = vault.store("mail", &secret("pw")).await.unwrap();
    std::fs::write(dir.path().join("blobs").join(cid.as_str()), b"garbage").unwrap();

    assert!(vault.retrieve("mail").await.is_err());
}

#[tokio::test]
async fn identities_do_not_share_slots() {
    let dir = tempfile::tempdir().unwrap();
    let alice = LocalRegistry::new(identity());
    let bob = alice.as_identity(
        Identity::new("0x0000000000000000000000000000000000000b0b").unwrap(),
    );

    let alice_vault = device(dir.path(), "alice.db", &alice).await;
    let bob_vault = device(dir.path(), "bob.db", &bob).await;

    alice_vault.store("mail", &secret("pw")).await.unwrap();
    assert_eq!(bob_vault.rehydrate().await.unwrap(), Reconciliation::EmptySlot);
}
