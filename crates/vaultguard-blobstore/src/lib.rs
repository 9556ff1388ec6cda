// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-addressed blob stores for VaultGuard.
//!
//! Both backends implement [`vaultguard_core::BlobStore`] and agree on ids:
//! CIDv1, raw codec, sha2-256.

pub mod content_id;
pub mod fs;
pub mod ipfs;

use std::sync::Arc;

use vaultguard_config::model::{BlobBackend, BlobStoreConfig};
use vaultguard_core::{BlobStore, VaultError};

pub use content_id::{compute_content_id, parse_cid};
pub use fs::FsBlobStore;
pub use ipfs::IpfsBlobStore;

/// Build the blob store selected by `[blob_store].backend`.
pub fn from_config(config: &BlobStoreConfig) -> Result<Arc<dyn BlobStore>, VaultError> {
    let store: Arc<dyn BlobStore> = match config.backend {
        BlobBackend::Ipfs => Arc::new(IpfsBlobStore::new(config)?),
        BlobBackend::Filesystem => Arc::new(FsBlobStore::new(&config.data_dir)),
    };
    Ok(store)
}
