// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A blob store backed by a local directory, one file per content id.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::debug;
use vaultguard_core::{
    AdapterType, BlobStore, ContentId, HealthStatus, PluginAdapter, VaultError,
};

use crate::content_id;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Files live at `<root>/<cid>`; writes go through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &ContentId) -> Result<PathBuf, VaultError> {
        // Parsing as a CID also rules out path separators.
        let cid = content_id::parse_cid(id)?;
        Ok(self.root.join(cid.to_string()))
    }
}

fn io_err(e: std::io::Error) -> VaultError {
    VaultError::Storage {
        source: Box::new(e),
    }
}

#[async_trait]
impl PluginAdapter for FsBlobStore {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::BlobStore
    }

    async fn health_check(&self) -> Result<HealthStatus, VaultError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => {
                Ok(HealthStatus::Healthy)
            }
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Degraded(format!(
                "{} is read-only",
                self.root.display()
            ))),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HealthStatus::Degraded(
                format!("{} does not exist yet", self.root.display()),
            )),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, bytes: &[u8]) -> Result<ContentId, VaultError> {
        let id = content_id::compute_content_id(bytes)?;
        let path = self.path_for(&id)?;
        if tokio::fs::try_exists(&path).await.map_err(io_err)? {
            debug!(content_id = %id, "blob already present");
            return Ok(id);
        }

        tokio::fs::create_dir_all(&self.root).await.map_err(io_err)?;
        let tmp = self.root.join(format!(
            ".{id}.{}.{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&tmp, bytes).await.map_err(io_err)?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err(e));
        }

        debug!(content_id = %id, size = bytes.len(), "blob written");
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, VaultError> {
        let path = self.path_for(id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VaultError::NotFound(format!("blob {id}")));
            }
            Err(e) => return Err(io_err(e)),
        };
        content_id::verify(id, &bytes)?;
        Ok(bytes)
    }
}
