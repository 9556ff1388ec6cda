// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the vault, the blob stores, and the registry.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::VaultError;

/// The caller principal a registry slot is keyed by.
///
/// Opaque to the vault; the JSON-RPC registry interprets it as a 20-byte
/// account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Create an identity, rejecting empty or whitespace-padded values.
    pub fn new(value: impl Into<String>) -> Result<Self, VaultError> {
        let value = value.into();
        if value.is_empty() || value.trim() != value {
            return Err(VaultError::InvalidInput(format!(
                "identity `{value}` must be non-empty without surrounding whitespace"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque address of an immutable payload in a content-addressed store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Wrap a content identifier returned by a store or read from the registry.
    pub fn new(value: impl Into<String>) -> Result<Self, VaultError> {
        let value = value.into();
        if value.is_empty() {
            return Err(VaultError::InvalidInput("content id must not be empty".into()));
        }
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(VaultError::InvalidInput(format!(
                "content id `{}` contains whitespace or control characters",
                value.escape_debug()
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local bookkeeping relating a human label (a website name) to a ContentId.
///
/// Never mutated in place: updates are delete + recreate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub label: String,
    pub content_id: ContentId,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Event emitted by the registry on every successful `setPointer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerChanged {
    pub identity: Identity,
    pub content_id: ContentId,
}

/// Confirmation of a registry write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryReceipt {
    /// Transaction hash, or a local sequence marker for in-process registries.
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub event: PointerChanged,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays in the credential pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    BlobStore,
    Registry,
    Index,
}
