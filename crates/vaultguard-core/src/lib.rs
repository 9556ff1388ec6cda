// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for VaultGuard.
//!
//! This crate provides the error type, the domain types, and the adapter
//! traits for the three collaborators of the credential pipeline: the
//! content-addressed blob store, the pointer registry, and the local index.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VaultError;
pub use types::{
    AdapterType, ContentId, HealthStatus, Identity, IndexEntry, PointerChanged, RegistryReceipt,
};

// Re-export all adapter traits at crate root.
pub use traits::{BlobStore, IndexStore, PluginAdapter, RegistryClient};
