// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the collaborators of the credential pipeline.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod blob;
pub mod index;
pub mod registry;

// Re-export all traits at the traits module level for convenience.
pub use adapter::PluginAdapter;
pub use blob::BlobStore;
pub use index::IndexStore;
pub use registry::RegistryClient;
