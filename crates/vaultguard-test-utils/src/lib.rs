// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for VaultGuard integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without an IPFS node or a chain.
//!
//! # Components
//!
//! - [`MockBlobStore`] - in-memory blob store with failure injection
//! - [`MockRegistry`] - in-process registry with failure injection and a scripted concurrent writer
//! - [`MemoryIndex`] - in-memory label index
//! - [`TestHarness`] - orchestrator over the mocks

pub mod harness;
pub mod memory_index;
pub mod mock_blob_store;
pub mod mock_registry;

pub use harness::{FAST_KDF, TEST_IDENTITY, TEST_PASSPHRASE, TestHarness};
pub use memory_index::MemoryIndex;
pub use mock_blob_store::MockBlobStore;
pub use mock_registry::MockRegistry;
