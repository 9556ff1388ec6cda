// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The credential pipeline for VaultGuard.
//!
//! Generates passwords, encrypts them under a passphrase-derived key
//! (Argon2id → AES-256-CBC + HMAC-SHA256), and runs the store/retrieve
//! workflows over a blob store, a pointer registry, and a local index.

pub mod crypto;
pub mod generator;
pub mod kdf;
pub mod keys;
pub mod orchestrator;
pub mod prompt;
pub mod record;

pub use generator::{generate, strength, Strength, DEFAULT_LENGTH, MIN_LENGTH};
pub use kdf::KdfParams;
pub use keys::KeyRing;
pub use orchestrator::{OrchestratorOptions, Reconciliation, VaultOrchestrator};
pub use prompt::{get_passphrase, read_secret};
pub use record::{EncryptedRecord, SealedCredential};
