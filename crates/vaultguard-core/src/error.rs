// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for VaultGuard.

use thiserror::Error;

/// The primary error type returned by every adapter trait and vault operation.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Caller-supplied input was rejected (empty label, malformed record, bad address).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Requested password length cannot satisfy the character-class guarantee.
    #[error("invalid password length {length}: at least {min} characters are required")]
    InvalidLength { length: usize, min: usize },

    /// A blob is missing from the store or the registry slot is empty.
    #[error("not found: {0}")]
    NotFound(String),

    /// The label has no entry in the local index.
    #[error("unknown label: {0}")]
    UnknownLabel(String),

    /// The label already has an entry in the local index.
    #[error("label already stored: {0}")]
    LabelExists(String),

    /// Wrong key or IV, tampered ciphertext, or invalid padding.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The registry transaction reverted or was never confirmed.
    #[error("registry write failed: {message}")]
    RegistryWriteFailed {
        message: String,
        tx_hash: Option<String>,
    },

    /// Transport-level failure talking to the blob store or the chain node.
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Local index persistence failure.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (missing identity, bad URLs, invalid KDF params).
    #[error("configuration error: {0}")]
    Config(String),

    /// The operation was cancelled before its network step resolved.
    #[error("operation cancelled")]
    Cancelled,

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Shorthand for a [`VaultError::Network`] wrapping a transport error.
    pub fn network(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true for errors raised before any collaborator was contacted.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::InvalidLength { .. }
                | Self::UnknownLabel(_)
                | Self::LabelExists(_)
                | Self::Config(_)
        )
    }
}
