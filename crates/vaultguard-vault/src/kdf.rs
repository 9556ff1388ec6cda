// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a passphrase.
//!
//! Derives a 32-byte record key using Argon2id (Algorithm::Argon2id,
//! Version::V0x13). Parameters come from `[kdf]` when sealing and from the
//! record header when opening.

use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use vaultguard_config::model::KdfConfig;
use vaultguard_core::VaultError;
use zeroize::Zeroizing;

pub const SALT_LEN: usize = 16;

/// Upper bounds for parameters read from untrusted records.
pub const MAX_MEMORY_COST: u32 = 1024 * 1024;
pub const MAX_ITERATIONS: u32 = 64;
pub const MAX_PARALLELISM: u32 = 64;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl From<&KdfConfig> for KdfParams {
    fn from(config: &KdfConfig) -> Self {
        Self {
            memory_cost: config.memory_cost,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

impl KdfParams {
    /// Reject parameters that would make derivation unreasonably expensive.
    pub fn check_bounds(&self) -> Result<(), VaultError> {
        if self.memory_cost > MAX_MEMORY_COST
            || self.iterations > MAX_ITERATIONS
            || self.parallelism > MAX_PARALLELISM
        {
            return Err(VaultError::InvalidInput(format!(
                "KDF parameters out of bounds: m={} t={} p={}",
                self.memory_cost, self.iterations, self.parallelism
            )));
        }
        Ok(())
    }
}

/// Derive a 32-byte key from passphrase using Argon2id.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; 32]>, VaultError> {
    params.check_bounds()?;
    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| VaultError::InvalidInput(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon_params,
    );

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase, salt, output.as_mut())
        .map_err(|e| VaultError::Internal(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random 16-byte salt for Argon2id.
pub fn generate_salt() -> Result<[u8; SALT_LEN], VaultError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| VaultError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}
