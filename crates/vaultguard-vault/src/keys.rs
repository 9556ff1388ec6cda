// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-derived record keys.
//!
//! A [`KeyRing`] holds the passphrase and one session salt. Records sealed in
//! this session share the session key; records from other sessions carry
//! their own salt and parameters, and the derived keys are cached.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use vaultguard_core::VaultError;
use zeroize::Zeroizing;

use crate::crypto;
use crate::kdf::{self, KdfParams, SALT_LEN};
use crate::record::{EncryptedRecord, SealedCredential};

type RecordKey = Arc<Zeroizing<[u8; 32]>>;

/// Derives, caches, and applies record keys.
///
/// Debug output omits the passphrase and all keys.
pub struct KeyRing {
    passphrase: Arc<SecretString>,
    params: KdfParams,
    session_salt: [u8; SALT_LEN],
    cache: Mutex<HashMap<([u8; SALT_LEN], KdfParams), RecordKey>>,
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing")
            .field("params", &self.params)
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

impl KeyRing {
    /// Create a key ring with a fresh session salt.
    ///
    /// No key is derived until the first seal or open.
    pub fn new(passphrase: SecretString, params: KdfParams) -> Result<Self, VaultError> {
        params.check_bounds()?;
        if passphrase.expose_secret().is_empty() {
            return Err(VaultError::InvalidInput(
                "empty passphrase not allowed".to_string(),
            ));
        }
        Ok(Self {
            passphrase: Arc::new(passphrase),
            params,
            session_salt: kdf::generate_salt()?,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Parameters used for records sealed by this key ring.
    pub fn params(&self) -> KdfParams {
        self.params
    }

    fn cached(&self, salt: &[u8; SALT_LEN], params: &KdfParams) -> Result<Option<RecordKey>, VaultError> {
        let cache = self.lock_cache()?;
        Ok(cache.get(&(*salt, *params)).map(Arc::clone))
    }

    fn lock_cache(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<([u8; SALT_LEN], KdfParams), RecordKey>>, VaultError> {
        self.cache
            .lock()
            .map_err(|_| VaultError::Internal("key cache lock poisoned".to_string()))
    }

    /// Argon2id runs on the blocking pool; the cache lock is never held across it.
    async fn key_for(&self, salt: &[u8; SALT_LEN], params: &KdfParams) -> Result<RecordKey, VaultError> {
        if let Some(key) = self.cached(salt, params)? {
            return Ok(key);
        }

        debug!(
            memory_cost = params.memory_cost,
            iterations = params.iterations,
            "deriving record key"
        );
        let passphrase = Arc::clone(&self.passphrase);
        let (salt, params) = (*salt, *params);
        let derived = tokio::task::spawn_blocking(move || {
            kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, &params)
        })
        .await
        .map_err(|e| VaultError::Internal(format!("key derivation task failed: {e}")))??;

        let mut cache = self.lock_cache()?;
        let key = cache
            .entry((salt, params))
            .or_insert_with(|| Arc::new(derived));
        Ok(Arc::clone(key))
    }

    /// Encrypt a credential under the session key.
    pub async fn seal(&self, credential: &SealedCredential) -> Result<EncryptedRecord, VaultError> {
        let key = self.key_for(&self.session_salt, &self.params).await?;
        let plaintext = credential.to_plaintext()?;
        let sealed = crypto::encrypt(&plaintext, &key)?;
        Ok(EncryptedRecord {
            salt: self.session_salt,
            kdf: self.params,
            iv: sealed.iv.to_vec(),
            ciphertext: sealed.ciphertext,
        })
    }

    /// Decrypt a record with the key derived from its own salt and parameters.
    ///
    /// A wrong passphrase surfaces as [`VaultError::Decryption`].
    pub async fn open(&self, record: &EncryptedRecord) -> Result<SealedCredential, VaultError> {
        record.kdf.check_bounds()?;
        let key = self.key_for(&record.salt, &record.kdf).await?;
        let plaintext = Zeroizing::new(crypto::decrypt(&record.iv, &record.ciphertext, &key[..])?);
        SealedCredential::from_plaintext(&plaintext)
    }
}
