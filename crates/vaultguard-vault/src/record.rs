// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The serialized payload handed to the blob store.
//!
//! A record is a JSON document with hex-encoded binary fields:
//!
//! ```json
//! { "version": 1,
//!   "cipher": "aes-256-cbc+hmac-sha256",
//!   "kdf": { "algorithm": "argon2id", "salt": "…", "memory_cost": 65536,
//!            "iterations": 3, "parallelism": 4 },
//!   "iv": "…",
//!   "ciphertext": "…" }
//! ```
//!
//! The key is never part of the record. The encrypted plaintext is a
//! [`SealedCredential`].

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use vaultguard_core::VaultError;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::kdf::{KdfParams, SALT_LEN};

pub const RECORD_VERSION: u32 = 1;
pub const CIPHER_NAME: &str = "aes-256-cbc+hmac-sha256";
pub const KDF_ALGORITHM: &str = "argon2id";

/// Decoded form of a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedRecord {
    pub salt: [u8; SALT_LEN],
    pub kdf: KdfParams,
    /// Left unchecked here; the cipher validates its length.
    pub iv: Vec<u8>,
    /// CBC body followed by the HMAC tag.
    pub ciphertext: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct WireRecord {
    version: u32,
    cipher: String,
    kdf: WireKdf,
    iv: String,
    ciphertext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct WireKdf {
    algorithm: String,
    salt: String,
    memory_cost: u32,
    iterations: u32,
    parallelism: u32,
}

impl EncryptedRecord {
    /// Serialize to the JSON bytes published to the blob store.
    pub fn to_bytes(&self) -> Result<Vec<u8>, VaultError> {
        let wire = WireRecord {
            version: RECORD_VERSION,
            cipher: CIPHER_NAME.to_string(),
            kdf: WireKdf {
                algorithm: KDF_ALGORITHM.to_string(),
                salt: hex::encode(self.salt),
                memory_cost: self.kdf.memory_cost,
                iterations: self.kdf.iterations,
                parallelism: self.kdf.parallelism,
            },
            iv: hex::encode(&self.iv),
            ciphertext: hex::encode(&self.ciphertext),
            key: None,
        };
        serde_json::to_vec(&wire)
            .map_err(|e| VaultError::Internal(format!("failed to serialize record: {e}")))
    }

    /// Parse bytes fetched from the blob store.
    ///
    /// Fails with [`VaultError::InvalidInput`] for anything that is not a
    /// version 1 record, including records that embed their key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VaultError> {
        let wire: WireRecord = serde_json::from_slice(bytes)
            .map_err(|e| VaultError::InvalidInput(format!("malformed record: {e}")))?;

        if wire.version != RECORD_VERSION {
            return Err(VaultError::InvalidInput(format!(
                "unsupported record version {}",
                wire.version
            )));
        }
        if wire.key.is_some() {
            return Err(VaultError::InvalidInput(
                "record embeds its encryption key; refusing to use it".to_string(),
            ));
        }
        if wire.cipher != CIPHER_NAME {
            return Err(VaultError::InvalidInput(format!(
                "unsupported cipher `{}`",
                wire.cipher
            )));
        }
        if wire.kdf.algorithm != KDF_ALGORITHM {
            return Err(VaultError::InvalidInput(format!(
                "unsupported KDF `{}`",
                wire.kdf.algorithm
            )));
        }

        let salt: [u8; SALT_LEN] = decode_hex("kdf.salt", &wire.kdf.salt)?
            .try_into()
            .map_err(|v: Vec<u8>| {
                VaultError::InvalidInput(format!(
                    "salt must be {SALT_LEN} bytes, got {}",
                    v.len()
                ))
            })?;

        Ok(Self {
            salt,
            kdf: KdfParams {
                memory_cost: wire.kdf.memory_cost,
                iterations: wire.kdf.iterations,
                parallelism: wire.kdf.parallelism,
            },
            iv: decode_hex("iv", &wire.iv)?,
            ciphertext: decode_hex("ciphertext", &wire.ciphertext)?,
        })
    }
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, VaultError> {
    hex::decode(value).map_err(|e| VaultError::InvalidInput(format!("{field}: {e}")))
}

/// The plaintext sealed inside a record.
///
/// Carrying the label lets a client rebuild its index from the registry.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SealedCredential {
    label: String,
    secret: String,
    created_at: String,
}

impl std::fmt::Debug for SealedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedCredential")
            .field("label", &self.label)
            .field("secret", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl SealedCredential {
    pub fn new(label: &str, secret: &str, created_at: String) -> Self {
        Self {
            label: label.to_string(),
            secret: secret.to_string(),
            created_at,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn secret(&self) -> SecretString {
        SecretString::from(self.secret.clone())
    }

    pub(crate) fn to_plaintext(&self) -> Result<Zeroizing<String>, VaultError> {
        serde_json::to_string(self)
            .map(Zeroizing::new)
            .map_err(|e| VaultError::Internal(format!("failed to serialize credential: {e}")))
    }

    pub(crate) fn from_plaintext(plaintext: &str) -> Result<Self, VaultError> {
        serde_json::from_str(plaintext)
            .map_err(|e| VaultError::InvalidInput(format!("malformed credential payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn sample() -> EncryptedRecord {
        EncryptedRecord {
            salt: [7u8; SALT_LEN],
            kdf: KdfParams {
                memory_cost: 65536,
                iterations: 3,
                parallelism: 4,
            },
            iv: vec![1u8; 16],
            ciphertext: vec![0xab; 48],
        }
    }

    fn json(bytes: &[u8]) -> serde_json::Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn wire_layout() {
        let value = json(&sample().to_bytes().unwrap());
        assert_eq!(value["version"], 1);
        assert_eq!(value["cipher"], "aes-256-cbc+hmac-sha256");
        assert_eq!(value["kdf"]["algorithm"], "argon2id");
        assert_eq!(value["kdf"]["salt"], "07".repeat(16));
        assert_eq!(value["kdf"]["memory_cost"], 65536);
        assert_eq!(value["iv"], "01".repeat(16));
        assert!(value.get("key").is_none());
    }

    #[test]
    fn decode_encoded_record() {
        let record = sample();
        assert_eq!(EncryptedRecord::from_bytes(&record.to_bytes().unwrap()).unwrap(), record);
    }

    #[test]
    fn embedded_key_refused() {
        let mut value = json(&sample().to_bytes().unwrap());
        value["key"] = serde_json::json!("00".repeat(32));
        let err = EncryptedRecord::from_bytes(value.to_string().as_bytes()).unwrap_err();
        assert!(err.to_string().contains("embeds its encryption key"), "{err}");
    }

    #[test]
    fn rejects_malformed_records() {
        let base = json(&sample().to_bytes().unwrap());
        let cases: Vec<(&str, serde_json::Value)> = vec![
            ("version", serde_json::json!(2)),
            ("cipher", serde_json::json!("aes-256-gcm")),
            ("iv", serde_json::json!("zz")),
            ("ciphertext", serde_json::json!(42)),
        ];
        for (field, bad) in cases {
            let mut value = base.clone();
            value[field] = bad;
            let result = EncryptedRecord::from_bytes(value.to_string().as_bytes());
            assert!(
                matches!(result, Err(VaultError::InvalidInput(_))),
                "field {field}: {result:?}"
            );
        }

        let mut short_salt = base.clone();
        short_salt["kdf"]["salt"] = serde_json::json!("0102");
        assert!(EncryptedRecord::from_bytes(short_salt.to_string().as_bytes()).is_err());

        assert!(EncryptedRecord::from_bytes(b"not json").is_err());
    }

    #[test]
    fn short_iv_survives_decoding() {
        let mut record = sample();
        record.iv = vec![0u8; 8];
        let decoded = EncryptedRecord::from_bytes(&record.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.iv.len(), 8);
    }

    #[test]
    fn sealed_credential_plaintext() {
        let sealed = SealedCredential::new("site.com", "secret1", "2026-01-01T00:00:00Z".into());
        let plaintext = sealed.to_plaintext().unwrap();
        let back = SealedCredential::from_plaintext(&plaintext).unwrap();
        assert_eq!(back.label(), "site.com");
        assert_eq!(back.secret().expose_secret(), "secret1");
        assert_eq!(back.created_at(), "2026-01-01T00:00:00Z");
        assert!(!format!("{back:?}").contains("secret1"));
    }
}
