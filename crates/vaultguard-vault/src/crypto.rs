// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-CBC with an HMAC-SHA256 tag (encrypt-then-MAC).
//!
//! Every call to [`encrypt`] draws a fresh 16-byte IV from the system CSPRNG.
//! The 32-byte tag covers `iv || body` and is appended to the body, so the
//! `ciphertext` handed back is `body || tag`. [`decrypt`] checks the tag in
//! constant time before unpadding; a flipped bit never yields plaintext.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use vaultguard_core::VaultError;
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;
pub const BLOCK_LEN: usize = 16;
pub const TAG_LEN: usize = 32;

const ENC_LABEL: &[u8] = b"vaultguard/v1/aes-256-cbc";
const MAC_LABEL: &[u8] = b"vaultguard/v1/hmac-sha256";

/// Output of [`encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub iv: [u8; IV_LEN],
    /// CBC body followed by the HMAC tag.
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` under `key` with a fresh random IV.
pub fn encrypt(plaintext: &str, key: &[u8; KEY_LEN]) -> Result<Sealed, VaultError> {
    let mut iv = [0u8; IV_LEN];
    SystemRandom::new()
        .fill(&mut iv)
        .map_err(|_| VaultError::Internal("failed to generate random IV".to_string()))?;

    let (enc_key, mac_key) = subkeys(key)?;
    let mut ciphertext = Aes256CbcEnc::new_from_slices(enc_key.as_ref(), &iv)
        .map_err(|_| VaultError::Internal("failed to initialise AES-256-CBC".to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    let tag = compute_tag(&mac_key, &iv, &ciphertext)?;
    ciphertext.extend_from_slice(&tag);

    Ok(Sealed { iv, ciphertext })
}

/// Decrypt a `body || tag` ciphertext produced by [`encrypt`].
///
/// Fails with [`VaultError::Decryption`] on a wrong key or IV size, a short or
/// misaligned ciphertext, a tag mismatch, bad padding, or non-UTF-8 output.
pub fn decrypt(iv: &[u8], ciphertext: &[u8], key: &[u8]) -> Result<String, VaultError> {
    let key: &[u8; KEY_LEN] = key.try_into().map_err(|_| {
        VaultError::Decryption(format!("key must be {KEY_LEN} bytes, got {}", key.len()))
    })?;
    if iv.len() != IV_LEN {
        return Err(VaultError::Decryption(format!(
            "IV must be {IV_LEN} bytes, got {}",
            iv.len()
        )));
    }
    if ciphertext.len() < BLOCK_LEN + TAG_LEN {
        return Err(VaultError::Decryption(format!(
            "ciphertext too short: {} bytes",
            ciphertext.len()
        )));
    }
    let (body, tag) = ciphertext.split_at(ciphertext.len() - TAG_LEN);
    if body.len() % BLOCK_LEN != 0 {
        return Err(VaultError::Decryption(format!(
            "ciphertext length {} is not a multiple of the block size",
            body.len()
        )));
    }

    let (enc_key, mac_key) = subkeys(key)?;
    let mut mac = HmacSha256::new_from_slice(mac_key.as_ref())
        .map_err(|_| VaultError::Internal("failed to initialise HMAC".to_string()))?;
    mac.update(iv);
    mac.update(body);
    mac.verify_slice(tag)
        .map_err(|_| VaultError::Decryption("authentication tag mismatch".to_string()))?;

    let plaintext = Zeroizing::new(
        Aes256CbcDec::new_from_slices(enc_key.as_ref(), iv)
            .map_err(|_| VaultError::Internal("failed to initialise AES-256-CBC".to_string()))?
            .decrypt_padded_vec_mut::<Pkcs7>(body)
            .map_err(|_| VaultError::Decryption("invalid padding".to_string()))?,
    );

    String::from_utf8(plaintext.to_vec())
        .map_err(|_| VaultError::Decryption("plaintext is not valid UTF-8".to_string()))
}

type SubKey = Zeroizing<[u8; KEY_LEN]>;

fn subkeys(key: &[u8; KEY_LEN]) -> Result<(SubKey, SubKey), VaultError> {
    Ok((label_key(key, ENC_LABEL)?, label_key(key, MAC_LABEL)?))
}

fn label_key(key: &[u8; KEY_LEN], label: &[u8]) -> Result<SubKey, VaultError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| VaultError::Internal("failed to initialise HMAC".to_string()))?;
    mac.update(label);
    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn compute_tag(mac_key: &[u8; KEY_LEN], iv: &[u8], body: &[u8]) -> Result<[u8; TAG_LEN], VaultError> {
    let mut mac = HmacSha256::new_from_slice(mac_key)
        .map_err(|_| VaultError::Internal("failed to initialise HMAC".to_string()))?;
    mac.update(iv);
    mac.update(body);
    Ok(mac.finalize().into_bytes().into())
}
