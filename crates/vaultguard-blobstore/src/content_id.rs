// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content identifiers: CIDv1, raw codec, sha2-256, base32 (`bafkrei…`).

use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};
use vaultguard_core::{ContentId, VaultError};

/// Multicodec code for raw bytes.
pub const RAW_CODEC: u64 = 0x55;

/// Multihash code for sha2-256.
pub const SHA2_256: u64 = 0x12;

/// The id the raw-leaf IPFS importer assigns to a single-block payload.
pub fn compute_content_id(bytes: &[u8]) -> Result<ContentId, VaultError> {
    let cid = Cid::new_v1(RAW_CODEC, Code::Sha2_256.digest(bytes));
    ContentId::new(cid.to_string())
}

/// Parse a content id as a CID.
pub fn parse_cid(id: &ContentId) -> Result<Cid, VaultError> {
    Cid::try_from(id.as_str())
        .map_err(|e| VaultError::InvalidInput(format!("`{id}` is not a valid CID: {e}")))
}

/// Check that `bytes` hash to `id`.
///
/// Returns `Ok(false)` when `id` is not a raw sha2-256 CID and so cannot be
/// checked locally.
pub fn verify(id: &ContentId, bytes: &[u8]) -> Result<bool, VaultError> {
    let expected = parse_cid(id)?;
    if expected.codec() != RAW_CODEC || expected.hash().code() != SHA2_256 {
        return Ok(false);
    }
    let actual = Cid::new_v1(RAW_CODEC, Code::Sha2_256.digest(bytes));
    if actual.hash() != expected.hash() {
        return Err(VaultError::InvalidInput(format!(
            "payload does not match content id {id}"
        )));
    }
    Ok(true)
}
