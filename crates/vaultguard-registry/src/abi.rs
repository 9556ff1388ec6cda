// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Solidity ABI encoding for the two PointerRegistry calls.
//!
//! Only the shapes the contract uses are supported: a single dynamic
//! `string` argument or return value, and a single `address` argument.

use vaultguard_core::VaultError;

const WORD: usize = 32;

/// `bytes4(keccak256("setPointer(string)"))`
pub const SET_POINTER_SELECTOR: [u8; 4] = [0xbd, 0x56, 0x96, 0x3a];

/// `bytes4(keccak256("getPointer(address)"))`
pub const GET_POINTER_SELECTOR: [u8; 4] = [0x6b, 0xd1, 0x5a, 0x9f];

/// `keccak256("PointerChanged(address,string)")`
pub const POINTER_CHANGED_TOPIC: &str =
    "0xa47ee0ed31290812f802ec3c55ae8575a5f901dbdddfb56adf117e2e4998f7d5";

/// A 20-byte account or contract address.
pub type Address = [u8; 20];

/// Parse a `0x`-prefixed, 40-hex-digit address.
pub fn parse_address(value: &str) -> Result<Address, VaultError> {
    let hex_part = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| VaultError::InvalidInput(format!("address `{value}` must start with 0x")))?;
    let mut address = [0u8; 20];
    hex::decode_to_slice(hex_part, &mut address)
        .map_err(|e| VaultError::InvalidInput(format!("invalid address `{value}`: {e}")))?;
    Ok(address)
}

/// Format bytes as `0x`-prefixed lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode `0x`-prefixed hex returned by a node.
pub fn from_hex(value: &str) -> Result<Vec<u8>, VaultError> {
    let hex_part = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(hex_part)
        .map_err(|e| VaultError::InvalidInput(format!("invalid hex from node: {e}")))
}

/// Calldata for `setPointer(string)`.
pub fn encode_set_pointer(content_id: &str) -> Vec<u8> {
    let mut data = SET_POINTER_SELECTOR.to_vec();
    data.extend_from_slice(&encode_string(content_id));
    data
}

/// Calldata for `getPointer(address)`.
pub fn encode_get_pointer(address: &Address) -> Vec<u8> {
    let mut data = GET_POINTER_SELECTOR.to_vec();
    data.extend_from_slice(&address_word(address));
    data
}

/// ABI encoding of a lone `string`: head offset, length, padded bytes.
pub fn encode_string(value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(2 * WORD + padded);
    out.extend_from_slice(&usize_word(WORD));
    out.extend_from_slice(&usize_word(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(2 * WORD + padded, 0);
    out
}

/// Decode a lone ABI `string`, as returned by `getPointer` or carried in
/// `PointerChanged` log data.
pub fn decode_string(data: &[u8]) -> Result<String, VaultError> {
    let offset = read_usize(data, 0)?;
    let len = read_usize(data, offset)?;
    let start = offset
        .checked_add(WORD)
        .ok_or_else(|| malformed("string offset overflows"))?;
    let end = start
        .checked_add(len)
        .ok_or_else(|| malformed("string length overflows"))?;
    let bytes = data
        .get(start..end)
        .ok_or_else(|| malformed("string runs past end of data"))?;
    String::from_utf8(bytes.to_vec()).map_err(|_| malformed("string is not UTF-8"))
}

/// Decode an indexed `address` topic.
pub fn decode_address_topic(topic: &str) -> Result<Address, VaultError> {
    let word = from_hex(topic)?;
    if word.len() != WORD || word[..12].iter().any(|b| *b != 0) {
        return Err(malformed("address topic is not a left-padded address"));
    }
    let mut address = [0u8; 20];
    address.copy_from_slice(&word[12..]);
    Ok(address)
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address);
    word
}

fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn read_usize(data: &[u8], at: usize) -> Result<usize, VaultError> {
    let word = at
        .checked_add(WORD)
        .and_then(|end| data.get(at..end))
        .ok_or_else(|| malformed("truncated ABI word"))?;
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(malformed("ABI integer does not fit in 64 bits"));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(tail)).map_err(|_| malformed("ABI integer too large"))
}

fn malformed(reason: &str) -> VaultError {
    VaultError::InvalidInput(format!("malformed ABI data: {reason}"))
}
