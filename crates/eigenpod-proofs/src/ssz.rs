//! SSZ chunk packing and node hashing primitives.
//!
//! Everything above this module works in 32-byte chunks, the unit of SSZ
//! merkleization: basic values are little-endian encoded and zero-padded to a
//! chunk, packed lists group several values per chunk, and interior nodes are
//! SHA-256 over the 64-byte concatenation of their children.

use alloy_primitives::B256;
use sha2::{Digest, Sha256};

use crate::proof::ProofError;

/// Number of u64 values packed into one 32-byte balance chunk.
pub const BALANCES_PER_CHUNK: usize = 4;

/// Encode a u64 as a little-endian 32-byte chunk.
#[must_use]
pub fn pack_u64(value: u64) -> B256 {
    let mut chunk = [0u8; 32];
    chunk[..8].copy_from_slice(&value.to_le_bytes());
    B256::from(chunk)
}

/// Encode a bool as a 32-byte chunk (first byte 0 or 1).
#[must_use]
pub fn pack_bool(value: bool) -> B256 {
    let mut chunk = [0u8; 32];
    chunk[0] = u8::from(value);
    B256::from(chunk)
}

/// Left-align a short byte string into a 32-byte chunk.
///
/// Used for sub-chunk basic vectors such as fork versions and justification
/// bits. Panics if `bytes` is longer than a chunk.
#[must_use]
pub fn pack_bytes(bytes: &[u8]) -> B256 {
    let mut chunk = [0u8; 32];
    chunk[..bytes.len()].copy_from_slice(bytes);
    B256::from(chunk)
}

/// Pack a u64 list into chunks, four values per chunk, little-endian,
/// zero-padding the final chunk.
#[must_use]
pub fn pack_u64_list(values: &[u64]) -> Vec<B256> {
    values
        .chunks(BALANCES_PER_CHUNK)
        .map(|group| {
            let mut chunk = [0u8; 32];
            for (i, value) in group.iter().enumerate() {
                chunk[i * 8..(i + 1) * 8].copy_from_slice(&value.to_le_bytes());
            }
            B256::from(chunk)
        })
        .collect()
}

/// SHA-256 over the 64-byte concatenation of two nodes.
#[must_use]
pub fn hash_pair(left: &B256, right: &B256) -> B256 {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    let digest: [u8; 32] = hasher.finalize().into();
    B256::from(digest)
}

/// Bind a list's element count into its data root:
/// `hash(root, little_endian(length))`.
#[must_use]
pub fn mix_in_length(root: &B256, length: usize) -> B256 {
    hash_pair(root, &pack_u64(length as u64))
}

/// Little-endian 32-byte encoding of an arbitrary-width count, used as the
/// final sibling of list proofs. Values above `u64::MAX` are rejected.
pub fn big_to_little_endian(value: u128) -> Result<B256, ProofError> {
    let value = u64::try_from(value).map_err(|_| ProofError::ValueTooLarge(value))?;
    Ok(pack_u64(value))
}
