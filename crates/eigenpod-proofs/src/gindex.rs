//! Generalized-index arithmetic for the beacon proof paths.
//!
//! A generalized index numbers tree positions heap-style with the root at 1;
//! its depth is `floor(log2(g))` and the bits below the leading 1 spell the
//! left/right walk. Indices of nested structures concatenate, which is how the
//! layered proofs here compose.

use crate::fork::{
    ForkName, BALANCES_FIELD_INDEX, BALANCE_LIST_TREE_DEPTH, VALIDATORS_FIELD_INDEX,
    VALIDATOR_LIST_TREE_DEPTH,
};
use crate::types::{HEADER_STATE_ROOT_INDEX, HEADER_TREE_DEPTH};

/// Concatenate generalized indices along a nesting path.
#[must_use]
pub fn concat_gindices(gindices: &[u64]) -> u64 {
    let mut result = 1u64;
    for &gindex in gindices {
        debug_assert!(gindex >= 1);
        let depth = gindex_depth(gindex);
        result = (result << depth) | (gindex ^ (1u64 << depth));
    }
    result
}

/// Depth of a generalized index: `floor(log2(g))`. `g` must be positive.
#[must_use]
pub const fn gindex_depth(gindex: u64) -> u32 {
    63 - gindex.leading_zeros()
}

/// Gindex of `state_root` within the block header tree.
#[must_use]
pub const fn state_root_gindex() -> u64 {
    (1 << HEADER_TREE_DEPTH) + HEADER_STATE_ROOT_INDEX
}

/// Gindex of a top-level state field, measured from the state root.
#[must_use]
pub fn top_level_field_gindex(fork: ForkName, field_index: u64) -> u64 {
    (1u64 << fork.state_tree_depth()) + field_index
}

/// Gindex of `validators[index]`'s container root, measured from the state
/// root. The list layer contributes one level: the data root sits at 2, the
/// length mix-in at 3.
#[must_use]
pub fn validator_container_gindex(fork: ForkName, validator_index: u64) -> u64 {
    concat_gindices(&[
        top_level_field_gindex(fork, VALIDATORS_FIELD_INDEX),
        2,
        (1u64 << VALIDATOR_LIST_TREE_DEPTH) + validator_index,
    ])
}

/// Gindex of the balance chunk holding `validator_index`'s balance, measured
/// from the state root. Four balances share a chunk.
#[must_use]
pub fn balance_chunk_gindex(fork: ForkName, validator_index: u64) -> u64 {
    concat_gindices(&[
        top_level_field_gindex(fork, BALANCES_FIELD_INDEX),
        2,
        (1u64 << BALANCE_LIST_TREE_DEPTH) + (validator_index >> 2),
    ])
}

/// Sibling count of a validator-fields proof against the state root.
#[must_use]
pub fn validator_fields_proof_length(fork: ForkName) -> usize {
    VALIDATOR_LIST_TREE_DEPTH + 1 + fork.state_tree_depth()
}

/// Sibling count of a balance proof against the state root.
#[must_use]
pub fn balance_proof_length(fork: ForkName) -> usize {
    BALANCE_LIST_TREE_DEPTH + 1 + fork.state_tree_depth()
}
