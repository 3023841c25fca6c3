//! Layered Merkle tree construction over 32-byte chunks.
//!
//! Trees are built over the occupied leaf prefix only; the all-zero region is
//! covered by the memoized zero-subtree ladder, so a depth-40 validator tree
//! costs a few hashes per occupied leaf rather than 2^40. The layers are
//! retained so that authentication paths for many leaves can be read out of
//! one construction, which is what the oracle-state cache stores.

use std::sync::OnceLock;

use alloy_primitives::B256;

use crate::proof::ProofError;
use crate::ssz::hash_pair;

/// Maximum supported tree depth.
pub const MAX_DEPTH: usize = 64;

/// Root of an all-zero subtree of depth `k`.
///
/// `zero_hash(0)` is the zero leaf; `zero_hash(k) = hash(zero_hash(k-1),
/// zero_hash(k-1))`. Panics if `depth > MAX_DEPTH`.
#[must_use]
pub fn zero_hash(depth: usize) -> B256 {
    static ZERO_HASHES: OnceLock<[B256; MAX_DEPTH + 1]> = OnceLock::new();
    let ladder = ZERO_HASHES.get_or_init(|| {
        let mut hashes = [B256::ZERO; MAX_DEPTH + 1];
        for k in 1..=MAX_DEPTH {
            hashes[k] = hash_pair(&hashes[k - 1], &hashes[k - 1]);
        }
        hashes
    });
    ladder[depth]
}

/// A complete binary Merkle tree of fixed depth, zero-padded past the
/// occupied leaf prefix.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    depth: usize,
    /// `layers[0]` is the occupied leaves; `layers[k]` the occupied prefix of
    /// level `k`. Nodes past a prefix are zero-subtree roots.
    layers: Vec<Vec<B256>>,
}

impl MerkleTree {
    /// Build a tree of `depth` levels from `leaves`, virtually zero-padding
    /// to `2^depth` leaf slots.
    pub fn from_leaves(leaves: Vec<B256>, depth: usize) -> Result<Self, ProofError> {
        if depth > MAX_DEPTH {
            return Err(ProofError::InternalTree(format!(
                "tree depth {depth} exceeds maximum {MAX_DEPTH}"
            )));
        }
        if (leaves.len() as u128) > (1u128 << depth) {
            return Err(ProofError::InternalTree(format!(
                "{} leaves exceed the capacity of a depth-{depth} tree",
                leaves.len()
            )));
        }

        let mut layers = Vec::with_capacity(depth + 1);
        layers.push(leaves);
        for level in 0..depth {
            let below: &Vec<B256> = &layers[level];
            let mut above = Vec::with_capacity(below.len().div_ceil(2));
            for pair in below.chunks(2) {
                let right = pair.get(1).copied().unwrap_or_else(|| zero_hash(level));
                above.push(hash_pair(&pair[0], &right));
            }
            layers.push(above);
        }

        Ok(Self { depth, layers })
    }

    /// Depth of the tree; proofs have exactly this many siblings.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Root of the fully padded tree.
    #[must_use]
    pub fn root(&self) -> B256 {
        self.layers[self.depth]
            .first()
            .copied()
            .unwrap_or_else(|| zero_hash(self.depth))
    }

    /// Leaf value at `index`; zero inside the padding.
    pub fn leaf(&self, index: u64) -> Result<B256, ProofError> {
        self.check_bounds(index)?;
        Ok(self.layers[0].get(index as usize).copied().unwrap_or(B256::ZERO))
    }

    /// Authentication path of leaf `index`: one sibling per level, leaf side
    /// first.
    pub fn proof(&self, index: u64) -> Result<Vec<B256>, ProofError> {
        self.check_bounds(index)?;
        let mut branch = Vec::with_capacity(self.depth);
        for level in 0..self.depth {
            let sibling = (index >> level) ^ 1;
            let node = self.layers[level]
                .get(sibling as usize)
                .copied()
                .unwrap_or_else(|| zero_hash(level));
            branch.push(node);
        }
        Ok(branch)
    }

    fn check_bounds(&self, index: u64) -> Result<(), ProofError> {
        if u128::from(index) >= (1u128 << self.depth) {
            return Err(ProofError::IndexOutOfRange {
                index,
                max: (1u128 << self.depth).min(u128::from(u64::MAX)) as u64,
            });
        }
        Ok(())
    }
}

/// Merkle root of `leaves` zero-padded to `2^depth`, without retaining
/// layers. Callers guarantee `leaves.len() <= 2^depth`; container
/// merkleizers use compile-time field counts.
#[must_use]
pub fn merkleize_chunks(leaves: &[B256], depth: usize) -> B256 {
    debug_assert!((leaves.len() as u128) <= (1u128 << depth));
    let mut layer = leaves.to_vec();
    for level in 0..depth {
        let mut above = Vec::with_capacity(layer.len().div_ceil(2));
        for pair in layer.chunks(2) {
            let right = pair.get(1).copied().unwrap_or_else(|| zero_hash(level));
            above.push(hash_pair(&pair[0], &right));
        }
        layer = above;
    }
    layer.first().copied().unwrap_or_else(|| zero_hash(depth))
}

/// Replay an authentication path: fold `leaf` with each sibling, choosing the
/// hashing side from the leaf index bits, and return the reconstructed root.
#[must_use]
pub fn compute_root_from_proof(leaf: B256, index: u64, branch: &[B256]) -> B256 {
    branch
        .iter()
        .enumerate()
        .fold(leaf, |node, (level, sibling)| {
            if (index >> level) & 1 == 0 {
                hash_pair(&node, sibling)
            } else {
                hash_pair(sibling, &node)
            }
        })
}
