//! Beacon-chain container types and their hash-tree-roots.
//!
//! Containers merkleize over their 32-byte field chunks: basic fields pack
//! into a chunk, composite fields contribute their own root, and the chunk
//! vector is padded to the next power of two.

use alloy_primitives::{FixedBytes, B256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::merkle::merkleize_chunks;
use crate::ssz::{hash_pair, pack_bool, pack_bytes, pack_u64};

/// BLS public key bytes as they appear in the validator registry.
pub type PublicKeyBytes = FixedBytes<48>;

/// Number of 32-byte field chunks in a `Validator` container.
pub const VALIDATOR_FIELD_COUNT: usize = 8;

/// Tree depth of the `Validator` container (8 fields).
pub const VALIDATOR_TREE_DEPTH: usize = 3;

/// Tree depth of the `BeaconBlockHeader` container (5 fields, padded to 8).
pub const HEADER_TREE_DEPTH: usize = 3;

/// Field index of `state_root` within the block header.
pub const HEADER_STATE_ROOT_INDEX: u64 = 3;

/// The raw 32-byte field chunks of a validator, in container order.
pub type ValidatorFields = [B256; VALIDATOR_FIELD_COUNT];

/// Validator record from the beacon state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    /// BLS public key (48 bytes)
    pub pubkey: PublicKeyBytes,
    /// Withdrawal credentials
    pub withdrawal_credentials: B256,
    /// Effective balance in Gwei
    pub effective_balance: u64,
    /// Whether the validator is slashed
    pub slashed: bool,
    pub activation_eligibility_epoch: u64,
    pub activation_epoch: u64,
    pub exit_epoch: u64,
    pub withdrawable_epoch: u64,
}

impl Validator {
    /// The eight field chunks, in the order the verifier re-hashes them.
    ///
    /// The pubkey chunk is `sha256(pubkey || zero_16)`: 48 bytes span two
    /// chunks and hash as a depth-1 pair. The 16 zero bytes are mandatory;
    /// omitting them yields a different, silently invalid root.
    #[must_use]
    pub fn to_fields(&self) -> ValidatorFields {
        [
            self.pubkey_hash(),
            self.withdrawal_credentials,
            pack_u64(self.effective_balance),
            pack_bool(self.slashed),
            pack_u64(self.activation_eligibility_epoch),
            pack_u64(self.activation_epoch),
            pack_u64(self.exit_epoch),
            pack_u64(self.withdrawable_epoch),
        ]
    }

    /// `sha256(pubkey || zero_16)`, also the key into the EigenPod contract's
    /// validator info mapping.
    #[must_use]
    pub fn pubkey_hash(&self) -> B256 {
        let mut hasher = Sha256::new();
        hasher.update(self.pubkey);
        hasher.update([0u8; 16]);
        let digest: [u8; 32] = hasher.finalize().into();
        B256::from(digest)
    }

    /// SSZ hash-tree-root: the depth-3 Merkle root over the field chunks.
    #[must_use]
    pub fn hash_tree_root(&self) -> B256 {
        merkleize_chunks(&self.to_fields(), VALIDATOR_TREE_DEPTH)
    }
}

/// Beacon block header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBlockHeader {
    pub slot: u64,
    pub proposer_index: u64,
    pub parent_root: B256,
    pub state_root: B256,
    pub body_root: B256,
}

impl BeaconBlockHeader {
    /// The header's leaf layer, padded to the full depth-3 width.
    pub(crate) fn leaves(&self) -> [B256; 8] {
        [
            pack_u64(self.slot),
            pack_u64(self.proposer_index),
            self.parent_root,
            self.state_root,
            self.body_root,
            B256::ZERO,
            B256::ZERO,
            B256::ZERO,
        ]
    }

    /// SSZ hash-tree-root; for the latest header this is the beacon block
    /// root the EIP-4788 oracle pins.
    #[must_use]
    pub fn hash_tree_root(&self) -> B256 {
        merkleize_chunks(&self.leaves(), HEADER_TREE_DEPTH)
    }
}

/// Fork data carried by the beacon state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fork {
    pub previous_version: [u8; 4],
    pub current_version: [u8; 4],
    pub epoch: u64,
}

impl Fork {
    #[must_use]
    pub fn hash_tree_root(&self) -> B256 {
        merkleize_chunks(
            &[
                pack_bytes(&self.previous_version),
                pack_bytes(&self.current_version),
                pack_u64(self.epoch),
            ],
            2,
        )
    }
}

/// Eth1 deposit data snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eth1Data {
    pub deposit_root: B256,
    pub deposit_count: u64,
    pub block_hash: B256,
}

impl Eth1Data {
    #[must_use]
    pub fn hash_tree_root(&self) -> B256 {
        merkleize_chunks(
            &[self.deposit_root, pack_u64(self.deposit_count), self.block_hash],
            2,
        )
    }
}

/// Checkpoint for finality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkpoint {
    pub epoch: u64,
    pub root: B256,
}

impl Checkpoint {
    #[must_use]
    pub fn hash_tree_root(&self) -> B256 {
        hash_pair(&pack_u64(self.epoch), &self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::zero_hash;

    fn test_validator() -> Validator {
        Validator {
            pubkey: PublicKeyBytes::repeat_byte(0x01),
            withdrawal_credentials: B256::repeat_byte(0x02),
            effective_balance: 32_000_000_000,
            slashed: false,
            activation_eligibility_epoch: 1,
            activation_epoch: 2,
            exit_epoch: u64::MAX,
            withdrawable_epoch: u64::MAX,
        }
    }

    #[test]
    fn test_pubkey_leaf_is_padded_before_hashing() {
        let validator = test_validator();

        let mut hasher = Sha256::new();
        hasher.update([0x01u8; 48]);
        hasher.update([0u8; 16]);
        let expected: [u8; 32] = hasher.finalize().into();
        assert_eq!(validator.pubkey_hash(), B256::from(expected));

        // The unpadded 48-byte digest is a different value; a root built from
        // it would never verify on chain.
        let mut unpadded = Sha256::new();
        unpadded.update([0x01u8; 48]);
        let unpadded: [u8; 32] = unpadded.finalize().into();
        assert_ne!(validator.pubkey_hash(), B256::from(unpadded));
    }

    #[test]
    fn test_validator_fields_order() {
        let validator = test_validator();
        let fields = validator.to_fields();
        assert_eq!(fields[0], validator.pubkey_hash());
        assert_eq!(fields[1], validator.withdrawal_credentials);
        assert_eq!(fields[2], pack_u64(32_000_000_000));
        assert_eq!(fields[3], pack_bool(false));
        assert_eq!(fields[4], pack_u64(1));
        assert_eq!(fields[5], pack_u64(2));
        assert_eq!(fields[6], pack_u64(u64::MAX));
        assert_eq!(fields[7], pack_u64(u64::MAX));
    }

    #[test]
    fn test_validator_root_is_sensitive_to_field_order() {
        let validator = test_validator();
        let canonical = validator.hash_tree_root();

        let mut permuted = validator.to_fields();
        permuted.swap(1, 2);
        assert_ne!(merkleize_chunks(&permuted, VALIDATOR_TREE_DEPTH), canonical);
    }

    #[test]
    fn test_validator_root_matches_manual_fold() {
        let validator = test_validator();
        let f = validator.to_fields();
        let expected = hash_pair(
            &hash_pair(&hash_pair(&f[0], &f[1]), &hash_pair(&f[2], &f[3])),
            &hash_pair(&hash_pair(&f[4], &f[5]), &hash_pair(&f[6], &f[7])),
        );
        assert_eq!(validator.hash_tree_root(), expected);
    }

    #[test]
    fn test_header_root_pads_last_three_leaves() {
        let header = BeaconBlockHeader {
            slot: 100,
            proposer_index: 7,
            parent_root: B256::repeat_byte(0x11),
            state_root: B256::repeat_byte(0x22),
            body_root: B256::repeat_byte(0x33),
        };
        let l = header.leaves();
        let expected = hash_pair(
            &hash_pair(&hash_pair(&l[0], &l[1]), &hash_pair(&l[2], &l[3])),
            &hash_pair(&hash_pair(&l[4], &zero_hash(0)), &zero_hash(1)),
        );
        assert_eq!(header.hash_tree_root(), expected);
    }

    #[test]
    fn test_checkpoint_root() {
        let checkpoint = Checkpoint { epoch: 9, root: B256::repeat_byte(0x44) };
        assert_eq!(
            checkpoint.hash_tree_root(),
            hash_pair(&pack_u64(9), &B256::repeat_byte(0x44))
        );
    }

    #[test]
    fn test_fork_and_eth1_data_roots_pad_to_four_chunks() {
        let fork = Fork { previous_version: [1, 0, 0, 0], current_version: [2, 0, 0, 0], epoch: 5 };
        let expected = hash_pair(
            &hash_pair(&pack_bytes(&[1, 0, 0, 0]), &pack_bytes(&[2, 0, 0, 0])),
            &hash_pair(&pack_u64(5), &zero_hash(0)),
        );
        assert_eq!(fork.hash_tree_root(), expected);

        let eth1 = Eth1Data {
            deposit_root: B256::repeat_byte(0x55),
            deposit_count: 12,
            block_hash: B256::repeat_byte(0x66),
        };
        let expected = hash_pair(
            &hash_pair(&eth1.deposit_root, &pack_u64(12)),
            &hash_pair(&eth1.block_hash, &zero_hash(0)),
        );
        assert_eq!(eth1.hash_tree_root(), expected);
    }
}
