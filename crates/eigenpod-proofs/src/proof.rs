//! Proof shapes and the proving façade.
//!
//! Proofs are ordered sibling lists, leaf side first; composite proofs
//! concatenate the inner (leaf-subtree) path before the outer one, which is
//! the order the EigenPod contract walks them. The JSON field names are the
//! stable interface the downstream tooling serializes for contract calls.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::beacon_state::VersionedBeaconState;
use crate::cache::{StateCache, StateTrees};
use crate::fork::{
    ForkName, Network, BALANCES_FIELD_INDEX, BALANCE_LIST_TREE_DEPTH, VALIDATORS_FIELD_INDEX,
    VALIDATOR_LIST_TREE_DEPTH,
};
use crate::merkle::{merkleize_chunks, MerkleTree};
use crate::ssz::{big_to_little_endian, mix_in_length, pack_u64_list};
use crate::types::{
    BeaconBlockHeader, Validator, ValidatorFields, HEADER_STATE_ROOT_INDEX, HEADER_TREE_DEPTH,
};

/// Errors surfaced by proof generation. Every failure aborts the call; no
/// partial results are returned and the cache is left untouched.
#[derive(Debug, Error)]
pub enum ProofError {
    /// Chain id without a registered fork schedule.
    #[error("unsupported chain id {0}")]
    UnsupportedChain(u64),

    /// Fork version missing from the network's schedule.
    #[error("unknown fork version 0x{}", alloy_primitives::hex::encode(.0))]
    UnknownFork([u8; 4]),

    /// The beacon state yielded inconsistent data.
    #[error("beacon state access failed: {0}")]
    StateAccess(String),

    /// Requested index outside the tree or validator registry bounds.
    #[error("index {index} out of range (max {max})")]
    IndexOutOfRange { index: u64, max: u64 },

    /// A length encoding exceeded u64 bounds.
    #[error("value {0} exceeds u64 bounds")]
    ValueTooLarge(u128),

    /// Tree-builder invariant violation; indicates a bug.
    #[error("internal tree error: {0}")]
    InternalTree(String),
}

/// Proof that a state root is committed to by a block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRootProof {
    /// The beacon state root the header commits to.
    pub beacon_state_root: B256,
    /// Siblings from the `state_root` leaf to the header root.
    pub state_root_proof: Vec<B256>,
}

/// Balance proof for one validator in a checkpoint batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceProof {
    /// `sha256(pubkey || zero_16)`; the contract's validator-info key.
    pub pubkey_hash: B256,
    /// The full 32-byte chunk holding this validator's balance; the verifier
    /// extracts the 8-byte slice itself.
    pub balance_root: B256,
    /// Chunk path (38) || length sibling || top-level path for `balances`.
    pub proof: Vec<B256>,
}

/// Arguments for `EigenPod.verifyWithdrawalCredentials`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyValidatorFieldsCallParams {
    pub oracle_timestamp: u64,
    pub state_root_proof: StateRootProof,
    pub validator_indices: Vec<u64>,
    /// Per index: validator path (40) || length sibling || top-level path for
    /// `validators`.
    pub validator_fields_proofs: Vec<Vec<B256>>,
    /// Per index: the raw field chunks the verifier re-hashes into the
    /// validator root.
    pub validator_fields: Vec<ValidatorFields>,
}

/// Arguments for `EigenPod.verifyCheckpointProofs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCheckpointProofsCallParams {
    pub beacon_timestamp: u64,
    pub state_root_proof: StateRootProof,
    pub balance_proofs: Vec<BalanceProof>,
}

/// Authentication path of the `state_root` leaf against the block header
/// root: leaf 2 (`parent_root`), then `hash(slot, proposer_index)`, then the
/// hash of the padded tail.
pub fn prove_state_root_against_block_header(
    header: &BeaconBlockHeader,
) -> Result<Vec<B256>, ProofError> {
    let tree = MerkleTree::from_leaves(header.leaves().to_vec(), HEADER_TREE_DEPTH)?;
    tree.proof(HEADER_STATE_ROOT_INDEX)
}

/// Beacon-chain proof generator for EigenPod contract calls.
///
/// Construction pins the network (fork schedule and genesis time) and the
/// oracle-state cache TTL; one instance serves many proofs, re-using the
/// cached subtrees for repeated calls against the same `(slot, fork)`.
#[derive(Debug)]
pub struct EigenPodProofs {
    network: Network,
    cache: StateCache,
}

impl EigenPodProofs {
    /// Create a prover for `chain_id` with the given cache TTL in seconds.
    pub fn new(chain_id: u64, oracle_state_cache_expiry_seconds: u64) -> Result<Self, ProofError> {
        Ok(Self {
            network: Network::from_chain_id(chain_id)?,
            cache: StateCache::new(Duration::from_secs(oracle_state_cache_expiry_seconds)),
        })
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Completed cache builds so far; cache hits do not increment it.
    #[must_use]
    pub fn cache_build_count(&self) -> u64 {
        self.cache.build_count()
    }

    /// Prove the fields of each listed validator against the block header.
    ///
    /// Duplicate indices are allowed; any index at or beyond the validator
    /// count fails the whole call.
    #[instrument(skip_all, fields(slot = state.slot(), fork = %state.fork_name(), validators = validator_indices.len()))]
    pub fn prove_validator_containers(
        &self,
        header: &BeaconBlockHeader,
        state: &VersionedBeaconState,
        validator_indices: &[u64],
    ) -> Result<VerifyValidatorFieldsCallParams, ProofError> {
        let trees = self.state_trees(state)?;
        let validators = state.validators();

        let mut proofs = Vec::with_capacity(validator_indices.len());
        let mut fields = Vec::with_capacity(validator_indices.len());
        for &index in validator_indices {
            proofs.push(self.prove_validator_against_beacon_state(state, &trees, index)?);
            fields.push(validators[index as usize].to_fields());
        }

        Ok(VerifyValidatorFieldsCallParams {
            oracle_timestamp: self.network.slot_timestamp(header.slot),
            state_root_proof: state_root_proof(header)?,
            validator_indices: validator_indices.to_vec(),
            validator_fields_proofs: proofs,
            validator_fields: fields,
        })
    }

    /// Credential-verification flow: validator fields only, balance proofs
    /// omitted.
    pub fn prove_withdrawal_credentials(
        &self,
        header: &BeaconBlockHeader,
        state: &VersionedBeaconState,
        validator_indices: &[u64],
    ) -> Result<VerifyValidatorFieldsCallParams, ProofError> {
        self.prove_validator_containers(header, state, validator_indices)
    }

    /// Single-validator form: the shared header proof plus one validator's
    /// proof against the beacon state.
    pub fn prove_validator_fields(
        &self,
        header: &BeaconBlockHeader,
        state: &VersionedBeaconState,
        validator_index: u64,
    ) -> Result<(StateRootProof, Vec<B256>), ProofError> {
        let trees = self.state_trees(state)?;
        let proof = self.prove_validator_against_beacon_state(state, &trees, validator_index)?;
        Ok((state_root_proof(header)?, proof))
    }

    /// Prove current balances for a checkpoint batch. All balance proofs
    /// share one state-root proof.
    #[instrument(skip_all, fields(slot = state.slot(), fork = %state.fork_name(), validators = validator_indices.len()))]
    pub fn prove_checkpoint_proofs(
        &self,
        header: &BeaconBlockHeader,
        state: &VersionedBeaconState,
        validator_indices: &[u64],
    ) -> Result<VerifyCheckpointProofsCallParams, ProofError> {
        let trees = self.state_trees(state)?;
        let validators = state.validators();

        let mut balance_proofs = Vec::with_capacity(validator_indices.len());
        for &index in validator_indices {
            let proof = self.prove_balance_against_beacon_state(state, &trees, index)?;
            balance_proofs.push(BalanceProof {
                pubkey_hash: validators[index as usize].pubkey_hash(),
                balance_root: trees.balance_tree.leaf(index >> 2)?,
                proof,
            });
        }

        Ok(VerifyCheckpointProofsCallParams {
            beacon_timestamp: self.network.slot_timestamp(header.slot),
            state_root_proof: state_root_proof(header)?,
            balance_proofs,
        })
    }

    /// One root per immediate field of the state container.
    pub fn compute_beacon_state_top_level_roots(
        &self,
        state: &VersionedBeaconState,
    ) -> Result<Vec<B256>, ProofError> {
        Ok(self.state_trees(state)?.top_level_roots.clone())
    }

    /// Hash-tree-root of the state container: the top-level roots merkleized
    /// over the fork's padded width.
    pub fn compute_beacon_state_root(
        &self,
        state: &VersionedBeaconState,
    ) -> Result<B256, ProofError> {
        let trees = self.state_trees(state)?;
        Ok(merkleize_chunks(
            &trees.top_level_roots,
            state.fork_name().state_tree_depth(),
        ))
    }

    /// Build or fetch the cached trees for this state's `(slot, fork)`.
    fn state_trees(&self, state: &VersionedBeaconState) -> Result<Arc<StateTrees>, ProofError> {
        let key = (state.slot(), state.fork_name());
        self.cache.get_or_build(key, || {
            let validators = state.validators();
            let balances = state.balances();
            if balances.len() != validators.len() {
                return Err(ProofError::StateAccess(format!(
                    "balance list length {} does not match validator count {}",
                    balances.len(),
                    validators.len()
                )));
            }

            let validator_leaves: Vec<B256> =
                validators.iter().map(Validator::hash_tree_root).collect();
            let validator_tree =
                MerkleTree::from_leaves(validator_leaves, VALIDATOR_LIST_TREE_DEPTH)?;
            let balance_tree =
                MerkleTree::from_leaves(pack_u64_list(balances), BALANCE_LIST_TREE_DEPTH)?;

            let validators_root = mix_in_length(&validator_tree.root(), validators.len());
            let balances_root = mix_in_length(&balance_tree.root(), balances.len());
            let top_level_roots = state.top_level_roots(validators_root, balances_root);

            Ok(StateTrees { top_level_roots, validator_tree, balance_tree })
        })
    }

    /// Validator path (40) || length sibling || top-level path for `validators`.
    fn prove_validator_against_beacon_state(
        &self,
        state: &VersionedBeaconState,
        trees: &StateTrees,
        validator_index: u64,
    ) -> Result<Vec<B256>, ProofError> {
        let count = state.validators().len() as u64;
        if validator_index >= count {
            return Err(ProofError::IndexOutOfRange { index: validator_index, max: count });
        }

        let mut proof = trees.validator_tree.proof(validator_index)?;
        proof.push(big_to_little_endian(u128::from(count))?);
        proof.extend(self.prove_top_level_root(trees, state.fork_name(), VALIDATORS_FIELD_INDEX)?);
        Ok(proof)
    }

    /// Chunk path (38) || length sibling || top-level path for `balances`.
    fn prove_balance_against_beacon_state(
        &self,
        state: &VersionedBeaconState,
        trees: &StateTrees,
        validator_index: u64,
    ) -> Result<Vec<B256>, ProofError> {
        let count = state.validators().len() as u64;
        if validator_index >= count {
            return Err(ProofError::IndexOutOfRange { index: validator_index, max: count });
        }

        let mut proof = trees.balance_tree.proof(validator_index >> 2)?;
        proof.push(big_to_little_endian(u128::from(count))?);
        proof.extend(self.prove_top_level_root(trees, state.fork_name(), BALANCES_FIELD_INDEX)?);
        Ok(proof)
    }

    /// Authentication path of one top-level field inside the state container.
    fn prove_top_level_root(
        &self,
        trees: &StateTrees,
        fork: ForkName,
        field_index: u64,
    ) -> Result<Vec<B256>, ProofError> {
        let tree = MerkleTree::from_leaves(trees.top_level_roots.clone(), fork.state_tree_depth())?;
        tree.proof(field_index)
    }
}

fn state_root_proof(header: &BeaconBlockHeader) -> Result<StateRootProof, ProofError> {
    Ok(StateRootProof {
        beacon_state_root: header.state_root,
        state_root_proof: prove_state_root_against_block_header(header)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon_state::BeaconStateDeneb;
    use crate::gindex;
    use crate::merkle::compute_root_from_proof;
    use crate::ssz::pack_u64;
    use crate::types::PublicKeyBytes;

    fn make_validator(index: u8) -> Validator {
        Validator {
            pubkey: PublicKeyBytes::repeat_byte(index),
            withdrawal_credentials: B256::repeat_byte(index),
            effective_balance: 32_000_000_000,
            activation_epoch: 100 + u64::from(index),
            exit_epoch: u64::MAX,
            withdrawable_epoch: u64::MAX,
            ..Validator::default()
        }
    }

    fn deneb_state(count: u8) -> VersionedBeaconState {
        let mut state = BeaconStateDeneb { slot: 1_000, genesis_time: 1_606_824_023, ..Default::default() };
        for i in 0..count {
            state.validators.push(make_validator(i));
            state.balances.push(31_000_000_000 + u64::from(i));
        }
        VersionedBeaconState::Deneb(state)
    }

    fn header_for(prover: &EigenPodProofs, state: &VersionedBeaconState) -> BeaconBlockHeader {
        BeaconBlockHeader {
            slot: state.slot(),
            proposer_index: 1,
            parent_root: B256::repeat_byte(0x11),
            state_root: prover.compute_beacon_state_root(state).unwrap(),
            body_root: B256::repeat_byte(0x22),
        }
    }

    #[test]
    fn test_new_rejects_unknown_chain() {
        let err = EigenPodProofs::new(5, 300).unwrap_err();
        assert!(matches!(err, ProofError::UnsupportedChain(5)));
    }

    #[test]
    fn test_state_root_proof_against_header() {
        let header = BeaconBlockHeader {
            slot: 42,
            proposer_index: 7,
            parent_root: B256::repeat_byte(0x0a),
            state_root: B256::repeat_byte(0x0b),
            body_root: B256::repeat_byte(0x0c),
        };

        let proof = prove_state_root_against_block_header(&header).unwrap();
        assert_eq!(proof.len(), 3);
        assert_eq!(proof[0], header.parent_root);

        let reconstructed = compute_root_from_proof(
            header.state_root,
            HEADER_STATE_ROOT_INDEX,
            &proof,
        );
        assert_eq!(reconstructed, header.hash_tree_root());
    }

    #[test]
    fn test_single_validator_proof_shape() {
        let prover = EigenPodProofs::new(1, 300).unwrap();
        let state = deneb_state(1);
        let header = header_for(&prover, &state);

        let params = prover.prove_validator_containers(&header, &state, &[0]).unwrap();

        assert_eq!(params.validator_indices, vec![0]);
        assert_eq!(params.validator_fields_proofs.len(), 1);
        assert_eq!(
            params.validator_fields_proofs[0].len(),
            gindex::validator_fields_proof_length(ForkName::Deneb)
        );
        // the length sibling sits right above the 40 list levels
        assert_eq!(
            params.validator_fields_proofs[0][VALIDATOR_LIST_TREE_DEPTH],
            pack_u64(1)
        );
        // returned fields are the raw chunks
        let validator = &state.validators()[0];
        assert_eq!(params.validator_fields[0][0], validator.pubkey_hash());
        assert_eq!(params.validator_fields[0][1], validator.withdrawal_credentials);
        assert_eq!(params.oracle_timestamp, 1_606_824_023 + 1_000 * 12);
    }

    #[test]
    fn test_length_sibling_encodes_the_count() {
        let prover = EigenPodProofs::new(1, 300).unwrap();
        let state = deneb_state(5);
        let header = header_for(&prover, &state);

        let params = prover.prove_validator_containers(&header, &state, &[4]).unwrap();
        let sibling = params.validator_fields_proofs[0][VALIDATOR_LIST_TREE_DEPTH];
        assert_eq!(sibling, pack_u64(5));
        assert_eq!(sibling[0], 0x05);
        assert_eq!(&sibling[1..8], &[0u8; 7]);
    }

    #[test]
    fn test_duplicate_indices_are_allowed() {
        let prover = EigenPodProofs::new(1, 300).unwrap();
        let state = deneb_state(3);
        let header = header_for(&prover, &state);

        let params = prover.prove_validator_containers(&header, &state, &[2, 2, 0]).unwrap();
        assert_eq!(params.validator_fields_proofs.len(), 3);
        assert_eq!(params.validator_fields_proofs[0], params.validator_fields_proofs[1]);
    }

    #[test]
    fn test_out_of_range_index_fails_the_call() {
        let prover = EigenPodProofs::new(1, 300).unwrap();
        let state = deneb_state(3);
        let header = header_for(&prover, &state);

        let err = prover.prove_validator_containers(&header, &state, &[0, 3]).unwrap_err();
        assert!(matches!(err, ProofError::IndexOutOfRange { index: 3, max: 3 }));

        let err = prover.prove_checkpoint_proofs(&header, &state, &[5]).unwrap_err();
        assert!(matches!(err, ProofError::IndexOutOfRange { index: 5, .. }));
    }

    #[test]
    fn test_mismatched_balance_list_is_state_access_error() {
        let prover = EigenPodProofs::new(1, 300).unwrap();
        let mut inner = BeaconStateDeneb { slot: 1, ..Default::default() };
        inner.validators.push(make_validator(0));
        // no balances pushed
        let state = VersionedBeaconState::Deneb(inner);
        let header = BeaconBlockHeader::default();

        let err = prover.prove_validator_containers(&header, &state, &[0]).unwrap_err();
        assert!(matches!(err, ProofError::StateAccess(_)));
    }

    #[test]
    fn test_single_validator_form_matches_batch() {
        let prover = EigenPodProofs::new(1, 300).unwrap();
        let state = deneb_state(4);
        let header = header_for(&prover, &state);

        let (state_root_proof, proof) =
            prover.prove_validator_fields(&header, &state, 2).unwrap();
        let batch = prover.prove_validator_containers(&header, &state, &[2]).unwrap();

        assert_eq!(state_root_proof, batch.state_root_proof);
        assert_eq!(proof, batch.validator_fields_proofs[0]);
    }

    #[test]
    fn test_withdrawal_credentials_flow_matches_validator_containers() {
        let prover = EigenPodProofs::new(1, 300).unwrap();
        let state = deneb_state(4);
        let header = header_for(&prover, &state);

        let a = prover.prove_validator_containers(&header, &state, &[1, 3]).unwrap();
        let b = prover.prove_withdrawal_credentials(&header, &state, &[1, 3]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_checkpoint_balance_root_is_the_packed_chunk() {
        let prover = EigenPodProofs::new(1, 300).unwrap();
        let state = deneb_state(6);
        let header = header_for(&prover, &state);

        let params = prover.prove_checkpoint_proofs(&header, &state, &[5]).unwrap();
        let chunk = params.balance_proofs[0].balance_root;
        // validator 5 lives in chunk 1 at offset 1
        assert_eq!(&chunk[0..8], &state.balances()[4].to_le_bytes());
        assert_eq!(&chunk[8..16], &state.balances()[5].to_le_bytes());
        assert_eq!(&chunk[16..32], &[0u8; 16]);
        assert_eq!(params.balance_proofs[0].pubkey_hash, state.validators()[5].pubkey_hash());
    }

    #[test]
    fn test_call_params_json_field_names() {
        let prover = EigenPodProofs::new(1, 300).unwrap();
        let state = deneb_state(2);
        let header = header_for(&prover, &state);

        let params = prover.prove_validator_containers(&header, &state, &[0]).unwrap();
        let json = serde_json::to_value(&params).unwrap();
        for key in [
            "oracleTimestamp",
            "stateRootProof",
            "validatorIndices",
            "validatorFieldsProofs",
            "validatorFields",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["stateRootProof"].get("beaconStateRoot").is_some());
        assert!(json["stateRootProof"].get("stateRootProof").is_some());

        let checkpoint = prover.prove_checkpoint_proofs(&header, &state, &[0]).unwrap();
        let json = serde_json::to_value(&checkpoint).unwrap();
        for key in ["beaconTimestamp", "stateRootProof", "balanceProofs"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        for key in ["pubkeyHash", "balanceRoot", "proof"] {
            assert!(json["balanceProofs"][0].get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_call_params_json_round_trip() {
        let prover = EigenPodProofs::new(1, 300).unwrap();
        let state = deneb_state(2);
        let header = header_for(&prover, &state);

        let params = prover.prove_validator_containers(&header, &state, &[0, 1]).unwrap();
        let json = serde_json::to_string(&params).unwrap();
        let decoded: VerifyValidatorFieldsCallParams = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, params);
    }
}
