//! # EigenPod Proofs
//!
//! SSZ merkleization and Merkle proof generation against Ethereum
//! beacon-chain state, producing the exact proof objects the EigenPod
//! contract's `verifyWithdrawalCredentials` and `verifyCheckpointProofs`
//! entry points consume.
//!
//! Given a beacon block header, the full beacon state at that header's slot,
//! and a list of validator indices, the prover emits layered proofs
//! (validator leaf → list → state container → block header) together with the
//! leaf values the on-chain verifier re-hashes. The two expensive subtrees
//! (the depth-40 validator tree and the depth-38 balance-chunk tree) are
//! cached per `(slot, fork)` so repeated proofs against the same state do not
//! re-hash the registry.
//!
//! Fetching headers and states from a beacon node, selecting which validators
//! to prove, and submitting transactions are left to callers.

pub mod beacon_state;
pub mod cache;
pub mod fork;
pub mod gindex;
pub mod merkle;
pub mod proof;
pub mod ssz;
pub mod types;

pub use beacon_state::{
    BeaconStateAltair, BeaconStateBellatrix, BeaconStateCapella, BeaconStateDeneb,
    BeaconStateElectra, BeaconStatePhase0, VersionedBeaconState,
};
pub use cache::{StateCache, StateTrees, DEFAULT_CACHE_EXPIRY_SECONDS};
pub use fork::{ForkName, Network, SECONDS_PER_SLOT, SLOTS_PER_EPOCH};
pub use merkle::MerkleTree;
pub use proof::{
    prove_state_root_against_block_header, BalanceProof, EigenPodProofs, ProofError,
    StateRootProof, VerifyCheckpointProofsCallParams, VerifyValidatorFieldsCallParams,
};
pub use types::{
    BeaconBlockHeader, Checkpoint, Eth1Data, Fork, PublicKeyBytes, Validator, ValidatorFields,
};
