//! Per-fork beacon state containers and the fork-tagged wrapper.
//!
//! Each hard fork fixes its own ordered field list, and with it the shape of
//! the state tree. The prover only ever descends into a handful of fields
//! (`validators`, `balances`, and the small typed containers); every other
//! field is carried as its hash-tree-root, supplied by whoever decoded the
//! state. That keeps the containers honest about field count and order while
//! avoiding payload headers and sync committees the proofs never touch.

use alloy_primitives::B256;

use crate::fork::ForkName;
use crate::ssz::{pack_bytes, pack_u64};
use crate::types::{BeaconBlockHeader, Checkpoint, Eth1Data, Fork, Validator};

/// Phase0 beacon state (21 fields).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeaconStatePhase0 {
    pub genesis_time: u64,
    pub genesis_validators_root: B256,
    pub slot: u64,
    pub fork: Fork,
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots_root: B256,
    pub state_roots_root: B256,
    pub historical_roots_root: B256,
    pub eth1_data: Eth1Data,
    pub eth1_data_votes_root: B256,
    pub eth1_deposit_index: u64,
    pub validators: Vec<Validator>,
    pub balances: Vec<u64>,
    pub randao_mixes_root: B256,
    pub slashings_root: B256,
    pub previous_epoch_attestations_root: B256,
    pub current_epoch_attestations_root: B256,
    /// The four justification bits, packed little-endian into the low byte.
    pub justification_bits: u8,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
}

impl BeaconStatePhase0 {
    fn top_level_roots(&self, validators_root: B256, balances_root: B256) -> Vec<B256> {
        vec![
            pack_u64(self.genesis_time),
            self.genesis_validators_root,
            pack_u64(self.slot),
            self.fork.hash_tree_root(),
            self.latest_block_header.hash_tree_root(),
            self.block_roots_root,
            self.state_roots_root,
            self.historical_roots_root,
            self.eth1_data.hash_tree_root(),
            self.eth1_data_votes_root,
            pack_u64(self.eth1_deposit_index),
            validators_root,
            balances_root,
            self.randao_mixes_root,
            self.slashings_root,
            self.previous_epoch_attestations_root,
            self.current_epoch_attestations_root,
            pack_bytes(&[self.justification_bits]),
            self.previous_justified_checkpoint.hash_tree_root(),
            self.current_justified_checkpoint.hash_tree_root(),
            self.finalized_checkpoint.hash_tree_root(),
        ]
    }
}

/// Altair beacon state (24 fields): attestations become participation flags,
/// sync committees and inactivity scores are appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeaconStateAltair {
    pub genesis_time: u64,
    pub genesis_validators_root: B256,
    pub slot: u64,
    pub fork: Fork,
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots_root: B256,
    pub state_roots_root: B256,
    pub historical_roots_root: B256,
    pub eth1_data: Eth1Data,
    pub eth1_data_votes_root: B256,
    pub eth1_deposit_index: u64,
    pub validators: Vec<Validator>,
    pub balances: Vec<u64>,
    pub randao_mixes_root: B256,
    pub slashings_root: B256,
    pub previous_epoch_participation_root: B256,
    pub current_epoch_participation_root: B256,
    pub justification_bits: u8,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
    pub inactivity_scores_root: B256,
    pub current_sync_committee_root: B256,
    pub next_sync_committee_root: B256,
}

impl BeaconStateAltair {
    fn top_level_roots(&self, validators_root: B256, balances_root: B256) -> Vec<B256> {
        vec![
            pack_u64(self.genesis_time),
            self.genesis_validators_root,
            pack_u64(self.slot),
            self.fork.hash_tree_root(),
            self.latest_block_header.hash_tree_root(),
            self.block_roots_root,
            self.state_roots_root,
            self.historical_roots_root,
            self.eth1_data.hash_tree_root(),
            self.eth1_data_votes_root,
            pack_u64(self.eth1_deposit_index),
            validators_root,
            balances_root,
            self.randao_mixes_root,
            self.slashings_root,
            self.previous_epoch_participation_root,
            self.current_epoch_participation_root,
            pack_bytes(&[self.justification_bits]),
            self.previous_justified_checkpoint.hash_tree_root(),
            self.current_justified_checkpoint.hash_tree_root(),
            self.finalized_checkpoint.hash_tree_root(),
            self.inactivity_scores_root,
            self.current_sync_committee_root,
            self.next_sync_committee_root,
        ]
    }
}

/// Bellatrix beacon state (25 fields): appends the execution payload header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeaconStateBellatrix {
    pub genesis_time: u64,
    pub genesis_validators_root: B256,
    pub slot: u64,
    pub fork: Fork,
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots_root: B256,
    pub state_roots_root: B256,
    pub historical_roots_root: B256,
    pub eth1_data: Eth1Data,
    pub eth1_data_votes_root: B256,
    pub eth1_deposit_index: u64,
    pub validators: Vec<Validator>,
    pub balances: Vec<u64>,
    pub randao_mixes_root: B256,
    pub slashings_root: B256,
    pub previous_epoch_participation_root: B256,
    pub current_epoch_participation_root: B256,
    pub justification_bits: u8,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
    pub inactivity_scores_root: B256,
    pub current_sync_committee_root: B256,
    pub next_sync_committee_root: B256,
    pub latest_execution_payload_header_root: B256,
}

impl BeaconStateBellatrix {
    fn top_level_roots(&self, validators_root: B256, balances_root: B256) -> Vec<B256> {
        vec![
            pack_u64(self.genesis_time),
            self.genesis_validators_root,
            pack_u64(self.slot),
            self.fork.hash_tree_root(),
            self.latest_block_header.hash_tree_root(),
            self.block_roots_root,
            self.state_roots_root,
            self.historical_roots_root,
            self.eth1_data.hash_tree_root(),
            self.eth1_data_votes_root,
            pack_u64(self.eth1_deposit_index),
            validators_root,
            balances_root,
            self.randao_mixes_root,
            self.slashings_root,
            self.previous_epoch_participation_root,
            self.current_epoch_participation_root,
            pack_bytes(&[self.justification_bits]),
            self.previous_justified_checkpoint.hash_tree_root(),
            self.current_justified_checkpoint.hash_tree_root(),
            self.finalized_checkpoint.hash_tree_root(),
            self.inactivity_scores_root,
            self.current_sync_committee_root,
            self.next_sync_committee_root,
            self.latest_execution_payload_header_root,
        ]
    }
}

/// Capella beacon state (28 fields): appends withdrawal bookkeeping and
/// historical summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeaconStateCapella {
    pub genesis_time: u64,
    pub genesis_validators_root: B256,
    pub slot: u64,
    pub fork: Fork,
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots_root: B256,
    pub state_roots_root: B256,
    pub historical_roots_root: B256,
    pub eth1_data: Eth1Data,
    pub eth1_data_votes_root: B256,
    pub eth1_deposit_index: u64,
    pub validators: Vec<Validator>,
    pub balances: Vec<u64>,
    pub randao_mixes_root: B256,
    pub slashings_root: B256,
    pub previous_epoch_participation_root: B256,
    pub current_epoch_participation_root: B256,
    pub justification_bits: u8,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
    pub inactivity_scores_root: B256,
    pub current_sync_committee_root: B256,
    pub next_sync_committee_root: B256,
    pub latest_execution_payload_header_root: B256,
    pub next_withdrawal_index: u64,
    pub next_withdrawal_validator_index: u64,
    pub historical_summaries_root: B256,
}

impl BeaconStateCapella {
    fn top_level_roots(&self, validators_root: B256, balances_root: B256) -> Vec<B256> {
        vec![
            pack_u64(self.genesis_time),
            self.genesis_validators_root,
            pack_u64(self.slot),
            self.fork.hash_tree_root(),
            self.latest_block_header.hash_tree_root(),
            self.block_roots_root,
            self.state_roots_root,
            self.historical_roots_root,
            self.eth1_data.hash_tree_root(),
            self.eth1_data_votes_root,
            pack_u64(self.eth1_deposit_index),
            validators_root,
            balances_root,
            self.randao_mixes_root,
            self.slashings_root,
            self.previous_epoch_participation_root,
            self.current_epoch_participation_root,
            pack_bytes(&[self.justification_bits]),
            self.previous_justified_checkpoint.hash_tree_root(),
            self.current_justified_checkpoint.hash_tree_root(),
            self.finalized_checkpoint.hash_tree_root(),
            self.inactivity_scores_root,
            self.current_sync_committee_root,
            self.next_sync_committee_root,
            self.latest_execution_payload_header_root,
            pack_u64(self.next_withdrawal_index),
            pack_u64(self.next_withdrawal_validator_index),
            self.historical_summaries_root,
        ]
    }
}

/// Deneb beacon state. Same field list as Capella; only the execution payload
/// header's own layout changed, which is opaque at this level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeaconStateDeneb {
    pub genesis_time: u64,
    pub genesis_validators_root: B256,
    pub slot: u64,
    pub fork: Fork,
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots_root: B256,
    pub state_roots_root: B256,
    pub historical_roots_root: B256,
    pub eth1_data: Eth1Data,
    pub eth1_data_votes_root: B256,
    pub eth1_deposit_index: u64,
    pub validators: Vec<Validator>,
    pub balances: Vec<u64>,
    pub randao_mixes_root: B256,
    pub slashings_root: B256,
    pub previous_epoch_participation_root: B256,
    pub current_epoch_participation_root: B256,
    pub justification_bits: u8,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
    pub inactivity_scores_root: B256,
    pub current_sync_committee_root: B256,
    pub next_sync_committee_root: B256,
    pub latest_execution_payload_header_root: B256,
    pub next_withdrawal_index: u64,
    pub next_withdrawal_validator_index: u64,
    pub historical_summaries_root: B256,
}

impl BeaconStateDeneb {
    fn top_level_roots(&self, validators_root: B256, balances_root: B256) -> Vec<B256> {
        vec![
            pack_u64(self.genesis_time),
            self.genesis_validators_root,
            pack_u64(self.slot),
            self.fork.hash_tree_root(),
            self.latest_block_header.hash_tree_root(),
            self.block_roots_root,
            self.state_roots_root,
            self.historical_roots_root,
            self.eth1_data.hash_tree_root(),
            self.eth1_data_votes_root,
            pack_u64(self.eth1_deposit_index),
            validators_root,
            balances_root,
            self.randao_mixes_root,
            self.slashings_root,
            self.previous_epoch_participation_root,
            self.current_epoch_participation_root,
            pack_bytes(&[self.justification_bits]),
            self.previous_justified_checkpoint.hash_tree_root(),
            self.current_justified_checkpoint.hash_tree_root(),
            self.finalized_checkpoint.hash_tree_root(),
            self.inactivity_scores_root,
            self.current_sync_committee_root,
            self.next_sync_committee_root,
            self.latest_execution_payload_header_root,
            pack_u64(self.next_withdrawal_index),
            pack_u64(self.next_withdrawal_validator_index),
            self.historical_summaries_root,
        ]
    }
}

/// Electra beacon state (37 fields): appends deposit/exit/consolidation
/// bookkeeping and the three pending-operation lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeaconStateElectra {
    pub genesis_time: u64,
    pub genesis_validators_root: B256,
    pub slot: u64,
    pub fork: Fork,
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots_root: B256,
    pub state_roots_root: B256,
    pub historical_roots_root: B256,
    pub eth1_data: Eth1Data,
    pub eth1_data_votes_root: B256,
    pub eth1_deposit_index: u64,
    pub validators: Vec<Validator>,
    pub balances: Vec<u64>,
    pub randao_mixes_root: B256,
    pub slashings_root: B256,
    pub previous_epoch_participation_root: B256,
    pub current_epoch_participation_root: B256,
    pub justification_bits: u8,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
    pub inactivity_scores_root: B256,
    pub current_sync_committee_root: B256,
    pub next_sync_committee_root: B256,
    pub latest_execution_payload_header_root: B256,
    pub next_withdrawal_index: u64,
    pub next_withdrawal_validator_index: u64,
    pub historical_summaries_root: B256,
    pub deposit_requests_start_index: u64,
    pub deposit_balance_to_consume: u64,
    pub exit_balance_to_consume: u64,
    pub earliest_exit_epoch: u64,
    pub consolidation_balance_to_consume: u64,
    pub earliest_consolidation_epoch: u64,
    pub pending_deposits_root: B256,
    pub pending_partial_withdrawals_root: B256,
    pub pending_consolidations_root: B256,
}

impl BeaconStateElectra {
    fn top_level_roots(&self, validators_root: B256, balances_root: B256) -> Vec<B256> {
        vec![
            pack_u64(self.genesis_time),
            self.genesis_validators_root,
            pack_u64(self.slot),
            self.fork.hash_tree_root(),
            self.latest_block_header.hash_tree_root(),
            self.block_roots_root,
            self.state_roots_root,
            self.historical_roots_root,
            self.eth1_data.hash_tree_root(),
            self.eth1_data_votes_root,
            pack_u64(self.eth1_deposit_index),
            validators_root,
            balances_root,
            self.randao_mixes_root,
            self.slashings_root,
            self.previous_epoch_participation_root,
            self.current_epoch_participation_root,
            pack_bytes(&[self.justification_bits]),
            self.previous_justified_checkpoint.hash_tree_root(),
            self.current_justified_checkpoint.hash_tree_root(),
            self.finalized_checkpoint.hash_tree_root(),
            self.inactivity_scores_root,
            self.current_sync_committee_root,
            self.next_sync_committee_root,
            self.latest_execution_payload_header_root,
            pack_u64(self.next_withdrawal_index),
            pack_u64(self.next_withdrawal_validator_index),
            self.historical_summaries_root,
            pack_u64(self.deposit_requests_start_index),
            pack_u64(self.deposit_balance_to_consume),
            pack_u64(self.exit_balance_to_consume),
            pack_u64(self.earliest_exit_epoch),
            pack_u64(self.consolidation_balance_to_consume),
            pack_u64(self.earliest_consolidation_epoch),
            self.pending_deposits_root,
            self.pending_partial_withdrawals_root,
            self.pending_consolidations_root,
        ]
    }
}

/// A beacon state tagged by its hard fork.
///
/// The variant fixes the container layout at compile time; the fork registry
/// supplies the matching field count and tree depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionedBeaconState {
    Phase0(BeaconStatePhase0),
    Altair(BeaconStateAltair),
    Bellatrix(BeaconStateBellatrix),
    Capella(BeaconStateCapella),
    Deneb(BeaconStateDeneb),
    Electra(BeaconStateElectra),
}

macro_rules! with_state {
    ($self:expr, $state:ident => $body:expr) => {
        match $self {
            VersionedBeaconState::Phase0($state) => $body,
            VersionedBeaconState::Altair($state) => $body,
            VersionedBeaconState::Bellatrix($state) => $body,
            VersionedBeaconState::Capella($state) => $body,
            VersionedBeaconState::Deneb($state) => $body,
            VersionedBeaconState::Electra($state) => $body,
        }
    };
}

impl VersionedBeaconState {
    /// Fork identity of this state.
    #[must_use]
    pub fn fork_name(&self) -> ForkName {
        match self {
            Self::Phase0(_) => ForkName::Phase0,
            Self::Altair(_) => ForkName::Altair,
            Self::Bellatrix(_) => ForkName::Bellatrix,
            Self::Capella(_) => ForkName::Capella,
            Self::Deneb(_) => ForkName::Deneb,
            Self::Electra(_) => ForkName::Electra,
        }
    }

    #[must_use]
    pub fn slot(&self) -> u64 {
        with_state!(self, state => state.slot)
    }

    #[must_use]
    pub fn genesis_time(&self) -> u64 {
        with_state!(self, state => state.genesis_time)
    }

    #[must_use]
    pub fn fork(&self) -> &Fork {
        with_state!(self, state => &state.fork)
    }

    #[must_use]
    pub fn validators(&self) -> &[Validator] {
        with_state!(self, state => &state.validators)
    }

    #[must_use]
    pub fn balances(&self) -> &[u64] {
        with_state!(self, state => &state.balances)
    }

    /// One root per immediate field of the state container, in field order.
    /// `validators_root` and `balances_root` are the finished (length-mixed)
    /// list roots computed by the prover's list trees.
    #[must_use]
    pub fn top_level_roots(&self, validators_root: B256, balances_root: B256) -> Vec<B256> {
        with_state!(self, state => state.top_level_roots(validators_root, balances_root))
    }
}
