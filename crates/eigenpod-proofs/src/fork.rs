//! Fork registry: per-fork beacon-state shapes and per-network schedules.
//!
//! The container layout of `BeaconState` changes at hard forks; everything the
//! prover needs to know about a fork's shape lives here. Field positions that
//! the proofs descend into (`validators`, `balances`, `slot`,
//! `latest_block_header`) have been stable since Phase0.

use std::fmt;

use crate::proof::ProofError;

/// Depth of the validator list data tree (registry capacity 2^40).
pub const VALIDATOR_LIST_TREE_DEPTH: usize = 40;

/// Depth of the balance list data tree: 4 balances per chunk gives a chunk
/// capacity of 2^38.
pub const BALANCE_LIST_TREE_DEPTH: usize = 38;

/// Field index of `genesis_time` in the beacon state.
pub const GENESIS_TIME_FIELD_INDEX: u64 = 0;

/// Field index of `slot`.
pub const SLOT_FIELD_INDEX: u64 = 2;

/// Field index of `latest_block_header`.
pub const LATEST_BLOCK_HEADER_FIELD_INDEX: u64 = 4;

/// Field index of `validators`.
pub const VALIDATORS_FIELD_INDEX: u64 = 11;

/// Field index of `balances`.
pub const BALANCES_FIELD_INDEX: u64 = 12;

/// Seconds per slot on all supported networks.
pub const SECONDS_PER_SLOT: u64 = 12;

/// Slots per epoch.
pub const SLOTS_PER_EPOCH: u64 = 32;

/// Identity of a consensus-layer hard fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ForkName {
    Phase0,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
    Electra,
}

impl ForkName {
    /// Number of immediate fields in this fork's `BeaconState` container.
    #[must_use]
    pub const fn state_field_count(self) -> usize {
        match self {
            Self::Phase0 => 21,
            Self::Altair => 24,
            Self::Bellatrix => 25,
            Self::Capella | Self::Deneb => 28,
            Self::Electra => 37,
        }
    }

    /// Depth of the state container tree: `ceil(log2(field_count))`.
    #[must_use]
    pub const fn state_tree_depth(self) -> usize {
        self.state_field_count().next_power_of_two().trailing_zeros() as usize
    }
}

impl fmt::Display for ForkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Phase0 => "phase0",
            Self::Altair => "altair",
            Self::Bellatrix => "bellatrix",
            Self::Capella => "capella",
            Self::Deneb => "deneb",
            Self::Electra => "electra",
        };
        f.write_str(name)
    }
}

/// A scheduled fork activation on one network.
#[derive(Debug, Clone, Copy)]
struct ScheduledFork {
    fork: ForkName,
    epoch: u64,
    version: [u8; 4],
}

const MAINNET_SCHEDULE: &[ScheduledFork] = &[
    ScheduledFork { fork: ForkName::Phase0, epoch: 0, version: [0x00, 0x00, 0x00, 0x00] },
    ScheduledFork { fork: ForkName::Altair, epoch: 74_240, version: [0x01, 0x00, 0x00, 0x00] },
    ScheduledFork { fork: ForkName::Bellatrix, epoch: 144_896, version: [0x02, 0x00, 0x00, 0x00] },
    ScheduledFork { fork: ForkName::Capella, epoch: 194_048, version: [0x03, 0x00, 0x00, 0x00] },
    ScheduledFork { fork: ForkName::Deneb, epoch: 269_568, version: [0x04, 0x00, 0x00, 0x00] },
    ScheduledFork { fork: ForkName::Electra, epoch: 364_032, version: [0x05, 0x00, 0x00, 0x00] },
];

const HOLESKY_SCHEDULE: &[ScheduledFork] = &[
    ScheduledFork { fork: ForkName::Phase0, epoch: 0, version: [0x01, 0x01, 0x70, 0x00] },
    ScheduledFork { fork: ForkName::Altair, epoch: 0, version: [0x02, 0x01, 0x70, 0x00] },
    ScheduledFork { fork: ForkName::Bellatrix, epoch: 0, version: [0x03, 0x01, 0x70, 0x00] },
    ScheduledFork { fork: ForkName::Capella, epoch: 256, version: [0x04, 0x01, 0x70, 0x00] },
    ScheduledFork { fork: ForkName::Deneb, epoch: 29_696, version: [0x05, 0x01, 0x70, 0x00] },
    ScheduledFork { fork: ForkName::Electra, epoch: 115_968, version: [0x06, 0x01, 0x70, 0x00] },
];

/// Chain constants for one network: genesis time and the fork schedule.
#[derive(Debug, Clone)]
pub struct Network {
    chain_id: u64,
    genesis_time: u64,
    schedule: &'static [ScheduledFork],
}

impl Network {
    /// Resolve the network for a chain id. Ethereum mainnet (1) and Holesky
    /// (17000) are supported.
    pub fn from_chain_id(chain_id: u64) -> Result<Self, ProofError> {
        match chain_id {
            1 => Ok(Self { chain_id, genesis_time: 1_606_824_023, schedule: MAINNET_SCHEDULE }),
            17_000 => Ok(Self { chain_id, genesis_time: 1_695_902_400, schedule: HOLESKY_SCHEDULE }),
            other => Err(ProofError::UnsupportedChain(other)),
        }
    }

    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    #[must_use]
    pub fn genesis_time(&self) -> u64 {
        self.genesis_time
    }

    /// Wall-clock timestamp of a slot: `genesis_time + slot * 12`.
    #[must_use]
    pub fn slot_timestamp(&self, slot: u64) -> u64 {
        self.genesis_time + slot * SECONDS_PER_SLOT
    }

    /// The fork active at an epoch.
    #[must_use]
    pub fn fork_at_epoch(&self, epoch: u64) -> ForkName {
        self.schedule
            .iter()
            .rev()
            .find(|scheduled| epoch >= scheduled.epoch)
            .map_or(ForkName::Phase0, |scheduled| scheduled.fork)
    }

    /// The fork active at a slot.
    #[must_use]
    pub fn fork_at_slot(&self, slot: u64) -> ForkName {
        self.fork_at_epoch(slot / SLOTS_PER_EPOCH)
    }

    /// Resolve a state's `fork.current_version` to a fork identity.
    pub fn fork_for_version(&self, version: [u8; 4]) -> Result<ForkName, ProofError> {
        self.schedule
            .iter()
            .find(|scheduled| scheduled.version == version)
            .map(|scheduled| scheduled.fork)
            .ok_or(ProofError::UnknownFork(version))
    }

    /// Version bytes of a fork on this network.
    #[must_use]
    pub fn fork_version(&self, fork: ForkName) -> Option<[u8; 4]> {
        self.schedule
            .iter()
            .find(|scheduled| scheduled.fork == fork)
            .map(|scheduled| scheduled.version)
    }
}
