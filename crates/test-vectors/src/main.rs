//! Test Vector Generator
//!
//! Builds a deterministic beacon state, proves a batch of validators and a
//! checkpoint against it, and writes the call params as JSON for the Solidity
//! verifier tests.

use alloy_primitives::B256;
use anyhow::Result;
use clap::Parser;
use eigenpod_proofs::beacon_state::BeaconStateDeneb;
use eigenpod_proofs::{
    BeaconBlockHeader, EigenPodProofs, PublicKeyBytes, Validator, VerifyCheckpointProofsCallParams,
    VerifyValidatorFieldsCallParams, VersionedBeaconState, DEFAULT_CACHE_EXPIRY_SECONDS,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "generate-test-vectors")]
#[command(about = "Generate EigenPod proof test vectors for Solidity tests")]
struct Args {
    /// Output directory for test vectors
    #[arg(short, long, default_value = "test-vectors")]
    output: PathBuf,

    /// Number of test validators in the state
    #[arg(long, default_value = "16")]
    num_validators: u64,

    /// Slot of the synthetic state
    #[arg(long, default_value = "8626176")]
    slot: u64,

    /// Chain id selecting genesis time and fork schedule
    #[arg(long, default_value = "1")]
    chain_id: u64,
}

/// Test vector file format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TestVectorFile {
    chain_id: u64,
    fork: String,
    block_root: B256,
    block_header: BeaconBlockHeader,
    beacon_state_root: B256,
    verify_validator_fields_call_params: VerifyValidatorFieldsCallParams,
    verify_checkpoint_proofs_call_params: VerifyCheckpointProofsCallParams,
}

/// Deterministic validator so vectors are reproducible across runs.
fn make_validator(index: u64) -> Validator {
    let mut pubkey = [0u8; 48];
    pubkey[..8].copy_from_slice(&index.to_le_bytes());
    pubkey[8] = 0xaa;

    let mut credentials = [0u8; 32];
    credentials[0] = 0x01;
    credentials[24..].copy_from_slice(&index.to_be_bytes());

    Validator {
        pubkey: PublicKeyBytes::from(pubkey),
        withdrawal_credentials: B256::from(credentials),
        effective_balance: 32_000_000_000,
        activation_epoch: 1_000 + index,
        exit_epoch: u64::MAX,
        withdrawable_epoch: u64::MAX,
        ..Validator::default()
    }
}

fn build_state(slot: u64, num_validators: u64) -> VersionedBeaconState {
    let mut state = BeaconStateDeneb {
        slot,
        genesis_time: 1_606_824_023,
        genesis_validators_root: B256::repeat_byte(0x4b),
        ..Default::default()
    };
    for index in 0..num_validators {
        state.validators.push(make_validator(index));
        state.balances.push(32_000_000_000 + index * 1_000_000);
    }
    VersionedBeaconState::Deneb(state)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    tracing::info!(
        output = %args.output.display(),
        validators = args.num_validators,
        slot = args.slot,
        "Generating test vectors"
    );

    let state = build_state(args.slot, args.num_validators);
    let prover = EigenPodProofs::new(args.chain_id, DEFAULT_CACHE_EXPIRY_SECONDS)?;

    let beacon_state_root = prover.compute_beacon_state_root(&state)?;
    let block_header = BeaconBlockHeader {
        slot: args.slot,
        proposer_index: 1,
        parent_root: B256::repeat_byte(0x70),
        state_root: beacon_state_root,
        body_root: B256::repeat_byte(0x0d),
    };

    let indices: Vec<u64> = (0..args.num_validators).collect();
    let validator_fields = prover.prove_validator_containers(&block_header, &state, &indices)?;
    let checkpoint = prover.prove_checkpoint_proofs(&block_header, &state, &indices)?;

    let file = TestVectorFile {
        chain_id: args.chain_id,
        fork: state.fork_name().to_string(),
        block_root: block_header.hash_tree_root(),
        block_header,
        beacon_state_root,
        verify_validator_fields_call_params: validator_fields,
        verify_checkpoint_proofs_call_params: checkpoint,
    };

    std::fs::create_dir_all(&args.output)?;
    let output_path = args.output.join("eigenpod_proofs.json");
    let json = serde_json::to_string_pretty(&file)?;
    std::fs::write(&output_path, json)?;

    tracing::info!(path = %output_path.display(), "Wrote test vectors");

    Ok(())
}
