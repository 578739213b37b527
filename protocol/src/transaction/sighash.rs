//! Per-input signing digest ("sighash", sign-all variant).
//!
//! Every hash here is 32-byte BLAKE2b keyed with `"TransactionSigningHash"`.
//! The digest for input `i` is fed, in order:
//!
//! ```text
//! version u16
//! H(prev outpoints)        txid [32] | index u32, per input
//! H(sequences)             u64, per input
//! H(sig op counts)         u8, per input
//! outpoint of input i      txid [32] | index u32
//! script version u16 (0)
//! spent script             u64 len | bytes
//! spent amount u64
//! sequence of input i u64
//! sig op count of input i u8
//! H(outputs)               value u64 | version u16 | u64 len | script, per output
//! lock_time u64 | subnetwork_id [20] | gas u64
//! payload hash             zero if native and empty, else H(u64 len | payload)
//! sighash type u8 (1)
//! ```
//!
//! Field widths, byte order and the empty-payload rule must match the
//! network's own computation exactly, or signatures never validate.

use crate::config::SCRIPT_PUBLIC_KEY_VERSION;
use crate::crypto::hash::{Hash32, KeyedHasher, ZERO_HASH};
use crate::crypto::signatures::SIG_HASH_ALL;
use crate::error::{EngineError, Result};

use super::types::{SpentOutput, Transaction};

// ---------------------------------------------------------------------------
// Reused sub-hashes
// ---------------------------------------------------------------------------

/// The transaction-wide sub-hashes, computed once and shared by every input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigHashReusedValues {
    pub previous_outputs_hash: Hash32,
    pub sequences_hash: Hash32,
    pub sig_op_counts_hash: Hash32,
    pub outputs_hash: Hash32,
    pub payload_hash: Hash32,
}

impl SigHashReusedValues {
    pub fn new(tx: &Transaction) -> Self {
        Self {
            previous_outputs_hash: previous_outputs_hash(tx),
            sequences_hash: sequences_hash(tx),
            sig_op_counts_hash: sig_op_counts_hash(tx),
            outputs_hash: outputs_hash(tx),
            payload_hash: payload_hash(tx),
        }
    }
}

fn previous_outputs_hash(tx: &Transaction) -> Hash32 {
    let mut hasher = KeyedHasher::signing();
    for input in &tx.inputs {
        hasher
            .update(input.previous_outpoint.transaction_id.as_bytes())
            .write_u32(input.previous_outpoint.index);
    }
    hasher.finalize()
}

fn sequences_hash(tx: &Transaction) -> Hash32 {
    let mut hasher = KeyedHasher::signing();
    for input in &tx.inputs {
        hasher.write_u64(input.sequence);
    }
    hasher.finalize()
}

fn sig_op_counts_hash(tx: &Transaction) -> Hash32 {
    let mut hasher = KeyedHasher::signing();
    for input in &tx.inputs {
        hasher.write_u8(input.sig_op_count);
    }
    hasher.finalize()
}

fn outputs_hash(tx: &Transaction) -> Hash32 {
    let mut hasher = KeyedHasher::signing();
    for output in &tx.outputs {
        hasher
            .write_u64(output.value)
            .write_u16(output.script_public_key.version)
            .write_var_bytes(&output.script_public_key.script);
    }
    hasher.finalize()
}

fn payload_hash(tx: &Transaction) -> Hash32 {
    if tx.subnetwork_id.is_native() && tx.payload.is_empty() {
        return ZERO_HASH;
    }
    KeyedHasher::signing().write_var_bytes(&tx.payload).finalize()
}

// ---------------------------------------------------------------------------
// Digest
// ---------------------------------------------------------------------------

/// Signing digest for `input_index`, spending `spent`.
pub fn calc_schnorr_signature_hash(
    tx: &Transaction,
    input_index: usize,
    spent: &SpentOutput,
    reused: &SigHashReusedValues,
) -> Result<Hash32> {
    let input = tx.inputs.get(input_index).ok_or(EngineError::InputIndexOutOfRange {
        index: input_index,
        count: tx.inputs.len(),
    })?;

    let mut hasher = KeyedHasher::signing();
    hasher
        .write_u16(tx.version)
        .update(reused.previous_outputs_hash)
        .update(reused.sequences_hash)
        .update(reused.sig_op_counts_hash)
        .update(input.previous_outpoint.transaction_id.as_bytes())
        .write_u32(input.previous_outpoint.index)
        .write_u16(SCRIPT_PUBLIC_KEY_VERSION)
        .write_var_bytes(&spent.script_public_key.script)
        .write_u64(spent.amount)
        .write_u64(input.sequence)
        .write_u8(input.sig_op_count)
        .update(reused.outputs_hash)
        .write_u64(tx.lock_time)
        .update(tx.subnetwork_id.as_bytes())
        .write_u64(tx.gas)
        .update(reused.payload_hash)
        .write_u8(SIG_HASH_ALL);

    Ok(hasher.finalize())
}

/// One-off digest that computes the shared sub-hashes itself.
pub fn signature_hash(tx: &Transaction, input_index: usize, spent: &SpentOutput) -> Result<Hash32> {
    calc_schnorr_signature_hash(tx, input_index, spent, &SigHashReusedValues::new(tx))
}
