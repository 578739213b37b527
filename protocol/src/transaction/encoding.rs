//! Canonical binary encoding of a transaction.
//!
//! Little-endian integers, variable-length counts and byte strings:
//!
//! ```text
//! version u16 | varint #inputs | inputs | varint #outputs | outputs
//!   | lock_time u64 | subnetwork_id [20] | gas u64 | varint len | payload
//!
//! input  = txid [32] | index u32 | varint len | signature_script | sequence u64 | sig_op_count u8
//! output = value u64 | script version u16 | varint len | script
//! ```
//!
//! The byte length of this form feeds compute mass. The same form with
//! signature scripts emptied is the preimage of the transaction id.

use crate::crypto::hash::KeyedHasher;

use super::types::{Transaction, TransactionId, TransactionInput, TransactionOutput};

// ---------------------------------------------------------------------------
// VarInt
// ---------------------------------------------------------------------------

/// Appends `value` as a compact integer: one byte below `0xfd`, otherwise a
/// `0xfd`/`0xfe`/`0xff` marker followed by 2, 4 or 8 little-endian bytes.
pub fn write_varint(out: &mut Vec<u8>, value: u64) {
    if value < 0xfd {
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Encoded width of [`write_varint`] for `value`.
pub fn varint_len(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

fn write_var_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

fn encode_input(out: &mut Vec<u8>, input: &TransactionInput, with_signature: bool) {
    out.extend_from_slice(input.previous_outpoint.transaction_id.as_bytes());
    out.extend_from_slice(&input.previous_outpoint.index.to_le_bytes());
    if with_signature {
        write_var_bytes(out, &input.signature_script);
    } else {
        write_varint(out, 0);
    }
    out.extend_from_slice(&input.sequence.to_le_bytes());
    out.push(input.sig_op_count);
}

fn encode_output(out: &mut Vec<u8>, output: &TransactionOutput) {
    out.extend_from_slice(&output.value.to_le_bytes());
    out.extend_from_slice(&output.script_public_key.version.to_le_bytes());
    write_var_bytes(out, &output.script_public_key.script);
}

fn encode(tx: &Transaction, with_signatures: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(tx));
    out.extend_from_slice(&tx.version.to_le_bytes());

    write_varint(&mut out, tx.inputs.len() as u64);
    for input in &tx.inputs {
        encode_input(&mut out, input, with_signatures);
    }

    write_varint(&mut out, tx.outputs.len() as u64);
    for output in &tx.outputs {
        encode_output(&mut out, output);
    }

    out.extend_from_slice(&tx.lock_time.to_le_bytes());
    out.extend_from_slice(tx.subnetwork_id.as_bytes());
    out.extend_from_slice(&tx.gas.to_le_bytes());
    write_var_bytes(&mut out, &tx.payload);
    out
}

/// Full canonical encoding, signature scripts included.
pub fn encode_transaction(tx: &Transaction) -> Vec<u8> {
    encode(tx, true)
}

/// Length of [`encode_transaction`] without allocating it.
pub fn encoded_len(tx: &Transaction) -> usize {
    let inputs: usize = tx
        .inputs
        .iter()
        .map(|i| 32 + 4 + varint_len(i.signature_script.len() as u64) + i.signature_script.len() + 8 + 1)
        .sum();
    let outputs: usize = tx
        .outputs
        .iter()
        .map(|o| {
            let script = &o.script_public_key.script;
            8 + 2 + varint_len(script.len() as u64) + script.len()
        })
        .sum();
    2 + varint_len(tx.inputs.len() as u64)
        + inputs
        + varint_len(tx.outputs.len() as u64)
        + outputs
        + 8
        + tx.subnetwork_id.as_bytes().len()
        + 8
        + varint_len(tx.payload.len() as u64)
        + tx.payload.len()
}

/// Transaction identifier: keyed hash over the encoding with empty signature
/// scripts, so the id is the same before and after signing.
pub fn transaction_id(tx: &Transaction) -> TransactionId {
    let preimage = encode(tx, false);
    TransactionId(KeyedHasher::transaction_id().update(&preimage).finalize())
}

/// [`transaction_id`] in display form (byte-reversed hex).
pub fn compute_transaction_id(tx: &Transaction) -> String {
    transaction_id(tx).to_hex()
}
