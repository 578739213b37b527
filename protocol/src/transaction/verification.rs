//! Signature verification of transactions reported by a remote source.
//!
//! This never runs on transactions built locally. Its job is to catch a
//! reported transaction whose signatures definitely do not match its
//! contents, without rejecting shapes this engine does not understand.
//!
//! The policy is **fail-open**:
//!
//! - An input that cannot be checked (missing spender address or amount,
//!   unresolvable address, non pay-to-public-key script, signature script of
//!   another shape) is skipped as inconclusive.
//! - Only a well-formed input whose schnorr signature does not verify makes
//!   the whole transaction [`VerificationOutcome::Invalid`].
//!
//! Do not tighten this to reject on parse failures: other clients produce
//! shapes that are valid on-chain but unknown here.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::sighash::{calc_schnorr_signature_hash, SigHashReusedValues};
use super::types::{
    Outpoint, ScriptPublicKey, SpentOutput, SubnetworkId, Transaction, TransactionInput, TransactionOutput,
};
use crate::address::{extract_x_only_public_key, ScriptResolver};
use crate::crypto::keys::parse_x_only_public_key;
use crate::crypto::signatures::{parse_signature_script, verify_digest};

// ---------------------------------------------------------------------------
// Reported shapes
// ---------------------------------------------------------------------------

/// One input as reported by an indexer or node, with whatever it knows
/// about the output being spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedInput {
    pub previous_outpoint: Outpoint,
    #[serde(with = "hex")]
    pub signature_script: Vec<u8>,
    pub sequence: u64,
    pub sig_op_count: u8,
    #[serde(default)]
    pub spender_address: Option<String>,
    #[serde(default)]
    pub spent_amount: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedTransaction {
    pub inputs: Vec<ReportedInput>,
    pub outputs: Vec<TransactionOutput>,
    pub version: u16,
    pub lock_time: u64,
    pub subnetwork_id: SubnetworkId,
    pub gas: u64,
    #[serde(with = "hex")]
    pub payload: Vec<u8>,
}

impl ReportedTransaction {
    fn to_transaction(&self) -> Transaction {
        Transaction {
            version: self.version,
            inputs: self
                .inputs
                .iter()
                .map(|i| TransactionInput {
                    previous_outpoint: i.previous_outpoint,
                    signature_script: i.signature_script.clone(),
                    sequence: i.sequence,
                    sig_op_count: i.sig_op_count,
                })
                .collect(),
            outputs: self.outputs.clone(),
            lock_time: self.lock_time,
            subnetwork_id: self.subnetwork_id,
            gas: self.gas,
            payload: self.payload.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum VerificationOutcome {
    /// Every input was checked and every signature matched.
    Valid,
    /// The signature of `input_index` definitely does not match.
    #[serde(rename_all = "camelCase")]
    Invalid { input_index: usize },
    /// Nothing mismatched, but at least one input could not be checked.
    Inconclusive { reason: String },
}

impl VerificationOutcome {
    /// Whether the caller should keep the transaction. Only `Invalid` is rejected.
    pub fn is_acceptable(&self) -> bool {
        !matches!(self, Self::Invalid { .. })
    }
}

enum InputCheck {
    Verified,
    Mismatch,
    Skipped(String),
}

fn check_input<R: ScriptResolver + ?Sized>(
    resolver: &R,
    tx: &Transaction,
    reported: &ReportedInput,
    index: usize,
    reused: &SigHashReusedValues,
) -> InputCheck {
    let Some(signature) = parse_signature_script(&reported.signature_script) else {
        return InputCheck::Skipped("unrecognized signature script".to_string());
    };
    let Some(address) = reported.spender_address.as_deref() else {
        return InputCheck::Skipped("spender address not reported".to_string());
    };
    let Some(amount) = reported.spent_amount else {
        return InputCheck::Skipped("spent amount not reported".to_string());
    };
    let script: ScriptPublicKey = match resolver.script_for_address(address) {
        Ok(script) => script,
        Err(e) => return InputCheck::Skipped(e.to_string()),
    };
    let Some(public_key) = extract_x_only_public_key(&script.script).and_then(|k| parse_x_only_public_key(&k)) else {
        return InputCheck::Skipped("spent script is not pay-to-public-key".to_string());
    };

    let spent = SpentOutput {
        amount,
        script_public_key: script,
    };
    let digest = match calc_schnorr_signature_hash(tx, index, &spent, reused) {
        Ok(digest) => digest,
        Err(e) => return InputCheck::Skipped(e.to_string()),
    };

    if verify_digest(&public_key, &digest, &signature) {
        InputCheck::Verified
    } else {
        InputCheck::Mismatch
    }
}

/// Checks every input of `reported`. Stops at the first definite mismatch.
pub fn verify_reported_transaction<R: ScriptResolver + ?Sized>(
    resolver: &R,
    reported: &ReportedTransaction,
) -> VerificationOutcome {
    if reported.inputs.is_empty() {
        return VerificationOutcome::Inconclusive {
            reason: "transaction has no inputs".to_string(),
        };
    }

    let tx = reported.to_transaction();
    let reused = SigHashReusedValues::new(&tx);
    let mut first_skip: Option<String> = None;

    for (index, input) in reported.inputs.iter().enumerate() {
        match check_input(resolver, &tx, input, index, &reused) {
            InputCheck::Verified => {}
            InputCheck::Mismatch => {
                warn!(input_index = index, outpoint = %input.previous_outpoint, "signature mismatch");
                return VerificationOutcome::Invalid { input_index: index };
            }
            InputCheck::Skipped(reason) => {
                debug!(input_index = index, %reason, "input not verifiable, skipping");
                if first_skip.is_none() {
                    first_skip = Some(format!("input {index}: {reason}"));
                }
            }
        }
    }

    match first_skip {
        Some(reason) => VerificationOutcome::Inconclusive { reason },
        None => VerificationOutcome::Valid,
    }
}

/// Fail-open verification over loose fields. `false` only on a definite
/// signature mismatch.
#[allow(clippy::too_many_arguments)]
pub fn verify_transaction_signatures<R: ScriptResolver + ?Sized>(
    resolver: &R,
    inputs: &[ReportedInput],
    outputs: &[TransactionOutput],
    version: u16,
    lock_time: u64,
    subnetwork_id: SubnetworkId,
    gas: u64,
    payload: &[u8],
) -> bool {
    let reported = ReportedTransaction {
        inputs: inputs.to_vec(),
        outputs: outputs.to_vec(),
        version,
        lock_time,
        subnetwork_id,
        gas,
        payload: payload.to_vec(),
    };
    verify_reported_transaction(resolver, &reported).is_acceptable()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
